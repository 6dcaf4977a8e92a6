//! Composer registry.
//!
//! Composers are referred to by string identifier in settings and forms. The
//! registry maps each identifier to the composer type it names and keeps one
//! shared instance per type, created on first use.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use formcraft_core::settings::{ComposerSettings, DEFAULT_COMPOSER};
use formcraft_core::{FormcraftError, FormcraftResult};
use formcraft_forms::Form;

use crate::bootstrap4::Bootstrap4;
use crate::composer::{BaseComposer, Composer};

/// Identifier of the built-in Bootstrap 4 composer.
pub const BOOTSTRAP4_COMPOSER: &str = "formcraft.composers.Bootstrap4";

type ComposerFactory = fn() -> Arc<dyn Composer>;

fn make<C: Composer + Default>() -> Arc<dyn Composer> {
    Arc::new(C::default())
}

/// Maps identifiers to composer types and caches one instance per type.
///
/// Two identifiers registered for the same type share its instance.
#[derive(Default)]
pub struct ComposerRegistry {
    factories: HashMap<String, (TypeId, ComposerFactory)>,
    instances: RwLock<HashMap<TypeId, Arc<dyn Composer>>>,
}

impl std::fmt::Debug for ComposerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ComposerRegistry").field("composers", &names).finish()
    }
}

impl ComposerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in composers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<BaseComposer>(DEFAULT_COMPOSER);
        registry.register::<Bootstrap4>(BOOTSTRAP4_COMPOSER);
        registry
    }

    /// Registers composer type `C` under `id`, replacing any previous entry.
    pub fn register<C: Composer + Default>(&mut self, id: impl Into<String>) {
        let id = id.into();
        tracing::debug!(composer = %id, "Registering composer");
        self.factories.insert(id, (TypeId::of::<C>(), make::<C>));
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Returns the shared composer registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`FormcraftError::ImportError`] if `id` is not registered.
    pub fn get(&self, id: &str) -> FormcraftResult<Arc<dyn Composer>> {
        let (type_id, factory) = self.factories.get(id).ok_or_else(|| {
            tracing::warn!(composer = id, "Unknown composer identifier");
            FormcraftError::ImportError(id.to_string())
        })?;
        Ok(self.shared(*type_id, *factory))
    }

    /// Returns the shared instance of `C`, whether or not it is registered.
    pub fn instance<C: Composer + Default>(&self) -> Arc<dyn Composer> {
        self.shared(TypeId::of::<C>(), make::<C>)
    }

    fn shared(&self, type_id: TypeId, factory: ComposerFactory) -> Arc<dyn Composer> {
        if let Some(existing) = self
            .instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
        {
            return Arc::clone(existing);
        }
        let mut instances = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(instances.entry(type_id).or_insert_with(factory))
    }
}

/// Returns the global composer registry, pre-populated with the built-ins.
pub fn composer_registry() -> &'static RwLock<ComposerRegistry> {
    static REGISTRY: OnceLock<RwLock<ComposerRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(ComposerRegistry::with_builtins()))
}

/// Registers composer type `C` in the global registry.
pub fn register_composer<C: Composer + Default>(id: impl Into<String>) {
    composer_registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register::<C>(id);
}

/// Resolves a composer identifier through the global registry.
pub fn resolve_composer(id: &str) -> FormcraftResult<Arc<dyn Composer>> {
    composer_registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(id)
}

/// Returns the composer for `form`: the one it names, else the configured
/// default.
pub fn get_composer(form: &dyn Form, settings: &ComposerSettings) -> FormcraftResult<Arc<dyn Composer>> {
    let id = form.composer().unwrap_or(settings.default_composer.as_str());
    resolve_composer(id)
}
