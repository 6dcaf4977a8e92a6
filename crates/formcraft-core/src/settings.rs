//! Settings for formcraft.
//!
//! This module provides the [`Settings`] struct, which holds all configuration,
//! and [`LazySettings`], a globally-accessible, lazily-initialized settings instance.
//!
//! The composer layer reads exactly two values: the identifier of the composer
//! used when a form declares none, and the identifier of the renderer used when
//! neither the composer nor the form names one. Both live in
//! [`ComposerSettings`], an immutable value that is passed explicitly to
//! whatever resolves composers and renderers.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Identifier of the composer that applies no overrides at all.
pub const DEFAULT_COMPOSER: &str = "formcraft.composer.BaseComposer";

/// Identifier of the Tera-backed renderer shipped with the forms crate.
pub const DEFAULT_FORM_RENDERER: &str = "formcraft.forms.renderers.TemplatesRenderer";

/// Defaults consulted by the composer layer.
///
/// # Examples
///
/// ```
/// use formcraft_core::settings::ComposerSettings;
///
/// let settings = ComposerSettings::default();
/// assert_eq!(settings.default_composer, "formcraft.composer.BaseComposer");
/// assert!(settings.default_form_renderer.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerSettings {
    /// Composer used for forms that do not declare their own.
    pub default_composer: String,
    /// Renderer used when neither the composer nor the form specifies one.
    pub default_form_renderer: Option<String>,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            default_composer: DEFAULT_COMPOSER.to_string(),
            default_form_renderer: None,
        }
    }
}

impl ComposerSettings {
    /// Returns the composer settings from [`SETTINGS`] if they were configured,
    /// otherwise the defaults.
    pub fn current() -> Self {
        if SETTINGS.is_configured() {
            SETTINGS.get().composer.clone()
        } else {
            Self::default()
        }
    }
}

/// The complete set of settings.
///
/// # Examples
///
/// ```
/// use formcraft_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.log_level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,

    // ── Rendering ────────────────────────────────────────────────────

    /// The renderer used by widgets when nothing more specific is configured.
    pub form_renderer: String,
    /// Additional directories searched for templates by the default renderer.
    pub template_dirs: Vec<PathBuf>,

    // ── Composer ─────────────────────────────────────────────────────

    /// Defaults for composer and renderer resolution.
    pub composer: ComposerSettings,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            form_renderer: DEFAULT_FORM_RENDERER.to_string(),
            template_dirs: Vec::new(),
            composer: ComposerSettings::default(),
            log_level: "info".to_string(),
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) to access them.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();
