//! Template renderers.
//!
//! A [`Renderer`] turns a template name and a [`Context`] into markup. The
//! shipped implementation, [`TemplatesRenderer`], is backed by Tera and
//! carries the built-in widget templates (`formcraft/widgets/*.html`) and the
//! Bootstrap 4 field templates (`formcraft/bootstrap4/*.html`).
//!
//! Renderers are referred to by identifier in configuration. The
//! [`RendererRegistry`] maps identifiers to factories; [`RendererSpec`] is the
//! value a form or composer holds to name the renderer it wants.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};

use formcraft_core::settings::{Settings, DEFAULT_FORM_RENDERER, SETTINGS};
use formcraft_core::{FormcraftError, FormcraftResult};

use crate::widgets::Context;

/// Produces markup from a template name and a context.
pub trait Renderer: Send + Sync + fmt::Debug {
    /// Renders the named template with the given context.
    fn render(&self, template_name: &str, context: &Context) -> FormcraftResult<String>;
}

/// A function that constructs a renderer.
pub type RendererFactory = fn() -> FormcraftResult<Arc<dyn Renderer>>;

/// Built-in templates as `(name, source)` pairs.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("formcraft/widgets/attrs.html", include_str!("../templates/formcraft/widgets/attrs.html")),
    ("formcraft/widgets/input.html", include_str!("../templates/formcraft/widgets/input.html")),
    ("formcraft/widgets/text.html", include_str!("../templates/formcraft/widgets/text.html")),
    ("formcraft/widgets/hidden.html", include_str!("../templates/formcraft/widgets/hidden.html")),
    ("formcraft/widgets/number.html", include_str!("../templates/formcraft/widgets/number.html")),
    ("formcraft/widgets/email.html", include_str!("../templates/formcraft/widgets/email.html")),
    ("formcraft/widgets/url.html", include_str!("../templates/formcraft/widgets/url.html")),
    ("formcraft/widgets/password.html", include_str!("../templates/formcraft/widgets/password.html")),
    ("formcraft/widgets/date.html", include_str!("../templates/formcraft/widgets/date.html")),
    ("formcraft/widgets/datetime.html", include_str!("../templates/formcraft/widgets/datetime.html")),
    ("formcraft/widgets/time.html", include_str!("../templates/formcraft/widgets/time.html")),
    ("formcraft/widgets/file.html", include_str!("../templates/formcraft/widgets/file.html")),
    (
        "formcraft/widgets/clearable_file_input.html",
        include_str!("../templates/formcraft/widgets/clearable_file_input.html"),
    ),
    ("formcraft/widgets/textarea.html", include_str!("../templates/formcraft/widgets/textarea.html")),
    ("formcraft/widgets/checkbox.html", include_str!("../templates/formcraft/widgets/checkbox.html")),
    ("formcraft/widgets/select.html", include_str!("../templates/formcraft/widgets/select.html")),
    ("formcraft/widgets/radio.html", include_str!("../templates/formcraft/widgets/radio.html")),
    (
        "formcraft/widgets/checkbox_select.html",
        include_str!("../templates/formcraft/widgets/checkbox_select.html"),
    ),
    ("formcraft/bootstrap4/widget.html", include_str!("../templates/formcraft/bootstrap4/widget.html")),
    ("formcraft/bootstrap4/input.html", include_str!("../templates/formcraft/bootstrap4/input.html")),
    ("formcraft/bootstrap4/checkbox.html", include_str!("../templates/formcraft/bootstrap4/checkbox.html")),
    (
        "formcraft/bootstrap4/checkbox_select.html",
        include_str!("../templates/formcraft/bootstrap4/checkbox_select.html"),
    ),
    (
        "formcraft/bootstrap4/radio_select.html",
        include_str!("../templates/formcraft/bootstrap4/radio_select.html"),
    ),
    ("formcraft/bootstrap4/file.html", include_str!("../templates/formcraft/bootstrap4/file.html")),
];

/// Escapes a string for safe inclusion in HTML.
///
/// Converts `&`, `<`, `>`, `"`, and `'` to their HTML entity equivalents.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// A Tera-backed renderer.
///
/// Templates found in the configured directories take precedence over the
/// built-in templates of the same name.
///
/// # Examples
///
/// ```
/// use formcraft_forms::renderers::{Renderer, TemplatesRenderer};
/// use formcraft_forms::widgets::Context;
///
/// let renderer = TemplatesRenderer::new()
///     .unwrap()
///     .with_template("hello.html", "Hello {{ name }}!")
///     .unwrap();
///
/// let mut ctx = Context::new();
/// ctx.insert("name".to_string(), "<World>".into());
/// assert_eq!(renderer.render("hello.html", &ctx).unwrap(), "Hello &lt;World&gt;!");
/// ```
#[derive(Debug, Clone)]
pub struct TemplatesRenderer {
    tera: tera::Tera,
}

impl TemplatesRenderer {
    /// Creates a renderer holding only the built-in templates.
    pub fn new() -> FormcraftResult<Self> {
        Self::with_dirs(&[])
    }

    /// Creates a renderer that loads every template under the given directories
    /// and falls back to the built-in templates.
    pub fn with_dirs(dirs: &[PathBuf]) -> FormcraftResult<Self> {
        let mut tera = tera::Tera::default();
        for dir in dirs {
            let loaded = load_dir(dir)?;
            tera.extend(&loaded).map_err(template_error)?;
        }

        let mut builtins = tera::Tera::default();
        builtins
            .add_raw_templates(BUILTIN_TEMPLATES.iter().copied())
            .map_err(template_error)?;
        tera.extend(&builtins).map_err(template_error)?;

        tera.set_escape_fn(escape_html);
        tracing::debug!(
            dirs = dirs.len(),
            templates = tera.get_template_names().count(),
            "Built templates renderer"
        );
        Ok(Self { tera })
    }

    /// Creates a renderer using the template directories from the settings.
    pub fn from_settings(settings: &Settings) -> FormcraftResult<Self> {
        Self::with_dirs(&settings.template_dirs)
    }

    /// Adds (or replaces) an in-memory template.
    pub fn with_template(mut self, name: &str, source: &str) -> FormcraftResult<Self> {
        self.tera
            .add_raw_template(name, source)
            .map_err(template_error)?;
        Ok(self)
    }

    /// Returns `true` if a template with the given name is available.
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }
}

impl Renderer for TemplatesRenderer {
    fn render(&self, template_name: &str, context: &Context) -> FormcraftResult<String> {
        if !self.has_template(template_name) {
            return Err(FormcraftError::TemplateDoesNotExist(template_name.to_string()));
        }
        let ctx = tera::Context::from_value(serde_json::Value::Object(context.clone()))
            .map_err(template_error)?;
        self.tera.render(template_name, &ctx).map_err(|e| match e.kind {
            tera::ErrorKind::TemplateNotFound(name) => FormcraftError::TemplateDoesNotExist(name),
            _ => template_error(e),
        })
    }
}

fn load_dir(dir: &Path) -> FormcraftResult<tera::Tera> {
    let glob = format!("{}/**/*", dir.display());
    tera::Tera::parse(&glob).map_err(|e| {
        FormcraftError::ConfigurationError(format!(
            "Failed to load templates from '{}': {}",
            dir.display(),
            describe(&e)
        ))
    })
}

fn template_error(e: tera::Error) -> FormcraftError {
    FormcraftError::TemplateError(describe(&e))
}

/// Flattens a Tera error and its sources into one message.
fn describe(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

// ============================================================
// Registry
// ============================================================

/// Maps renderer identifiers to factories.
#[derive(Debug, Default)]
pub struct RendererRegistry {
    factories: HashMap<String, RendererFactory>,
}

impl RendererRegistry {
    /// Creates a registry containing the built-in renderer.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register(DEFAULT_FORM_RENDERER, shared_templates_renderer);
        registry
    }

    /// Registers (or replaces) a renderer factory under an identifier.
    pub fn register(&mut self, id: impl Into<String>, factory: RendererFactory) {
        self.factories.insert(id.into(), factory);
    }

    /// Returns `true` if the identifier is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Resolves an identifier and constructs the renderer.
    ///
    /// # Errors
    ///
    /// Returns [`FormcraftError::ImportError`] if the identifier is unknown.
    pub fn resolve(&self, id: &str) -> FormcraftResult<Arc<dyn Renderer>> {
        let factory = self.factories.get(id).ok_or_else(|| {
            tracing::warn!(renderer = id, "Unknown renderer identifier");
            FormcraftError::ImportError(id.to_string())
        })?;
        factory()
    }
}

/// Returns the global renderer registry.
pub fn renderer_registry() -> &'static RwLock<RendererRegistry> {
    static REGISTRY: OnceLock<RwLock<RendererRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(RendererRegistry::new()))
}

/// Registers a renderer factory in the global registry.
pub fn register_renderer(id: impl Into<String>, factory: RendererFactory) {
    renderer_registry()
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .register(id, factory);
}

/// Resolves a renderer identifier through the global registry.
pub fn resolve_renderer(id: &str) -> FormcraftResult<Arc<dyn Renderer>> {
    renderer_registry()
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .resolve(id)
}

/// The process-wide [`TemplatesRenderer`], built on first use from the
/// global settings' template directories (if configured).
pub fn templates_renderer() -> FormcraftResult<Arc<TemplatesRenderer>> {
    static SHARED: OnceLock<Arc<TemplatesRenderer>> = OnceLock::new();
    if let Some(renderer) = SHARED.get() {
        return Ok(Arc::clone(renderer));
    }
    let renderer = if SETTINGS.is_configured() {
        TemplatesRenderer::from_settings(SETTINGS.get())?
    } else {
        TemplatesRenderer::new()?
    };
    Ok(Arc::clone(SHARED.get_or_init(|| Arc::new(renderer))))
}

fn shared_templates_renderer() -> FormcraftResult<Arc<dyn Renderer>> {
    let renderer: Arc<dyn Renderer> = templates_renderer()?;
    Ok(renderer)
}

/// Returns the renderer named by the `form_renderer` setting (the built-in
/// templates renderer when settings were never configured).
pub fn default_renderer() -> FormcraftResult<Arc<dyn Renderer>> {
    if SETTINGS.is_configured() {
        resolve_renderer(&SETTINGS.get().form_renderer)
    } else {
        resolve_renderer(DEFAULT_FORM_RENDERER)
    }
}

// ============================================================
// RendererSpec
// ============================================================

/// How a form or composer names its renderer.
#[derive(Clone)]
pub enum RendererSpec {
    /// An identifier resolved through the global [`RendererRegistry`].
    Named(String),
    /// A factory called on every resolution.
    Type(RendererFactory),
    /// A ready-made renderer used as-is.
    Instance(Arc<dyn Renderer>),
}

impl RendererSpec {
    /// Produces the renderer this spec refers to.
    ///
    /// # Errors
    ///
    /// Returns [`FormcraftError::ImportError`] for an unknown identifier, or
    /// whatever the factory returns.
    pub fn instantiate(&self) -> FormcraftResult<Arc<dyn Renderer>> {
        match self {
            Self::Named(id) => resolve_renderer(id),
            Self::Type(factory) => factory(),
            Self::Instance(renderer) => Ok(Arc::clone(renderer)),
        }
    }
}

impl fmt::Debug for RendererSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(id) => f.debug_tuple("Named").field(id).finish(),
            Self::Type(_) => f.write_str("Type(..)"),
            Self::Instance(r) => f.debug_tuple("Instance").field(r).finish(),
        }
    }
}

impl From<&str> for RendererSpec {
    fn from(id: &str) -> Self {
        Self::Named(id.to_string())
    }
}

impl From<String> for RendererSpec {
    fn from(id: String) -> Self {
        Self::Named(id)
    }
}

impl From<Arc<dyn Renderer>> for RendererSpec {
    fn from(renderer: Arc<dyn Renderer>) -> Self {
        Self::Instance(renderer)
    }
}
