//! Composers: per-form rendering policies.
//!
//! A [`Composer`] decides, for one named field, which widget, template,
//! label, help text and CSS classes are used when the field is rendered, and
//! gets a last look at the widget attributes and the template context. All
//! of its per-name overrides live in a [`ComposerConfig`]; a name missing
//! from a map means "use the next source", never "use an empty value".
//!
//! Composers are shared process-wide (see [`crate::registry`]) and are never
//! mutated after construction.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use formcraft_core::settings::ComposerSettings;
use formcraft_core::FormcraftResult;
use formcraft_forms::renderers::{resolve_renderer, Renderer, RendererSpec};
use formcraft_forms::widgets::{create_widget, Attrs, Context, Widget, WidgetType};
use formcraft_forms::Form;

/// How a composer overrides the widget of one field.
pub enum WidgetSpec {
    /// A widget type, instantiated fresh for every render.
    Type(WidgetType),
    /// A constructor, called for every render.
    Factory(fn() -> Box<dyn Widget>),
    /// A configured widget, deep-copied for every render.
    Instance(Box<dyn Widget>),
}

impl WidgetSpec {
    /// Produces a widget no other render shares.
    pub fn instantiate(&self) -> Box<dyn Widget> {
        match self {
            Self::Type(widget_type) => create_widget(*widget_type),
            Self::Factory(factory) => factory(),
            Self::Instance(widget) => widget.clone_box(),
        }
    }
}

impl fmt::Debug for WidgetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(widget_type) => f.debug_tuple("Type").field(widget_type).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::Instance(widget) => f.debug_tuple("Instance").field(widget).finish(),
        }
    }
}

impl From<WidgetType> for WidgetSpec {
    fn from(widget_type: WidgetType) -> Self {
        Self::Type(widget_type)
    }
}

impl From<Box<dyn Widget>> for WidgetSpec {
    fn from(widget: Box<dyn Widget>) -> Self {
        Self::Instance(widget)
    }
}

/// The overrides a composer applies.
///
/// Every map is optional; an absent map and an absent key behave the same.
///
/// # Examples
///
/// ```
/// use formcraft_composer::composer::ComposerConfig;
/// use formcraft_forms::WidgetType;
///
/// let config = ComposerConfig::new()
///     .with_widget("bio", WidgetType::Textarea)
///     .with_label("bio", "About you")
///     .with_error_css_class("is-invalid");
///
/// assert_eq!(config.labels.as_ref().and_then(|m| m.get("bio")).map(String::as_str), Some("About you"));
/// assert!(config.help_texts.is_none());
/// ```
#[derive(Debug, Default)]
pub struct ComposerConfig {
    /// The renderer this composer prefers over the form's.
    pub renderer: Option<RendererSpec>,
    /// CSS class for fields with errors; falls back to the form's.
    pub error_css_class: Option<String>,
    /// CSS class for required fields; falls back to the form's.
    pub required_css_class: Option<String>,
    /// Widget overrides by field name.
    pub widgets: Option<HashMap<String, WidgetSpec>>,
    /// Template overrides by field name.
    pub template_names: Option<HashMap<String, String>>,
    /// Label overrides by field name.
    pub labels: Option<HashMap<String, String>>,
    /// Help text overrides by field name.
    pub help_texts: Option<HashMap<String, String>>,
    /// CSS class overrides by field name.
    pub css_classes: Option<HashMap<String, String>>,
}

fn insert_named<V>(map: &mut Option<HashMap<String, V>>, name: impl Into<String>, value: V) {
    map.get_or_insert_with(HashMap::new).insert(name.into(), value);
}

fn lookup<'a, V>(map: Option<&'a HashMap<String, V>>, name: &str) -> Option<&'a V> {
    map.and_then(|m| m.get(name))
}

impl ComposerConfig {
    /// Creates a config with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the preferred renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl Into<RendererSpec>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }

    /// Sets the CSS class for fields with errors.
    #[must_use]
    pub fn with_error_css_class(mut self, class: impl Into<String>) -> Self {
        self.error_css_class = Some(class.into());
        self
    }

    /// Sets the CSS class for required fields.
    #[must_use]
    pub fn with_required_css_class(mut self, class: impl Into<String>) -> Self {
        self.required_css_class = Some(class.into());
        self
    }

    /// Overrides the widget of field `name`.
    #[must_use]
    pub fn with_widget(mut self, name: impl Into<String>, widget: impl Into<WidgetSpec>) -> Self {
        insert_named(&mut self.widgets, name, widget.into());
        self
    }

    /// Overrides the template of field `name`.
    #[must_use]
    pub fn with_template_name(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        insert_named(&mut self.template_names, name, template.into());
        self
    }

    /// Overrides the label of field `name`.
    #[must_use]
    pub fn with_label(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        insert_named(&mut self.labels, name, label.into());
        self
    }

    /// Overrides the help text of field `name`.
    #[must_use]
    pub fn with_help_text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        insert_named(&mut self.help_texts, name, text.into());
        self
    }

    /// Overrides the CSS classes of field `name`.
    #[must_use]
    pub fn with_css_classes(mut self, name: impl Into<String>, classes: impl Into<String>) -> Self {
        insert_named(&mut self.css_classes, name, classes.into());
        self
    }
}

/// A rendering policy for the fields of a form.
///
/// Implementors only have to expose their [`ComposerConfig`]; every
/// resolution step has a default that reads it. Styling themes override
/// [`get_default_template_name`](Self::get_default_template_name) and the
/// two hooks.
pub trait Composer: Send + Sync + fmt::Debug + 'static {
    /// Returns the overrides this composer applies.
    fn config(&self) -> &ComposerConfig;

    /// Returns a name for this composer, used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Resolves the renderer for `form`.
    ///
    /// The composer's own renderer wins, then the form's, then the
    /// configured default. `None` leaves the choice to the widget.
    fn get_renderer(
        &self,
        form: &dyn Form,
        settings: &ComposerSettings,
    ) -> FormcraftResult<Option<Arc<dyn Renderer>>> {
        if let Some(spec) = self.config().renderer.as_ref().or_else(|| form.default_renderer()) {
            tracing::debug!(composer = self.name(), renderer = ?spec, "Resolved renderer");
            return spec.instantiate().map(Some);
        }
        match settings.default_form_renderer.as_deref() {
            Some(id) => {
                tracing::debug!(composer = self.name(), renderer = id, "Using default renderer");
                resolve_renderer(id).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Returns a fresh widget for field `name` if one is configured.
    fn get_widget(&self, name: &str) -> Option<Box<dyn Widget>> {
        let widget = lookup(self.config().widgets.as_ref(), name)?.instantiate();
        tracing::debug!(field = name, widget = %widget.widget_type(), "Resolved widget override");
        Some(widget)
    }

    /// Resolves the template for field `name`.
    ///
    /// Hidden widgets always keep their own template; then the per-name
    /// override applies; then [`get_default_template_name`](Self::get_default_template_name).
    fn get_template_name(&self, name: &str, widget: &dyn Widget) -> String {
        if widget.is_hidden() {
            return widget.template_name().to_string();
        }
        lookup(self.config().template_names.as_ref(), name)
            .cloned()
            .unwrap_or_else(|| self.get_default_template_name(name, widget))
    }

    /// Computes the template used when no per-name override exists.
    fn get_default_template_name(&self, _name: &str, widget: &dyn Widget) -> String {
        widget.template_name().to_string()
    }

    /// Returns the label override for field `name`.
    fn get_label(&self, name: &str, _widget: &dyn Widget) -> Option<&str> {
        lookup(self.config().labels.as_ref(), name).map(String::as_str)
    }

    /// Returns the help text override for field `name`.
    fn get_help_text(&self, name: &str, _widget: &dyn Widget) -> Option<&str> {
        lookup(self.config().help_texts.as_ref(), name).map(String::as_str)
    }

    /// Returns the CSS class override for field `name`.
    fn get_css_classes(&self, name: &str, _widget: &dyn Widget) -> Option<&str> {
        lookup(self.config().css_classes.as_ref(), name).map(String::as_str)
    }

    /// The CSS class for fields with errors, if the composer sets one.
    fn error_css_class(&self) -> Option<&str> {
        self.config().error_css_class.as_deref()
    }

    /// The CSS class for required fields, if the composer sets one.
    fn required_css_class(&self) -> Option<&str> {
        self.config().required_css_class.as_deref()
    }

    /// Final pass over the merged widget attributes.
    fn build_widget_attrs(&self, _name: &str, attrs: Attrs, _widget: &dyn Widget) -> Attrs {
        attrs
    }

    /// Final pass over the template context.
    fn build_context(&self, _name: &str, context: Context, _widget: &dyn Widget) -> Context {
        context
    }
}

/// The composer that applies its config and nothing else.
///
/// With an empty config, fields render exactly as they would without a
/// composer.
#[derive(Debug, Default)]
pub struct BaseComposer {
    config: ComposerConfig,
}

impl BaseComposer {
    /// Creates a composer applying `config`.
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }
}

impl Composer for BaseComposer {
    fn config(&self) -> &ComposerConfig {
        &self.config
    }
}

/// CSS classes given either as one space-separated string or as tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(Vec<String>);

impl ClassList {
    /// Returns the individual class tokens.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.iter().flat_map(|c| c.split_whitespace())
    }
}

impl From<&str> for ClassList {
    fn from(classes: &str) -> Self {
        Self(vec![classes.to_string()])
    }
}

impl From<String> for ClassList {
    fn from(classes: String) -> Self {
        Self(vec![classes])
    }
}

impl From<Option<&str>> for ClassList {
    fn from(classes: Option<&str>) -> Self {
        classes.map(Self::from).unwrap_or_default()
    }
}

impl From<Vec<String>> for ClassList {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl From<&[&str]> for ClassList {
    fn from(tokens: &[&str]) -> Self {
        Self(tokens.iter().map(|t| (*t).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ClassList {
    fn from(tokens: [&str; N]) -> Self {
        Self(tokens.iter().map(|t| (*t).to_string()).collect())
    }
}
