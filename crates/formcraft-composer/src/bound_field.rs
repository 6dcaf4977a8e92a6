//! Bound fields rendered through a composer.
//!
//! [`BoundField`] wraps the plain [`formcraft_forms::BoundField`] and asks a
//! [`Composer`] at every decision point: which widget to use, which
//! attributes to add, which template to render and what to put in its
//! context. With a composer that overrides nothing, the markup is the same
//! as the plain bound field's.

use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use formcraft_core::logging::render_span;
use formcraft_core::settings::ComposerSettings;
use formcraft_core::{FormcraftError, FormcraftResult};
use formcraft_forms::bound_field::BoundField as PlainBoundField;
use formcraft_forms::renderers::escape_html;
use formcraft_forms::widgets::{Attrs, Context, Widget};
use formcraft_forms::{Form, FormFieldDef, Value};

use crate::composer::{ClassList, Composer};
use crate::registry::get_composer;

/// A form field bound to its form and rendered through a composer.
///
/// The adapter is built for one render. The widget the composer picks is
/// resolved on first use and kept for the adapter's lifetime, so repeated
/// accessors see the same widget.
pub struct BoundField<'a> {
    inner: PlainBoundField<'a>,
    composer: Arc<dyn Composer>,
    settings: ComposerSettings,
    widget: OnceCell<Option<Box<dyn Widget>>>,
}

impl fmt::Debug for BoundField<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundField")
            .field("name", &self.name())
            .field("composer", &self.composer.name())
            .finish_non_exhaustive()
    }
}

impl<'a> BoundField<'a> {
    /// Binds `field` of `form` under `name`, rendered through `composer`.
    ///
    /// Settings default to [`ComposerSettings::current`].
    pub fn new(
        form: &'a dyn Form,
        field: &'a FormFieldDef,
        name: &'a str,
        composer: Arc<dyn Composer>,
    ) -> Self {
        Self {
            inner: PlainBoundField::new(form, field, name),
            composer,
            settings: ComposerSettings::current(),
            widget: OnceCell::new(),
        }
    }

    /// Binds the field called `name`, using the form's composer.
    ///
    /// # Errors
    ///
    /// Returns [`FormcraftError::FieldDoesNotExist`] for an unknown field and
    /// [`FormcraftError::ImportError`] for an unknown composer.
    pub fn for_field(form: &'a dyn Form, name: &str, settings: ComposerSettings) -> FormcraftResult<Self> {
        let field = form
            .field(name)
            .ok_or_else(|| FormcraftError::FieldDoesNotExist(name.to_string()))?;
        let composer = get_composer(form, &settings)?;
        Ok(Self::new(form, field, &field.name, composer).with_settings(settings))
    }

    /// Replaces the settings used for renderer fallback.
    #[must_use]
    pub fn with_settings(mut self, settings: ComposerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The plain bound field this adapter wraps.
    pub fn inner(&self) -> &PlainBoundField<'a> {
        &self.inner
    }

    /// The composer this field renders through.
    pub fn composer(&self) -> &Arc<dyn Composer> {
        &self.composer
    }

    pub fn form(&self) -> &'a dyn Form {
        self.inner.form()
    }

    pub fn field(&self) -> &'a FormFieldDef {
        self.inner.field()
    }

    pub fn name(&self) -> &'a str {
        self.inner.name()
    }

    pub fn html_name(&self) -> String {
        self.inner.html_name()
    }

    pub fn html_initial_name(&self) -> String {
        self.inner.html_initial_name()
    }

    pub fn html_initial_id(&self) -> String {
        self.inner.html_initial_id()
    }

    pub fn auto_id(&self) -> String {
        self.inner.auto_id()
    }

    pub fn errors(&self) -> &'a [String] {
        self.inner.errors()
    }

    /// The widget this field renders with: the composer's override if it has
    /// one for this name, else the field's own.
    pub fn widget(&self) -> &dyn Widget {
        self.widget
            .get_or_init(|| self.composer.get_widget(self.name()))
            .as_deref()
            .unwrap_or_else(|| self.field().widget.as_ref())
    }

    /// The label, preferring the composer's override.
    pub fn label(&self) -> &str {
        self.composer
            .get_label(self.name(), self.widget())
            .unwrap_or_else(|| self.inner.label())
    }

    /// The help text, preferring the composer's override.
    pub fn help_text(&self) -> &str {
        self.composer
            .get_help_text(self.name(), self.widget())
            .unwrap_or_else(|| self.inner.help_text())
    }

    pub fn is_hidden(&self) -> bool {
        self.widget().is_hidden()
    }

    /// The initial value, trimmed to what the widget can display.
    pub fn initial(&self) -> Value {
        let value = self
            .form()
            .initial()
            .get(self.name())
            .or(self.field().initial.as_ref())
            .cloned()
            .unwrap_or(Value::Null);
        if self.widget().supports_microseconds() {
            value
        } else {
            value.without_microseconds()
        }
    }

    /// The submitted value, read through the widget.
    pub fn data(&self) -> Value {
        self.inner.data_with(self.widget())
    }

    /// The value to display: submitted data when bound, else the initial value.
    pub fn value(&self) -> Value {
        let mut value = self.initial();
        if self.form().is_bound() {
            value = self.field().bound_data(self.data(), value);
        }
        self.field().prepare_value(value)
    }

    pub fn id_for_label(&self) -> String {
        self.inner.id_for_label_with(self.widget())
    }

    /// Merges attributes for `widget` and gives the composer the last word.
    ///
    /// From lowest to highest priority: the `required` and `disabled`
    /// markers, the widget's stored attributes, `attrs`, then whatever the
    /// composer's hook returns.
    pub fn build_widget_attrs(&self, attrs: &Attrs, widget: &dyn Widget) -> Attrs {
        let mut merged = widget.build_attrs(widget.attrs(), attrs);
        let markers = self.inner.build_widget_attrs(&Attrs::new(), widget);
        for (key, value) in markers {
            merged.entry(key).or_insert(value);
        }
        self.composer.build_widget_attrs(self.name(), merged, widget)
    }

    /// Space-joined CSS classes for this field.
    ///
    /// `extra` comes first with duplicates dropped, followed by the error
    /// class when the field has errors and the required class when it is
    /// required. The composer's classes win over the form's.
    pub fn css_classes(&self, extra: impl Into<ClassList>) -> String {
        let extra = extra.into();
        let mut tokens: Vec<&str> = extra.tokens().collect();
        if self.inner.has_errors() {
            tokens.extend(self.error_css_class());
        }
        if self.field().required {
            tokens.extend(self.required_css_class());
        }
        let mut classes: Vec<&str> = Vec::with_capacity(tokens.len());
        for token in tokens {
            if !token.is_empty() && !classes.contains(&token) {
                classes.push(token);
            }
        }
        classes.join(" ")
    }

    /// The composer's error class, else the form's. Empty strings count as unset.
    fn error_css_class(&self) -> Option<&str> {
        non_empty(self.composer.error_css_class()).or_else(|| non_empty(self.form().error_css_class()))
    }

    fn required_css_class(&self) -> Option<&str> {
        non_empty(self.composer.required_css_class())
            .or_else(|| non_empty(self.form().required_css_class()))
    }

    /// Builds the template context for `widget`.
    ///
    /// `extra_context` overrides the widget's own context. `label`,
    /// `help_text` and `css_classes` are filled in only where still absent;
    /// `errors` always reflects the field.
    pub fn get_context(
        &self,
        widget: &dyn Widget,
        html_name: &str,
        value: &Value,
        attrs: &Attrs,
        extra_context: &Context,
    ) -> Context {
        let mut context = widget.get_context(html_name, value, attrs);
        for (key, value) in extra_context {
            context.insert(key.clone(), value.clone());
        }

        let name = self.name();
        if !context.contains_key("label") {
            let label = self
                .composer
                .get_label(name, widget)
                .unwrap_or_else(|| self.inner.label());
            context.insert("label".to_string(), label.into());
        }
        if !context.contains_key("help_text") {
            let help_text = self
                .composer
                .get_help_text(name, widget)
                .unwrap_or_else(|| self.inner.help_text());
            context.insert("help_text".to_string(), help_text.into());
        }
        if !context.contains_key("css_classes") {
            let css_classes = self.css_classes(self.composer.get_css_classes(name, widget));
            context.insert("css_classes".to_string(), css_classes.into());
        }
        context.insert("errors".to_string(), self.errors().into());

        tracing::trace!(field = name, keys = context.len(), "Built field context");
        context
    }

    /// Renders the field.
    ///
    /// `widget` replaces the resolved widget for this call. With
    /// `only_initial`, renders the hidden copy of the initial value.
    ///
    /// # Errors
    ///
    /// Propagates renderer resolution and template failures.
    pub fn as_widget(
        &self,
        widget: Option<&dyn Widget>,
        attrs: &Attrs,
        only_initial: bool,
        extra_context: &Context,
    ) -> FormcraftResult<String> {
        let span = render_span(self.composer.name(), self.name());
        let _guard = span.enter();

        let mut widget = widget.unwrap_or_else(|| self.widget()).clone_box();
        if self.field().localize {
            widget.set_localized(true);
        }

        let mut attrs = self.build_widget_attrs(attrs, widget.as_ref());
        let auto_id = self.auto_id();
        if !auto_id.is_empty() && !widget.attrs().contains_key("id") {
            let id = if only_initial {
                self.html_initial_id()
            } else {
                auto_id
            };
            attrs.entry("id").or_insert(id.into());
        }

        let (html_name, value) = if only_initial {
            let name = self.html_initial_name();
            let value = self
                .inner
                .submitted_initial(&name)
                .unwrap_or_else(|| self.value());
            (name, value)
        } else {
            (self.html_name(), self.value())
        };

        let context = self.get_context(widget.as_ref(), &html_name, &value, &attrs, extra_context);
        let template_name = self.composer.get_template_name(self.name(), widget.as_ref());
        let context = self.composer.build_context(self.name(), context, widget.as_ref());
        let renderer = self.composer.get_renderer(self.form(), &self.settings)?;
        tracing::debug!(template = %template_name, "Rendering field");
        widget.render_with(&template_name, &context, renderer.as_deref())
    }

    /// Renders the field as a hidden input.
    pub fn as_hidden(&self, attrs: &Attrs, only_initial: bool) -> FormcraftResult<String> {
        let hidden = self.field().hidden_widget();
        self.as_widget(Some(hidden.as_ref()), attrs, only_initial, &Context::new())
    }

    /// Renders the field, followed by the hidden initial value when the
    /// field asks for one.
    pub fn render(&self) -> FormcraftResult<String> {
        let mut html = self.as_widget(None, &Attrs::new(), false, &Context::new())?;
        if self.field().show_hidden_initial {
            html.push_str(&self.as_hidden(&Attrs::new(), true)?);
        }
        Ok(html)
    }

    /// Renders a `<label>` for this field with the resolved label.
    pub fn label_tag(&self) -> String {
        let label_id = self.id_for_label();
        let class = match self.required_css_class() {
            Some(class) if self.field().required => format!(r#" class="{}""#, escape_html(class)),
            _ => String::new(),
        };
        let label = escape_html(self.label());
        if label_id.is_empty() {
            format!("<label{class}>{label}</label>")
        } else {
            format!(r#"<label for="{}"{class}>{label}</label>"#, escape_html(&label_id))
        }
    }

    /// The contexts of the resolved widget's individually renderable parts.
    pub fn subwidgets(&self) -> Vec<JsonValue> {
        let widget = self.widget();
        let id = widget
            .attrs()
            .get("id")
            .and_then(JsonValue::as_str)
            .filter(|id| !id.is_empty())
            .map_or_else(|| self.auto_id(), str::to_string);
        let mut attrs = Attrs::new();
        if !id.is_empty() {
            attrs.insert("id".to_string(), id.into());
        }
        let attrs = self.build_widget_attrs(&attrs, widget);
        widget.subwidgets(&self.html_name(), &self.value(), &attrs)
    }
}

fn non_empty(class: Option<&str>) -> Option<&str> {
    class.filter(|class| !class.is_empty())
}
