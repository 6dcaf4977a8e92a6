//! Bound fields: form fields paired with their form's data and errors.
//!
//! A [`BoundField`] represents the combination of a form, one of its field
//! definitions and the name it is bound under. It is the primary type used
//! when rendering a form field by field, and renders through the field's
//! own widget with no styling policy applied.

use serde_json::Value as JsonValue;

use formcraft_core::FormcraftResult;

use crate::fields::FormFieldDef;
use crate::form::Form;
use crate::renderers::escape_html;
use crate::value::Value;
use crate::widgets::{Attrs, Widget};

/// A form field bound to its form.
#[derive(Clone, Copy)]
pub struct BoundField<'a> {
    form: &'a dyn Form,
    field: &'a FormFieldDef,
    name: &'a str,
}

impl std::fmt::Debug for BoundField<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundField")
            .field("name", &self.name)
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

impl<'a> BoundField<'a> {
    /// Creates a new `BoundField`.
    pub fn new(form: &'a dyn Form, field: &'a FormFieldDef, name: &'a str) -> Self {
        Self { form, field, name }
    }

    /// Returns the form this field is bound to.
    pub fn form(&self) -> &'a dyn Form {
        self.form
    }

    /// Returns the field definition.
    pub fn field(&self) -> &'a FormFieldDef {
        self.field
    }

    /// Returns the unprefixed field name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Returns the HTML `name` attribute (prefixed).
    pub fn html_name(&self) -> String {
        self.form.add_prefix(self.name)
    }

    /// Returns the `name` of the hidden copy of the initial value.
    pub fn html_initial_name(&self) -> String {
        self.form.add_initial_prefix(self.name)
    }

    /// Returns the `id` of the hidden copy of the initial value.
    pub fn html_initial_id(&self) -> String {
        self.form.add_initial_prefix(&self.auto_id())
    }

    /// Returns the field's label.
    pub fn label(&self) -> &'a str {
        &self.field.label
    }

    /// Returns the field's help text.
    pub fn help_text(&self) -> &'a str {
        &self.field.help_text
    }

    /// Returns the field's validation errors.
    pub fn errors(&self) -> &'a [String] {
        self.form.errors().get(self.name).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if this field has any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    /// Returns the auto-generated HTML `id`, or an empty string when the
    /// form disables ids.
    pub fn auto_id(&self) -> String {
        match self.form.auto_id() {
            Some(format) if format.contains("{}") => format.replace("{}", &self.html_name()),
            Some(format) if !format.is_empty() => self.html_name(),
            _ => String::new(),
        }
    }

    /// Returns the initial value for this field.
    pub fn initial(&self) -> Value {
        self.form.get_initial_for_field(self.field, self.name)
    }

    /// Returns the submitted value, read through `widget`.
    pub fn data_with(&self, widget: &dyn Widget) -> Value {
        widget.value_from_data(self.form.data(), self.form.files(), &self.html_name())
    }

    /// Returns the submitted value, read through the field's widget.
    pub fn data(&self) -> Value {
        self.data_with(self.field.widget.as_ref())
    }

    /// Returns the value to display, read through `widget` when bound.
    pub fn value_with(&self, widget: &dyn Widget) -> Value {
        let mut value = self.initial();
        if self.form.is_bound() {
            value = self.field.bound_data(self.data_with(widget), value);
        }
        self.field.prepare_value(value)
    }

    /// Returns the value to display: submitted data when bound, else the
    /// initial value.
    pub fn value(&self) -> Value {
        self.value_with(self.field.widget.as_ref())
    }

    /// Returns `true` if the field's widget is hidden.
    pub fn is_hidden(&self) -> bool {
        self.field.widget.is_hidden()
    }

    /// Returns the `id` a `<label>` should point at.
    pub fn id_for_label(&self) -> String {
        self.id_for_label_with(self.field.widget.as_ref())
    }

    /// Returns the `id` a `<label>` should point at for `widget`.
    pub fn id_for_label_with(&self, widget: &dyn Widget) -> String {
        let id = widget
            .attrs()
            .get("id")
            .and_then(JsonValue::as_str)
            .filter(|id| !id.is_empty())
            .map_or_else(|| self.auto_id(), str::to_string);
        widget.id_for_label(&id)
    }

    /// Adds the `required` and `disabled` markers to `attrs`.
    pub fn build_widget_attrs(&self, attrs: &Attrs, widget: &dyn Widget) -> Attrs {
        let mut attrs = attrs.clone();
        if widget.use_required_attribute(&self.initial())
            && self.field.required
            && self.form.use_required_attribute()
        {
            attrs.insert("required".to_string(), true.into());
        }
        if self.field.disabled {
            attrs.insert("disabled".to_string(), true.into());
        }
        attrs
    }

    /// Renders the field through `widget` (or the field's own widget).
    ///
    /// With `only_initial`, renders under the hidden-initial name and id.
    pub fn as_widget(
        &self,
        widget: Option<&dyn Widget>,
        attrs: &Attrs,
        only_initial: bool,
    ) -> FormcraftResult<String> {
        let mut widget = widget.unwrap_or(self.field.widget.as_ref()).clone_box();
        if self.field.localize {
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
        let (name, value) = if only_initial {
            let name = self.html_initial_name();
            let value = self.submitted_initial(&name).unwrap_or_else(|| self.value());
            (name, value)
        } else {
            (self.html_name(), self.value())
        };
        let renderer = self.form.renderer()?;
        widget.render(&name, &value, &attrs, renderer.as_deref())
    }

    /// Reads a resubmitted hidden initial value through the hidden widget.
    pub fn submitted_initial(&self, initial_name: &str) -> Option<Value> {
        if !self.form.data().contains_key(initial_name) {
            return None;
        }
        let hidden = self.field.hidden_widget();
        Some(hidden.value_from_data(self.form.data(), self.form.files(), initial_name))
    }

    /// Renders the field as a hidden input.
    pub fn as_hidden(&self, attrs: &Attrs, only_initial: bool) -> FormcraftResult<String> {
        let hidden = self.field.hidden_widget();
        self.as_widget(Some(hidden.as_ref()), attrs, only_initial)
    }

    /// Renders the field, followed by the hidden initial value when the
    /// field asks for one.
    pub fn render(&self) -> FormcraftResult<String> {
        let mut html = self.as_widget(None, &Attrs::new(), false)?;
        if self.field.show_hidden_initial {
            html.push_str(&self.as_hidden(&Attrs::new(), true)?);
        }
        Ok(html)
    }

    /// Returns the field's CSS classes: `extra` plus the form's error and
    /// required classes where they apply. Duplicates are dropped.
    pub fn css_classes(&self, extra: &[&str]) -> String {
        let mut tokens: Vec<&str> = extra.iter().flat_map(|c| c.split_whitespace()).collect();
        if self.has_errors() {
            tokens.extend(self.form.error_css_class());
        }
        if self.field.required {
            tokens.extend(self.form.required_css_class());
        }
        let mut classes: Vec<&str> = Vec::with_capacity(tokens.len());
        for token in tokens {
            if !token.is_empty() && !classes.contains(&token) {
                classes.push(token);
            }
        }
        classes.join(" ")
    }

    /// Renders a `<label>` element for this field.
    pub fn label_tag(&self) -> String {
        let label_id = self.id_for_label();
        let class = match self.form.required_css_class() {
            Some(class) if self.field.required => format!(r#" class="{}""#, escape_html(class)),
            _ => String::new(),
        };
        let label = escape_html(self.label());
        if label_id.is_empty() {
            format!("<label{class}>{label}</label>")
        } else {
            format!(r#"<label for="{}"{class}>{label}</label>"#, escape_html(&label_id))
        }
    }

    /// Renders the error list as an HTML `<ul>` element.
    pub fn errors_as_ul(&self) -> String {
        if self.errors().is_empty() {
            return String::new();
        }
        let items: String = self
            .errors()
            .iter()
            .map(|e| format!("<li>{}</li>", escape_html(e)))
            .collect();
        format!(r#"<ul class="errorlist">{items}</ul>"#)
    }

    /// Returns the contexts of the widget's individually renderable parts.
    pub fn subwidgets(&self) -> Vec<JsonValue> {
        let widget = self.field.widget.as_ref();
        let mut attrs = Attrs::new();
        let id = self.auto_id();
        if !id.is_empty() {
            attrs.insert("id".to_string(), id.into());
        }
        let attrs = widget.build_attrs(widget.attrs(), &attrs);
        widget.subwidgets(&self.html_name(), &self.value(), &attrs)
    }
}
