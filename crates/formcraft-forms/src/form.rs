//! Form trait and `BaseForm` implementation.
//!
//! The [`Form`] trait is the core abstraction for all form types. It exposes
//! the submitted data, initial values, per-field errors and the rendering
//! defaults (CSS classes, renderer, composer) that bound fields read.
//!
//! [`BaseForm`] provides a concrete, general-purpose implementation of the
//! `Form` trait that can be constructed from a list of field definitions.
//! Validation runs lazily the first time errors or cleaned data are read.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use formcraft_core::utils::FormData;
use formcraft_core::{FormcraftError, FormcraftResult};
use serde_json::Value as JsonValue;

use crate::bound_field::BoundField;
use crate::fields::FormFieldDef;
use crate::renderers::{Renderer, RendererSpec};
use crate::validation::{self, CleanedForm, NON_FIELD_ERRORS};
use crate::value::Value;
use crate::widgets::Context;

/// The default `auto_id` format: `id_` followed by the field's HTML name.
pub const DEFAULT_AUTO_ID: &str = "id_{}";

/// Cross-field validation hook run after field-level cleaning.
pub type CleanHook = fn(&HashMap<String, Value>) -> Result<(), HashMap<String, Vec<String>>>;

/// The core form trait. All form types implement this.
///
/// All implementations must be `Send + Sync` so forms can be shared
/// between threads while rendering.
pub trait Form: Send + Sync {
    /// Returns the form's field definitions.
    fn fields(&self) -> &[FormFieldDef];

    /// Returns the submitted data (empty when unbound).
    fn data(&self) -> &FormData;

    /// Returns the uploaded files (empty when unbound).
    fn files(&self) -> &FormData;

    /// Returns the initial (default) values for fields.
    fn initial(&self) -> &HashMap<String, Value>;

    /// Returns the form prefix (for namespacing multiple forms on one page).
    fn prefix(&self) -> Option<&str>;

    /// Returns the `id` format; `{}` is replaced by the field's HTML name.
    /// `None` or an empty string disables `id` attributes.
    fn auto_id(&self) -> Option<&str>;

    /// Returns `true` if this form has been bound to data.
    fn is_bound(&self) -> bool;

    /// Returns per-field validation errors, keyed by field name.
    fn errors(&self) -> &HashMap<String, Vec<String>>;

    /// Returns the cleaned (validated and coerced) data.
    fn cleaned_data(&self) -> &HashMap<String, Value>;

    /// Returns `true` if the form is bound and has no errors.
    fn is_valid(&self) -> bool {
        self.is_bound() && self.errors().is_empty()
    }

    /// CSS class added to fields that have errors.
    fn error_css_class(&self) -> Option<&str> {
        None
    }

    /// CSS class added to required fields.
    fn required_css_class(&self) -> Option<&str> {
        None
    }

    /// Whether widgets may render the `required` attribute.
    fn use_required_attribute(&self) -> bool {
        true
    }

    /// The renderer this form prefers, if any.
    fn default_renderer(&self) -> Option<&RendererSpec> {
        None
    }

    /// The identifier of the composer this form is styled with, if any.
    fn composer(&self) -> Option<&str> {
        None
    }

    /// Instantiates the form's preferred renderer.
    fn renderer(&self) -> FormcraftResult<Option<Arc<dyn Renderer>>> {
        self.default_renderer()
            .map(RendererSpec::instantiate)
            .transpose()
    }

    /// Looks up a field definition by name.
    fn field(&self, name: &str) -> Option<&FormFieldDef> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Returns the field name with the form prefix applied.
    fn add_prefix(&self, field_name: &str) -> String {
        match self.prefix() {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}-{field_name}"),
            _ => field_name.to_string(),
        }
    }

    /// Returns the name used for the hidden copy of a field's initial value.
    fn add_initial_prefix(&self, field_name: &str) -> String {
        format!("initial-{}", self.add_prefix(field_name))
    }

    /// Returns the initial value for a field: the form's initial data first,
    /// then the field's own initial value.
    fn get_initial_for_field(&self, field: &FormFieldDef, field_name: &str) -> Value {
        let value = self
            .initial()
            .get(field_name)
            .or(field.initial.as_ref())
            .cloned()
            .unwrap_or(Value::Null);
        if field.widget.supports_microseconds() {
            value
        } else {
            value.without_microseconds()
        }
    }
}

/// A general-purpose form implementation.
///
/// `BaseForm` holds a list of field definitions and manages binding,
/// validation, and cleaned data. It is the most common way to create
/// forms.
#[derive(Debug)]
pub struct BaseForm {
    field_defs: Vec<FormFieldDef>,
    initial_data: HashMap<String, Value>,
    prefix: Option<String>,
    auto_id: Option<String>,
    bound: bool,
    data: FormData,
    files: FormData,
    error_css_class: Option<String>,
    required_css_class: Option<String>,
    use_required_attribute: bool,
    renderer: Option<RendererSpec>,
    composer: Option<String>,
    clean_hook: Option<CleanHook>,
    cleaned: OnceLock<CleanedForm>,
}

impl BaseForm {
    /// Creates a new unbound `BaseForm` with the given field definitions.
    pub fn new(fields: Vec<FormFieldDef>) -> Self {
        Self {
            field_defs: fields,
            initial_data: HashMap::new(),
            prefix: None,
            auto_id: Some(DEFAULT_AUTO_ID.to_string()),
            bound: false,
            data: FormData::new(),
            files: FormData::new(),
            error_css_class: None,
            required_css_class: None,
            use_required_attribute: true,
            renderer: None,
            composer: None,
            clean_hook: None,
            cleaned: OnceLock::new(),
        }
    }

    /// Sets initial (default) values for fields.
    #[must_use]
    pub fn with_initial(mut self, initial: HashMap<String, Value>) -> Self {
        self.initial_data = initial;
        self
    }

    /// Sets the form prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the `id` format. `None` disables `id` attributes.
    #[must_use]
    pub fn with_auto_id(mut self, auto_id: Option<&str>) -> Self {
        self.auto_id = auto_id.map(str::to_string);
        self
    }

    /// Sets the CSS class added to fields with errors.
    #[must_use]
    pub fn with_error_css_class(mut self, class: impl Into<String>) -> Self {
        self.error_css_class = Some(class.into());
        self
    }

    /// Sets the CSS class added to required fields.
    #[must_use]
    pub fn with_required_css_class(mut self, class: impl Into<String>) -> Self {
        self.required_css_class = Some(class.into());
        self
    }

    /// Sets whether widgets may render the `required` attribute.
    #[must_use]
    pub fn with_use_required_attribute(mut self, use_required: bool) -> Self {
        self.use_required_attribute = use_required;
        self
    }

    /// Sets the renderer this form prefers.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl Into<RendererSpec>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }

    /// Sets the composer identifier this form is styled with.
    #[must_use]
    pub fn with_composer(mut self, composer: impl Into<String>) -> Self {
        self.composer = Some(composer.into());
        self
    }

    /// Sets the cross-field validation hook.
    #[must_use]
    pub fn with_clean(mut self, hook: CleanHook) -> Self {
        self.clean_hook = Some(hook);
        self
    }

    /// Binds submitted data to this form, discarding any previous results.
    pub fn bind(&mut self, data: FormData) {
        self.bind_with_files(data, FormData::new());
    }

    /// Binds submitted data and uploaded files to this form.
    pub fn bind_with_files(&mut self, data: FormData, files: FormData) {
        self.bound = true;
        self.data = data;
        self.files = files;
        self.cleaned = OnceLock::new();
    }

    /// Records an error against a field, or against the whole form when
    /// `field` is `None`. The field is dropped from the cleaned data.
    pub fn add_error(&mut self, field: Option<&str>, message: impl Into<String>) {
        let mut cleaned = self.cleaned.take().unwrap_or_else(|| self.full_clean());
        let key = field.unwrap_or(NON_FIELD_ERRORS);
        cleaned.errors.entry(key.to_string()).or_default().push(message.into());
        cleaned.cleaned_data.remove(key);
        self.cleaned = OnceLock::from(cleaned);
    }

    /// Returns bound fields for template iteration.
    pub fn bound_fields(&self) -> Vec<BoundField<'_>> {
        self.field_defs
            .iter()
            .map(|field| BoundField::new(self, field, &field.name))
            .collect()
    }

    /// Returns the bound field for `name`.
    pub fn bound_field(&self, name: &str) -> FormcraftResult<BoundField<'_>> {
        self.field(name)
            .map(|field| BoundField::new(self, field, &field.name))
            .ok_or_else(|| FormcraftError::FieldDoesNotExist(name.to_string()))
    }

    /// Returns the non-field (form-level) errors.
    pub fn non_field_errors(&self) -> &[String] {
        self.errors().get(NON_FIELD_ERRORS).map_or(&[], Vec::as_slice)
    }

    /// Generates a template context for rendering the whole form.
    ///
    /// The context carries `fields` (name, label, help text, rendered
    /// widget, label tag, errors, required), `errors`, `non_field_errors`
    /// and `is_bound`.
    pub fn as_context(&self) -> FormcraftResult<Context> {
        let mut fields = Vec::with_capacity(self.field_defs.len());
        for bf in self.bound_fields() {
            let mut field_ctx = serde_json::Map::new();
            field_ctx.insert("name".to_string(), bf.html_name().into());
            field_ctx.insert("label".to_string(), bf.label().into());
            field_ctx.insert("help_text".to_string(), bf.help_text().into());
            field_ctx.insert("html".to_string(), bf.render()?.into());
            field_ctx.insert("label_tag".to_string(), bf.label_tag().into());
            field_ctx.insert("errors".to_string(), bf.errors().to_vec().into());
            field_ctx.insert("required".to_string(), bf.field().required.into());
            fields.push(JsonValue::Object(field_ctx));
        }

        let mut ctx = Context::new();
        ctx.insert("fields".to_string(), JsonValue::Array(fields));
        let errors: serde_json::Map<String, JsonValue> = self
            .errors()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone().into()))
            .collect();
        ctx.insert("errors".to_string(), JsonValue::Object(errors));
        ctx.insert(
            "non_field_errors".to_string(),
            self.non_field_errors().to_vec().into(),
        );
        ctx.insert("is_bound".to_string(), self.bound.into());
        Ok(ctx)
    }

    fn full_clean(&self) -> CleanedForm {
        if !self.bound {
            return CleanedForm::default();
        }
        let mut cleaned = validation::clean_fields(self);
        if let Some(hook) = self.clean_hook {
            validation::clean_form(&mut cleaned, hook);
        }
        tracing::trace!(
            fields = self.field_defs.len(),
            errors = cleaned.errors.len(),
            "Cleaned form"
        );
        cleaned
    }

    fn cleaned(&self) -> &CleanedForm {
        self.cleaned.get_or_init(|| self.full_clean())
    }
}

impl Form for BaseForm {
    fn fields(&self) -> &[FormFieldDef] {
        &self.field_defs
    }

    fn data(&self) -> &FormData {
        &self.data
    }

    fn files(&self) -> &FormData {
        &self.files
    }

    fn initial(&self) -> &HashMap<String, Value> {
        &self.initial_data
    }

    fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn auto_id(&self) -> Option<&str> {
        self.auto_id.as_deref()
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn errors(&self) -> &HashMap<String, Vec<String>> {
        &self.cleaned().errors
    }

    fn cleaned_data(&self) -> &HashMap<String, Value> {
        &self.cleaned().cleaned_data
    }

    fn error_css_class(&self) -> Option<&str> {
        self.error_css_class.as_deref()
    }

    fn required_css_class(&self) -> Option<&str> {
        self.required_css_class.as_deref()
    }

    fn use_required_attribute(&self) -> bool {
        self.use_required_attribute
    }

    fn default_renderer(&self) -> Option<&RendererSpec> {
        self.renderer.as_ref()
    }

    fn composer(&self) -> Option<&str> {
        self.composer.as_deref()
    }
}
