//! Widget system for rendering HTML form elements.
//!
//! Widgets are the bridge between form fields and their HTML representation.
//! Each widget knows how to build its template context, extract a value from
//! submitted form data, and generate an appropriate `id` attribute for its
//! `<label>` element. Markup itself is produced by a
//! [`Renderer`](crate::renderers::Renderer) from the widget's template.
//!
//! Attribute maps and contexts are insertion-ordered, so rendered attributes
//! appear in the order they were added. Attribute values are strings, or
//! booleans for valueless attributes (`true` renders the bare name, `false`
//! omits the attribute).

use std::fmt;

use formcraft_core::utils::FormData;
use formcraft_core::FormcraftResult;
use serde_json::Value as JsonValue;

use crate::renderers::{default_renderer, Renderer};
use crate::value::Value;

/// HTML attributes of a widget, in insertion order.
pub type Attrs = serde_json::Map<String, JsonValue>;

/// A template context, in insertion order.
pub type Context = serde_json::Map<String, JsonValue>;

/// Enumerates all built-in widget types.
///
/// Each variant corresponds to a distinct HTML form element or input type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetType {
    /// `<input type="text">`.
    TextInput,
    /// `<input type="number">`.
    NumberInput,
    /// `<input type="email">`.
    EmailInput,
    /// `<input type="url">`.
    UrlInput,
    /// `<input type="password">`.
    PasswordInput,
    /// `<input type="hidden">`.
    HiddenInput,
    /// `<textarea>`.
    Textarea,
    /// `<input type="checkbox">`.
    CheckboxInput,
    /// `<select>`.
    Select,
    /// `<select multiple>`.
    SelectMultiple,
    /// A set of `<input type="radio">` elements.
    RadioSelect,
    /// A set of `<input type="checkbox">` elements.
    CheckboxSelectMultiple,
    /// `<input type="date">`.
    DateInput,
    /// `<input type="datetime-local">`.
    DateTimeInput,
    /// `<input type="time">`.
    TimeInput,
    /// `<input type="file">`.
    FileInput,
    /// `<input type="file">` with a clear checkbox.
    ClearableFileInput,
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TextInput => "TextInput",
            Self::NumberInput => "NumberInput",
            Self::EmailInput => "EmailInput",
            Self::UrlInput => "UrlInput",
            Self::PasswordInput => "PasswordInput",
            Self::HiddenInput => "HiddenInput",
            Self::Textarea => "Textarea",
            Self::CheckboxInput => "CheckboxInput",
            Self::Select => "Select",
            Self::SelectMultiple => "SelectMultiple",
            Self::RadioSelect => "RadioSelect",
            Self::CheckboxSelectMultiple => "CheckboxSelectMultiple",
            Self::DateInput => "DateInput",
            Self::DateTimeInput => "DateTimeInput",
            Self::TimeInput => "TimeInput",
            Self::FileInput => "FileInput",
            Self::ClearableFileInput => "ClearableFileInput",
        };
        write!(f, "{name}")
    }
}

impl WidgetType {
    /// Returns the styling family this widget type belongs to.
    pub const fn kind(self) -> WidgetKind {
        match self {
            Self::CheckboxInput => WidgetKind::Checkbox,
            Self::CheckboxSelectMultiple => WidgetKind::CheckboxGroup,
            Self::RadioSelect => WidgetKind::RadioGroup,
            Self::Select | Self::SelectMultiple => WidgetKind::Select,
            Self::FileInput | Self::ClearableFileInput => WidgetKind::File,
            Self::HiddenInput => WidgetKind::Hidden,
            Self::TextInput
            | Self::NumberInput
            | Self::EmailInput
            | Self::UrlInput
            | Self::PasswordInput
            | Self::Textarea
            | Self::DateInput
            | Self::DateTimeInput
            | Self::TimeInput => WidgetKind::Input,
        }
    }
}

/// The closed set of widget families that styling policies distinguish.
///
/// Anything that is not one of the specific families is an [`Input`](Self::Input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// A single checkbox.
    Checkbox,
    /// A group of checkboxes for a multiple choice.
    CheckboxGroup,
    /// A group of radio buttons.
    RadioGroup,
    /// A drop-down (single or multiple).
    Select,
    /// A file upload.
    File,
    /// A hidden input.
    Hidden,
    /// Any other input.
    Input,
}

/// State shared by every widget: its stored attributes and flags set by the
/// owning field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetBase {
    /// Attributes applied to every rendering of the widget.
    pub attrs: Attrs,
    /// Whether the owning field is required.
    pub is_required: bool,
    /// Whether values are rendered localized.
    pub is_localized: bool,
}

/// A trait for HTML form widgets.
///
/// Implementors supply their type, template, stored state, and a way to
/// copy themselves; everything else has a default that behaves like a plain
/// single-value input.
///
/// All widgets must be `Send + Sync` so that forms can be shared across
/// threads.
pub trait Widget: Send + Sync + fmt::Debug {
    /// Returns the widget type enum variant.
    fn widget_type(&self) -> WidgetType;

    /// Returns the name of the template that renders this widget.
    fn template_name(&self) -> &str;

    /// Returns the shared widget state.
    fn base(&self) -> &WidgetBase;

    /// Returns the shared widget state mutably.
    fn base_mut(&mut self) -> &mut WidgetBase;

    /// Returns an independent copy of this widget.
    fn clone_box(&self) -> Box<dyn Widget>;

    /// Returns the styling family of this widget.
    fn kind(&self) -> WidgetKind {
        self.widget_type().kind()
    }

    /// Returns the widget's stored attributes.
    fn attrs(&self) -> &Attrs {
        &self.base().attrs
    }

    /// Returns the widget's stored attributes mutably.
    fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.base_mut().attrs
    }

    /// Returns `true` for widgets that render no visible control.
    fn is_hidden(&self) -> bool {
        self.kind() == WidgetKind::Hidden
    }

    /// Returns `true` if the owning field is required.
    fn is_required(&self) -> bool {
        self.base().is_required
    }

    /// Records whether the owning field is required.
    fn set_required(&mut self, required: bool) {
        self.base_mut().is_required = required;
    }

    /// Returns `true` if values are rendered localized.
    fn is_localized(&self) -> bool {
        self.base().is_localized
    }

    /// Marks the widget to render localized values.
    fn set_localized(&mut self, localized: bool) {
        self.base_mut().is_localized = localized;
    }

    /// Returns `false` for widgets that cannot display sub-second precision.
    fn supports_microseconds(&self) -> bool {
        true
    }

    /// Returns `true` if the `required` HTML attribute may be rendered.
    fn use_required_attribute(&self, _initial: &Value) -> bool {
        !self.is_hidden()
    }

    /// Converts a value into the representation placed in the context.
    ///
    /// Empty values become `null`; everything else its display string.
    fn format_value(&self, value: &Value) -> JsonValue {
        if value.is_empty() {
            JsonValue::Null
        } else {
            JsonValue::String(value.to_string())
        }
    }

    /// Merges two attribute maps; `extra` wins on key collisions.
    fn build_attrs(&self, base: &Attrs, extra: &Attrs) -> Attrs {
        let mut attrs = base.clone();
        for (key, value) in extra {
            attrs.insert(key.clone(), value.clone());
        }
        attrs
    }

    /// Builds the inner `widget` dictionary of the context.
    ///
    /// `attrs` is used as given; callers merge the stored attributes first.
    fn widget_context(&self, name: &str, value: &Value, attrs: &Attrs) -> serde_json::Map<String, JsonValue> {
        let mut widget = serde_json::Map::new();
        widget.insert("name".to_string(), name.into());
        widget.insert("is_hidden".to_string(), self.is_hidden().into());
        widget.insert("required".to_string(), self.is_required().into());
        widget.insert("is_localized".to_string(), self.is_localized().into());
        widget.insert("value".to_string(), self.format_value(value));
        widget.insert("attrs".to_string(), JsonValue::Object(attrs.clone()));
        widget.insert("template_name".to_string(), self.template_name().into());
        widget
    }

    /// Builds the full template context for this widget.
    fn get_context(&self, name: &str, value: &Value, attrs: &Attrs) -> Context {
        wrap_widget_context(self.widget_context(name, value, attrs))
    }

    /// Renders the widget with its own template.
    ///
    /// `attrs` are merged over the widget's stored attributes. A `None`
    /// renderer means the process default.
    fn render(
        &self,
        name: &str,
        value: &Value,
        attrs: &Attrs,
        renderer: Option<&dyn Renderer>,
    ) -> FormcraftResult<String> {
        let attrs = self.build_attrs(self.attrs(), attrs);
        let context = self.get_context(name, value, &attrs);
        self.render_with(self.template_name(), &context, renderer)
    }

    /// Renders a prepared context with an explicit template.
    fn render_with(
        &self,
        template_name: &str,
        context: &Context,
        renderer: Option<&dyn Renderer>,
    ) -> FormcraftResult<String> {
        match renderer {
            Some(renderer) => renderer.render(template_name, context),
            None => default_renderer()?.render(template_name, context),
        }
    }

    /// Extracts this widget's value from submitted data.
    fn value_from_data(&self, data: &FormData, _files: &FormData, name: &str) -> Value {
        data.get(name).map_or(Value::Null, |v| Value::String(v.clone()))
    }

    /// Returns `true` if the submitted data carries nothing for this widget.
    fn value_omitted_from_data(&self, data: &FormData, _files: &FormData, name: &str) -> bool {
        !data.contains_key(name)
    }

    /// Returns the HTML `id` a `<label>` should point at.
    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }

    /// Returns the contexts of the individually renderable parts.
    ///
    /// Simple widgets have exactly one part: themselves.
    fn subwidgets(&self, name: &str, value: &Value, attrs: &Attrs) -> Vec<JsonValue> {
        vec![JsonValue::Object(self.widget_context(name, value, attrs))]
    }
}

impl Clone for Box<dyn Widget> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

fn wrap_widget_context(widget: serde_json::Map<String, JsonValue>) -> Context {
    let mut context = Context::new();
    context.insert("widget".to_string(), JsonValue::Object(widget));
    context
}

/// Moves a `type` entry out of constructor attributes.
fn take_input_type(attrs: &mut Attrs) -> Option<String> {
    let input_type = attrs.get("type").and_then(JsonValue::as_str).map(str::to_string)?;
    attrs.retain(|key, _| key != "type");
    Some(input_type)
}

// ---------------------------------------------------------------------------
// Built-in widgets
// ---------------------------------------------------------------------------

macro_rules! input_widget {
    (
        $(#[$meta:meta])*
        $name:ident, $widget_type:ident, $input_type:literal, $template:literal
        $(, supports_microseconds = $micro:literal)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            base: WidgetBase,
            input_type: String,
        }

        impl $name {
            /// Creates the widget with no stored attributes.
            pub fn new() -> Self {
                Self {
                    base: WidgetBase::default(),
                    input_type: $input_type.to_string(),
                }
            }

            /// Creates the widget with stored attributes. A `type` entry
            /// replaces the input type instead of becoming an attribute.
            pub fn with_attrs(mut attrs: Attrs) -> Self {
                let mut widget = Self::new();
                if let Some(input_type) = take_input_type(&mut attrs) {
                    widget.input_type = input_type;
                }
                widget.base.attrs = attrs;
                widget
            }

            /// Returns the `type` attribute rendered on the `<input>`.
            pub fn input_type(&self) -> &str {
                &self.input_type
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Widget for $name {
            fn widget_type(&self) -> WidgetType {
                WidgetType::$widget_type
            }

            fn template_name(&self) -> &str {
                $template
            }

            fn base(&self) -> &WidgetBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut WidgetBase {
                &mut self.base
            }

            fn clone_box(&self) -> Box<dyn Widget> {
                Box::new(self.clone())
            }

            fn get_context(&self, name: &str, value: &Value, attrs: &Attrs) -> Context {
                let mut widget = self.widget_context(name, value, attrs);
                widget.insert("type".to_string(), self.input_type.clone().into());
                wrap_widget_context(widget)
            }

            $(
                fn supports_microseconds(&self) -> bool {
                    $micro
                }
            )?
        }
    };
}

input_widget!(
    /// A basic `<input type="text">` widget.
    TextInput, TextInput, "text", "formcraft/widgets/text.html"
);
input_widget!(
    /// A `<input type="number">` widget.
    NumberInput, NumberInput, "number", "formcraft/widgets/number.html"
);
input_widget!(
    /// A `<input type="email">` widget.
    EmailInput, EmailInput, "email", "formcraft/widgets/email.html"
);
input_widget!(
    /// A `<input type="url">` widget.
    UrlInput, UrlInput, "url", "formcraft/widgets/url.html"
);
input_widget!(
    /// A `<input type="hidden">` widget.
    HiddenInput, HiddenInput, "hidden", "formcraft/widgets/hidden.html"
);
input_widget!(
    /// A date input. Renders as `type="text"` unless given `type` in its attributes.
    DateInput, DateInput, "text", "formcraft/widgets/date.html"
);
input_widget!(
    /// A date-time input.
    DateTimeInput, DateTimeInput, "text", "formcraft/widgets/datetime.html",
    supports_microseconds = false
);
input_widget!(
    /// A time input.
    TimeInput, TimeInput, "text", "formcraft/widgets/time.html",
    supports_microseconds = false
);

/// A `<input type="password">` widget.
///
/// By default, does not render the current value.
#[derive(Debug, Clone, Default)]
pub struct PasswordInput {
    base: WidgetBase,
    /// Whether to render the value attribute. Defaults to `false`.
    pub render_value: bool,
}

impl PasswordInput {
    /// Creates a password input that never echoes its value.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Widget for PasswordInput {
    fn widget_type(&self) -> WidgetType {
        WidgetType::PasswordInput
    }

    fn template_name(&self) -> &str {
        "formcraft/widgets/password.html"
    }

    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn clone_box(&self) -> Box<dyn Widget> {
        Box::new(self.clone())
    }

    fn get_context(&self, name: &str, value: &Value, attrs: &Attrs) -> Context {
        let value = if self.render_value { value } else { &Value::Null };
        let mut widget = self.widget_context(name, value, attrs);
        widget.insert("type".to_string(), "password".into());
        wrap_widget_context(widget)
    }
}

/// A `<textarea>` widget, 40 columns by 10 rows unless overridden.
#[derive(Debug, Clone)]
pub struct Textarea {
    base: WidgetBase,
}

impl Textarea {
    /// Creates a textarea with the default size.
    pub fn new() -> Self {
        let mut attrs = Attrs::new();
        attrs.insert("cols".to_string(), "40".into());
        attrs.insert("rows".to_string(), "10".into());
        Self {
            base: WidgetBase {
                attrs,
                ..WidgetBase::default()
            },
        }
    }

    /// Creates a textarea with extra stored attributes.
    pub fn with_attrs(attrs: Attrs) -> Self {
        let mut widget = Self::new();
        for (key, value) in attrs {
            widget.base.attrs.insert(key, value);
        }
        widget
    }
}

impl Default for Textarea {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Textarea {
    fn widget_type(&self) -> WidgetType {
        WidgetType::Textarea
    }

    fn template_name(&self) -> &str {
        "formcraft/widgets/textarea.html"
    }

    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn clone_box(&self) -> Box<dyn Widget> {
        Box::new(self.clone())
    }
}

/// A `<input type="checkbox">` widget for a boolean.
#[derive(Debug, Clone, Default)]
pub struct CheckboxInput {
    base: WidgetBase,
}

impl CheckboxInput {
    /// Creates a checkbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a checkbox with stored attributes.
    pub fn with_attrs(attrs: Attrs) -> Self {
        Self {
            base: WidgetBase {
                attrs,
                ..WidgetBase::default()
            },
        }
    }

    fn is_checked(value: &Value) -> bool {
        !matches!(value, Value::Bool(false) | Value::Null) && !value.is_empty()
    }
}

impl Widget for CheckboxInput {
    fn widget_type(&self) -> WidgetType {
        WidgetType::CheckboxInput
    }

    fn template_name(&self) -> &str {
        "formcraft/widgets/checkbox.html"
    }

    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn clone_box(&self) -> Box<dyn Widget> {
        Box::new(self.clone())
    }

    /// Booleans are expressed through `checked`, so only other values are echoed.
    fn format_value(&self, value: &Value) -> JsonValue {
        match value {
            Value::Bool(_) | Value::Null => JsonValue::Null,
            Value::String(s) if s.is_empty() => JsonValue::Null,
            other => JsonValue::String(other.to_string()),
        }
    }

    fn get_context(&self, name: &str, value: &Value, attrs: &Attrs) -> Context {
        let mut attrs = attrs.clone();
        if Self::is_checked(value) {
            attrs.insert("checked".to_string(), true.into());
        }
        let mut widget = self.widget_context(name, value, &attrs);
        widget.insert("type".to_string(), "checkbox".into());
        wrap_widget_context(widget)
    }

    /// A missing key means unchecked; `"true"`/`"false"` are read literally
    /// and any other non-empty string counts as checked.
    fn value_from_data(&self, data: &FormData, _files: &FormData, name: &str) -> Value {
        let Some(raw) = data.get(name) else {
            return Value::Bool(false);
        };
        match raw.to_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::Bool(!other.is_empty()),
        }
    }

    /// Unchecked boxes are never submitted, so a missing key is a value.
    fn value_omitted_from_data(&self, _data: &FormData, _files: &FormData, _name: &str) -> bool {
        false
    }
}

/// A `<input type="file">` widget.
#[derive(Debug, Clone, Default)]
pub struct FileInput {
    base: WidgetBase,
}

impl FileInput {
    /// Creates a file input.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Widget for FileInput {
    fn widget_type(&self) -> WidgetType {
        WidgetType::FileInput
    }

    fn template_name(&self) -> &str {
        "formcraft/widgets/file.html"
    }

    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn clone_box(&self) -> Box<dyn Widget> {
        Box::new(self.clone())
    }

    /// File inputs never echo a value back.
    fn format_value(&self, _value: &Value) -> JsonValue {
        JsonValue::Null
    }

    fn get_context(&self, name: &str, value: &Value, attrs: &Attrs) -> Context {
        let mut widget = self.widget_context(name, value, attrs);
        widget.insert("type".to_string(), "file".into());
        wrap_widget_context(widget)
    }

    fn value_from_data(&self, _data: &FormData, files: &FormData, name: &str) -> Value {
        files.get(name).map_or(Value::Null, |v| Value::String(v.clone()))
    }

    fn value_omitted_from_data(&self, _data: &FormData, files: &FormData, name: &str) -> bool {
        !files.contains_key(name)
    }
}

/// A file input that shows the current file and a "clear" checkbox.
#[derive(Debug, Clone, Default)]
pub struct ClearableFileInput {
    base: WidgetBase,
}

impl ClearableFileInput {
    /// Creates a clearable file input.
    pub fn new() -> Self {
        Self::default()
    }

    fn clear_checkbox_name(name: &str) -> String {
        format!("{name}-clear")
    }
}

impl Widget for ClearableFileInput {
    fn widget_type(&self) -> WidgetType {
        WidgetType::ClearableFileInput
    }

    fn template_name(&self) -> &str {
        "formcraft/widgets/clearable_file_input.html"
    }

    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn clone_box(&self) -> Box<dyn Widget> {
        Box::new(self.clone())
    }

    fn use_required_attribute(&self, initial: &Value) -> bool {
        !self.is_hidden() && initial.is_empty()
    }

    fn get_context(&self, name: &str, value: &Value, attrs: &Attrs) -> Context {
        let checkbox_name = Self::clear_checkbox_name(name);
        let mut widget = self.widget_context(name, value, attrs);
        widget.insert("type".to_string(), "file".into());
        widget.insert("checkbox_id".to_string(), format!("{checkbox_name}_id").into());
        widget.insert("checkbox_name".to_string(), checkbox_name.into());
        widget.insert("is_initial".to_string(), (!value.is_empty()).into());
        widget.insert("initial_text".to_string(), "Currently".into());
        widget.insert("input_text".to_string(), "Change".into());
        widget.insert("clear_checkbox_label".to_string(), "Clear".into());
        wrap_widget_context(widget)
    }

    /// A ticked clear box with no new upload yields `false` (clear the file).
    fn value_from_data(&self, data: &FormData, files: &FormData, name: &str) -> Value {
        let upload = files.get(name).map_or(Value::Null, |v| Value::String(v.clone()));
        let cleared = !self.is_required()
            && data
                .get(Self::clear_checkbox_name(name).as_str())
                .is_some_and(|v| !v.is_empty());
        if cleared && upload.is_null() {
            Value::Bool(false)
        } else {
            upload
        }
    }

    fn value_omitted_from_data(&self, data: &FormData, files: &FormData, name: &str) -> bool {
        !files.contains_key(name) && !data.contains_key(Self::clear_checkbox_name(name).as_str())
    }
}

// ---------------------------------------------------------------------------
// Choice widgets
// ---------------------------------------------------------------------------

/// When a choice widget may carry the `required` attribute.
#[derive(Debug, Clone, Copy)]
enum RequiredRule {
    /// Whenever the widget is visible.
    Visible,
    /// Only if the first choice has an empty value (a placeholder option).
    PlaceholderFirst,
    /// Never; a group of checkboxes cannot express "at least one".
    Never,
}

/// Static description of how a choice widget renders its options.
#[derive(Debug, Clone, Copy)]
struct ChoiceStyle {
    input_type: &'static str,
    allow_multiple: bool,
    option_inherits_attrs: bool,
    checked_attribute: &'static str,
    required_rule: RequiredRule,
    indexed_label: bool,
}

fn selected_values(style: &ChoiceStyle, value: &Value) -> Vec<String> {
    match value {
        Value::Null if style.allow_multiple => Vec::new(),
        Value::List(values) => values.iter().map(ToString::to_string).collect(),
        other => vec![other.to_string()],
    }
}

fn choice_options(
    style: &ChoiceStyle,
    name: &str,
    selected: &[String],
    choices: &[(String, String)],
    attrs: &Attrs,
) -> Vec<JsonValue> {
    let mut has_selected = false;
    choices
        .iter()
        .enumerate()
        .map(|(index, (value, label))| {
            let is_selected = (style.allow_multiple || !has_selected) && selected.contains(value);
            has_selected |= is_selected;

            let mut option_attrs = if style.option_inherits_attrs {
                attrs.clone()
            } else {
                Attrs::new()
            };
            if is_selected {
                option_attrs.insert(style.checked_attribute.to_string(), true.into());
            }
            if let Some(id) = option_attrs.get("id").and_then(JsonValue::as_str) {
                let indexed = format!("{id}_{index}");
                option_attrs.insert("id".to_string(), indexed.into());
            }

            serde_json::json!({
                "name": name,
                "value": value,
                "label": label,
                "selected": is_selected,
                "index": index.to_string(),
                "attrs": option_attrs,
                "type": style.input_type,
                "wrap_label": true,
            })
        })
        .collect()
}

macro_rules! choice_widget {
    (
        $(#[$meta:meta])*
        $name:ident, $widget_type:ident, $template:literal, $style:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            base: WidgetBase,
            /// Available choices as `(value, display_label)` pairs.
            pub choices: Vec<(String, String)>,
        }

        impl $name {
            const STYLE: ChoiceStyle = $style;

            /// Creates the widget with the given choices.
            pub fn new(choices: Vec<(String, String)>) -> Self {
                Self {
                    base: WidgetBase::default(),
                    choices,
                }
            }

            /// Creates the widget with choices and stored attributes.
            pub fn with_attrs(choices: Vec<(String, String)>, attrs: Attrs) -> Self {
                Self {
                    base: WidgetBase {
                        attrs,
                        ..WidgetBase::default()
                    },
                    choices,
                }
            }
        }

        impl Widget for $name {
            fn widget_type(&self) -> WidgetType {
                WidgetType::$widget_type
            }

            fn template_name(&self) -> &str {
                $template
            }

            fn base(&self) -> &WidgetBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut WidgetBase {
                &mut self.base
            }

            fn clone_box(&self) -> Box<dyn Widget> {
                Box::new(self.clone())
            }

            fn use_required_attribute(&self, _initial: &Value) -> bool {
                match Self::STYLE.required_rule {
                    RequiredRule::Visible => !self.is_hidden(),
                    RequiredRule::PlaceholderFirst => {
                        !self.is_hidden()
                            && self.choices.first().is_some_and(|(value, _)| value.is_empty())
                    }
                    RequiredRule::Never => false,
                }
            }

            fn format_value(&self, value: &Value) -> JsonValue {
                selected_values(&Self::STYLE, value).into()
            }

            fn get_context(&self, name: &str, value: &Value, attrs: &Attrs) -> Context {
                let mut attrs = attrs.clone();
                if Self::STYLE.allow_multiple && Self::STYLE.input_type == "select" {
                    attrs.insert("multiple".to_string(), true.into());
                }
                let selected = selected_values(&Self::STYLE, value);
                let options = choice_options(&Self::STYLE, name, &selected, &self.choices, &attrs);
                let mut widget = self.widget_context(name, value, &attrs);
                widget.insert("options".to_string(), JsonValue::Array(options));
                wrap_widget_context(widget)
            }

            fn value_from_data(&self, data: &FormData, _files: &FormData, name: &str) -> Value {
                if Self::STYLE.allow_multiple {
                    data.get_list(name).map_or(Value::List(Vec::new()), |values| {
                        Value::List(values.iter().map(|v| Value::String(v.clone())).collect())
                    })
                } else {
                    data.get(name).map_or(Value::Null, |v| Value::String(v.clone()))
                }
            }

            fn value_omitted_from_data(&self, data: &FormData, _files: &FormData, name: &str) -> bool {
                // An empty multiple selection is simply absent from the data.
                !Self::STYLE.allow_multiple && !data.contains_key(name)
            }

            fn id_for_label(&self, id: &str) -> String {
                if Self::STYLE.indexed_label && !id.is_empty() {
                    format!("{id}_0")
                } else {
                    id.to_string()
                }
            }

            fn subwidgets(&self, name: &str, value: &Value, attrs: &Attrs) -> Vec<JsonValue> {
                let selected = selected_values(&Self::STYLE, value);
                choice_options(&Self::STYLE, name, &selected, &self.choices, attrs)
            }
        }
    };
}

choice_widget!(
    /// A `<select>` drop-down.
    Select,
    Select,
    "formcraft/widgets/select.html",
    ChoiceStyle {
        input_type: "select",
        allow_multiple: false,
        option_inherits_attrs: false,
        checked_attribute: "selected",
        required_rule: RequiredRule::PlaceholderFirst,
        indexed_label: false,
    }
);

choice_widget!(
    /// A `<select multiple>` list.
    SelectMultiple,
    SelectMultiple,
    "formcraft/widgets/select.html",
    ChoiceStyle {
        input_type: "select",
        allow_multiple: true,
        option_inherits_attrs: false,
        checked_attribute: "selected",
        required_rule: RequiredRule::Visible,
        indexed_label: false,
    }
);

choice_widget!(
    /// A group of radio buttons.
    RadioSelect,
    RadioSelect,
    "formcraft/widgets/radio.html",
    ChoiceStyle {
        input_type: "radio",
        allow_multiple: false,
        option_inherits_attrs: true,
        checked_attribute: "checked",
        required_rule: RequiredRule::Visible,
        indexed_label: true,
    }
);

choice_widget!(
    /// A group of checkboxes for a multiple choice.
    CheckboxSelectMultiple,
    CheckboxSelectMultiple,
    "formcraft/widgets/checkbox_select.html",
    ChoiceStyle {
        input_type: "checkbox",
        allow_multiple: true,
        option_inherits_attrs: true,
        checked_attribute: "checked",
        required_rule: RequiredRule::Never,
        indexed_label: true,
    }
);

/// Creates a default widget instance for a given [`WidgetType`].
pub fn create_widget(widget_type: WidgetType) -> Box<dyn Widget> {
    match widget_type {
        WidgetType::TextInput => Box::new(TextInput::new()),
        WidgetType::NumberInput => Box::new(NumberInput::new()),
        WidgetType::EmailInput => Box::new(EmailInput::new()),
        WidgetType::UrlInput => Box::new(UrlInput::new()),
        WidgetType::PasswordInput => Box::new(PasswordInput::new()),
        WidgetType::HiddenInput => Box::new(HiddenInput::new()),
        WidgetType::Textarea => Box::new(Textarea::new()),
        WidgetType::CheckboxInput => Box::new(CheckboxInput::new()),
        WidgetType::Select => Box::new(Select::new(vec![])),
        WidgetType::SelectMultiple => Box::new(SelectMultiple::new(vec![])),
        WidgetType::RadioSelect => Box::new(RadioSelect::new(vec![])),
        WidgetType::CheckboxSelectMultiple => Box::new(CheckboxSelectMultiple::new(vec![])),
        WidgetType::DateInput => Box::new(DateInput::new()),
        WidgetType::DateTimeInput => Box::new(DateTimeInput::new()),
        WidgetType::TimeInput => Box::new(TimeInput::new()),
        WidgetType::FileInput => Box::new(FileInput::new()),
        WidgetType::ClearableFileInput => Box::new(ClearableFileInput::new()),
    }
}

/// Creates a widget instance, passing choices to the choice-based types.
pub fn create_widget_with_choices(
    widget_type: WidgetType,
    choices: &[(String, String)],
) -> Box<dyn Widget> {
    match widget_type {
        WidgetType::Select => Box::new(Select::new(choices.to_vec())),
        WidgetType::SelectMultiple => Box::new(SelectMultiple::new(choices.to_vec())),
        WidgetType::RadioSelect => Box::new(RadioSelect::new(choices.to_vec())),
        WidgetType::CheckboxSelectMultiple => {
            Box::new(CheckboxSelectMultiple::new(choices.to_vec()))
        }
        other => create_widget(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, JsonValue)]) -> Attrs {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn choices() -> Vec<(String, String)> {
        vec![
            ("m".to_string(), "Male".to_string()),
            ("f".to_string(), "Female".to_string()),
        ]
    }

    fn render(widget: &dyn Widget, name: &str, value: &Value, extra: &Attrs) -> String {
        widget.render(name, value, extra, None).unwrap()
    }

    #[test]
    fn test_text_input_render() {
        let html = render(&TextInput::new(), "name", &Value::from("Alice"), &Attrs::new());
        assert_eq!(html, r#"<input type="text" name="name" value="Alice">"#);
    }

    #[test]
    fn test_text_input_render_empty() {
        let html = render(&TextInput::new(), "name", &Value::Null, &Attrs::new());
        assert_eq!(html, r#"<input type="text" name="name">"#);
    }

    #[test]
    fn test_text_input_attribute_order() {
        let w = TextInput::with_attrs(attrs(&[("maxlength", "100".into())]));
        let extra = attrs(&[
            ("placeholder", "Title".into()),
            ("required", true.into()),
            ("id", "id_title".into()),
        ]);
        let html = render(&w, "title", &Value::Null, &extra);
        assert_eq!(
            html,
            r#"<input type="text" name="title" maxlength="100" placeholder="Title" required id="id_title">"#
        );
    }

    #[test]
    fn test_false_attribute_is_omitted() {
        let extra = attrs(&[("disabled", false.into()), ("data-x", "1".into())]);
        let html = render(&TextInput::new(), "n", &Value::Null, &extra);
        assert_eq!(html, r#"<input type="text" name="n" data-x="1">"#);
    }

    #[test]
    fn test_value_is_escaped() {
        let html = render(&TextInput::new(), "q", &Value::from("<b>&"), &Attrs::new());
        assert!(html.contains(r#"value="&lt;b&gt;&amp;""#));
    }

    #[test]
    fn test_type_attr_becomes_input_type() {
        let w = DateInput::with_attrs(attrs(&[("type", "date".into())]));
        assert_eq!(w.input_type(), "date");
        assert!(!w.attrs().contains_key("type"));
        let html = render(&w, "published", &Value::Null, &Attrs::new());
        assert_eq!(html, r#"<input type="date" name="published">"#);
    }

    #[test]
    fn test_number_input_render() {
        let html = render(&NumberInput::new(), "age", &Value::Int(25), &Attrs::new());
        assert_eq!(html, r#"<input type="number" name="age" value="25">"#);
    }

    #[test]
    fn test_password_input_no_render_value() {
        let html = render(&PasswordInput::new(), "pass", &Value::from("secret"), &Attrs::new());
        assert_eq!(html, r#"<input type="password" name="pass">"#);
    }

    #[test]
    fn test_password_input_render_value() {
        let w = PasswordInput {
            render_value: true,
            ..PasswordInput::default()
        };
        let html = render(&w, "pass", &Value::from("secret"), &Attrs::new());
        assert!(html.contains(r#"value="secret""#));
    }

    #[test]
    fn test_hidden_input() {
        let w = HiddenInput::new();
        assert!(w.is_hidden());
        assert!(!w.use_required_attribute(&Value::Null));
        let html = render(&w, "token", &Value::from("abc"), &Attrs::new());
        assert_eq!(html, r#"<input type="hidden" name="token" value="abc">"#);
    }

    #[test]
    fn test_context_carries_localized_flag() {
        let mut w = NumberInput::new();
        let ctx = w.get_context("price", &Value::Null, &Attrs::new());
        assert_eq!(ctx["widget"]["is_localized"], false);
        w.set_localized(true);
        let ctx = w.get_context("price", &Value::Null, &Attrs::new());
        assert_eq!(ctx["widget"]["is_localized"], true);
    }

    #[test]
    fn test_textarea_render() {
        let html = render(&Textarea::new(), "bio", &Value::from("Hello"), &Attrs::new());
        assert_eq!(html, "<textarea name=\"bio\" cols=\"40\" rows=\"10\">\nHello</textarea>");
    }

    #[test]
    fn test_checkbox_checked() {
        let html = render(&CheckboxInput::new(), "agree", &Value::Bool(true), &Attrs::new());
        assert_eq!(html, r#"<input type="checkbox" name="agree" checked>"#);
    }

    #[test]
    fn test_checkbox_unchecked() {
        let html = render(&CheckboxInput::new(), "agree", &Value::Bool(false), &Attrs::new());
        assert_eq!(html, r#"<input type="checkbox" name="agree">"#);
    }

    #[test]
    fn test_checkbox_value_from_data() {
        let w = CheckboxInput::new();
        let files = FormData::new();
        assert_eq!(w.value_from_data(&FormData::parse("agree=on"), &files, "agree"), Value::Bool(true));
        assert_eq!(w.value_from_data(&FormData::parse("agree=false"), &files, "agree"), Value::Bool(false));
        assert_eq!(w.value_from_data(&FormData::new(), &files, "agree"), Value::Bool(false));
        assert!(!w.value_omitted_from_data(&FormData::new(), &files, "agree"));
    }

    #[test]
    fn test_select_render() {
        let w = Select::new(choices());
        let html = render(&w, "gender", &Value::from("f"), &attrs(&[("id", "id_gender".into())]));
        assert_eq!(
            html,
            "<select name=\"gender\" id=\"id_gender\">\n  <option value=\"m\">Male</option>\n  <option value=\"f\" selected>Female</option>\n</select>"
        );
    }

    #[test]
    fn test_select_required_attribute_needs_placeholder() {
        assert!(!Select::new(choices()).use_required_attribute(&Value::Null));
        let mut with_blank = choices();
        with_blank.insert(0, (String::new(), "---".to_string()));
        assert!(Select::new(with_blank).use_required_attribute(&Value::Null));
    }

    #[test]
    fn test_select_multiple_render() {
        let w = SelectMultiple::new(choices());
        let value = Value::List(vec![Value::from("m"), Value::from("f")]);
        let html = render(&w, "g", &value, &Attrs::new());
        assert!(html.starts_with(r#"<select name="g" multiple>"#));
        assert!(html.contains(r#"<option value="m" selected>Male</option>"#));
        assert!(html.contains(r#"<option value="f" selected>Female</option>"#));
    }

    #[test]
    fn test_select_multiple_value_from_data() {
        let w = SelectMultiple::new(choices());
        let data = FormData::parse("g=m&g=f");
        assert_eq!(
            w.value_from_data(&data, &FormData::new(), "g"),
            Value::List(vec![Value::from("m"), Value::from("f")])
        );
        assert!(!w.value_omitted_from_data(&FormData::new(), &FormData::new(), "g"));
    }

    #[test]
    fn test_radio_select_render() {
        let w = RadioSelect::new(choices());
        let html = render(&w, "gender", &Value::from("m"), &attrs(&[("id", "id_gender".into())]));
        assert!(html.starts_with(r#"<div id="id_gender">"#));
        assert!(html.contains(
            r#"<label for="id_gender_0"><input type="radio" name="gender" value="m" id="id_gender_0" checked> Male</label>"#
        ));
        assert!(html.contains(
            r#"<label for="id_gender_1"><input type="radio" name="gender" value="f" id="id_gender_1"> Female</label>"#
        ));
    }

    #[test]
    fn test_radio_select_id_for_label() {
        let w = RadioSelect::new(vec![]);
        assert_eq!(w.id_for_label("id_choice"), "id_choice_0");
        assert_eq!(w.id_for_label(""), "");
    }

    #[test]
    fn test_checkbox_select_multiple() {
        let w = CheckboxSelectMultiple::new(choices());
        assert!(!w.use_required_attribute(&Value::Null));
        let subwidgets = w.subwidgets("g", &Value::List(vec![Value::from("f")]), &Attrs::new());
        assert_eq!(subwidgets.len(), 2);
        assert_eq!(subwidgets[0]["selected"], false);
        assert_eq!(subwidgets[1]["selected"], true);
        assert_eq!(subwidgets[1]["attrs"]["checked"], true);
    }

    #[test]
    fn test_file_input_never_echoes_value() {
        let html = render(&FileInput::new(), "cv", &Value::from("cv.pdf"), &Attrs::new());
        assert_eq!(html, r#"<input type="file" name="cv">"#);
    }

    #[test]
    fn test_file_input_reads_files() {
        let w = FileInput::new();
        let files = FormData::parse("cv=cv.pdf");
        assert_eq!(w.value_from_data(&FormData::new(), &files, "cv"), Value::from("cv.pdf"));
        assert!(w.value_omitted_from_data(&FormData::new(), &FormData::new(), "cv"));
    }

    #[test]
    fn test_clearable_file_input_initial() {
        let w = ClearableFileInput::new();
        let html = render(&w, "photo", &Value::from("me.png"), &Attrs::new());
        assert!(html.starts_with("Currently: me.png"));
        assert!(html.contains(r#"<input type="checkbox" name="photo-clear" id="photo-clear_id">"#));
        assert!(html.ends_with(r#"<input type="file" name="photo">"#));
        assert!(!w.use_required_attribute(&Value::from("me.png")));
    }

    #[test]
    fn test_clearable_file_input_clear() {
        let w = ClearableFileInput::new();
        let data = FormData::parse("photo-clear=on");
        assert_eq!(w.value_from_data(&data, &FormData::new(), "photo"), Value::Bool(false));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(WidgetType::CheckboxInput.kind(), WidgetKind::Checkbox);
        assert_eq!(WidgetType::SelectMultiple.kind(), WidgetKind::Select);
        assert_eq!(WidgetType::ClearableFileInput.kind(), WidgetKind::File);
        assert_eq!(WidgetType::Textarea.kind(), WidgetKind::Input);
        assert_eq!(WidgetType::HiddenInput.kind(), WidgetKind::Hidden);
    }

    #[test]
    fn test_supports_microseconds() {
        assert!(DateInput::new().supports_microseconds());
        assert!(!DateTimeInput::new().supports_microseconds());
        assert!(!TimeInput::new().supports_microseconds());
    }

    #[test]
    fn test_clone_box_is_independent() {
        let original: Box<dyn Widget> = Box::new(TextInput::new());
        let mut copy = original.clone();
        copy.attrs_mut().insert("class".to_string(), "x".into());
        assert!(original.attrs().is_empty());
        assert_eq!(copy.attrs().len(), 1);
    }

    #[test]
    fn test_create_widget() {
        for t in [WidgetType::TextInput, WidgetType::Select, WidgetType::FileInput] {
            assert_eq!(create_widget(t).widget_type(), t);
        }
        let w = create_widget_with_choices(WidgetType::RadioSelect, &choices());
        assert_eq!(w.widget_type(), WidgetType::RadioSelect);
    }

    #[test]
    fn test_display() {
        assert_eq!(WidgetType::CheckboxSelectMultiple.to_string(), "CheckboxSelectMultiple");
    }
}
