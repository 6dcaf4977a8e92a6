//! Form field definitions and type-level validation.
//!
//! Each [`FormFieldDef`] describes a single form field, including its type,
//! widget, and metadata. The [`FormFieldType`] enum defines the type-specific
//! parsing and coercion logic through the [`clean_field_value`] function.

use std::collections::HashMap;

use formcraft_core::ValidationError;

use crate::value::Value;
use crate::widgets::{create_widget_with_choices, Attrs, HiddenInput, Widget, WidgetType};

/// A validator run on a field's value after type coercion.
pub type Validator = fn(&Value) -> Result<(), ValidationError>;

/// Defines the type of a form field, including type-specific parameters.
///
/// Each variant carries the parameters needed for parsing and validating
/// raw input from form submissions. The [`clean_field_value`] function
/// dispatches on this enum to perform type coercion and built-in validation.
#[derive(Debug, Clone, PartialEq)]
pub enum FormFieldType {
    /// A character (string) field.
    Char {
        /// Minimum length (characters).
        min_length: Option<usize>,
        /// Maximum length (characters).
        max_length: Option<usize>,
        /// Whether to strip leading/trailing whitespace.
        strip: bool,
    },
    /// An integer field.
    Integer {
        /// Minimum allowed value.
        min_value: Option<i64>,
        /// Maximum allowed value.
        max_value: Option<i64>,
    },
    /// A floating-point field.
    Float {
        /// Minimum allowed value.
        min_value: Option<f64>,
        /// Maximum allowed value.
        max_value: Option<f64>,
    },
    /// A fixed-precision decimal field.
    Decimal {
        /// Maximum total number of digits.
        max_digits: u32,
        /// Number of digits after the decimal point.
        decimal_places: u32,
    },
    /// A boolean field (true/false).
    Boolean,
    /// A date field (YYYY-MM-DD).
    Date,
    /// A date-time field (YYYY-MM-DDTHH:MM:SS).
    DateTime,
    /// A time field (HH:MM:SS).
    Time,
    /// An email address field.
    Email,
    /// A URL field.
    Url,
    /// A single-choice field.
    Choice {
        /// Available choices as `(value, display_label)` pairs.
        choices: Vec<(String, String)>,
    },
    /// A multiple-choice field.
    MultipleChoice {
        /// Available choices as `(value, display_label)` pairs.
        choices: Vec<(String, String)>,
    },
    /// A file upload field. The value is the uploaded file's name.
    File {
        /// Allowed file extensions (e.g. `["jpg", "png"]`). Empty allows all.
        allowed_extensions: Vec<String>,
    },
}

impl FormFieldType {
    /// Returns the choices of a choice-based field type.
    pub fn choices(&self) -> &[(String, String)] {
        match self {
            Self::Choice { choices } | Self::MultipleChoice { choices } => choices,
            _ => &[],
        }
    }
}

/// Complete definition of a form field.
///
/// A `FormFieldDef` captures everything needed to render, parse, and validate
/// a single form field. It owns its widget; the widget's `is_required` and
/// type-derived attributes (such as `maxlength`) are kept in step with the
/// field by the builder methods.
#[derive(Debug, Clone)]
pub struct FormFieldDef {
    /// The field name (HTML name attribute before prefixing).
    pub name: String,
    /// The field type, controlling parsing and coercion.
    pub field_type: FormFieldType,
    /// Whether this field is required.
    pub required: bool,
    /// Default/initial value.
    pub initial: Option<Value>,
    /// Help text displayed alongside the field.
    pub help_text: String,
    /// Human-readable label.
    pub label: String,
    /// The widget used for rendering.
    pub widget: Box<dyn Widget>,
    /// Additional validators applied after type coercion.
    pub validators: Vec<Validator>,
    /// Custom error messages keyed by error code.
    pub error_messages: HashMap<String, String>,
    /// Whether the field is disabled (rendered but not editable).
    pub disabled: bool,
    /// Whether values are rendered localized.
    pub localize: bool,
    /// Whether to render a hidden copy of the initial value next to the widget.
    pub show_hidden_initial: bool,
}

impl FormFieldDef {
    /// Creates a new `FormFieldDef` with sensible defaults.
    ///
    /// The field is required by default, uses the default widget for its type,
    /// and is labelled with the prettified field name.
    pub fn new(name: impl Into<String>, field_type: FormFieldType) -> Self {
        let name = name.into();
        let widget_type = default_widget_for_field_type(&field_type);
        let widget = create_widget_with_choices(widget_type, field_type.choices());
        let label = pretty_name(&name);
        let mut field = Self {
            name,
            field_type,
            required: true,
            initial: None,
            help_text: String::new(),
            label,
            widget,
            validators: Vec::new(),
            error_messages: HashMap::new(),
            disabled: false,
            localize: false,
            show_hidden_initial: false,
        };
        field.attach_widget();
        field
    }

    /// Sets whether this field is required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self.widget.set_required(required);
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn initial(mut self, value: impl Into<Value>) -> Self {
        self.initial = Some(value.into());
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Replaces the widget with the given instance.
    #[must_use]
    pub fn widget(mut self, widget: Box<dyn Widget>) -> Self {
        self.widget = widget;
        self.attach_widget();
        self
    }

    /// Replaces the widget with a fresh instance of the given type.
    #[must_use]
    pub fn widget_type(self, widget_type: WidgetType) -> Self {
        let widget = create_widget_with_choices(widget_type, self.field_type.choices());
        self.widget(widget)
    }

    /// Adds a validator.
    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Sets a custom error message for a given code.
    #[must_use]
    pub fn error_message(mut self, code: impl Into<String>, msg: impl Into<String>) -> Self {
        self.error_messages.insert(code.into(), msg.into());
        self
    }

    /// Sets whether this field is disabled.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Sets whether values are rendered localized.
    #[must_use]
    pub fn localize(mut self, localize: bool) -> Self {
        self.localize = localize;
        if localize {
            self.widget.set_localized(true);
        }
        self
    }

    /// Sets whether a hidden copy of the initial value is rendered.
    #[must_use]
    pub fn show_hidden_initial(mut self, show: bool) -> Self {
        self.show_hidden_initial = show;
        self
    }

    /// Returns the attributes this field adds to a widget.
    ///
    /// Character fields contribute `maxlength`/`minlength` to visible
    /// widgets; numeric fields contribute `min`, `max` and `step` to number
    /// inputs.
    pub fn widget_attrs(&self, widget: &dyn Widget) -> Attrs {
        let mut attrs = Attrs::new();
        let is_number_input = widget.widget_type() == WidgetType::NumberInput;
        match &self.field_type {
            FormFieldType::Char {
                min_length,
                max_length,
                ..
            } if !widget.is_hidden() => {
                if let Some(max) = max_length {
                    attrs.insert("maxlength".to_string(), max.to_string().into());
                }
                if let Some(min) = min_length {
                    attrs.insert("minlength".to_string(), min.to_string().into());
                }
            }
            FormFieldType::Integer {
                min_value,
                max_value,
            } if is_number_input => {
                if let Some(min) = min_value {
                    attrs.insert("min".to_string(), min.to_string().into());
                }
                if let Some(max) = max_value {
                    attrs.insert("max".to_string(), max.to_string().into());
                }
            }
            FormFieldType::Float {
                min_value,
                max_value,
            } if is_number_input => {
                if let Some(min) = min_value {
                    attrs.insert("min".to_string(), min.to_string().into());
                }
                if let Some(max) = max_value {
                    attrs.insert("max".to_string(), max.to_string().into());
                }
                if !widget.attrs().contains_key("step") {
                    attrs.insert("step".to_string(), "any".into());
                }
            }
            FormFieldType::Decimal { decimal_places, .. }
                if is_number_input && !widget.attrs().contains_key("step") =>
            {
                attrs.insert("step".to_string(), decimal_step(*decimal_places).into());
            }
            _ => {}
        }
        attrs
    }

    /// Returns the widget used for the hidden copy of the initial value.
    pub fn hidden_widget(&self) -> Box<dyn Widget> {
        Box::new(HiddenInput::new())
    }

    /// Returns the value to display for a bound field.
    ///
    /// Disabled fields ignore submitted data; an empty upload keeps the
    /// initial file.
    pub fn bound_data(&self, data: Value, initial: Value) -> Value {
        if self.disabled {
            return initial;
        }
        match (&self.field_type, &data) {
            (FormFieldType::File { .. }, Value::Null) => initial,
            _ => data,
        }
    }

    /// Adjusts a value just before it is handed to a widget.
    pub fn prepare_value(&self, value: Value) -> Value {
        if self.widget.supports_microseconds() {
            value
        } else {
            value.without_microseconds()
        }
    }

    /// Keeps the owned widget in step with the field's settings.
    fn attach_widget(&mut self) {
        self.widget.set_required(self.required);
        if self.localize {
            self.widget.set_localized(true);
        }
        let extra = self.widget_attrs(self.widget.as_ref());
        for (key, value) in extra {
            self.widget.attrs_mut().insert(key, value);
        }
    }

    fn message(&self, code: &str, default: impl FnOnce() -> String) -> String {
        self.error_messages.get(code).cloned().unwrap_or_else(default)
    }
}

/// Converts a field name into a human-readable label: `"first_name"` becomes
/// `"First name"`.
pub fn pretty_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

fn decimal_step(decimal_places: u32) -> String {
    if decimal_places == 0 {
        "1".to_string()
    } else {
        format!("0.{}1", "0".repeat(decimal_places as usize - 1))
    }
}

/// Returns the default widget type for a given form field type.
pub const fn default_widget_for_field_type(field_type: &FormFieldType) -> WidgetType {
    match field_type {
        FormFieldType::Char { .. } => WidgetType::TextInput,
        FormFieldType::Integer { .. } | FormFieldType::Float { .. } | FormFieldType::Decimal { .. } => {
            WidgetType::NumberInput
        }
        FormFieldType::Boolean => WidgetType::CheckboxInput,
        FormFieldType::Date => WidgetType::DateInput,
        FormFieldType::DateTime => WidgetType::DateTimeInput,
        FormFieldType::Time => WidgetType::TimeInput,
        FormFieldType::Email => WidgetType::EmailInput,
        FormFieldType::Url => WidgetType::UrlInput,
        FormFieldType::Choice { .. } => WidgetType::Select,
        FormFieldType::MultipleChoice { .. } => WidgetType::SelectMultiple,
        FormFieldType::File { .. } => WidgetType::ClearableFileInput,
    }
}

/// Cleans (validates and coerces) a widget value into a typed `Value`.
///
/// This performs type-level validation:
/// 1. Required check (if `required` and the value is empty)
/// 2. Type coercion (string -> i64, date, etc.)
/// 3. Type-specific constraint validation (min/max, choices)
/// 4. Custom validators
///
/// Returns the cleaned `Value` or a list of error messages.
pub fn clean_field_value(field: &FormFieldDef, value: &Value) -> Result<Value, Vec<String>> {
    let required_error = || {
        vec![field.message("required", || "This field is required.".to_string())]
    };

    let cleaned = match &field.field_type {
        FormFieldType::Boolean => {
            let checked = match value {
                Value::Bool(b) => *b,
                Value::String(s) => matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on"),
                other => !other.is_empty(),
            };
            if field.required && !checked {
                return Err(required_error());
            }
            Value::Bool(checked)
        }
        FormFieldType::MultipleChoice { choices } => {
            let selected: Vec<String> = match value {
                Value::List(values) => values.iter().map(ToString::to_string).collect(),
                Value::Null => Vec::new(),
                other => vec![other.to_string()],
            };
            if selected.is_empty() {
                if field.required {
                    return Err(required_error());
                }
                return Ok(Value::List(Vec::new()));
            }
            let mut errors = Vec::new();
            for s in &selected {
                if !choices.iter().any(|(v, _)| v == s) {
                    errors.push(format!(
                        "Select a valid choice. {s} is not one of the available choices."
                    ));
                }
            }
            if !errors.is_empty() {
                return Err(errors);
            }
            Value::List(selected.into_iter().map(Value::String).collect())
        }
        FormFieldType::File { .. } if matches!(value, Value::Bool(false)) => {
            // The clear checkbox was ticked.
            if field.required {
                return Err(required_error());
            }
            Value::Null
        }
        _ => {
            let raw = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let raw_str = match &field.field_type {
                FormFieldType::Char { strip: true, .. } => raw.trim(),
                _ => raw.as_str(),
            };
            if raw_str.is_empty() {
                if field.required {
                    return Err(required_error());
                }
                return Ok(field.initial.clone().unwrap_or(Value::Null));
            }
            coerce(field, raw_str)?
        }
    };

    let errors: Vec<String> = field
        .validators
        .iter()
        .filter_map(|validator| validator(&cleaned).err())
        .map(|e| e.to_string())
        .collect();
    if errors.is_empty() {
        Ok(cleaned)
    } else {
        Err(errors)
    }
}

/// Parses a non-empty raw string according to the field's type.
fn coerce(field: &FormFieldDef, raw_str: &str) -> Result<Value, Vec<String>> {
    let mut errors = Vec::new();

    let value = match &field.field_type {
        FormFieldType::Char {
            min_length,
            max_length,
            ..
        } => {
            let len = raw_str.chars().count();
            if let Some(min) = min_length {
                if len < *min {
                    errors.push(format!(
                        "Ensure this value has at least {min} characters (it has {len})."
                    ));
                }
            }
            if let Some(max) = max_length {
                if len > *max {
                    errors.push(format!(
                        "Ensure this value has at most {max} characters (it has {len})."
                    ));
                }
            }
            Value::String(raw_str.to_string())
        }

        FormFieldType::Integer {
            min_value,
            max_value,
        } => match raw_str.parse::<i64>() {
            Ok(n) => {
                if let Some(min) = min_value {
                    if n < *min {
                        errors.push(format!(
                            "Ensure this value is greater than or equal to {min}."
                        ));
                    }
                }
                if let Some(max) = max_value {
                    if n > *max {
                        errors.push(format!("Ensure this value is less than or equal to {max}."));
                    }
                }
                Value::Int(n)
            }
            Err(_) => {
                errors.push(field.message("invalid", || "Enter a whole number.".to_string()));
                Value::Null
            }
        },

        FormFieldType::Float {
            min_value,
            max_value,
        } => match raw_str.parse::<f64>() {
            Ok(n) => {
                if let Some(min) = min_value {
                    if n < *min {
                        errors.push(format!(
                            "Ensure this value is greater than or equal to {min}."
                        ));
                    }
                }
                if let Some(max) = max_value {
                    if n > *max {
                        errors.push(format!("Ensure this value is less than or equal to {max}."));
                    }
                }
                Value::Float(n)
            }
            Err(_) => {
                errors.push(field.message("invalid", || "Enter a number.".to_string()));
                Value::Null
            }
        },

        FormFieldType::Decimal {
            max_digits,
            decimal_places,
        } => match raw_str.parse::<f64>() {
            Ok(n) => {
                let unsigned = raw_str.trim_start_matches('-');
                let (integer_part, fraction_part) =
                    unsigned.split_once('.').unwrap_or((unsigned, ""));
                let total_digits = integer_part.len() + fraction_part.len();

                if total_digits > *max_digits as usize {
                    errors.push(format!(
                        "Ensure that there are no more than {max_digits} digits in total."
                    ));
                }
                let whole_digits = max_digits.saturating_sub(*decimal_places);
                if fraction_part.len() > *decimal_places as usize {
                    errors.push(format!(
                        "Ensure that there are no more than {decimal_places} decimal places."
                    ));
                } else if total_digits <= *max_digits as usize
                    && integer_part.len() > whole_digits as usize
                {
                    errors.push(format!(
                        "Ensure that there are no more than {whole_digits} digits before the decimal point."
                    ));
                }
                Value::Float(n)
            }
            Err(_) => {
                errors.push(field.message("invalid", || "Enter a number.".to_string()));
                Value::Null
            }
        },

        FormFieldType::Date => match chrono::NaiveDate::parse_from_str(raw_str, "%Y-%m-%d") {
            Ok(d) => Value::Date(d),
            Err(_) => {
                errors.push(field.message("invalid", || "Enter a valid date.".to_string()));
                Value::Null
            }
        },

        FormFieldType::DateTime => {
            let result = chrono::NaiveDateTime::parse_from_str(raw_str, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| chrono::NaiveDateTime::parse_from_str(raw_str, "%Y-%m-%dT%H:%M"))
                .or_else(|_| chrono::NaiveDateTime::parse_from_str(raw_str, "%Y-%m-%d %H:%M:%S"))
                .or_else(|_| chrono::NaiveDateTime::parse_from_str(raw_str, "%Y-%m-%d %H:%M"));
            match result {
                Ok(dt) => Value::DateTime(dt),
                Err(_) => {
                    errors.push(field.message("invalid", || "Enter a valid date/time.".to_string()));
                    Value::Null
                }
            }
        }

        FormFieldType::Time => {
            let result = chrono::NaiveTime::parse_from_str(raw_str, "%H:%M:%S")
                .or_else(|_| chrono::NaiveTime::parse_from_str(raw_str, "%H:%M"));
            match result {
                Ok(t) => Value::Time(t),
                Err(_) => {
                    errors.push(field.message("invalid", || "Enter a valid time.".to_string()));
                    Value::Null
                }
            }
        }

        FormFieldType::Email => {
            let valid = regex::Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
                .is_ok_and(|re| re.is_match(raw_str));
            if !valid {
                errors.push(field.message("invalid", || "Enter a valid email address.".to_string()));
            }
            Value::String(raw_str.to_string())
        }

        FormFieldType::Url => {
            let valid = regex::Regex::new(r"^https?://[^\s/$.?#].[^\s]*$")
                .is_ok_and(|re| re.is_match(raw_str));
            if !valid {
                errors.push(field.message("invalid", || "Enter a valid URL.".to_string()));
            }
            Value::String(raw_str.to_string())
        }

        FormFieldType::Choice { choices } => {
            if !choices.iter().any(|(v, _)| v == raw_str) {
                errors.push(format!(
                    "Select a valid choice. {raw_str} is not one of the available choices."
                ));
            }
            Value::String(raw_str.to_string())
        }

        FormFieldType::File { allowed_extensions } => {
            if !allowed_extensions.is_empty() {
                let ext = raw_str
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_lowercase())
                    .unwrap_or_default();
                if !allowed_extensions.iter().any(|e| e.to_lowercase() == ext) {
                    errors.push(format!(
                        "File extension not allowed. Allowed extensions: {}.",
                        allowed_extensions.join(", ")
                    ));
                }
            }
            Value::String(raw_str.to_string())
        }

        FormFieldType::Boolean | FormFieldType::MultipleChoice { .. } => {
            Value::String(raw_str.to_string())
        }
    };

    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{Textarea, WidgetKind};

    fn char_field(name: &str) -> FormFieldDef {
        FormFieldDef::new(
            name,
            FormFieldType::Char {
                min_length: None,
                max_length: None,
                strip: false,
            },
        )
    }

    fn clean(field: &FormFieldDef, raw: &str) -> Result<Value, Vec<String>> {
        clean_field_value(field, &Value::from(raw))
    }

    #[test]
    fn test_char_field_clean() {
        let field = FormFieldDef::new(
            "name",
            FormFieldType::Char {
                min_length: Some(2),
                max_length: Some(50),
                strip: true,
            },
        );
        assert_eq!(clean(&field, "  Alice  ").unwrap(), Value::from("Alice"));
    }

    #[test]
    fn test_char_field_too_short() {
        let field = FormFieldDef::new(
            "name",
            FormFieldType::Char {
                min_length: Some(5),
                max_length: None,
                strip: false,
            },
        );
        let errors = clean(&field, "abc").unwrap_err();
        assert!(errors[0].contains("at least 5"));
    }

    #[test]
    fn test_char_field_too_long() {
        let field = FormFieldDef::new(
            "name",
            FormFieldType::Char {
                min_length: None,
                max_length: Some(3),
                strip: false,
            },
        );
        let errors = clean(&field, "abcdef").unwrap_err();
        assert!(errors[0].contains("at most 3"));
    }

    #[test]
    fn test_integer_field_clean() {
        let field = FormFieldDef::new(
            "age",
            FormFieldType::Integer {
                min_value: Some(0),
                max_value: Some(150),
            },
        );
        assert_eq!(clean(&field, "42").unwrap(), Value::Int(42));
        assert!(clean(&field, "abc").is_err());
        assert!(clean(&field, "-1").unwrap_err()[0].contains("greater than or equal to 0"));
        assert!(clean(&field, "200").unwrap_err()[0].contains("less than or equal to 150"));
    }

    #[test]
    fn test_float_field_clean() {
        let field = FormFieldDef::new(
            "price",
            FormFieldType::Float {
                min_value: None,
                max_value: None,
            },
        );
        assert_eq!(clean(&field, "3.25").unwrap(), Value::Float(3.25));
        assert_eq!(clean(&field, "x").unwrap_err()[0], "Enter a number.");
    }

    #[test]
    fn test_decimal_field_digits() {
        let field = FormFieldDef::new(
            "amount",
            FormFieldType::Decimal {
                max_digits: 5,
                decimal_places: 2,
            },
        );
        assert!(clean(&field, "123.45").is_ok());
        assert!(clean(&field, "123456").unwrap_err()[0].contains("5 digits in total"));
        assert!(clean(&field, "1234.5").unwrap_err()[0].contains("3 digits before the decimal point"));
        assert!(clean(&field, "1.234").unwrap_err()[0].contains("2 decimal places"));
    }

    #[test]
    fn test_boolean_field_clean() {
        let field = FormFieldDef::new("agree", FormFieldType::Boolean).required(false);
        assert_eq!(clean_field_value(&field, &Value::Bool(true)).unwrap(), Value::Bool(true));
        assert_eq!(clean(&field, "on").unwrap(), Value::Bool(true));
        assert_eq!(clean_field_value(&field, &Value::Bool(false)).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_required_boolean_must_be_checked() {
        let field = FormFieldDef::new("agree", FormFieldType::Boolean);
        let errors = clean_field_value(&field, &Value::Bool(false)).unwrap_err();
        assert_eq!(errors[0], "This field is required.");
    }

    #[test]
    fn test_date_time_fields() {
        let date = FormFieldDef::new("d", FormFieldType::Date);
        assert!(matches!(clean(&date, "2024-01-15").unwrap(), Value::Date(_)));
        assert!(clean(&date, "15/01/2024").is_err());

        let datetime = FormFieldDef::new("dt", FormFieldType::DateTime);
        assert!(matches!(clean(&datetime, "2024-01-15T10:30").unwrap(), Value::DateTime(_)));
        assert!(matches!(clean(&datetime, "2024-01-15 10:30:00").unwrap(), Value::DateTime(_)));

        let time = FormFieldDef::new("t", FormFieldType::Time);
        assert!(matches!(clean(&time, "10:30").unwrap(), Value::Time(_)));
    }

    #[test]
    fn test_email_and_url_fields() {
        let email = FormFieldDef::new("email", FormFieldType::Email);
        assert!(clean(&email, "user@example.com").is_ok());
        assert_eq!(clean(&email, "nope").unwrap_err()[0], "Enter a valid email address.");

        let url = FormFieldDef::new("site", FormFieldType::Url);
        assert!(clean(&url, "https://example.com").is_ok());
        assert!(clean(&url, "example").is_err());
    }

    #[test]
    fn test_choice_field() {
        let field = FormFieldDef::new(
            "color",
            FormFieldType::Choice {
                choices: vec![("r".into(), "Red".into()), ("g".into(), "Green".into())],
            },
        );
        assert_eq!(clean(&field, "r").unwrap(), Value::from("r"));
        assert!(clean(&field, "b").unwrap_err()[0].contains("b is not one of"));
    }

    #[test]
    fn test_multiple_choice_field() {
        let field = FormFieldDef::new(
            "colors",
            FormFieldType::MultipleChoice {
                choices: vec![("r".into(), "Red".into()), ("g".into(), "Green".into())],
            },
        );
        let value = Value::List(vec![Value::from("r"), Value::from("g")]);
        assert_eq!(clean_field_value(&field, &value).unwrap(), value);
        assert!(clean_field_value(&field, &Value::List(vec![])).is_err());
        let bad = Value::List(vec![Value::from("x")]);
        assert!(clean_field_value(&field, &bad).is_err());
    }

    #[test]
    fn test_file_field() {
        let field = FormFieldDef::new(
            "upload",
            FormFieldType::File {
                allowed_extensions: vec!["pdf".into()],
            },
        )
        .required(false);
        assert!(clean(&field, "report.pdf").is_ok());
        assert!(clean(&field, "image.png").unwrap_err()[0].contains("not allowed"));
        assert_eq!(clean_field_value(&field, &Value::Bool(false)).unwrap(), Value::Null);
    }

    #[test]
    fn test_required_field_empty() {
        let field = char_field("name");
        assert_eq!(clean(&field, "").unwrap_err()[0], "This field is required.");
        assert!(clean_field_value(&field, &Value::Null).is_err());
    }

    #[test]
    fn test_optional_field_empty_uses_initial() {
        let field = char_field("status").required(false);
        assert_eq!(clean(&field, "").unwrap(), Value::Null);
        let field = field.initial("active");
        assert_eq!(clean(&field, "").unwrap(), Value::from("active"));
    }

    #[test]
    fn test_custom_error_message() {
        let field = char_field("name").error_message("required", "Please enter your name.");
        assert_eq!(clean(&field, "").unwrap_err()[0], "Please enter your name.");
    }

    #[test]
    fn test_validators_run_after_coercion() {
        fn even(value: &Value) -> Result<(), ValidationError> {
            match value {
                Value::Int(n) if n % 2 == 0 => Ok(()),
                _ => Err(ValidationError::new("Enter an even number.", "even")),
            }
        }
        let field = FormFieldDef::new(
            "n",
            FormFieldType::Integer {
                min_value: None,
                max_value: None,
            },
        )
        .validator(even);
        assert!(clean(&field, "4").is_ok());
        assert_eq!(clean(&field, "3").unwrap_err(), vec!["Enter an even number.".to_string()]);
    }

    #[test]
    fn test_field_builder_chain() {
        let field = FormFieldDef::new("email", FormFieldType::Email)
            .required(false)
            .label("Email Address")
            .help_text("Enter a valid email")
            .widget_type(WidgetType::TextInput)
            .disabled(true);
        assert_eq!(field.label, "Email Address");
        assert_eq!(field.help_text, "Enter a valid email");
        assert_eq!(field.widget.widget_type(), WidgetType::TextInput);
        assert!(!field.widget.is_required());
        assert!(field.disabled);
    }

    #[test]
    fn test_default_label_is_pretty_name() {
        assert_eq!(char_field("first_name").label, "First name");
        assert_eq!(pretty_name("URL_path"), "Url path");
        assert_eq!(pretty_name(""), "");
    }

    #[test]
    fn test_default_widget_for_field_type() {
        assert_eq!(
            default_widget_for_field_type(&FormFieldType::Integer {
                min_value: None,
                max_value: None,
            }),
            WidgetType::NumberInput
        );
        assert_eq!(
            default_widget_for_field_type(&FormFieldType::Boolean),
            WidgetType::CheckboxInput
        );
        assert_eq!(
            default_widget_for_field_type(&FormFieldType::Email),
            WidgetType::EmailInput
        );
        assert_eq!(
            default_widget_for_field_type(&FormFieldType::MultipleChoice { choices: vec![] }),
            WidgetType::SelectMultiple
        );
    }

    #[test]
    fn test_widget_is_required_follows_field() {
        let field = char_field("title");
        assert!(field.widget.is_required());
        let field = field.required(false);
        assert!(!field.widget.is_required());
    }

    #[test]
    fn test_char_widget_attrs() {
        let field = FormFieldDef::new(
            "title",
            FormFieldType::Char {
                min_length: Some(2),
                max_length: Some(100),
                strip: true,
            },
        );
        assert_eq!(field.widget.attrs()["maxlength"], "100");
        assert_eq!(field.widget.attrs()["minlength"], "2");

        let hidden = field.clone().widget_type(WidgetType::HiddenInput);
        assert!(!hidden.widget.attrs().contains_key("maxlength"));

        let textarea = field.widget(Box::new(Textarea::new()));
        assert_eq!(textarea.widget.attrs()["maxlength"], "100");
        assert_eq!(textarea.widget.attrs()["cols"], "40");
    }

    #[test]
    fn test_number_widget_attrs() {
        let field = FormFieldDef::new(
            "qty",
            FormFieldType::Integer {
                min_value: Some(1),
                max_value: Some(9),
            },
        );
        assert_eq!(field.widget.attrs()["min"], "1");
        assert_eq!(field.widget.attrs()["max"], "9");

        let amount = FormFieldDef::new(
            "amount",
            FormFieldType::Decimal {
                max_digits: 8,
                decimal_places: 2,
            },
        );
        assert_eq!(amount.widget.attrs()["step"], "0.01");

        let ratio = FormFieldDef::new(
            "ratio",
            FormFieldType::Float {
                min_value: None,
                max_value: None,
            },
        );
        assert_eq!(ratio.widget.attrs()["step"], "any");
    }

    #[test]
    fn test_choice_widget_gets_choices() {
        let field = FormFieldDef::new(
            "color",
            FormFieldType::Choice {
                choices: vec![("r".into(), "Red".into())],
            },
        )
        .widget_type(WidgetType::RadioSelect);
        assert_eq!(field.widget.kind(), WidgetKind::RadioGroup);
        let options = field.widget.subwidgets("color", &Value::Null, &Attrs::new());
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_bound_data() {
        let field = char_field("name");
        assert_eq!(field.bound_data(Value::from("new"), Value::from("old")), Value::from("new"));
        let disabled = field.disabled(true);
        assert_eq!(disabled.bound_data(Value::from("new"), Value::from("old")), Value::from("old"));

        let file = FormFieldDef::new("cv", FormFieldType::File { allowed_extensions: vec![] });
        assert_eq!(file.bound_data(Value::Null, Value::from("cv.pdf")), Value::from("cv.pdf"));
    }

    #[test]
    fn test_prepare_value_strips_microseconds() {
        let field = FormFieldDef::new("at", FormFieldType::Time);
        let t = chrono::NaiveTime::from_hms_micro_opt(9, 0, 0, 5).unwrap();
        assert_eq!(
            field.prepare_value(Value::Time(t)),
            Value::Time(chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_hidden_widget() {
        assert!(char_field("x").hidden_widget().is_hidden());
    }
}
