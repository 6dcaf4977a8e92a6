//! The `field` tag: render one field of a form with keyword arguments.
//!
//! Arguments are split three ways:
//!
//! - keys starting with `_` go into the template context, prefix stripped;
//! - `label` and `help_text` go into the context as-is;
//! - everything else becomes a widget attribute, with `__` written for `-`
//!   (`data__id=5` renders `data-id="5"`).
//!
//! ```
//! use formcraft_composer::templatetag::{field_tag, TagParams};
//! use formcraft_core::settings::ComposerSettings;
//! use formcraft_forms::{BaseForm, FormFieldDef, FormFieldType};
//!
//! let form = BaseForm::new(vec![FormFieldDef::new(
//!     "q",
//!     FormFieldType::Char { min_length: None, max_length: None, strip: true },
//! )
//! .required(false)]);
//!
//! let params = TagParams::parse(r#"placeholder="Search" data__role=query"#).unwrap();
//! let html = field_tag(&form, "q", params, &ComposerSettings::default()).unwrap();
//! assert_eq!(html, r#"<input type="text" name="q" placeholder="Search" data-role="query" id="id_q">"#);
//! ```

use serde_json::Value as JsonValue;

use formcraft_core::settings::ComposerSettings;
use formcraft_core::{FormcraftError, FormcraftResult};
use formcraft_forms::widgets::{Attrs, Context};
use formcraft_forms::Form;

use crate::bound_field::BoundField;

/// Arguments that always go to the template context.
const CONTEXT_ARGUMENTS: [&str; 2] = ["label", "help_text"];

/// Keyword arguments of a `field` tag, in the order they were given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagParams(Vec<(String, JsonValue)>);

impl TagParams {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// Parses `key=value` pairs separated by whitespace.
    ///
    /// Values may be quoted strings, integers, decimals, `True`/`False` or
    /// `None`; any other bare word is taken as a string.
    ///
    /// # Errors
    ///
    /// Returns [`FormcraftError::TemplateError`] for an argument without `=`.
    pub fn parse(args: &str) -> FormcraftResult<Self> {
        split_args(args)
            .into_iter()
            .map(|arg| {
                let (key, raw) = arg.split_once('=').ok_or_else(|| {
                    FormcraftError::TemplateError(format!(
                        "'field' tag arguments must be key=value, got '{arg}'"
                    ))
                })?;
                Ok((key.to_string(), parse_literal(raw)))
            })
            .collect::<FormcraftResult<Vec<_>>>()
            .map(Self)
    }

    /// Returns `true` if no arguments were given.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits the arguments into widget attributes and context entries.
    ///
    /// A `label` or `help_text` of `None` is dropped, leaving the computed
    /// value in place.
    pub fn split(self) -> (Attrs, Context) {
        let mut attrs = Attrs::new();
        let mut context = Context::new();
        for (key, value) in self.0 {
            if let Some(context_key) = key.strip_prefix('_') {
                context.insert(context_key.to_string(), value);
            } else if CONTEXT_ARGUMENTS.contains(&key.as_str()) {
                if !value.is_null() {
                    context.insert(key, value);
                }
            } else {
                attrs.insert(key.replace("__", "-"), value);
            }
        }
        (attrs, context)
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for TagParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Splits on whitespace outside of quotes.
fn split_args(content: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for ch in content.chars() {
        match ch {
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
                current.push(ch);
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
                current.push(ch);
            }
            c if c.is_whitespace() && !in_single_quote && !in_double_quote => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn parse_literal(raw: &str) -> JsonValue {
    let quoted = raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')));
    if quoted {
        return JsonValue::String(raw[1..raw.len() - 1].to_string());
    }
    match raw {
        "True" | "true" => JsonValue::Bool(true),
        "False" | "false" => JsonValue::Bool(false),
        "None" => JsonValue::Null,
        _ => raw
            .parse::<i64>()
            .map(JsonValue::from)
            .ok()
            .map(JsonValue::from)
            .or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(JsonValue::from)
            })
            .unwrap_or_else(|| JsonValue::String(raw.to_string())),
    }
}

/// Renders field `name` of `form` through the form's composer.
///
/// # Errors
///
/// Returns [`FormcraftError::FieldDoesNotExist`] for an unknown field, and
/// propagates composer, renderer and template failures.
pub fn field_tag(
    form: &dyn Form,
    name: &str,
    params: TagParams,
    settings: &ComposerSettings,
) -> FormcraftResult<String> {
    let bound_field = BoundField::for_field(form, name, settings.clone())?;
    let (attrs, context) = params.split();
    tracing::trace!(field = name, attrs = attrs.len(), context = context.len(), "field tag");
    bound_field.as_widget(None, &attrs, false, &context)
}
