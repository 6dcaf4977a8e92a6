//! Validation pipeline for form processing.
//!
//! This module implements the validation pipeline:
//! 1. Field-level validation (type coercion + per-field validators)
//! 2. Form-level cross-field validation
//!
//! Errors accumulate rather than short-circuiting, so all validation
//! issues are reported at once.

use std::collections::HashMap;

use crate::fields::clean_field_value;
use crate::form::{CleanHook, Form};
use crate::value::Value;

/// The error key for errors that belong to the whole form.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// The outcome of cleaning a bound form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedForm {
    /// Cleaned values keyed by field name.
    pub cleaned_data: HashMap<String, Value>,
    /// Error messages keyed by field name (or [`NON_FIELD_ERRORS`]).
    pub errors: HashMap<String, Vec<String>>,
}

/// Performs field-level validation for all fields of a form.
///
/// For each field definition:
/// 1. Reads the value through the field's widget (or the initial value
///    for disabled fields)
/// 2. Runs [`clean_field_value`] for type coercion and field-level validation
/// 3. Populates `cleaned_data` on success or `errors` on failure
pub fn clean_fields(form: &dyn Form) -> CleanedForm {
    let mut cleaned = CleanedForm::default();
    for field in form.fields() {
        let value = if field.disabled {
            form.get_initial_for_field(field, &field.name)
        } else {
            let html_name = form.add_prefix(&field.name);
            field.widget.value_from_data(form.data(), form.files(), &html_name)
        };

        match clean_field_value(field, &value) {
            Ok(value) => {
                cleaned.cleaned_data.insert(field.name.clone(), value);
            }
            Err(field_errors) => {
                cleaned.errors.insert(field.name.clone(), field_errors);
            }
        }
    }
    cleaned
}

/// Runs the cross-field hook and merges its errors.
///
/// Fields that gain an error are dropped from the cleaned data.
pub fn clean_form(cleaned: &mut CleanedForm, hook: CleanHook) {
    if let Err(form_errors) = hook(&cleaned.cleaned_data) {
        for (key, msgs) in form_errors {
            cleaned.cleaned_data.remove(&key);
            cleaned.errors.entry(key).or_default().extend(msgs);
        }
    }
}

/// Validates a form and returns its errors sorted by field name.
///
/// # Returns
///
/// - `Ok(())` if all validation passes
/// - `Err(errors)` with a list of `(field_name, error_messages)` tuples
pub fn full_clean(form: &dyn Form) -> Result<(), Vec<(String, Vec<String>)>> {
    if form.is_valid() {
        return Ok(());
    }
    let mut errors: Vec<(String, Vec<String>)> = form
        .errors()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    errors.sort_by(|a, b| a.0.cmp(&b.0));
    Err(errors)
}
