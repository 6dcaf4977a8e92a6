//! Core error types for formcraft.
//!
//! Rendering a field never invents its own failure categories: everything
//! here is raised by a collaborator (an identifier that cannot be resolved,
//! a template that is missing or fails to evaluate, a bad settings file)
//! and propagated unchanged.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A validation error produced by the host form framework.
///
/// # Examples
///
/// ```
/// use formcraft_core::error::ValidationError;
///
/// let err = ValidationError::new("This field is required.", "required");
/// assert_eq!(err.to_string(), "This field is required.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error message shown to the user.
    pub message: String,
    /// A short code identifying the failure (e.g. "required", "invalid").
    pub code: String,
    /// Parameters interpolated into the message.
    pub params: HashMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for formcraft.
#[derive(Error, Debug)]
pub enum FormcraftError {
    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The framework is improperly configured.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A composer or renderer identifier could not be resolved.
    #[error("Cannot import '{0}'")]
    ImportError(String),

    // ── Forms ────────────────────────────────────────────────────────

    /// The form has no field with the requested name.
    #[error("Field '{0}' does not exist on this form")]
    FieldDoesNotExist(String),

    /// Validation failed.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    // ── Templates ────────────────────────────────────────────────────

    /// The requested template was not found.
    #[error("Template does not exist: {0}")]
    TemplateDoesNotExist(String),

    /// A template failed to parse or to render.
    #[error("Template error: {0}")]
    TemplateError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ValidationError> for FormcraftError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err)
    }
}

/// A convenience type alias for `Result<T, FormcraftError>`.
pub type FormcraftResult<T> = Result<T, FormcraftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("This field is required.", "required");
        assert_eq!(err.to_string(), "This field is required.");
    }

    #[test]
    fn test_validation_error_with_param() {
        let err = ValidationError::new("Too short.", "min_length").with_param("min", "8");
        assert_eq!(err.params.get("min").unwrap(), "8");
    }

    #[test]
    fn test_import_error_display() {
        let err = FormcraftError::ImportError("myapp.MissingRenderer".into());
        assert_eq!(err.to_string(), "Cannot import 'myapp.MissingRenderer'");
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: FormcraftError = ValidationError::new("Enter a number.", "invalid").into();
        assert!(matches!(err, FormcraftError::ValidationError(_)));
        assert_eq!(err.to_string(), "Validation error: Enter a number.");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FormcraftError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }
}
