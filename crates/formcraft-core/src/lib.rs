//! # formcraft-core
//!
//! Core types, settings, and error types for formcraft.
//! This crate has zero framework dependencies and provides the foundation for all other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`utils`] - Utility types (`MultiValueDict`)
//! - [`settings`] - Settings, composer defaults, and global configuration
//! - [`settings_loader`] - Loading settings from TOML/JSON files and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{FormcraftError, FormcraftResult, ValidationError};
pub use settings::{ComposerSettings, Settings, SETTINGS};
