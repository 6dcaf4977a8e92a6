//! # formcraft
//!
//! Per-field rendering customization for forms.
//!
//! This is the meta-crate that re-exports the formcraft sub-crates. Depend on
//! `formcraft` to get all of them, or on the individual crates for
//! finer-grained control.

/// Core types, settings, logging, and error types.
pub use formcraft_core as core;

/// Fields, widgets, forms, and Tera-backed renderers.
pub use formcraft_forms as forms;

/// Composers, the composer registry, the composer-aware bound field, and the
/// `field` tag.
pub use formcraft_composer as composer;

pub use serde_json;
pub use tracing;
