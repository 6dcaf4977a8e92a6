//! # formcraft-composer
//!
//! Per-field rendering policies for formcraft forms.
//!
//! A [`Composer`] overrides, by field name, the widget, template, label, help
//! text and CSS classes a field renders with, without touching the form. The
//! composer-aware [`BoundField`] consults it at every step of rendering; the
//! [`templatetag`] front end drives that from keyword arguments.
//!
//! ## Modules
//!
//! - [`composer`] - The [`Composer`] trait, [`ComposerConfig`] and [`BaseComposer`]
//! - [`registry`] - Composer identifiers and the shared instance per type
//! - [`bootstrap4`] - The Bootstrap 4 composer
//! - [`bound_field`] - The composer-aware bound field
//! - [`templatetag`] - The `field` tag
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use formcraft_composer::{BaseComposer, BoundField, ComposerConfig};
//! use formcraft_forms::{BaseForm, Form, FormFieldDef, FormFieldType, WidgetType};
//!
//! let form = BaseForm::new(vec![FormFieldDef::new(
//!     "bio",
//!     FormFieldType::Char { min_length: None, max_length: None, strip: true },
//! )]);
//! let composer = Arc::new(BaseComposer::new(
//!     ComposerConfig::new().with_widget("bio", WidgetType::Textarea),
//! ));
//!
//! let field = &form.fields()[0];
//! let bound = BoundField::new(&form, field, &field.name, composer);
//! assert!(bound.render().unwrap().starts_with("<textarea"));
//! ```

pub mod bootstrap4;
pub mod bound_field;
pub mod composer;
pub mod registry;
pub mod templatetag;

pub use bootstrap4::Bootstrap4;
pub use bound_field::BoundField;
pub use composer::{BaseComposer, ClassList, Composer, ComposerConfig, WidgetSpec};
pub use registry::{
    composer_registry, get_composer, register_composer, resolve_composer, ComposerRegistry,
};
pub use templatetag::{field_tag, TagParams};
