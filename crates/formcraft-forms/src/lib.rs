//! # formcraft-forms
//!
//! Form framework for formcraft. Provides the [`Form`] trait, field types
//! with validation, widgets that render through templates, bound fields,
//! and the Tera-backed renderers that turn widget contexts into markup.
//!
//! ## Modules
//!
//! - [`value`] - Typed field values
//! - [`widgets`] - The [`Widget`] trait and the built-in widgets
//! - [`fields`] - Field definitions, coercion and validation
//! - [`form`] - The [`Form`] trait and [`BaseForm`]
//! - [`validation`] - The cleaning pipeline
//! - [`bound_field`] - Fields bound to a form, rendered without styling policy
//! - [`renderers`] - Template renderers and the renderer registry
//!
//! ## Example
//!
//! ```
//! use formcraft_core::utils::FormData;
//! use formcraft_forms::{BaseForm, Form, FormFieldDef, FormFieldType};
//!
//! let mut form = BaseForm::new(vec![FormFieldDef::new(
//!     "title",
//!     FormFieldType::Char { min_length: None, max_length: Some(100), strip: true },
//! )]);
//! form.bind(FormData::parse("title=Dune"));
//! assert!(form.is_valid());
//!
//! let html = form.bound_field("title").unwrap().render().unwrap();
//! assert_eq!(
//!     html,
//!     r#"<input type="text" name="title" value="Dune" maxlength="100" required id="id_title">"#
//! );
//! ```

pub mod bound_field;
pub mod fields;
pub mod form;
pub mod renderers;
pub mod validation;
pub mod value;
pub mod widgets;

pub use bound_field::BoundField;
pub use fields::{clean_field_value, FormFieldDef, FormFieldType};
pub use form::{BaseForm, Form};
pub use renderers::{default_renderer, Renderer, RendererSpec, TemplatesRenderer};
pub use value::Value;
pub use widgets::{Attrs, Context, Widget, WidgetKind, WidgetType};
