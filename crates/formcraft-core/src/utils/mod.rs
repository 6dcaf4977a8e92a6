//! Utility types for formcraft.
//!
//! This module provides:
//! - [`MultiValueDict`]: A dictionary that can hold multiple values per key.
//! - [`FormData`]: The submitted-data flavour of it, keyed and valued by strings.

mod multi_value_dict;

pub use multi_value_dict::MultiValueDict;

/// Submitted form data (or uploaded file names) keyed by HTML field name.
pub type FormData = MultiValueDict<String, String>;
