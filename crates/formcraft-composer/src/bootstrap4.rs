//! A composer that renders fields with Bootstrap 4 markup.

use formcraft_forms::widgets::{Attrs, Widget, WidgetKind};
use serde_json::Value as JsonValue;

use crate::composer::{Composer, ComposerConfig};

/// Field template and widget class for each widget family.
const fn theme(kind: WidgetKind) -> (&'static str, &'static str) {
    match kind {
        WidgetKind::Checkbox => ("formcraft/bootstrap4/checkbox.html", "form-check-input"),
        WidgetKind::CheckboxGroup => ("formcraft/bootstrap4/checkbox_select.html", "form-check-input"),
        WidgetKind::RadioGroup => ("formcraft/bootstrap4/radio_select.html", "form-check-input"),
        WidgetKind::Select => ("formcraft/bootstrap4/input.html", "custom-select"),
        WidgetKind::File => ("formcraft/bootstrap4/file.html", "custom-file-input"),
        WidgetKind::Hidden | WidgetKind::Input => ("formcraft/bootstrap4/input.html", "form-control"),
    }
}

/// Wraps every visible field in a Bootstrap 4 `form-group` and gives its
/// widget the matching control class.
///
/// # Examples
///
/// ```
/// use formcraft_composer::{Bootstrap4, Composer};
/// use formcraft_forms::widgets::{Select, TextInput};
///
/// let composer = Bootstrap4::default();
/// assert_eq!(
///     composer.get_template_name("email", &TextInput::new()),
///     "formcraft/bootstrap4/input.html"
/// );
/// let attrs = composer.build_widget_attrs("country", Default::default(), &Select::new(vec![]));
/// assert_eq!(attrs["class"], "custom-select");
/// ```
#[derive(Debug, Default)]
pub struct Bootstrap4 {
    config: ComposerConfig,
}

impl Bootstrap4 {
    /// Creates the composer with additional overrides.
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }
}

impl Composer for Bootstrap4 {
    fn config(&self) -> &ComposerConfig {
        &self.config
    }

    fn get_default_template_name(&self, _name: &str, widget: &dyn Widget) -> String {
        theme(widget.kind()).0.to_string()
    }

    /// Adds the control class; `class` ends up last and free of duplicates.
    fn build_widget_attrs(&self, _name: &str, mut attrs: Attrs, widget: &dyn Widget) -> Attrs {
        let existing = attrs.shift_remove("class");
        let mut classes: Vec<&str> = Vec::new();
        let tokens = existing
            .as_ref()
            .and_then(JsonValue::as_str)
            .into_iter()
            .flat_map(str::split_whitespace)
            .chain(std::iter::once(theme(widget.kind()).1));
        for token in tokens {
            if !classes.contains(&token) {
                classes.push(token);
            }
        }
        attrs.insert("class".to_string(), classes.join(" ").into());
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcraft_forms::widgets::{
        CheckboxInput, CheckboxSelectMultiple, ClearableFileInput, HiddenInput, RadioSelect,
        SelectMultiple, TextInput, Textarea,
    };

    fn attrs(pairs: &[(&str, &str)]) -> Attrs {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), JsonValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_default_templates() {
        let composer = Bootstrap4::default();
        let cases: [(&dyn Widget, &str); 6] = [
            (&CheckboxInput::new(), "formcraft/bootstrap4/checkbox.html"),
            (&CheckboxSelectMultiple::new(vec![]), "formcraft/bootstrap4/checkbox_select.html"),
            (&RadioSelect::new(vec![]), "formcraft/bootstrap4/radio_select.html"),
            (&SelectMultiple::new(vec![]), "formcraft/bootstrap4/input.html"),
            (&ClearableFileInput::new(), "formcraft/bootstrap4/file.html"),
            (&Textarea::new(), "formcraft/bootstrap4/input.html"),
        ];
        for (widget, template) in cases {
            assert_eq!(composer.get_template_name("f", widget), template);
        }
    }

    #[test]
    fn test_hidden_keeps_builtin_template() {
        let composer = Bootstrap4::default();
        assert_eq!(
            composer.get_template_name("f", &HiddenInput::new()),
            "formcraft/widgets/hidden.html"
        );
    }

    #[test]
    fn test_class_is_merged_and_moved_last() {
        let composer = Bootstrap4::default();
        let merged = composer.build_widget_attrs(
            "f",
            attrs(&[("class", "wide form-control wide"), ("placeholder", "x")]),
            &TextInput::new(),
        );
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, ["placeholder", "class"]);
        assert_eq!(merged["class"], "wide form-control");
    }

    #[test]
    fn test_checkbox_class() {
        let merged = Bootstrap4::default().build_widget_attrs("f", Attrs::new(), &CheckboxInput::new());
        assert_eq!(merged["class"], "form-check-input");
    }
}
