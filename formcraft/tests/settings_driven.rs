//! Rendering driven by settings loaded from a configuration file.

use formcraft::composer::{field_tag, TagParams};
use formcraft::core::settings_loader;
use formcraft::forms::{BaseForm, FormFieldDef, FormFieldType};

fn contact_form() -> BaseForm {
    BaseForm::new(vec![
        FormFieldDef::new("email", FormFieldType::Email),
        FormFieldDef::new(
            "message",
            FormFieldType::Char {
                min_length: None,
                max_length: None,
                strip: true,
            },
        )
        .required(false),
    ])
}

#[test]
fn default_composer_comes_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("formcraft.toml");
    std::fs::write(
        &path,
        "debug = false\n\n[composer]\ndefault_composer = \"formcraft.composers.Bootstrap4\"\n",
    )
    .unwrap();
    let settings = settings_loader::from_toml_file(&path).unwrap();
    assert!(!settings.debug);

    let form = contact_form();
    let params = TagParams::parse(r#"placeholder="you@example.com""#).unwrap();
    let html = field_tag(&form, "email", params, &settings.composer).unwrap();
    assert!(html.starts_with(r#"<div class="form-group">"#));
    assert!(html.contains(
        r#"<input type="email" name="email" placeholder="you@example.com" required class="form-control" id="id_email">"#
    ));
}

#[test]
fn unconfigured_settings_render_plain_widgets() {
    let settings = settings_loader::from_toml_str("").unwrap();
    let form = contact_form();
    let html = field_tag(&form, "message", TagParams::new(), &settings.composer).unwrap();
    assert_eq!(html, r#"<input type="text" name="message" id="id_message">"#);
}

#[test]
fn unknown_composer_in_settings_is_an_error() {
    let settings = settings_loader::from_toml_str(
        "[composer]\ndefault_composer = \"myapp.composers.Missing\"\n",
    )
    .unwrap();
    let err = field_tag(&contact_form(), "email", TagParams::new(), &settings.composer).unwrap_err();
    assert!(matches!(err, formcraft::core::FormcraftError::ImportError(_)));
}
