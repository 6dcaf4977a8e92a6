//! Rendering whole forms through the plain bound field.

use std::collections::HashMap;
use std::sync::Arc;

use formcraft_core::utils::FormData;
use formcraft_core::FormcraftError;
use formcraft_forms::renderers::{Renderer, TemplatesRenderer};
use formcraft_forms::widgets::Attrs;
use formcraft_forms::{BaseForm, Form, FormFieldDef, FormFieldType, Value, WidgetType};

fn signup_form() -> BaseForm {
    BaseForm::new(vec![
        FormFieldDef::new(
            "username",
            FormFieldType::Char {
                min_length: Some(3),
                max_length: Some(30),
                strip: true,
            },
        ),
        FormFieldDef::new("email", FormFieldType::Email).help_text("We never share it."),
        FormFieldDef::new(
            "age",
            FormFieldType::Integer {
                min_value: Some(13),
                max_value: None,
            },
        )
        .required(false),
        FormFieldDef::new(
            "plan",
            FormFieldType::Choice {
                choices: vec![
                    ("free".into(), "Free".into()),
                    ("pro".into(), "Pro".into()),
                ],
            },
        )
        .initial("free"),
        FormFieldDef::new("terms", FormFieldType::Boolean),
    ])
}

#[test]
fn renders_every_field_of_an_unbound_form() {
    let form = signup_form();
    let html: Vec<String> = form
        .bound_fields()
        .iter()
        .map(|bf| bf.render().unwrap())
        .collect();

    assert_eq!(
        html[0],
        r#"<input type="text" name="username" maxlength="30" minlength="3" required id="id_username">"#
    );
    assert_eq!(html[1], r#"<input type="email" name="email" required id="id_email">"#);
    assert_eq!(html[2], r#"<input type="number" name="age" min="13" id="id_age">"#);
    assert_eq!(
        html[3],
        "<select name=\"plan\" id=\"id_plan\">\n  <option value=\"free\" selected>Free</option>\n  <option value=\"pro\">Pro</option>\n</select>"
    );
    assert_eq!(html[4], r#"<input type="checkbox" name="terms" required id="id_terms">"#);
}

#[test]
fn bound_form_echoes_submitted_values() {
    let mut form = signup_form();
    form.bind(FormData::parse("username=ada&email=ada%40example.com&plan=pro&terms=on"));
    assert!(form.is_valid(), "{:?}", form.errors());

    let username = form.bound_field("username").unwrap().render().unwrap();
    assert!(username.contains(r#"value="ada""#));
    let email = form.bound_field("email").unwrap().render().unwrap();
    assert!(email.contains(r#"value="ada@example.com""#));
    let plan = form.bound_field("plan").unwrap().render().unwrap();
    assert!(plan.contains(r#"<option value="pro" selected>Pro</option>"#));
    let terms = form.bound_field("terms").unwrap().render().unwrap();
    assert!(terms.contains("checked"));
}

#[test]
fn invalid_form_reports_errors_per_field() {
    let mut form = signup_form();
    form.bind(FormData::parse("username=ab&age=7"));
    assert!(!form.is_valid());
    assert!(form.bound_field("username").unwrap().has_errors());
    assert!(form.bound_field("age").unwrap().has_errors());
    assert!(form.bound_field("email").unwrap().has_errors());
    assert!(form.bound_field("plan").unwrap().has_errors());
}

#[test]
fn prefixed_form_prefixes_names_and_ids() {
    let form = signup_form().with_prefix("signup");
    let html = form.bound_field("email").unwrap().render().unwrap();
    assert_eq!(
        html,
        r#"<input type="email" name="signup-email" required id="id_signup-email">"#
    );
}

#[test]
fn form_initial_beats_field_initial() {
    let initial = HashMap::from([("plan".to_string(), Value::from("pro"))]);
    let form = signup_form().with_initial(initial);
    let html = form.bound_field("plan").unwrap().render().unwrap();
    assert!(html.contains(r#"<option value="pro" selected>Pro</option>"#));
}

#[test]
fn unknown_field_is_an_error() {
    let form = signup_form();
    let err = form.bound_field("nickname").unwrap_err();
    assert!(matches!(err, FormcraftError::FieldDoesNotExist(ref name) if name == "nickname"));
}

#[test]
fn form_renderer_serves_custom_templates() {
    let dir = tempfile::tempdir().unwrap();
    let widgets = dir.path().join("formcraft").join("widgets");
    std::fs::create_dir_all(&widgets).unwrap();
    std::fs::write(
        widgets.join("email.html"),
        r#"<input type="email" class="fancy" name="{{ widget.name }}"{% include "formcraft/widgets/attrs.html" %}>"#,
    )
    .unwrap();

    let renderer = TemplatesRenderer::with_dirs(&[dir.path().to_path_buf()]).unwrap();
    assert!(renderer.has_template("formcraft/widgets/text.html"));
    let renderer: Arc<dyn Renderer> = Arc::new(renderer);
    let form = signup_form().with_renderer(renderer);

    let email = form.bound_field("email").unwrap().render().unwrap();
    assert_eq!(
        email,
        r#"<input type="email" class="fancy" name="email" required id="id_email">"#
    );
    let username = form.bound_field("username").unwrap().render().unwrap();
    assert!(username.starts_with(r#"<input type="text" name="username""#));
}

#[test]
fn widget_swap_keeps_field_attributes() {
    let form = BaseForm::new(vec![FormFieldDef::new(
        "bio",
        FormFieldType::Char {
            min_length: None,
            max_length: Some(500),
            strip: true,
        },
    )
    .widget_type(WidgetType::Textarea)
    .required(false)]);
    let html = form.bound_field("bio").unwrap().render().unwrap();
    assert_eq!(
        html,
        "<textarea name=\"bio\" cols=\"40\" rows=\"10\" maxlength=\"500\" id=\"id_bio\">\n</textarea>"
    );
}

#[test]
fn caller_attributes_follow_stored_ones() {
    let form = signup_form();
    let mut attrs = Attrs::new();
    attrs.insert("autocomplete".to_string(), "off".into());
    attrs.insert("maxlength".to_string(), "10".into());
    let html = form
        .bound_field("username")
        .unwrap()
        .as_widget(None, &attrs, false)
        .unwrap();
    assert_eq!(
        html,
        r#"<input type="text" name="username" maxlength="10" minlength="3" autocomplete="off" required id="id_username">"#
    );
}

#[test]
fn as_context_collects_rendered_fields() {
    let mut form = signup_form();
    form.bind(FormData::new());
    let ctx = form.as_context().unwrap();
    let fields = ctx["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 5);
    assert_eq!(fields[1]["label"], "Email");
    assert_eq!(fields[1]["help_text"], "We never share it.");
    assert_eq!(ctx["is_bound"], true);
    assert!(ctx["errors"]["username"].is_array());
}

#[test]
fn bound_field_outlives_the_lookup_name() {
    let form = signup_form();
    let bound = {
        let name = String::from("email");
        form.bound_field(&name).unwrap()
    };
    assert_eq!(bound.name(), "email");
    assert_eq!(bound.html_name(), "email");
}
