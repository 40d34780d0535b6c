use std::cell::Cell;
use std::rc::Rc;

use pkgform::config::IdStrategy;
use pkgform::form::{
    Disclosures, FieldRenderer, FieldSurface, IdGenerator, PackageForm, SubmitOutcome,
};
use pkgform::layout::{windows_package, LayoutItem, LayoutSpec, SectionSpec};
use pkgform::models::{FieldDescriptor, FieldKind};

fn renderer() -> FieldRenderer {
    FieldRenderer::new(IdGenerator::new("form-input-", IdStrategy::Sequential))
}

fn fill_visible_fields(form: &mut PackageForm) {
    let package_id = form.tree().find_field("packageId").unwrap();
    let display_name = form.tree().find_field("publisherDisplayName").unwrap();
    let publisher = form.tree().find_field("publisherId").unwrap();
    form.set_value(package_id, "Contoso.App");
    form.set_value(display_name, "Contoso");
    form.set_value(publisher, "CN=3a54a224-05dd-42aa-85bd-3f3c1478fdca");
}

#[test]
fn hidden_invalid_field_is_revealed_and_reported() {
    let mut form = PackageForm::new(&windows_package(), renderer());
    fill_visible_fields(&mut form);

    let url = form.tree().find_field("url").unwrap();
    let name = form.tree().find_field("name").unwrap();
    let section = form.tree().closest_disclosure(url).unwrap();
    assert!(!form.tree().is_expanded(section));

    let outcome = form.submit();
    assert_eq!(outcome, SubmitOutcome::Rejected { invalid: vec![url, name] });

    // Both invalid fields share the section, which was toggled only once.
    assert!(form.tree().is_expanded(section));
    assert_eq!(form.pending_deferred(), 1);
    assert!(form.bubble().is_none());

    assert_eq!(form.tick(), 1);
    assert_eq!(form.focused(), Some(url));
    assert_eq!(form.bubble().unwrap().field, url);

    // Fixing the field clears the report.
    form.set_value(url, "https://contoso.example/");
    assert!(form.bubble().is_none());
    form.set_value(name, "Contoso App");

    match form.submit() {
        SubmitOutcome::Accepted(options) => {
            assert_eq!(options["url"], "https://contoso.example/");
            assert_eq!(options["publisherDisplayName"], "Contoso");
            assert_eq!(options["signingMode"], "generate");
        }
        other => panic!("expected acceptance, got {:?}", other),
    }
}

#[test]
fn custom_message_follows_every_change() {
    let mut form = PackageForm::new(&windows_package(), renderer());
    let version = form.tree().find_field("version").unwrap();

    form.set_value(version, "0.1.0");
    let element = &form.tree().field(version).unwrap().element;
    assert!(element.custom_validity().starts_with("Version must be"));
    assert_eq!(element.title, element.custom_validity());

    form.set_value(version, "2.0.0");
    let element = &form.tree().field(version).unwrap().element;
    assert_eq!(element.custom_validity(), "");
    assert!(element.check_validity());
}

#[test]
fn nested_section_reveal_uses_nearest_section() {
    let layout = LayoutSpec {
        title: "Nested".to_string(),
        description: None,
        items: vec![LayoutItem::Section(SectionSpec {
            title: "Outer".to_string(),
            expanded: true,
            items: vec![LayoutItem::Section(SectionSpec {
                title: "Inner".to_string(),
                expanded: false,
                items: vec![LayoutItem::Field(
                    FieldDescriptor::new("Certificate password", FieldKind::Password)
                        .with_name("password")
                        .required(),
                )],
            })],
        })],
    };
    let mut form = PackageForm::new(&layout, renderer());
    let password = form.tree().find_field("password").unwrap();
    let inner = form.tree().closest_disclosure(password).unwrap();
    let outer = form.tree().closest_disclosure(inner).unwrap();

    form.submit();
    assert!(form.tree().is_expanded(inner));
    assert!(form.tree().is_expanded(outer));
    form.tick();
    assert_eq!(form.bubble().unwrap().message, "Please fill out this field.");
    assert!(!form.report_validity(password));
}

#[test]
fn change_handler_sees_every_input_event() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let layout = LayoutSpec {
        title: "Handlers".to_string(),
        description: None,
        items: vec![LayoutItem::Field(
            FieldDescriptor::new("Short name", FieldKind::Text)
                .with_name("shortName")
                .on_change(move |_, _, _| counter.set(counter.get() + 1)),
        )],
    };
    let mut form = PackageForm::new(&layout, renderer());
    let field = form.tree().find_field("shortName").unwrap();
    form.set_value(field, "C");
    form.set_value(field, "Co");
    assert_eq!(calls.get(), 2);
}
