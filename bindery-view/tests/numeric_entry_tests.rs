use std::rc::Rc;

use bindery_core::{DataType, Model, ModelSchema, Value};
use bindery_dom::{HeadlessToolkit, Toolkit};
use bindery_view::{Component, Registration, RegistryBuilder, Registry, ViewError, Window, WidgetWrapper};

fn model() -> Rc<Model> {
    let schema = ModelSchema::builder("Form")
        .property_with_default("age", 36)
        .property("ratio", DataType::Float)
        .build()
        .unwrap();
    Model::new(schema)
}

fn open(tk: &Rc<HeadlessToolkit>, template: &str, model: &Rc<Model>) -> Result<Window, ViewError> {
    let main = Rc::new(Component::new("Form").template(template));
    Window::open(tk.clone(), Registry::standard().unwrap(), main, model.clone())
}

#[test]
fn integer_entry_rejects_non_digits() {
    let tk = Rc::new(HeadlessToolkit::new());
    let model = model();
    let window = open(&tk, r#"<NumericEntry name="age" textvariable="[(age)]"/>"#, &model).unwrap();
    let entry = window.instance().widget("age").unwrap();
    assert_eq!(tk.class_name(entry).unwrap(), "Entry");
    assert_eq!(tk.path_name(entry).unwrap(), ".age");

    assert!(!tk.type_text(entry, "a").unwrap());
    assert_eq!(model.get("age").unwrap(), Value::Int(36));
    assert!(tk.type_text(entry, "5").unwrap());
    assert_eq!(model.get("age").unwrap(), Value::Int(365));

    // Clearing is allowed even though "" is not a number.
    assert!(tk.delete_text(entry, 3).unwrap());
    assert_eq!(model.get("age").unwrap(), Value::Int(0));
}

#[test]
fn data_type_option_switches_to_floats() {
    let tk = Rc::new(HeadlessToolkit::new());
    let model = model();
    let window = open(&tk, r#"<NumericEntry name="ratio" data-type="float" textvariable="[(ratio)]"/>"#, &model).unwrap();
    let entry = window.instance().widget("ratio").unwrap();

    tk.delete_text(entry, 3).unwrap();
    assert!(tk.type_text(entry, "1.").unwrap());
    assert!(tk.type_text(entry, "5").unwrap());
    assert!(!tk.type_text(entry, "x").unwrap());
    assert_eq!(model.get("ratio").unwrap(), Value::Float(1.5));
}

#[test]
fn unknown_data_type_is_an_error() {
    let tk = Rc::new(HeadlessToolkit::new());
    let err = open(&tk, r#"<NumericEntry data-type="complex"/>"#, &model()).unwrap_err();
    match err {
        ViewError::InvalidOption { option, value } => {
            assert_eq!(option, "data-type");
            assert_eq!(value, "complex");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn widget_wrappers_apply_presets() {
    let tk = Rc::new(HeadlessToolkit::new());
    let registry = RegistryBuilder::standard()
        .register(Registration::directive(WidgetWrapper::new("Heading", "Label").preset("font", "TkHeadingFont")))
        .build()
        .unwrap();
    let main = Rc::new(Component::new("Page").template(r#"<Frame><Heading name="h">Welcome</Heading></Frame>"#));
    let window = Window::open(tk.clone(), registry, main, None::<Rc<Model>>).unwrap();
    let heading = window.instance().widget("h").unwrap();

    assert_eq!(tk.class_name(heading).unwrap(), "Label");
    assert_eq!(tk.path_name(heading).unwrap(), ".!frame.h");
    assert_eq!(tk.displayed(heading).as_deref(), Some("Welcome"));
    let font = tk.config_value(heading, "font").and_then(|v| v.render());
    assert_eq!(font.as_deref(), Some("TkHeadingFont"));
    assert!(tk.geometry(heading).is_some());
}
