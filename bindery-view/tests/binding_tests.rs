use std::rc::Rc;

use bindery_core::{BindingKey, BindingState, DataType, Model, ModelSchema, Value};
use bindery_dom::{ConfigValue, HeadlessToolkit, Toolkit};
use bindery_template::parse_binding_expr;
use bindery_view::{BindTarget, Component, Registry, Window, bind, variable_counterpart};

fn form_model() -> Rc<Model> {
    let schema = ModelSchema::builder("Form")
        .property_with_default("name", "Ada")
        .property_with_default("age", 36)
        .property("progress", DataType::Float)
        .property_with_default("width", 120)
        .property("subscribed", DataType::Bool)
        .build()
        .expect("schema");
    Model::new(schema)
}

fn open(tk: &Rc<HeadlessToolkit>, template: &str, model: &Rc<Model>) -> Window {
    let main = Rc::new(Component::new("Form").template(template));
    Window::open(tk.clone(), Registry::standard().unwrap(), main, model.clone()).expect("open")
}

#[test]
fn label_text_binds_through_its_text_variable() {
    let tk = Rc::new(HeadlessToolkit::new());
    let model = form_model();
    let window = open(&tk, r#"<Label name="greeting" text="[name]"/>"#, &model);
    let label = window.instance().widget("greeting").unwrap();

    assert!(tk.variable(label, "textvariable").is_some());
    assert!(tk.config_value(label, "text").is_none(), "static text is cleared");
    assert_eq!(tk.displayed(label).as_deref(), Some("Ada"));
    model.set("name", "Grace").unwrap();
    assert_eq!(tk.displayed(label).as_deref(), Some("Grace"));
}

#[test]
fn two_way_entry_round_trip_without_echo() {
    let tk = Rc::new(HeadlessToolkit::new());
    let model = form_model();
    let window = open(&tk, r#"<Entry name="age" textvariable="[(age)]"/>"#, &model);
    let entry = window.instance().widget("age").unwrap();
    let var = tk.variable(entry, "textvariable").unwrap();
    assert_eq!(tk.displayed(entry).as_deref(), Some("36"));

    // Model to view: one write into the variable.
    let before = var.write_count();
    model.set("age", 40).unwrap();
    assert_eq!(tk.displayed(entry).as_deref(), Some("40"));
    assert_eq!(var.write_count() - before, 1);

    // View to model: the keystroke is the only write.
    let before = var.write_count();
    assert!(tk.type_text(entry, "1").unwrap());
    assert_eq!(model.get("age").unwrap(), Value::Int(401));
    assert_eq!(var.write_count() - before, 1);
}

#[test]
fn two_widgets_on_one_property_stay_in_step() {
    let tk = Rc::new(HeadlessToolkit::new());
    let model = form_model();
    let window = open(
        &tk,
        r#"<Frame>
             <Entry name="input" textvariable="[(name)]"/>
             <Label name="echo" text="[name]"/>
           </Frame>"#,
        &model,
    );
    let input = window.instance().widget("input").unwrap();
    let echo = window.instance().widget("echo").unwrap();
    tk.delete_text(input, 3).unwrap();
    tk.type_text(input, "Bob").unwrap();
    assert_eq!(model.get("name").unwrap(), Value::from("Bob"));
    assert_eq!(tk.displayed(echo).as_deref(), Some("Bob"));
}

#[test]
fn to_view_only_ignores_widget_edits() {
    let tk = Rc::new(HeadlessToolkit::new());
    let model = form_model();
    let window = open(&tk, r#"<Entry name="e" textvariable="[name]"/>"#, &model);
    let entry = window.instance().widget("e").unwrap();
    tk.type_text(entry, "!").unwrap();
    assert_eq!(model.get("name").unwrap(), Value::from("Ada"));
    model.set("name", "Lin").unwrap();
    assert_eq!(tk.displayed(entry).as_deref(), Some("Lin"));
}

#[test]
fn to_model_only_does_not_follow_the_model() {
    let tk = Rc::new(HeadlessToolkit::new());
    let model = form_model();
    let window = open(&tk, r#"<Checkbutton name="sub" variable="(subscribed)"/>"#, &model);
    let check = window.instance().widget("sub").unwrap();
    tk.invoke(check).unwrap();
    assert_eq!(model.get("subscribed").unwrap(), Value::Bool(true));
    model.set("subscribed", false).unwrap();
    assert_eq!(tk.variable(check, "variable").unwrap().get(), Value::Bool(true));
}

#[test]
fn unparseable_input_yields_the_zero_value() {
    let tk = Rc::new(HeadlessToolkit::new());
    let model = form_model();
    let window = open(&tk, r#"<Entry name="age" textvariable="[(age)]"/>"#, &model);
    let entry = window.instance().widget("age").unwrap();
    tk.delete_text(entry, 2).unwrap();
    tk.type_text(entry, "12").unwrap();
    assert_eq!(model.get("age").unwrap(), Value::Int(12));

    // Mid-edit garbage does not raise and does not keep the last good value.
    tk.type_text(entry, "x").unwrap();
    assert_eq!(model.get("age").unwrap(), Value::Int(0));
    // The entry keeps what the user typed.
    assert_eq!(tk.displayed(entry).as_deref(), Some("12x"));
}

#[test]
fn progressbar_value_binds_to_its_variable() {
    assert_eq!(variable_counterpart("Progressbar", "value"), Some("variable"));
    assert_eq!(variable_counterpart("Entry", "text"), None);

    let tk = Rc::new(HeadlessToolkit::new());
    let model = form_model();
    let window = open(&tk, r#"<Progressbar name="p" value="[progress]"/>"#, &model);
    let bar = window.instance().widget("p").unwrap();
    model.set("progress", 0.5).unwrap();
    assert_eq!(tk.variable(bar, "variable").unwrap().get(), Value::Float(0.5));
    assert!(tk.config_value(bar, "value").is_none());
}

#[test]
fn config_targets_are_pushed_and_never_bound_back() {
    let tk = Rc::new(HeadlessToolkit::new());
    let model = form_model();
    let window = open(&tk, r#"<Frame name="box" width="[(width)]"/>"#, &model);
    let frame = window.instance().widget("box").unwrap();
    let render = |tk: &HeadlessToolkit| tk.config_value(frame, "width").and_then(|v| v.render());

    assert_eq!(render(&tk).as_deref(), Some("120"));
    model.set("width", 300).unwrap();
    assert_eq!(render(&tk).as_deref(), Some("300"));

    let key = BindingKey::new(".box", "width");
    let binding = window.instance().binding(&key).expect("binding installed");
    assert!(binding.to_view());
    assert!(!binding.to_model(), "two-way degrades to view-only on config targets");
}

#[test]
fn rebinding_a_target_supersedes_the_old_binding() {
    let tk = Rc::new(HeadlessToolkit::new());
    let model = form_model();
    let window = open(&tk, r#"<Label name="l" text="[name]"/>"#, &model);
    let main = window.instance();
    let label = main.widget("l").unwrap();
    let key = BindingKey::new(".l", "textvariable");
    let first = main.binding(&key).unwrap();
    let name = model.property("name").unwrap().clone();
    assert_eq!(name.binding_count(), 1);

    let expr = parse_binding_expr("[name]").unwrap();
    let config = bind(main, BindTarget::Widget(label), "text", &expr).unwrap();
    tk.configure(label, config).unwrap();

    let second = main.binding(&key).unwrap();
    assert!(!Rc::ptr_eq(&first, &second));
    assert_eq!(first.state(), BindingState::Superseded);
    assert_eq!(second.state(), BindingState::Bound);
    assert_eq!(name.binding_count(), 1);
    assert_eq!(main.bindings().len(), 1);

    model.set("name", "Kay").unwrap();
    assert_eq!(tk.displayed(label).as_deref(), Some("Kay"));
    assert_eq!(first.variable().get(), Value::from("Ada"));
}

#[test]
fn bindings_follow_the_instance_they_were_made_for() {
    let tk = Rc::new(HeadlessToolkit::new());
    let a = form_model();
    let b = Model::new(a.schema().clone());
    let win_a = open(&tk, r#"<Label name="l" text="[name]"/>"#, &a);
    let win_b = open(&tk, r#"<Label name="l" text="[name]"/>"#, &b);
    let la = win_a.instance().widget("l").unwrap();
    let lb = win_b.instance().widget("l").unwrap();
    assert_ne!(tk.path_name(la).unwrap(), tk.path_name(lb).unwrap());

    b.set("name", "only b").unwrap();
    assert_eq!(tk.displayed(la).as_deref(), Some("Ada"));
    assert_eq!(tk.displayed(lb).as_deref(), Some("only b"));
}

#[test]
fn literal_config_is_passed_verbatim() {
    let tk = Rc::new(HeadlessToolkit::new());
    let model = form_model();
    let window = open(&tk, r#"<Label name="l" relief="sunken" anchor="w"/>"#, &model);
    let label = window.instance().widget("l").unwrap();
    assert!(matches!(
        tk.config_value(label, "relief"),
        Some(ConfigValue::Value(Value::Str(ref s))) if s == "sunken"
    ));
    assert!(window.instance().bindings().is_empty());
}

#[test]
fn bound_widgets_show_what_a_custom_setter_stored() {
    let schema = ModelSchema::builder("Volume")
        .computed(
            "percent",
            DataType::Int,
            |m| m.slot("percent").unwrap_or(Value::Int(0)),
            |m, v| {
                m.set_slot("percent", v.as_int().unwrap_or(0).clamp(0, 100));
                Ok(())
            },
        )
        .build()
        .unwrap();
    let model = Model::new(schema);
    model.set("percent", 40).unwrap();

    let tk = Rc::new(HeadlessToolkit::new());
    let window = open(
        &tk,
        r#"<Frame>
             <Entry name="input" textvariable="[(percent)]"/>
             <Label name="shown" text="[percent]"/>
           </Frame>"#,
        &model,
    );
    let input = window.instance().widget("input").unwrap();
    let shown = window.instance().widget("shown").unwrap();
    assert_eq!(tk.displayed(input).as_deref(), Some("40"));

    assert!(tk.type_text(input, "0").unwrap());
    assert_eq!(model.get("percent").unwrap(), Value::Int(100));
    assert_eq!(tk.displayed(shown).as_deref(), Some("100"));
    assert_eq!(tk.displayed(input).as_deref(), Some("100"));
}
