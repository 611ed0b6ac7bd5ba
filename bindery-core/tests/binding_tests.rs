use std::cell::RefCell;
use std::rc::Rc;

use bindery_core::{
    Binding, BindingState, BindingTable, DataType, Direction, Model, ModelSchema, TargetSink, Value,
};

fn counter_model() -> Rc<Model> {
    let schema = ModelSchema::builder("Counter")
        .property_with_default("count", 5)
        .property("label", DataType::Str)
        .build()
        .expect("schema");
    Model::new(schema)
}

fn bind_var(model: &Rc<Model>, property: &str, widget: &str, direction: Direction) -> Rc<Binding> {
    let prop = model.property(property).expect("property").clone();
    Binding::new(model, &prop, widget, "textvariable", direction, TargetSink::Variable)
}

#[test]
fn two_way_binding_syncs_both_directions() {
    let model = counter_model();
    let mut table = BindingTable::new();
    let binding = bind_var(&model, "count", ".!entry", Direction::TwoWay);
    table.install(binding.clone());

    // Seeded with the current property value.
    assert_eq!(binding.variable().get(), Value::Int(5));

    model.set("count", 7).unwrap();
    assert_eq!(binding.variable().get(), Value::Int(7));

    // Simulated typing.
    binding.variable().set("12");
    assert_eq!(model.get("count").unwrap(), Value::Int(12));
}

#[test]
fn propagation_is_bounded_to_one_write_per_variable() {
    let model = counter_model();
    let mut table = BindingTable::new();
    let a = bind_var(&model, "count", ".a", Direction::TwoWay);
    let b = bind_var(&model, "count", ".b", Direction::TwoWay);
    table.install(a.clone());
    table.install(b.clone());

    let (a0, b0) = (a.variable().write_count(), b.variable().write_count());
    model.set("count", 1).unwrap();
    assert_eq!(a.variable().write_count() - a0, 1);
    assert_eq!(b.variable().write_count() - b0, 1);

    let (a1, b1) = (a.variable().write_count(), b.variable().write_count());
    a.variable().set("3");
    assert_eq!(model.get("count").unwrap(), Value::Int(3));
    assert_eq!(a.variable().write_count() - a1, 1, "no echo into the writing variable");
    assert_eq!(b.variable().write_count() - b1, 1);
    assert_eq!(b.variable().get(), Value::Int(3));
}

#[test]
fn to_view_only_binding_ignores_widget_writes() {
    let model = counter_model();
    let mut table = BindingTable::new();
    let binding = bind_var(&model, "count", ".!label", Direction::ToView);
    table.install(binding.clone());

    binding.variable().set("99");
    assert_eq!(model.get("count").unwrap(), Value::Int(5));

    model.set("count", 6).unwrap();
    assert_eq!(binding.variable().get(), Value::Int(6));
}

#[test]
fn to_model_only_binding_ignores_model_writes() {
    let model = counter_model();
    let mut table = BindingTable::new();
    let binding = bind_var(&model, "count", ".!scale", Direction::ToModel);
    table.install(binding.clone());

    model.set("count", 8).unwrap();
    assert_eq!(binding.variable().get(), Value::Int(5));

    binding.variable().set(Value::Int(2));
    assert_eq!(model.get("count").unwrap(), Value::Int(2));
}

#[test]
fn second_binding_on_same_key_supersedes_first() {
    let model = counter_model();
    let mut table = BindingTable::new();
    let first = bind_var(&model, "count", ".!entry", Direction::TwoWay);
    let second = bind_var(&model, "count", ".!entry", Direction::TwoWay);
    assert_eq!(first.key(), second.key());

    assert!(table.install(first.clone()).is_none());
    let superseded = table.install(second.clone()).expect("previous binding returned");
    assert!(Rc::ptr_eq(&superseded, &first));

    assert_eq!(table.len(), 1);
    assert_eq!(first.state(), BindingState::Superseded);
    assert_eq!(second.state(), BindingState::Bound);

    let prop = model.property("count").unwrap();
    let attached = prop.bindings();
    assert_eq!(attached.len(), 1);
    assert!(Rc::ptr_eq(&attached[0], &second));

    // The detached variable no longer reaches the model.
    first.variable().set("40");
    assert_eq!(model.get("count").unwrap(), Value::Int(5));
}

#[test]
fn malformed_numeric_input_yields_zero_not_previous_value() {
    let model = counter_model();
    let mut table = BindingTable::new();
    let binding = bind_var(&model, "count", ".!entry", Direction::TwoWay);
    table.install(binding.clone());

    binding.variable().set("12");
    assert_eq!(model.get("count").unwrap(), Value::Int(12));

    binding.variable().set("12a");
    assert_eq!(binding.safe_get(), Value::Int(0));
    assert_eq!(model.get("count").unwrap(), Value::Int(0));
    // The raw text stays in the widget.
    assert_eq!(binding.variable().get(), Value::Str("12a".into()));
}

#[test]
fn config_target_degrades_to_view_only() {
    let model = counter_model();
    let mut table = BindingTable::new();
    let seen: Rc<RefCell<Vec<Value>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = {
        let seen = seen.clone();
        TargetSink::Config(Rc::new(move |v: &Value| seen.borrow_mut().push(v.clone())))
    };
    let prop = model.property("label").unwrap().clone();
    let binding = Binding::new(&model, &prop, ".!label", "foreground", Direction::TwoWay, sink);
    assert!(binding.to_view());
    assert!(!binding.to_model());
    table.install(binding.clone());

    model.set("label", "red").unwrap();
    assert_eq!(&*seen.borrow(), &vec![Value::Str("red".into())]);

    // Writes on the variable never reach the model.
    binding.variable().set("blue");
    assert_eq!(model.get("label").unwrap(), Value::Str("red".into()));
}

#[test]
fn only_bindings_of_the_written_instance_are_notified() {
    let schema = ModelSchema::builder("Pair")
        .property("value", DataType::Int)
        .build()
        .unwrap();
    let first = Model::new(schema.clone());
    let second = Model::new(schema);
    let mut table = BindingTable::new();
    let binding = bind_var(&first, "value", ".first", Direction::TwoWay);
    table.install(binding.clone());

    second.set("value", 3).unwrap();
    assert_eq!(binding.variable().get(), Value::Int(0));
    assert_eq!(first.get("value").unwrap(), Value::Int(0));

    first.set("value", 4).unwrap();
    assert_eq!(binding.variable().get(), Value::Int(4));
}

#[test]
fn clearing_table_detaches_everything() {
    let model = counter_model();
    let mut table = BindingTable::new();
    table.install(bind_var(&model, "count", ".a", Direction::TwoWay));
    table.install(bind_var(&model, "count", ".b", Direction::ToView));
    assert_eq!(model.property("count").unwrap().binding_count(), 2);

    table.clear();
    assert!(table.is_empty());
    assert_eq!(model.property("count").unwrap().binding_count(), 0);
}

#[test]
fn direction_flags() {
    assert_eq!(Direction::from_flags(true, true), Some(Direction::TwoWay));
    assert_eq!(Direction::from_flags(false, false), None);
    assert!(Direction::ToModel.to_model());
    assert!(!Direction::ToModel.to_view());
}

#[test]
fn writer_sees_what_a_custom_setter_stored() {
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
    let mut table = BindingTable::new();
    let entry = bind_var(&model, "percent", ".entry", Direction::TwoWay);
    let label = bind_var(&model, "percent", ".label", Direction::ToView);
    table.install(entry.clone());
    table.install(label.clone());

    entry.variable().set("40");
    assert_eq!(label.variable().get(), Value::Int(40));
    let writes = entry.variable().write_count();

    entry.variable().set("140");
    assert_eq!(model.get("percent").unwrap(), Value::Int(100));
    assert_eq!(label.variable().get(), Value::Int(100));
    assert_eq!(entry.variable().get(), Value::Int(100));
    assert_eq!(entry.variable().write_count() - writes, 2);
}
