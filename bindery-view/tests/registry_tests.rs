use std::rc::Rc;

use bindery_view::{Component, Directive, Entry, Registration, Registry, RegistryBuilder, RegistryError, ViewError, WidgetClass};

#[test]
fn standard_registry_knows_widgets_and_builtin_directives() {
    let registry = Registry::standard().unwrap();
    assert!(matches!(registry.lookup("Button"), Ok(Entry::Widget(c)) if c.name == "Button"));
    let directives: Vec<&str> = registry.directive_names().collect();
    assert_eq!(directives, ["Menu", "Notebook", "NumericEntry", "OptionMenu"]);
    assert!(registry.widget_names().any(|w| w == "Treeview"));
}

#[test]
fn unknown_tag_is_not_found() {
    let registry = Registry::standard().unwrap();
    match registry.lookup("Blink") {
        Err(ViewError::NotFound(name)) => assert_eq!(name, "Blink"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn distinct_directives_with_one_name_are_rejected() {
    let a = Rc::new(Component::new("Card").template("<Frame/>"));
    let b = Rc::new(Component::new("Card").template("<Label/>"));
    let err = RegistryBuilder::standard()
        .register(Registration::Directive(a))
        .register(Registration::Directive(b))
        .build()
        .err()
        .expect("duplicate");
    assert!(matches!(err, RegistryError::DuplicateDirective(ref name) if name == "Card"));
}

#[test]
fn registering_the_same_directive_twice_is_a_no_op() {
    let card = Rc::new(Component::new("Card").template("<Frame/>"));
    let registry = RegistryBuilder::new()
        .register(Registration::Directive(card.clone()))
        .register(Registration::Directive(card))
        .register(WidgetClass::new("Frame"))
        .register(WidgetClass::new("Frame"))
        .build()
        .unwrap();
    assert_eq!(registry.directive_names().collect::<Vec<_>>(), ["Card"]);
    assert_eq!(registry.widget_names().count(), 1);
}

#[test]
fn directives_shadow_widget_classes() {
    let fancy = Rc::new(Component::new("Label").template("<Frame/>"));
    let registry = RegistryBuilder::standard()
        .register(Registration::Directive(fancy))
        .build()
        .unwrap();
    match registry.lookup("Label").unwrap() {
        Entry::Directive(d) => assert_eq!(d.name(), "Label"),
        other => panic!("unexpected {other:?}"),
    }
    // The class itself is still known for layout decisions.
    assert!(registry.widget_class("Label").is_some());
}

#[test]
fn menus_and_toplevels_are_not_laid_out() {
    let registry = Registry::standard().unwrap();
    assert!(!registry.is_managed("Menu"));
    assert!(!registry.is_managed("Toplevel"));
    assert!(registry.is_managed("Frame"));
    assert!(registry.is_managed("SomethingCustom"));
    assert!(!registry.widget_class("Menu").unwrap().managed);
}
