use std::rc::Rc;

use bindery_core::{Model, ModelSchema};
use bindery_dom::{HeadlessToolkit, Toolkit};
use bindery_view::{Component, Named, Registry, Window};

#[test]
fn children_become_pages_with_tab_options() {
    let tk = Rc::new(HeadlessToolkit::new());
    let schema = ModelSchema::builder("Settings")
        .property_with_default("user", "ada")
        .build()
        .unwrap();
    let model = Model::new(schema);
    let main = Rc::new(Component::new("Settings").template(
        r#"<Notebook name="tabs" pack-fill="both">
             <Frame name="general" tab-text="General" tab-underline="0"/>
             <Label name="about" tab-text="About" text="[user]"/>
           </Notebook>"#,
    ));
    let window = Window::open(tk.clone(), Registry::standard().unwrap(), main, model.clone()).unwrap();
    let main = window.instance();

    let Some(Named::Directive(tabs)) = main.named("tabs") else {
        panic!("notebook directive");
    };
    let notebook = tabs.root_widget().unwrap();
    assert_eq!(tk.class_name(notebook).unwrap(), "Notebook");
    assert!(tk.geometry(notebook).is_some(), "the notebook itself is packed");

    let general = main.widget("general").expect("page names are shared");
    let about = main.widget("about").unwrap();
    let pages = tk.pages(notebook);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].0, general);
    assert_eq!(pages[0].1.get("text").map(String::as_str), Some("General"));
    assert_eq!(pages[0].1.get("underline").map(String::as_str), Some("0"));
    assert_eq!(pages[1].0, about);
    assert_eq!(pages[1].1.get("text").map(String::as_str), Some("About"));

    assert!(tk.geometry(general).is_none(), "pages are not packed");
    assert!(tk.geometry(about).is_none());
    assert!(tk.config_value(general, "tab-text").is_none());

    // Page attributes still bind.
    assert_eq!(tk.displayed(about).as_deref(), Some("ada"));
    model.set("user", "grace").unwrap();
    assert_eq!(tk.displayed(about).as_deref(), Some("grace"));
}
