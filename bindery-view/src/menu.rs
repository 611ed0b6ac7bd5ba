use std::rc::Rc;

use bindery_dom::{ConfigValue, WidgetId};
use bindery_template::{MODEL_ATTR, NAME_ATTR};
use tracing::warn;

use crate::attributes::{BindTarget, resolve_attributes};
use crate::directive::{ChildSpec, Constructed, Directive, Instance};
use crate::error::ViewError;
use crate::inflate::inflate;

/// Turns nested elements into menu entries.
///
/// A nested `Menu` becomes a cascade; any other tag becomes an entry of the
/// lowercased kind (`<Command>` is a `command` entry). Element text is the
/// entry label. A top-level menu is installed as its window's menu bar.
#[derive(Debug, Default, Clone, Copy)]
pub struct Menu;

impl Directive for Menu {
    fn name(&self) -> &str {
        "Menu"
    }

    fn create(&self, instance: &Rc<Instance>, parent: WidgetId) -> Result<WidgetId, ViewError> {
        let toolkit = instance.toolkit();
        let menu = toolkit.create_widget("Menu", parent, instance.declared_name())?;
        if toolkit.class_name(parent)? != "Menu" {
            let window = toolkit.toplevel(parent)?;
            toolkit.set_window_menu(window, menu)?;
        }
        Ok(menu)
    }

    fn add_child(&self, instance: &Rc<Instance>, _parent: WidgetId, child: ChildSpec) -> Result<Constructed, ViewError> {
        let ChildSpec { tag, mut attrs, text } = child;
        let toolkit = instance.toolkit().clone();
        let Some(menu) = instance.root_widget() else {
            return Err(ViewError::NotFound(tag));
        };
        if let Some(label) = text {
            attrs.insert("label".to_string(), label);
        }
        if attrs.remove(MODEL_ATTR).is_some() {
            warn!(tag = %tag, "model selector ignored inside a menu");
        }
        let index = toolkit.menu_len(menu);
        let target = BindTarget::MenuEntry { menu, index };

        if tag == "Menu" {
            let name = attrs.remove(NAME_ATTR);
            let constructed = inflate(instance, menu, "Menu", name.as_deref(), None)?;
            toolkit.configure(constructed.widget, vec![("tearoff".to_string(), ConfigValue::from("0"))])?;
            let resolved = resolve_attributes(instance, target, attrs)?;
            toolkit.menu_add_cascade(menu, constructed.widget, resolved.config)?;
            return Ok(constructed);
        }

        if let Some(name) = attrs.remove(NAME_ATTR) {
            warn!(tag = %tag, name = %name, "menu items cannot be named");
        }
        let resolved = resolve_attributes(instance, target, attrs)?;
        if !resolved.pack.is_empty() || !resolved.grid.is_empty() || !resolved.place.is_empty() || !resolved.custom.is_empty() {
            warn!(tag = %tag, "layout and custom options ignored on a menu item");
        }
        toolkit.menu_add_item(menu, &tag.to_lowercase(), resolved.config)?;
        Ok(Constructed {
            directive: None,
            widget: menu,
        })
    }

    fn shares_parent_names(&self) -> bool {
        true
    }
}
