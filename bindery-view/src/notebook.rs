use std::rc::Rc;

use bindery_dom::{Options, WidgetId};
use bindery_template::{MODEL_ATTR, NAME_ATTR};

use crate::attributes::{BindTarget, apply_resolved, deliver_custom, resolve_attributes};
use crate::directive::{ChildSpec, Constructed, Directive, Instance};
use crate::error::ViewError;
use crate::inflate::inflate;

/// Prefix of the options a notebook child passes to its tab.
pub const TAB_PREFIX: &str = "tab-";

/// A tabbed container: each child element becomes a page. `tab-*`
/// attributes configure the page's tab.
#[derive(Debug, Default, Clone, Copy)]
pub struct Notebook;

impl Directive for Notebook {
    fn name(&self) -> &str {
        "Notebook"
    }

    fn create(&self, instance: &Rc<Instance>, parent: WidgetId) -> Result<WidgetId, ViewError> {
        Ok(instance
            .toolkit()
            .create_widget("Notebook", parent, instance.declared_name())?)
    }

    fn add_child(&self, instance: &Rc<Instance>, parent: WidgetId, child: ChildSpec) -> Result<Constructed, ViewError> {
        let ChildSpec { tag, mut attrs, text } = child;
        let tab: Options = attrs
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(TAB_PREFIX).map(|opt| (opt.to_string(), v.clone())))
            .collect();
        attrs.retain(|k, _| !k.starts_with(TAB_PREFIX));
        if let Some(text) = text {
            attrs.insert("text".to_string(), text);
        }
        let name = attrs.remove(NAME_ATTR);
        let model_expr = attrs.remove(MODEL_ATTR);

        let constructed = inflate(instance, parent, &tag, name.as_deref(), model_expr.as_deref())?;
        let resolved = resolve_attributes(instance, BindTarget::Widget(constructed.widget), attrs)?;
        // Pages are managed by the notebook, not packed.
        let custom = apply_resolved(instance, constructed.widget, resolved, false)?;
        deliver_custom(&tag, constructed.directive.as_ref(), &custom)?;

        let notebook = instance.root_widget().unwrap_or(parent);
        instance.toolkit().notebook_add(notebook, constructed.widget, tab)?;
        Ok(constructed)
    }

    fn shares_parent_names(&self) -> bool {
        true
    }
}
