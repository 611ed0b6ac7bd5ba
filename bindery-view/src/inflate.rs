use std::rc::Rc;

use bindery_dom::{GeometryKind, Toolkit, WidgetId};
use bindery_template::{MODEL_ATTR, NAME_ATTR, model_selector};
use tracing::debug;

use crate::attributes::{deliver_custom, process_attributes};
use crate::directive::{ChildSpec, Constructed, Instance, Named};
use crate::error::ViewError;
use crate::registry::Entry;

/// The standard handling of a child element: fold its text into a `text`
/// attribute, inflate its tag, then resolve and apply its attributes.
pub fn add_child_default(instance: &Rc<Instance>, parent: WidgetId, child: ChildSpec) -> Result<Constructed, ViewError> {
    let ChildSpec { tag, mut attrs, text } = child;
    if let Some(text) = text {
        attrs.insert("text".to_string(), text);
    }
    let name = attrs.remove(NAME_ATTR);
    let model_expr = attrs.remove(MODEL_ATTR);

    let constructed = inflate(instance, parent, &tag, name.as_deref(), model_expr.as_deref())?;
    let custom = process_attributes(instance, constructed.widget, attrs)?;
    deliver_custom(&tag, constructed.directive.as_ref(), &custom)?;
    Ok(constructed)
}

/// Turn `tag` into a widget or a mounted directive under `parent`.
///
/// A directive gets the current model, or the sub-model `model_expr`
/// selects, and its root widget becomes the effective widget. `name`
/// registers the result with `instance`.
pub fn inflate(
    instance: &Rc<Instance>,
    parent: WidgetId,
    tag: &str,
    name: Option<&str>,
    model_expr: Option<&str>,
) -> Result<Constructed, ViewError> {
    let constructed = match instance.registry().lookup(tag)? {
        Entry::Directive(directive) => {
            let model = match model_expr {
                Some(expr) => {
                    let current = instance.model().ok_or_else(|| ViewError::NoModel {
                        directive: instance.directive_name().to_string(),
                    })?;
                    Some(current.child(model_selector(expr))?)
                }
                None => instance.model().cloned(),
            };
            debug!(tag, ?name, scoped = model_expr.is_some(), "inflating directive");
            let child = Instance::mount(
                directive,
                Some(instance),
                instance.toolkit().clone(),
                instance.registry().clone(),
                model,
                parent,
                name,
            )?;
            let widget = child.root_widget().ok_or_else(|| ViewError::NotFound(tag.to_string()))?;
            Constructed {
                directive: Some(child),
                widget,
            }
        }
        Entry::Widget(class) => {
            if model_expr.is_some() {
                debug!(tag, "model selector ignored on a plain widget");
            }
            let widget = instance.toolkit().create_widget(&class.name, parent, name)?;
            debug!(tag, ?name, "inflating widget");
            Constructed {
                directive: None,
                widget,
            }
        }
    };

    if let Some(name) = name {
        let named = match &constructed.directive {
            Some(child) => Named::Directive(child.clone()),
            None => Named::Widget(constructed.widget),
        };
        instance.register_name(name, named);
    }
    Ok(constructed)
}

/// Give every grid column of `container` stretch weight 1 when any of its
/// children is grid managed.
pub fn normalize_grid(toolkit: &dyn Toolkit, container: WidgetId) -> Result<(), ViewError> {
    let uses_grid = toolkit
        .children(container)
        .into_iter()
        .any(|c| toolkit.geometry_manager(c) == Some(GeometryKind::Grid));
    if !uses_grid {
        return Ok(());
    }
    let (columns, _) = toolkit.grid_size(container);
    for column in 0..columns {
        toolkit.column_configure(container, column, 1)?;
    }
    Ok(())
}
