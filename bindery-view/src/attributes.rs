//! Attribute resolution.
//!
//! Every attribute of an element ends up in exactly one place:
//!
//! - keys containing `command` become handler callables;
//! - bracketed values (`[p]`, `(p)`, `[(p)]`, `([p])`) become bindings;
//! - `pack-`, `grid-` and `place-` keys become layout options;
//! - other undashed keys are passed to the widget verbatim;
//! - other dashed keys are custom options for the element's directive.

use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use bindery_core::{Binding, Direction, TargetSink, Value};
use bindery_dom::{ConfigValue, Geometry, Options, Toolkit, WidgetId};
use bindery_template::{AttrTarget, BindingExpr, LayoutEngine, classify_key, is_binding_expr, is_command_key, parse_binding_expr};
use tracing::{debug, warn};

use crate::command::lookup_command;
use crate::directive::Instance;
use crate::error::ViewError;

/// Static attributes whose live counterpart is a variable option.
const VARIABLE_COUNTERPARTS: &[(&str, &str, &str)] = &[
    ("Button", "text", "textvariable"),
    ("Checkbutton", "text", "textvariable"),
    ("Menubutton", "text", "textvariable"),
    ("Radiobutton", "text", "textvariable"),
    ("Label", "text", "textvariable"),
    ("Message", "text", "textvariable"),
    ("Progressbar", "value", "variable"),
];

/// The variable option standing in for `attribute` on `class`, if any.
pub fn variable_counterpart(class: &str, attribute: &str) -> Option<&'static str> {
    VARIABLE_COUNTERPARTS
        .iter()
        .find(|(c, a, _)| *c == class && *a == attribute)
        .map(|(_, _, v)| *v)
}

/// What a binding's target attribute belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindTarget {
    Widget(WidgetId),
    /// An entry of a menu, addressed by index.
    MenuEntry { menu: WidgetId, index: usize },
}

impl BindTarget {
    /// The identity bindings to this target are keyed by.
    pub fn identity(&self, toolkit: &dyn Toolkit) -> Result<String, ViewError> {
        Ok(match self {
            BindTarget::Widget(w) => toolkit.path_name(*w)?,
            BindTarget::MenuEntry { menu, index } => format!("{}.menuitem:{index}", toolkit.path_name(*menu)?),
        })
    }

    fn class(&self, toolkit: &dyn Toolkit) -> Result<String, ViewError> {
        Ok(match self {
            BindTarget::Widget(w) => toolkit.class_name(*w)?,
            BindTarget::MenuEntry { .. } => "menuitem".to_string(),
        })
    }

    /// A callback pushing a new value of `attribute` into the target. When
    /// a directive wraps the widget the value goes through that directive.
    pub fn config_sink(
        &self,
        toolkit: Rc<dyn Toolkit>,
        wrapper: Option<Weak<Instance>>,
        attribute: &str,
    ) -> Rc<dyn Fn(&Value)> {
        let target = *self;
        let attribute = attribute.to_string();
        Rc::new(move |value: &Value| {
            let options = vec![(attribute.clone(), ConfigValue::Value(value.clone()))];
            let result = match (target, wrapper.as_ref().and_then(Weak::upgrade)) {
                (BindTarget::Widget(_), Some(owner)) => owner.directive().configure_widget(&owner, options),
                (BindTarget::Widget(w), None) => toolkit.configure(w, options).map_err(ViewError::from),
                (BindTarget::MenuEntry { menu, index }, _) => {
                    toolkit.menu_entry_configure(menu, index, options).map_err(ViewError::from)
                }
            };
            if let Err(err) = result {
                warn!(%err, attribute = %attribute, "could not push bound value");
            }
        })
    }
}

/// The directive instance mounted by `instance` on `widget`, if any.
pub fn wrapper_of(instance: &Rc<Instance>, widget: WidgetId) -> Option<Rc<Instance>> {
    instance
        .children()
        .into_iter()
        .find(|child| child.root_widget() == Some(widget))
}

/// Attributes sorted by destination.
#[derive(Debug, Default)]
pub struct Resolved {
    pub config: Vec<(String, ConfigValue)>,
    pub pack: Options,
    pub grid: Options,
    pub place: Options,
    pub custom: Options,
}

impl Resolved {
    /// The layout call to make: grid over place over pack. Pack is implicit
    /// for managed widgets.
    pub fn geometry(&self, managed: bool) -> Option<Geometry> {
        if !self.grid.is_empty() {
            Some(Geometry::Grid(self.grid.clone()))
        } else if !self.place.is_empty() {
            Some(Geometry::Place(self.place.clone()))
        } else if managed {
            Some(Geometry::Pack(self.pack.clone()))
        } else {
            None
        }
    }

    /// Layout only when the template asked for one.
    pub fn explicit_geometry(&self) -> Option<Geometry> {
        if self.pack.is_empty() && self.grid.is_empty() && self.place.is_empty() {
            None
        } else {
            self.geometry(true)
        }
    }
}

/// Create a binding from `expr` to `attribute` of `target`, install it in
/// `instance` and return the configuration that completes it on the widget.
pub fn bind(
    instance: &Rc<Instance>,
    target: BindTarget,
    attribute: &str,
    expr: &BindingExpr,
) -> Result<Vec<(String, ConfigValue)>, ViewError> {
    let model = instance.model().ok_or_else(|| ViewError::NoModel {
        directive: instance.directive_name().to_string(),
    })?;
    let property = model.property(&expr.property)?.clone();
    let toolkit = instance.toolkit().clone();

    let class = target.class(&*toolkit)?;
    let counterpart = variable_counterpart(&class, attribute);
    let target_attribute = counterpart.unwrap_or(attribute);
    let variable_backed = target_attribute.contains("variable");

    let sink = if variable_backed {
        TargetSink::Variable
    } else {
        let wrapper = match target {
            BindTarget::Widget(w) => wrapper_of(instance, w).map(|owner| Rc::downgrade(&owner)),
            BindTarget::MenuEntry { .. } => None,
        };
        TargetSink::Config(target.config_sink(toolkit.clone(), wrapper, target_attribute))
    };
    let Some(direction) = Direction::from_flags(expr.to_view, expr.to_model) else {
        return Err(ViewError::InvalidBindingExpr {
            attribute: attribute.to_string(),
            value: expr.property.clone(),
        });
    };
    let identity = target.identity(&*toolkit)?;
    let binding = Binding::new(model, &property, &identity, target_attribute, direction, sink);
    debug!(key = %binding.key(), property = property.name(), ?direction, "bound");
    let variable = binding.variable().clone();
    instance.install_binding(binding);

    if variable_backed {
        let mut out = vec![(target_attribute.to_string(), ConfigValue::Variable(variable))];
        if counterpart.is_some() {
            out.push((attribute.to_string(), ConfigValue::Unset));
        }
        Ok(out)
    } else {
        Ok(vec![(target_attribute.to_string(), ConfigValue::Value(property.read(model)))])
    }
}

/// Sort `attrs` by destination, resolving handlers and creating bindings on
/// the way.
pub fn resolve_attributes(
    instance: &Rc<Instance>,
    target: BindTarget,
    attrs: BTreeMap<String, String>,
) -> Result<Resolved, ViewError> {
    let mut resolved = Resolved::default();
    for (key, value) in attrs {
        match classify_key(&key) {
            AttrTarget::Layout(engine, option) => {
                let options = match engine {
                    LayoutEngine::Pack => &mut resolved.pack,
                    LayoutEngine::Grid => &mut resolved.grid,
                    LayoutEngine::Place => &mut resolved.place,
                };
                options.insert(option, value);
            }
            AttrTarget::Custom => {
                resolved.custom.insert(key, value);
            }
            AttrTarget::Config if is_command_key(&key) => {
                let command = lookup_command(instance, &value)?;
                resolved.config.push((key, ConfigValue::Command(command)));
            }
            AttrTarget::Config => {
                if let Some(expr) = parse_binding_expr(&value) {
                    let config = bind(instance, target, &key, &expr)?;
                    resolved.config.extend(config);
                } else if is_binding_expr(&value) {
                    return Err(ViewError::InvalidBindingExpr { attribute: key, value });
                } else {
                    resolved.config.push((key, ConfigValue::Value(Value::Str(value))));
                }
            }
        }
    }
    Ok(resolved)
}

/// Configure `widget` and lay it out. Returns the custom options for the
/// element's directive.
pub fn apply_resolved(
    instance: &Rc<Instance>,
    widget: WidgetId,
    resolved: Resolved,
    auto_pack: bool,
) -> Result<Options, ViewError> {
    let toolkit = instance.toolkit();
    let geometry = if auto_pack {
        let class = toolkit.class_name(widget)?;
        resolved.geometry(instance.registry().is_managed(&class))
    } else {
        resolved.explicit_geometry()
    };
    if !resolved.config.is_empty() {
        match wrapper_of(instance, widget) {
            Some(owner) => owner.directive().configure_widget(&owner, resolved.config)?,
            None => toolkit.configure(widget, resolved.config)?,
        }
    }
    if let Some(geometry) = geometry {
        toolkit.manage(widget, geometry)?;
    }
    Ok(resolved.custom)
}

/// Resolve and apply `attrs` on `widget`.
pub fn process_attributes(
    instance: &Rc<Instance>,
    widget: WidgetId,
    attrs: BTreeMap<String, String>,
) -> Result<Options, ViewError> {
    let resolved = resolve_attributes(instance, BindTarget::Widget(widget), attrs)?;
    apply_resolved(instance, widget, resolved, true)
}

/// Hand custom options to the element's directive, or drop them with a
/// warning when the element is a plain widget.
pub fn deliver_custom(tag: &str, directive: Option<&Rc<Instance>>, custom: &Options) -> Result<(), ViewError> {
    if custom.is_empty() {
        return Ok(());
    }
    match directive {
        Some(child) => child.directive().configure(child, custom),
        None => {
            warn!(tag, options = ?custom.keys().collect::<Vec<_>>(), "custom options ignored on a plain widget");
            Ok(())
        }
    }
}
