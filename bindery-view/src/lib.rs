//! Template inflation and binding resolution.
//!
//! A [`Registry`] maps template tags to widget classes and [`Directive`]s.
//! Mounting a directive produces an [`Instance`] which inflates its template
//! against a [`Toolkit`](bindery_dom::Toolkit), resolving each attribute to
//! widget configuration, layout, a handler or a live
//! [`Binding`](bindery_core::Binding).

pub mod attributes;
pub mod command;
pub mod component;
pub mod directive;
pub mod error;
pub mod inflate;
pub mod menu;
pub mod notebook;
pub mod registry;
pub mod widget_wrapper;
pub mod window;

pub use attributes::{BindTarget, Resolved, bind, process_attributes, resolve_attributes, variable_counterpart, wrapper_of};
pub use command::{DirectiveScope, HandlerScope, handler_scopes, lookup_command};
pub use component::{Component, TemplateSource};
pub use directive::{ChildSpec, Constructed, Directive, Instance, Named};
pub use error::ViewError;
pub use inflate::{add_child_default, inflate, normalize_grid};
pub use menu::Menu;
pub use notebook::Notebook;
pub use registry::{Entry, Registration, Registry, RegistryBuilder, RegistryError, WidgetClass};
pub use widget_wrapper::{NumericEntry, OptionMenu, WidgetWrapper};
pub use window::Window;
