//! Handler lookup for command attributes.
//!
//! A command attribute names a handler. The name is looked up in an ordered
//! list of scopes: the directive instance owning the template, each
//! enclosing instance, and finally the instance's model.

use std::rc::Rc;

use bindery_core::{Command, Model};
use tracing::trace;

use crate::directive::Instance;
use crate::error::ViewError;

/// Something that can resolve a handler by name.
pub trait HandlerScope {
    fn resolve(&self, name: &str) -> Option<Command>;

    /// Short description used in "not found" errors.
    fn describe(&self) -> String;
}

impl HandlerScope for Model {
    fn resolve(&self, name: &str) -> Option<Command> {
        self.handler(name)
    }

    fn describe(&self) -> String {
        format!("model {}", self.schema().name())
    }
}

/// A directive instance as a handler scope.
pub struct DirectiveScope(pub Rc<Instance>);

impl HandlerScope for DirectiveScope {
    fn resolve(&self, name: &str) -> Option<Command> {
        self.0.directive().handler(&self.0, name)
    }

    fn describe(&self) -> String {
        format!("directive {}", self.0.directive_name())
    }
}

/// The scopes searched for handlers named in `instance`'s template, in
/// priority order.
pub fn handler_scopes(instance: &Rc<Instance>) -> Vec<Rc<dyn HandlerScope>> {
    let mut scopes: Vec<Rc<dyn HandlerScope>> = instance
        .ancestry()
        .into_iter()
        .map(|i| Rc::new(DirectiveScope(i)) as Rc<dyn HandlerScope>)
        .collect();
    if let Some(model) = instance.model() {
        scopes.push(model.clone());
    }
    scopes
}

pub fn resolve_in(scopes: &[Rc<dyn HandlerScope>], name: &str) -> Option<Command> {
    scopes.iter().find_map(|scope| {
        let found = scope.resolve(name);
        if found.is_some() {
            trace!(handler = name, scope = %scope.describe(), "handler resolved");
        }
        found
    })
}

/// Resolve `name` for a command attribute in `instance`'s template.
pub fn lookup_command(instance: &Rc<Instance>, name: &str) -> Result<Command, ViewError> {
    let scopes = handler_scopes(instance);
    resolve_in(&scopes, name).ok_or_else(|| ViewError::HandlerNotFound {
        name: name.to_string(),
        searched: scopes
            .iter()
            .map(|s| s.describe())
            .collect::<Vec<_>>()
            .join(", "),
    })
}
