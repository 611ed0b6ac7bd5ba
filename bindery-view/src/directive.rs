//! Directives and their live instances.
//!
//! A [`Directive`] is a registered template-tag handler. Mounting one creates
//! an [`Instance`]: the directive's root widget, the model it is scoped to,
//! the bindings it owns and the widgets it has named.

use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use bindery_core::{Binding, BindingKey, BindingTable, Command, Lifecycle, Model};
use bindery_dom::{ConfigValue, Options, Toolkit, WidgetId};
use bindery_template::TemplateNode;
use tracing::debug;

use crate::error::ViewError;
use crate::inflate;
use crate::registry::Registry;

/// A registered template-tag handler.
pub trait Directive {
    /// The tag this directive answers to.
    fn name(&self) -> &str;

    /// Create the directive's root widget under `parent`, inflating any
    /// sub-tree it owns.
    fn create(&self, instance: &Rc<Instance>, parent: WidgetId) -> Result<WidgetId, ViewError>;

    /// Handle one child element of a template owned by `instance`.
    fn add_child(&self, instance: &Rc<Instance>, parent: WidgetId, child: ChildSpec) -> Result<Constructed, ViewError> {
        inflate::add_child_default(instance, parent, child)
    }

    /// A handler this directive offers to command attributes.
    fn handler(&self, _instance: &Rc<Instance>, _name: &str) -> Option<Command> {
        None
    }

    /// Receive the dashed options (other than layout ones) written on the
    /// directive's own tag.
    fn configure(&self, _instance: &Rc<Instance>, _options: &Options) -> Result<(), ViewError> {
        Ok(())
    }

    /// Apply widget options written on the directive's tag, including later
    /// pushes from bindings to them.
    fn configure_widget(&self, instance: &Rc<Instance>, options: Vec<(String, ConfigValue)>) -> Result<(), ViewError> {
        let widget = instance
            .root_widget()
            .ok_or_else(|| ViewError::Unmounted(self.name().to_string()))?;
        instance.toolkit().configure(widget, options)?;
        Ok(())
    }

    /// Register named widgets in the enclosing directive instead of a
    /// registry of its own.
    fn shares_parent_names(&self) -> bool {
        false
    }
}

/// A child element on its way to [`Directive::add_child`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSpec {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    /// Trimmed, non-blank text content.
    pub text: Option<String>,
}

impl ChildSpec {
    pub fn from_node(node: &TemplateNode) -> Self {
        Self {
            tag: node.tag.clone(),
            attrs: node.attrs.clone(),
            text: node.trimmed_text().map(str::to_string),
        }
    }
}

/// The result of handling one element: the child directive instance, if the
/// tag named one, and the widget its children attach to.
#[derive(Debug, Clone)]
pub struct Constructed {
    pub directive: Option<Rc<Instance>>,
    pub widget: WidgetId,
}

/// Something registered under a `name` attribute.
#[derive(Debug, Clone)]
pub enum Named {
    Widget(WidgetId),
    Directive(Rc<Instance>),
}

impl Named {
    /// The widget itself, or the directive's root widget.
    pub fn widget(&self) -> Option<WidgetId> {
        match self {
            Named::Widget(w) => Some(*w),
            Named::Directive(d) => d.root_widget(),
        }
    }
}

type NameTable = Rc<RefCell<BTreeMap<String, Named>>>;

/// One mounted directive.
pub struct Instance {
    directive: Rc<dyn Directive>,
    parent: Option<Weak<Instance>>,
    model: Option<Rc<Model>>,
    toolkit: Rc<dyn Toolkit>,
    registry: Rc<Registry>,
    bindings: RefCell<BindingTable>,
    named: NameTable,
    declared_name: Option<String>,
    children: RefCell<Vec<Rc<Instance>>>,
    root: Cell<Option<WidgetId>>,
    lifecycle: Lifecycle,
}

impl Instance {
    /// Mount `directive` under `parent_widget`: create the instance, let the
    /// directive build its root widget and record the instance with its
    /// parent. `name` is the `name` attribute written on the directive's tag.
    pub fn mount(
        directive: Rc<dyn Directive>,
        parent: Option<&Rc<Instance>>,
        toolkit: Rc<dyn Toolkit>,
        registry: Rc<Registry>,
        model: Option<Rc<Model>>,
        parent_widget: WidgetId,
        name: Option<&str>,
    ) -> Result<Rc<Instance>, ViewError> {
        let named = match parent {
            Some(p) if directive.shares_parent_names() => p.named.clone(),
            _ => NameTable::default(),
        };
        let instance = Rc::new(Instance {
            directive: directive.clone(),
            parent: parent.map(Rc::downgrade),
            model,
            toolkit,
            registry,
            bindings: RefCell::new(BindingTable::new()),
            named,
            declared_name: name.map(str::to_string),
            children: RefCell::new(Vec::new()),
            root: Cell::new(None),
            lifecycle: Lifecycle::new(),
        });
        debug!(directive = directive.name(), "mounting");
        let root = directive.create(&instance, parent_widget)?;
        instance.root.set(Some(root));
        if let Some(p) = parent {
            p.children.borrow_mut().push(instance.clone());
        }
        Ok(instance)
    }

    /// Build the live hierarchy described by `node` under `parent`.
    pub fn construct(self: &Rc<Self>, node: &TemplateNode, parent: WidgetId) -> Result<Constructed, ViewError> {
        let constructed = self
            .directive
            .add_child(self, parent, ChildSpec::from_node(node))?;
        let owner = constructed.directive.clone().unwrap_or_else(|| self.clone());
        for child in &node.children {
            owner.construct(child, constructed.widget)?;
        }
        inflate::normalize_grid(&*self.toolkit, constructed.widget)?;
        Ok(constructed)
    }

    pub fn directive(&self) -> &Rc<dyn Directive> {
        &self.directive
    }

    pub fn directive_name(&self) -> &str {
        self.directive.name()
    }

    pub fn parent(&self) -> Option<Rc<Instance>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// This instance and then each enclosing one, innermost first.
    pub fn ancestry(self: &Rc<Self>) -> Vec<Rc<Instance>> {
        let mut chain = vec![self.clone()];
        while let Some(parent) = chain.last().and_then(|i| i.parent()) {
            chain.push(parent);
        }
        chain
    }

    /// The name the template gave this directive's tag, if any. Directives
    /// wrapping one widget use it as the widget's path component.
    pub fn declared_name(&self) -> Option<&str> {
        self.declared_name.as_deref()
    }

    pub fn model(&self) -> Option<&Rc<Model>> {
        self.model.as_ref()
    }

    pub fn toolkit(&self) -> &Rc<dyn Toolkit> {
        &self.toolkit
    }

    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    /// `None` only while the directive is still creating it.
    pub fn root_widget(&self) -> Option<WidgetId> {
        self.root.get()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn children(&self) -> Vec<Rc<Instance>> {
        self.children.borrow().clone()
    }

    pub fn named(&self, name: &str) -> Option<Named> {
        self.named.borrow().get(name).cloned()
    }

    /// The widget registered under `name` (a directive's root widget for
    /// named directives).
    pub fn widget(&self, name: &str) -> Option<WidgetId> {
        self.named(name).and_then(|n| n.widget())
    }

    pub fn names(&self) -> Vec<String> {
        self.named.borrow().keys().cloned().collect()
    }

    pub(crate) fn register_name(&self, name: &str, named: Named) {
        self.named.borrow_mut().insert(name.to_string(), named);
    }

    pub fn bindings(&self) -> Ref<'_, BindingTable> {
        self.bindings.borrow()
    }

    pub fn binding(&self, key: &BindingKey) -> Option<Rc<Binding>> {
        self.bindings.borrow().get(key).cloned()
    }

    /// Install `binding`, detaching whatever this instance had bound to the
    /// same target.
    pub(crate) fn install_binding(&self, binding: Rc<Binding>) {
        if let Some(previous) = self.bindings.borrow_mut().install(binding) {
            debug!(key = %previous.key(), "binding superseded");
        }
    }

    /// Run mounted hooks, children first.
    pub fn run_mounted_hooks(&self) {
        for child in self.children() {
            child.run_mounted_hooks();
        }
        self.lifecycle.run_mounted_hooks();
    }

    /// Run destroy hooks and detach every binding in this subtree.
    pub fn teardown(&self) {
        self.lifecycle.run_destroy_hooks();
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.teardown();
        }
        let mut bindings = self.bindings.borrow_mut();
        debug!(directive = self.directive.name(), bindings = bindings.len(), "teardown");
        bindings.clear();
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("directive", &self.directive.name())
            .field("root", &self.root.get())
            .field("model", &self.model.as_ref().map(|m| m.schema().name()))
            .field("bindings", &self.bindings.borrow().len())
            .field("children", &self.children.borrow().len())
            .finish()
    }
}
