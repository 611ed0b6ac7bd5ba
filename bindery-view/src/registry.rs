//! Tag name lookup.
//!
//! Widget classes and directives are registered on a [`RegistryBuilder`]
//! during startup; [`RegistryBuilder::build`] freezes them into a
//! [`Registry`] that inflation consults for every template tag.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::directive::Directive;
use crate::error::ViewError;
use crate::menu::Menu;
use crate::notebook::Notebook;
use crate::widget_wrapper::{NumericEntry, OptionMenu};

/// Native classes created by [`RegistryBuilder::standard`]. Menus and
/// toplevels are not geometry managed.
const STANDARD_WIDGETS: &[&str] = &[
    "Frame",
    "Label",
    "Button",
    "Entry",
    "Checkbutton",
    "Radiobutton",
    "Scale",
    "Spinbox",
    "Listbox",
    "Text",
    "Canvas",
    "Scrollbar",
    "Message",
    "Menubutton",
    "LabelFrame",
    "PanedWindow",
    "Combobox",
    "Progressbar",
    "Separator",
    "Sizegrip",
    "Treeview",
];
const UNMANAGED_WIDGETS: &[&str] = &["Menu", "Toplevel"];

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("two different directives registered as \"{0}\"")]
    DuplicateDirective(String),
}

/// A native widget class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetClass {
    pub name: String,
    /// Whether the class takes part in pack/grid/place layout.
    pub managed: bool,
}

impl WidgetClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            managed: true,
        }
    }

    pub fn unmanaged(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            managed: false,
        }
    }
}

pub enum Registration {
    Widget(WidgetClass),
    Directive(Rc<dyn Directive>),
}

impl Registration {
    pub fn directive(directive: impl Directive + 'static) -> Self {
        Registration::Directive(Rc::new(directive))
    }
}

impl From<WidgetClass> for Registration {
    fn from(class: WidgetClass) -> Self {
        Registration::Widget(class)
    }
}

/// What a tag name resolves to.
#[derive(Clone)]
pub enum Entry {
    Directive(Rc<dyn Directive>),
    Widget(WidgetClass),
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Directive(d) => f.debug_tuple("Directive").field(&d.name()).finish(),
            Entry::Widget(w) => f.debug_tuple("Widget").field(w).finish(),
        }
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    widgets: BTreeMap<String, WidgetClass>,
    directives: Vec<Rc<dyn Directive>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard widget set plus the built-in `Menu`, `Notebook`,
    /// `NumericEntry` and `OptionMenu` directives.
    pub fn standard() -> Self {
        let mut builder = Self::new();
        for name in STANDARD_WIDGETS {
            builder = builder.register(WidgetClass::new(*name));
        }
        for name in UNMANAGED_WIDGETS {
            builder = builder.register(WidgetClass::unmanaged(*name));
        }
        builder
            .register(Registration::directive(Menu))
            .register(Registration::directive(Notebook))
            .register(Registration::directive(NumericEntry::new()))
            .register(Registration::directive(OptionMenu))
    }

    /// Add a widget class or directive. Registering the same class or the
    /// same directive object twice is a no-op.
    pub fn register(mut self, registration: impl Into<Registration>) -> Self {
        match registration.into() {
            Registration::Widget(class) => {
                self.widgets.insert(class.name.clone(), class);
            }
            Registration::Directive(directive) => {
                if !self.directives.iter().any(|d| Rc::ptr_eq(d, &directive)) {
                    self.directives.push(directive);
                }
            }
        }
        self
    }

    pub fn build(self) -> Result<Rc<Registry>, RegistryError> {
        let mut directives: BTreeMap<String, Rc<dyn Directive>> = BTreeMap::new();
        for directive in self.directives {
            let name = directive.name().to_string();
            if directives.contains_key(&name) {
                return Err(RegistryError::DuplicateDirective(name));
            }
            directives.insert(name, directive);
        }
        debug!(
            widgets = self.widgets.len(),
            directives = directives.len(),
            "registry built"
        );
        Ok(Rc::new(Registry {
            widgets: self.widgets,
            directives,
        }))
    }
}

/// Immutable tag lookup table.
pub struct Registry {
    widgets: BTreeMap<String, WidgetClass>,
    directives: BTreeMap<String, Rc<dyn Directive>>,
}

impl Registry {
    pub fn standard() -> Result<Rc<Registry>, RegistryError> {
        RegistryBuilder::standard().build()
    }

    /// Directives shadow widget classes of the same name.
    pub fn lookup(&self, name: &str) -> Result<Entry, ViewError> {
        if let Some(directive) = self.directives.get(name) {
            return Ok(Entry::Directive(directive.clone()));
        }
        self.widgets
            .get(name)
            .cloned()
            .map(Entry::Widget)
            .ok_or_else(|| ViewError::NotFound(name.to_string()))
    }

    pub fn widget_class(&self, name: &str) -> Option<&WidgetClass> {
        self.widgets.get(name)
    }

    /// Unknown classes are assumed managed.
    pub fn is_managed(&self, class: &str) -> bool {
        self.widgets.get(class).is_none_or(|c| c.managed)
    }

    pub fn directive_names(&self) -> impl Iterator<Item = &str> {
        self.directives.keys().map(String::as_str)
    }

    pub fn widget_names(&self) -> impl Iterator<Item = &str> {
        self.widgets.keys().map(String::as_str)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("widgets", &self.widgets.keys().collect::<Vec<_>>())
            .field("directives", &self.directives.keys().collect::<Vec<_>>())
            .finish()
    }
}
