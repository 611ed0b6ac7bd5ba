use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use bindery_core::{Command, Value, Variable};
use thiserror::Error;

/// Handle to a widget owned by a toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub usize);

/// Layout options, already stripped of their engine prefix.
pub type Options = BTreeMap<String, String>;

/// The kind of edit a key validator is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Insert,
    Delete,
}

/// Accepts or rejects the text an edit would produce.
pub type Validator = Rc<dyn Fn(EditAction, &str) -> bool>;

/// One configuration option value.
#[derive(Clone)]
pub enum ConfigValue {
    Value(Value),
    /// The widget reads and writes this variable for the option.
    Variable(Variable),
    Command(Command),
    Validator(Validator),
    /// Clear the option.
    Unset,
}

impl ConfigValue {
    /// The value as the widget would display it.
    pub fn render(&self) -> Option<String> {
        match self {
            ConfigValue::Value(v) => Some(v.to_string()),
            ConfigValue::Variable(var) => Some(var.get().to_string()),
            ConfigValue::Command(_) => Some("<command>".to_string()),
            ConfigValue::Validator(_) => Some("<validator>".to_string()),
            ConfigValue::Unset => None,
        }
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            ConfigValue::Variable(var) => f.debug_tuple("Variable").field(var).finish(),
            ConfigValue::Command(_) => f.write_str("Command"),
            ConfigValue::Validator(_) => f.write_str("Validator"),
            ConfigValue::Unset => f.write_str("Unset"),
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(v: Value) -> Self {
        ConfigValue::Value(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Value(Value::from(v))
    }
}

impl From<Variable> for ConfigValue {
    fn from(v: Variable) -> Self {
        ConfigValue::Variable(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Pack,
    Grid,
    Place,
}

/// A geometry manager call with its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Geometry {
    Pack(Options),
    Grid(Options),
    Place(Options),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Pack(_) => GeometryKind::Pack,
            Geometry::Grid(_) => GeometryKind::Grid,
            Geometry::Place(_) => GeometryKind::Place,
        }
    }

    pub fn options(&self) -> &Options {
        match self {
            Geometry::Pack(o) | Geometry::Grid(o) | Geometry::Place(o) => o,
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("no widget with id {0:?}")]
    UnknownWidget(WidgetId),

    #[error("{parent} already has a child named \"{name}\"")]
    DuplicateName { parent: String, name: String },

    #[error("{path} is a {class}, not a {expected}")]
    WrongClass {
        path: String,
        class: String,
        expected: &'static str,
    },

    #[error("menu {menu} has no entry {index}")]
    NoSuchEntry { menu: String, index: usize },

    #[error("{path} cannot be geometry managed")]
    Unmanageable { path: String },

    #[error("grid option \"{option}\" is out of range: {value:?}")]
    GridIndex { option: String, value: String },
}

/// The imperative widget API bindings and inflation run against.
///
/// Widgets are identified by [`WidgetId`] and named by Tk-style paths
/// (`.`, `.frame`, `.frame.!label2`). Every method takes `&self`; widgets
/// call back into user code (commands, validators, variable traces), and
/// those callbacks are free to call the toolkit again.
pub trait Toolkit {
    /// Create a top-level window. The first one is the application root.
    fn create_window(&self) -> Result<WidgetId, ToolkitError>;

    fn set_title(&self, window: WidgetId, title: &str) -> Result<(), ToolkitError>;

    /// Create a widget of `class` under `parent`. Without a name the toolkit
    /// picks a unique one.
    fn create_widget(&self, class: &str, parent: WidgetId, name: Option<&str>) -> Result<WidgetId, ToolkitError>;

    fn class_name(&self, widget: WidgetId) -> Result<String, ToolkitError>;

    fn path_name(&self, widget: WidgetId) -> Result<String, ToolkitError>;

    fn is_window(&self, widget: WidgetId) -> bool;

    /// The window containing `widget` (itself for windows).
    fn toplevel(&self, widget: WidgetId) -> Result<WidgetId, ToolkitError>;

    fn configure(&self, widget: WidgetId, options: Vec<(String, ConfigValue)>) -> Result<(), ToolkitError>;

    /// The current value of `option`, if it was ever configured.
    fn cget(&self, widget: WidgetId, option: &str) -> Option<ConfigValue>;

    fn manage(&self, widget: WidgetId, geometry: Geometry) -> Result<(), ToolkitError>;

    fn geometry_manager(&self, widget: WidgetId) -> Option<GeometryKind>;

    fn children(&self, widget: WidgetId) -> Vec<WidgetId>;

    /// Columns and rows spanned by the grid-managed children of `container`.
    fn grid_size(&self, container: WidgetId) -> (usize, usize);

    fn column_configure(&self, container: WidgetId, column: usize, weight: u32) -> Result<(), ToolkitError>;

    /// Append a cascade entry opening `submenu`. Returns the entry index.
    fn menu_add_cascade(
        &self,
        menu: WidgetId,
        submenu: WidgetId,
        options: Vec<(String, ConfigValue)>,
    ) -> Result<usize, ToolkitError>;

    /// Append an entry of `kind` (`command`, `checkbutton`, `radiobutton`,
    /// `separator`). Returns the entry index.
    fn menu_add_item(&self, menu: WidgetId, kind: &str, options: Vec<(String, ConfigValue)>) -> Result<usize, ToolkitError>;

    fn menu_len(&self, menu: WidgetId) -> usize;

    /// Remove the entries from `first` to the end of the menu.
    fn menu_delete(&self, menu: WidgetId, first: usize) -> Result<(), ToolkitError>;

    fn menu_entry_configure(
        &self,
        menu: WidgetId,
        index: usize,
        options: Vec<(String, ConfigValue)>,
    ) -> Result<(), ToolkitError>;

    fn set_window_menu(&self, window: WidgetId, menu: WidgetId) -> Result<(), ToolkitError>;

    fn notebook_add(&self, notebook: WidgetId, page: WidgetId, options: Options) -> Result<(), ToolkitError>;

    /// Run the event loop until the application quits.
    fn main_loop(&self);

    /// Destroy `widget` and its descendants.
    fn destroy(&self, widget: WidgetId);
}
