//! An in-memory [`Toolkit`].
//!
//! Widgets live in an arena and are named the way Tk names them. User input
//! is simulated through [`HeadlessToolkit::type_text`], [`HeadlessToolkit::invoke`]
//! and friends, which run validators, variable writes and commands exactly
//! once each. No borrow of the arena is held while user code runs.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use bindery_core::{DataType, Value, Variable};
use tracing::{debug, trace};

use crate::layout::{self, grid_extent};
use crate::toolkit::{ConfigValue, EditAction, Geometry, GeometryKind, Options, Toolkit, ToolkitError, WidgetId};
use crate::{Props, VNode};

const ROOT_CLASS: &str = "Tk";
const TOPLEVEL_CLASS: &str = "Toplevel";

#[derive(Debug, Default)]
struct MenuEntry {
    kind: String,
    options: BTreeMap<String, ConfigValue>,
    submenu: Option<WidgetId>,
}

/// A read-only view of one menu entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntryInfo {
    pub kind: String,
    pub options: BTreeMap<String, String>,
    pub submenu: Option<WidgetId>,
}

impl MenuEntryInfo {
    pub fn label(&self) -> Option<&str> {
        self.options.get("label").map(String::as_str)
    }
}

#[derive(Debug, Default)]
struct Record {
    class: String,
    path: String,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    options: BTreeMap<String, ConfigValue>,
    geometry: Option<Geometry>,
    column_weights: BTreeMap<usize, u32>,
    entries: Vec<MenuEntry>,
    window_menu: Option<WidgetId>,
    pages: Vec<(WidgetId, Options)>,
    title: Option<String>,
    // Entry contents when no text variable is linked.
    buffer: String,
    auto_names: HashMap<String, usize>,
    destroyed: bool,
}

#[derive(Default)]
pub struct HeadlessToolkit {
    widgets: RefCell<Vec<Record>>,
    root: Cell<Option<WidgetId>>,
    main_loops: Cell<usize>,
}

impl HeadlessToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, id: WidgetId, f: impl FnOnce(&Record) -> R) -> Result<R, ToolkitError> {
        let widgets = self.widgets.borrow();
        match widgets.get(id.0) {
            Some(rec) if !rec.destroyed => Ok(f(rec)),
            _ => Err(ToolkitError::UnknownWidget(id)),
        }
    }

    fn with_mut<R>(&self, id: WidgetId, f: impl FnOnce(&mut Record) -> R) -> Result<R, ToolkitError> {
        let mut widgets = self.widgets.borrow_mut();
        match widgets.get_mut(id.0) {
            Some(rec) if !rec.destroyed => Ok(f(rec)),
            _ => Err(ToolkitError::UnknownWidget(id)),
        }
    }

    fn expect_class(&self, id: WidgetId, expected: &'static str) -> Result<(), ToolkitError> {
        let (class, path) = self.with(id, |r| (r.class.clone(), r.path.clone()))?;
        if class == expected {
            Ok(())
        } else {
            Err(ToolkitError::WrongClass { path, class, expected })
        }
    }

    fn push(&self, class: &str, parent: Option<WidgetId>, name: Option<&str>) -> Result<WidgetId, ToolkitError> {
        let mut widgets = self.widgets.borrow_mut();
        let id = WidgetId(widgets.len());
        let path = match parent {
            None => ".".to_string(),
            Some(p) => {
                let parent_rec = widgets
                    .get_mut(p.0)
                    .filter(|r| !r.destroyed)
                    .ok_or(ToolkitError::UnknownWidget(p))?;
                let name = match name {
                    Some(n) => n.to_string(),
                    None => {
                        let base = class.to_lowercase();
                        let n = parent_rec.auto_names.entry(base.clone()).or_insert(0);
                        *n += 1;
                        if *n == 1 { format!("!{base}") } else { format!("!{base}{n}") }
                    }
                };
                let path = if parent_rec.path == "." {
                    format!(".{name}")
                } else {
                    format!("{}.{name}", parent_rec.path)
                };
                let parent_path = parent_rec.path.clone();
                if widgets.iter().any(|r| !r.destroyed && r.path == path) {
                    return Err(ToolkitError::DuplicateName {
                        parent: parent_path,
                        name,
                    });
                }
                widgets[p.0].children.push(id);
                path
            }
        };
        trace!(%path, class, "create widget");
        widgets.push(Record {
            class: class.to_string(),
            path,
            parent,
            ..Record::default()
        });
        Ok(id)
    }

    /// Look a widget up by path.
    pub fn find(&self, path: &str) -> Option<WidgetId> {
        self.widgets
            .borrow()
            .iter()
            .position(|r| !r.destroyed && r.path == path)
            .map(WidgetId)
    }

    pub fn exists(&self, widget: WidgetId) -> bool {
        self.with(widget, |_| ()).is_ok()
    }

    pub fn config_value(&self, widget: WidgetId, option: &str) -> Option<ConfigValue> {
        self.with(widget, |r| r.options.get(option).cloned()).ok().flatten()
    }

    /// The variable linked to `option`, if any.
    pub fn variable(&self, widget: WidgetId, option: &str) -> Option<Variable> {
        match self.config_value(widget, option)? {
            ConfigValue::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// What the widget shows: its text variable, its typed contents, its
    /// `text` option or its value variable, in that order.
    pub fn displayed(&self, widget: WidgetId) -> Option<String> {
        if let Some(var) = self.variable(widget, "textvariable") {
            return Some(var.get().to_string());
        }
        let (class, buffer) = self.with(widget, |r| (r.class.clone(), r.buffer.clone())).ok()?;
        if class == "Entry" || class == "Spinbox" || class == "Combobox" {
            return Some(buffer);
        }
        if let Some(text) = self.config_value(widget, "text").and_then(|v| v.render()) {
            return Some(text);
        }
        self.variable(widget, "variable").map(|v| v.get().to_string())
    }

    fn current_text(&self, widget: WidgetId) -> Result<String, ToolkitError> {
        match self.variable(widget, "textvariable") {
            Some(var) => Ok(var.get().to_string()),
            None => self.with(widget, |r| r.buffer.clone()),
        }
    }

    fn validate(&self, widget: WidgetId, action: EditAction, proposed: &str) -> bool {
        let key_validation = matches!(
            self.config_value(widget, "validate"),
            Some(ConfigValue::Value(Value::Str(ref mode))) if mode == "key" || mode == "all"
        );
        if !key_validation {
            return true;
        }
        match self.config_value(widget, "validatecommand") {
            Some(ConfigValue::Validator(check)) => check(action, proposed),
            _ => true,
        }
    }

    fn store_text(&self, widget: WidgetId, text: String) -> Result<(), ToolkitError> {
        match self.variable(widget, "textvariable") {
            Some(var) => var.set(Value::Str(text)),
            None => self.with_mut(widget, |r| r.buffer = text)?,
        }
        Ok(())
    }

    /// Type `text` at the end of an entry. Returns whether the key validator
    /// accepted the edit.
    pub fn type_text(&self, widget: WidgetId, text: &str) -> Result<bool, ToolkitError> {
        let proposed = self.current_text(widget)? + text;
        if !self.validate(widget, EditAction::Insert, &proposed) {
            debug!(?widget, %proposed, "keystroke rejected");
            return Ok(false);
        }
        self.store_text(widget, proposed)?;
        Ok(true)
    }

    /// Delete `count` characters from the end of an entry.
    pub fn delete_text(&self, widget: WidgetId, count: usize) -> Result<bool, ToolkitError> {
        let current = self.current_text(widget)?;
        let keep = current.chars().count().saturating_sub(count);
        let proposed: String = current.chars().take(keep).collect();
        if !self.validate(widget, EditAction::Delete, &proposed) {
            return Ok(false);
        }
        self.store_text(widget, proposed)?;
        Ok(true)
    }

    /// Write a value into the variable linked to `option`, as the widget
    /// would when the user moves a scale or ticks a box.
    pub fn set_variable(&self, widget: WidgetId, option: &str, value: impl Into<Value>) -> Result<bool, ToolkitError> {
        self.with(widget, |_| ())?;
        match self.variable(widget, option) {
            Some(var) => {
                var.set(value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Click a button-like widget. Check buttons toggle their variable
    /// before the command runs.
    pub fn invoke(&self, widget: WidgetId) -> Result<bool, ToolkitError> {
        let class = self.class_name(widget)?;
        if class == "Checkbutton" {
            if let Some(var) = self.variable(widget, "variable") {
                let on = truthy(&var.get());
                var.set(Value::Bool(!on));
            }
        }
        match self.config_value(widget, "command") {
            Some(ConfigValue::Command(cmd)) => {
                cmd();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Click a menu entry. Check entries toggle their variable and radio
    /// entries store their value in it before the command runs.
    pub fn invoke_menu_entry(&self, menu: WidgetId, index: usize) -> Result<bool, ToolkitError> {
        let entry = self.with(menu, |r| {
            r.entries.get(index).map(|e| {
                let option = |name: &str| e.options.get(name).cloned();
                (e.kind.clone(), option("variable"), option("value"), option("command"))
            })
        })?;
        let Some((kind, variable, value, command)) = entry else {
            return Err(ToolkitError::NoSuchEntry {
                menu: self.path_name(menu)?,
                index,
            });
        };
        let mut acted = false;
        if let Some(ConfigValue::Variable(var)) = variable {
            match kind.as_str() {
                "checkbutton" => {
                    let on = truthy(&var.get());
                    var.set(Value::Bool(!on));
                    acted = true;
                }
                "radiobutton" => {
                    let chosen = match value {
                        Some(ConfigValue::Value(v)) => v,
                        _ => Value::Str(String::new()),
                    };
                    var.set(chosen);
                    acted = true;
                }
                _ => {}
            }
        }
        if let Some(ConfigValue::Command(cmd)) = command {
            cmd();
            acted = true;
        }
        Ok(acted)
    }

    pub fn geometry(&self, widget: WidgetId) -> Option<Geometry> {
        self.with(widget, |r| r.geometry.clone()).ok().flatten()
    }

    pub fn column_weight(&self, container: WidgetId, column: usize) -> Option<u32> {
        self.with(container, |r| r.column_weights.get(&column).copied())
            .ok()
            .flatten()
    }

    pub fn menu_entries(&self, menu: WidgetId) -> Vec<MenuEntryInfo> {
        self.with(menu, |r| {
            r.entries
                .iter()
                .map(|e| MenuEntryInfo {
                    kind: e.kind.clone(),
                    options: e
                        .options
                        .iter()
                        .filter_map(|(k, v)| v.render().map(|s| (k.clone(), s)))
                        .collect(),
                    submenu: e.submenu,
                })
                .collect()
        })
        .unwrap_or_default()
    }

    pub fn window_menu(&self, window: WidgetId) -> Option<WidgetId> {
        self.with(window, |r| r.window_menu).ok().flatten()
    }

    pub fn pages(&self, notebook: WidgetId) -> Vec<(WidgetId, Options)> {
        self.with(notebook, |r| r.pages.clone()).unwrap_or_default()
    }

    pub fn title(&self, window: WidgetId) -> Option<String> {
        self.with(window, |r| r.title.clone()).ok().flatten()
    }

    /// How many times the event loop was entered.
    pub fn main_loop_runs(&self) -> usize {
        self.main_loops.get()
    }

    /// Capture `widget` and its descendants.
    pub fn snapshot(&self, widget: WidgetId) -> Result<VNode, ToolkitError> {
        let (class, path, mut attrs, geometry, entries, children) = self.with(widget, |r| {
            let attrs: BTreeMap<String, String> = r
                .options
                .iter()
                .filter_map(|(k, v)| v.render().map(|s| (k.clone(), s)))
                .collect();
            let entries: Vec<(String, BTreeMap<String, String>)> = r
                .entries
                .iter()
                .map(|e| {
                    (
                        e.kind.clone(),
                        e.options
                            .iter()
                            .filter_map(|(k, v)| v.render().map(|s| (k.clone(), s)))
                            .collect(),
                    )
                })
                .collect();
            (
                r.class.clone(),
                r.path.clone(),
                attrs,
                r.geometry.clone(),
                entries,
                r.children.clone(),
            )
        })?;

        if let Some(geometry) = geometry {
            let prefix = match geometry.kind() {
                GeometryKind::Pack => "pack",
                GeometryKind::Grid => "grid",
                GeometryKind::Place => "place",
            };
            attrs.insert("manager".to_string(), prefix.to_string());
            for (k, v) in geometry.options() {
                attrs.insert(format!("{prefix}-{k}"), v.clone());
            }
        }
        if let Some(text) = self.displayed(widget) {
            attrs.entry("text".to_string()).or_insert(text);
        }

        let mut nodes = Vec::new();
        for (i, (kind, options)) in entries.into_iter().enumerate() {
            nodes.push(VNode {
                tag: kind,
                key: format!("{path}#{i}"),
                props: Props { attrs: options },
                children: Vec::new(),
            });
        }
        for child in children {
            if self.exists(child) {
                nodes.push(self.snapshot(child)?);
            }
        }
        Ok(VNode {
            tag: class,
            key: path,
            props: Props { attrs },
            children: nodes,
        })
    }
}

fn truthy(value: &Value) -> bool {
    DataType::Bool
        .coerce(value)
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn merge(target: &mut BTreeMap<String, ConfigValue>, options: Vec<(String, ConfigValue)>) {
    for (k, v) in options {
        match v {
            ConfigValue::Unset => {
                target.remove(&k);
            }
            v => {
                target.insert(k, v);
            }
        }
    }
}

impl Toolkit for HeadlessToolkit {
    fn create_window(&self) -> Result<WidgetId, ToolkitError> {
        let root = self.root.get().filter(|r| self.exists(*r));
        let id = match root {
            None => {
                let id = self.push(ROOT_CLASS, None, None)?;
                self.root.set(Some(id));
                id
            }
            Some(root) => self.push(TOPLEVEL_CLASS, Some(root), None)?,
        };
        debug!(?id, "window created");
        Ok(id)
    }

    fn set_title(&self, window: WidgetId, title: &str) -> Result<(), ToolkitError> {
        self.with_mut(window, |r| r.title = Some(title.to_string()))
    }

    fn create_widget(&self, class: &str, parent: WidgetId, name: Option<&str>) -> Result<WidgetId, ToolkitError> {
        self.push(class, Some(parent), name)
    }

    fn class_name(&self, widget: WidgetId) -> Result<String, ToolkitError> {
        self.with(widget, |r| r.class.clone())
    }

    fn path_name(&self, widget: WidgetId) -> Result<String, ToolkitError> {
        self.with(widget, |r| r.path.clone())
    }

    fn is_window(&self, widget: WidgetId) -> bool {
        self.with(widget, |r| r.class == ROOT_CLASS || r.class == TOPLEVEL_CLASS)
            .unwrap_or(false)
    }

    fn toplevel(&self, widget: WidgetId) -> Result<WidgetId, ToolkitError> {
        let mut current = widget;
        loop {
            if self.is_window(current) {
                return Ok(current);
            }
            match self.with(current, |r| r.parent)? {
                Some(parent) => current = parent,
                None => return Ok(current),
            }
        }
    }

    fn configure(&self, widget: WidgetId, options: Vec<(String, ConfigValue)>) -> Result<(), ToolkitError> {
        trace!(?widget, count = options.len(), "configure");
        self.with_mut(widget, |r| merge(&mut r.options, options))
    }

    fn cget(&self, widget: WidgetId, option: &str) -> Option<ConfigValue> {
        self.config_value(widget, option)
    }

    fn manage(&self, widget: WidgetId, geometry: Geometry) -> Result<(), ToolkitError> {
        let (class, path) = self.with(widget, |r| (r.class.clone(), r.path.clone()))?;
        if class == "Menu" || class == ROOT_CLASS || class == TOPLEVEL_CLASS {
            return Err(ToolkitError::Unmanageable { path });
        }
        if let Geometry::Grid(options) = &geometry {
            layout::Cell::from_options(options)?;
        }
        self.with_mut(widget, |r| r.geometry = Some(geometry))
    }

    fn geometry_manager(&self, widget: WidgetId) -> Option<GeometryKind> {
        self.geometry(widget).map(|g| g.kind())
    }

    fn children(&self, widget: WidgetId) -> Vec<WidgetId> {
        let widgets = self.widgets.borrow();
        widgets
            .get(widget.0)
            .map(|r| {
                r.children
                    .iter()
                    .copied()
                    .filter(|c| !widgets[c.0].destroyed)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn grid_size(&self, container: WidgetId) -> (usize, usize) {
        let cells: Vec<Options> = self
            .children(container)
            .into_iter()
            .filter_map(|c| match self.geometry(c) {
                Some(Geometry::Grid(options)) => Some(options),
                _ => None,
            })
            .collect();
        grid_extent(&cells)
    }

    fn column_configure(&self, container: WidgetId, column: usize, weight: u32) -> Result<(), ToolkitError> {
        self.with_mut(container, |r| {
            r.column_weights.insert(column, weight);
        })
    }

    fn menu_add_cascade(
        &self,
        menu: WidgetId,
        submenu: WidgetId,
        options: Vec<(String, ConfigValue)>,
    ) -> Result<usize, ToolkitError> {
        self.expect_class(menu, "Menu")?;
        self.expect_class(submenu, "Menu")?;
        self.with_mut(menu, |r| {
            let mut entry = MenuEntry {
                kind: "cascade".to_string(),
                submenu: Some(submenu),
                ..MenuEntry::default()
            };
            merge(&mut entry.options, options);
            r.entries.push(entry);
            r.entries.len() - 1
        })
    }

    fn menu_add_item(&self, menu: WidgetId, kind: &str, options: Vec<(String, ConfigValue)>) -> Result<usize, ToolkitError> {
        self.expect_class(menu, "Menu")?;
        self.with_mut(menu, |r| {
            let mut entry = MenuEntry {
                kind: kind.to_string(),
                ..MenuEntry::default()
            };
            merge(&mut entry.options, options);
            r.entries.push(entry);
            r.entries.len() - 1
        })
    }

    fn menu_len(&self, menu: WidgetId) -> usize {
        self.with(menu, |r| r.entries.len()).unwrap_or(0)
    }

    fn menu_delete(&self, menu: WidgetId, first: usize) -> Result<(), ToolkitError> {
        self.expect_class(menu, "Menu")?;
        self.with_mut(menu, |r| r.entries.truncate(first))
    }

    fn menu_entry_configure(
        &self,
        menu: WidgetId,
        index: usize,
        options: Vec<(String, ConfigValue)>,
    ) -> Result<(), ToolkitError> {
        let found = self.with_mut(menu, |r| match r.entries.get_mut(index) {
            Some(entry) => {
                merge(&mut entry.options, options);
                true
            }
            None => false,
        })?;
        if found {
            Ok(())
        } else {
            Err(ToolkitError::NoSuchEntry {
                menu: self.path_name(menu)?,
                index,
            })
        }
    }

    fn set_window_menu(&self, window: WidgetId, menu: WidgetId) -> Result<(), ToolkitError> {
        self.expect_class(menu, "Menu")?;
        if !self.is_window(window) {
            let (class, path) = self.with(window, |r| (r.class.clone(), r.path.clone()))?;
            return Err(ToolkitError::WrongClass {
                path,
                class,
                expected: "window",
            });
        }
        self.with_mut(window, |r| r.window_menu = Some(menu))
    }

    fn notebook_add(&self, notebook: WidgetId, page: WidgetId, options: Options) -> Result<(), ToolkitError> {
        self.expect_class(notebook, "Notebook")?;
        self.with(page, |_| ())?;
        self.with_mut(notebook, |r| r.pages.push((page, options)))
    }

    fn main_loop(&self) {
        self.main_loops.set(self.main_loops.get() + 1);
        debug!("main loop entered (headless: returns immediately)");
    }

    fn destroy(&self, widget: WidgetId) {
        let mut stack = vec![widget];
        let mut widgets = self.widgets.borrow_mut();
        while let Some(id) = stack.pop() {
            if let Some(rec) = widgets.get_mut(id.0) {
                rec.destroyed = true;
                // Drop linked variables and commands with the widget.
                rec.options.clear();
                rec.entries.clear();
                stack.extend(rec.children.iter().copied());
            }
        }
    }
}
