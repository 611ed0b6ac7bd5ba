//! The widget toolkit seam.
//!
//! [`Toolkit`] is the imperative widget API bindings and inflation drive;
//! [`HeadlessToolkit`] implements it in memory. A live widget tree can be
//! captured as a [`VNode`] snapshot and two snapshots compared with
//! [`diff::changes`].

use std::collections::BTreeMap;

pub mod diff;
pub mod headless;
pub mod layout;
pub mod toolkit;

pub use headless::{HeadlessToolkit, MenuEntryInfo};
pub use toolkit::{ConfigValue, EditAction, Geometry, GeometryKind, Options, Toolkit, ToolkitError, Validator, WidgetId};

/// A snapshot of one widget: its class, its path, its rendered options and
/// its children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VNode {
    pub tag: String,
    pub key: String,
    pub props: Props,
    pub children: Vec<VNode>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    pub attrs: BTreeMap<String, String>,
}

impl Props {
    pub fn new() -> Self {
        Self {
            attrs: BTreeMap::new(),
        }
    }
    pub fn set(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.attrs.insert(k.into(), v.into());
        self
    }
    pub fn get(&self, k: &str) -> Option<&str> {
        self.attrs.get(k).map(String::as_str)
    }
}

// Allow concise props creation
impl From<()> for Props {
    fn from(_: ()) -> Self {
        Props::default()
    }
}
impl From<Vec<(&str, &str)>> for Props {
    fn from(v: Vec<(&str, &str)>) -> Self {
        let mut p = Props::new();
        for (k, v) in v {
            p.attrs.insert(k.to_string(), v.to_string());
        }
        p
    }
}

/// Build a snapshot node by hand, mostly for tests.
pub fn h(tag: impl Into<String>, key: impl Into<String>, props: impl Into<Props>, children: Vec<VNode>) -> VNode {
    VNode {
        tag: tag.into(),
        key: key.into(),
        props: props.into(),
        children,
    }
}

impl VNode {
    /// Depth-first search by path.
    pub fn find(&self, key: &str) -> Option<&VNode> {
        if self.key == key {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(key))
    }

    /// Indented one-line-per-widget rendering.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.tag);
        out.push(' ');
        out.push_str(&self.key);
        for (k, v) in &self.props.attrs {
            out.push_str(&format!(" {k}={v:?}"));
        }
        out.push('\n');
        for c in &self.children {
            c.render_into(out, depth + 1);
        }
    }
}
