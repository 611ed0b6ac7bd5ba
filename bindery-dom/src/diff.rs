use std::collections::BTreeMap;
use std::fmt;

use crate::VNode;

/// One difference between two snapshots, keyed by widget path.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Added(String),
    Removed(String),
    /// An option appeared, disappeared or changed value.
    Attr {
        key: String,
        attr: String,
        old: Option<String>,
        new: Option<String>,
    },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Added(key) => write!(f, "+ {key}"),
            Change::Removed(key) => write!(f, "- {key}"),
            Change::Attr { key, attr, old, new } => {
                let show = |v: &Option<String>| v.as_deref().map(|s| format!("{s:?}")).unwrap_or_else(|| "-".into());
                write!(f, "~ {key} {attr}: {} -> {}", show(old), show(new))
            }
        }
    }
}

fn index<'a>(node: &'a VNode, out: &mut BTreeMap<&'a str, &'a VNode>) {
    out.insert(&node.key, node);
    for c in &node.children {
        index(c, out);
    }
}

/// Per-widget differences between `old` and `new`, ordered by path.
pub fn changes(old: &VNode, new: &VNode) -> Vec<Change> {
    let mut a = BTreeMap::new();
    let mut b = BTreeMap::new();
    index(old, &mut a);
    index(new, &mut b);

    let mut out = Vec::new();
    for (key, before) in &a {
        match b.get(key) {
            None => out.push(Change::Removed(key.to_string())),
            Some(after) if before.tag != after.tag => {
                out.push(Change::Removed(key.to_string()));
                out.push(Change::Added(key.to_string()));
            }
            Some(after) => diff_props(key, before, after, &mut out),
        }
    }
    for key in b.keys() {
        if !a.contains_key(key) {
            out.push(Change::Added(key.to_string()));
        }
    }
    out
}

fn diff_props(key: &str, a: &VNode, b: &VNode, out: &mut Vec<Change>) {
    // Set new and changed
    for (k, v_new) in &b.props.attrs {
        let v_old = a.props.attrs.get(k);
        if v_old != Some(v_new) {
            out.push(Change::Attr {
                key: key.to_string(),
                attr: k.clone(),
                old: v_old.cloned(),
                new: Some(v_new.clone()),
            });
        }
    }
    // Remove missing
    for (k, v_old) in &a.props.attrs {
        if !b.props.attrs.contains_key(k) {
            out.push(Change::Attr {
                key: key.to_string(),
                attr: k.clone(),
                old: Some(v_old.clone()),
                new: None,
            });
        }
    }
}
