//! Experimental mapping-based template format.
//!
//! Each element is a single-entry mapping from tag to body:
//!
//! ```yaml
//! Frame:
//!   pack-fill: both
//!   children:
//!     - Label:
//!         text: "[title]"
//!     - Button: Press me
//! ```
//!
//! A body is either a mapping of attributes (with the reserved keys
//! `children` and `text`), a scalar used as the element text, or empty.

use serde_yaml::{Mapping, Value};

use crate::error::TemplateError;
use crate::template_ast::TemplateNode;

pub fn parse_yaml(source: &str) -> Result<TemplateNode, TemplateError> {
    if source.trim().is_empty() {
        return Err(TemplateError::Empty);
    }
    let doc: Value = serde_yaml::from_str(source)?;
    if doc.is_null() {
        return Err(TemplateError::Empty);
    }
    node_from_entry(&doc)
}

fn node_from_entry(entry: &Value) -> Result<TemplateNode, TemplateError> {
    let map = entry
        .as_mapping()
        .ok_or_else(|| TemplateError::Shape(format!("expected a single-entry mapping, got {entry:?}")))?;
    if map.len() != 1 {
        return Err(TemplateError::Shape(format!(
            "an element needs exactly one tag, found {}",
            map.len()
        )));
    }
    let Some((tag, body)) = map.iter().next() else {
        return Err(TemplateError::Empty);
    };
    let tag = tag
        .as_str()
        .ok_or_else(|| TemplateError::Shape(format!("tag must be a string, got {tag:?}")))?;

    let mut node = TemplateNode::new(tag);
    match body {
        Value::Null => {}
        Value::Mapping(attrs) => fill_from_mapping(&mut node, attrs)?,
        scalar => node.text = Some(scalar_to_string(scalar)?),
    }
    Ok(node)
}

fn fill_from_mapping(node: &mut TemplateNode, attrs: &Mapping) -> Result<(), TemplateError> {
    for (key, value) in attrs {
        let key = key
            .as_str()
            .ok_or_else(|| TemplateError::Shape(format!("attribute name must be a string, got {key:?}")))?;
        match key {
            "children" => {
                let children = value
                    .as_sequence()
                    .ok_or_else(|| TemplateError::Shape("children must be a list".to_string()))?;
                for child in children {
                    node.children.push(node_from_entry(child)?);
                }
            }
            "text" => node.text = Some(scalar_to_string(value)?),
            _ => {
                node.attrs.insert(key.to_string(), scalar_to_string(value)?);
            }
        }
    }
    Ok(())
}

fn scalar_to_string(value: &Value) -> Result<String, TemplateError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(TemplateError::Shape(format!("expected a scalar, got {other:?}"))),
    }
}
