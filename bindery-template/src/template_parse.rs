use std::fs;
use std::path::Path;

use pest::Parser;
use pest::iterators::Pair;
use tracing::debug;

use crate::error::TemplateError;
use crate::template_ast::TemplateNode;

#[derive(pest_derive::Parser)]
#[grammar = "template.pest"]
struct TemplateParser;

/// Source formats a template can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    Xml,
    /// Experimental mapping format, see [`crate::yaml`].
    Yaml,
}

impl TemplateFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("xml") => Some(TemplateFormat::Xml),
            Some("yaml") | Some("yml") => Some(TemplateFormat::Yaml),
            _ => None,
        }
    }
}

pub fn parse_template(source: &str, format: TemplateFormat) -> Result<TemplateNode, TemplateError> {
    match format {
        TemplateFormat::Xml => parse_xml(source),
        TemplateFormat::Yaml => crate::yaml::parse_yaml(source),
    }
}

/// Read and parse a template file, choosing the format by extension.
pub fn load_template(path: &Path) -> Result<TemplateNode, TemplateError> {
    let format =
        TemplateFormat::from_path(path).ok_or_else(|| TemplateError::UnknownFormat(path.to_path_buf()))?;
    let source = fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), ?format, "loading template");
    parse_template(&source, format)
}

/// Parse an XML template into its root node.
pub fn parse_xml(source: &str) -> Result<TemplateNode, TemplateError> {
    let mut pairs =
        TemplateParser::parse(Rule::document, source).map_err(|e| TemplateError::Syntax(e.to_string()))?;
    let document = pairs.next().ok_or(TemplateError::Empty)?;

    // `document` holds exactly one `element` (prolog, comments and whitespace
    // are silent rules).
    let root = document
        .into_inner()
        .find(|p| p.as_rule() == Rule::element)
        .ok_or(TemplateError::Empty)?;
    build_element(root)
}

fn build_element(pair: Pair<'_, Rule>) -> Result<TemplateNode, TemplateError> {
    let mut inner = pair.into_inner();
    let tag = inner
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or(TemplateError::Empty)?;
    let mut node = TemplateNode::new(tag);
    let mut text = String::new();
    let mut seen_child = false;

    for part in inner {
        match part.as_rule() {
            Rule::attribute => {
                let mut kv = part.into_inner();
                let (Some(name), Some(value)) = (kv.next(), kv.next()) else {
                    continue;
                };
                let name = name.as_str().to_string();
                if node
                    .attrs
                    .insert(name.clone(), unescape(value.as_str()))
                    .is_some()
                {
                    return Err(TemplateError::DuplicateAttribute {
                        tag: node.tag.clone(),
                        name,
                    });
                }
            }
            Rule::element => {
                seen_child = true;
                node.children.push(build_element(part)?);
            }
            Rule::text if !seen_child => text.push_str(&unescape(part.as_str())),
            Rule::cdata if !seen_child => {
                if let Some(body) = part.into_inner().next() {
                    text.push_str(body.as_str());
                }
            }
            Rule::close_tag => {
                let found = part
                    .into_inner()
                    .next()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                if found != node.tag {
                    return Err(TemplateError::MismatchedTag {
                        expected: node.tag,
                        found,
                    });
                }
            }
            _ => {}
        }
    }

    if !text.is_empty() {
        node.text = Some(text);
    }
    Ok(node)
}

/// Resolve the predefined and numeric character references.
fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(semi) = rest.find(';') else { break };
        let entity = &rest[1..semi];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::unescape;

    #[test]
    fn unescape_entities() {
        assert_eq!(unescape("a &lt; b &amp;&amp; c"), "a < b && c");
        assert_eq!(unescape("&#65;&#x42;"), "AB");
        assert_eq!(unescape("fish & chips"), "fish & chips");
        assert_eq!(unescape("&bogus; x"), "&bogus; x");
    }
}
