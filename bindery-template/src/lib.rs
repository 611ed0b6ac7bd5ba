//! Template sources for bindery views.
//!
//! Parses XML (and an experimental YAML mapping format) into a
//! [`TemplateNode`] tree, and defines the attribute mini-language used by
//! inflation: binding expressions, layout prefixes and model selectors.

pub mod error;
pub mod expr;
pub mod template_ast;
pub mod template_parse;
pub mod yaml;

pub use error::TemplateError;
pub use expr::{
    AttrTarget, BindingExpr, LayoutEngine, MODEL_ATTR, NAME_ATTR, classify_key, is_binding_expr, is_command_key,
    model_selector, parse_binding_expr,
};
pub use template_ast::TemplateNode;
pub use template_parse::{TemplateFormat, load_template, parse_template, parse_xml};
pub use yaml::parse_yaml;
