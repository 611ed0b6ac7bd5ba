use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("malformed XML template: {0}")]
    Syntax(String),

    #[error("closing tag </{found}> does not match <{expected}>")]
    MismatchedTag { expected: String, found: String },

    #[error("attribute \"{name}\" repeated on <{tag}>")]
    DuplicateAttribute { tag: String, name: String },

    #[error("malformed YAML template: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unexpected YAML template shape: {0}")]
    Shape(String),

    #[error("template has no root element")]
    Empty,

    #[error("unknown template format for {0}")]
    UnknownFormat(PathBuf),

    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
