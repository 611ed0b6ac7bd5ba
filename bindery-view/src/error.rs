use bindery_core::ModelError;
use bindery_dom::ToolkitError;
use bindery_template::TemplateError;
use thiserror::Error;

use crate::registry::RegistryError;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("no widget class or directive named \"{0}\"")]
    NotFound(String),

    #[error("handler \"{name}\" not found (searched {searched})")]
    HandlerNotFound { name: String, searched: String },

    #[error("{directive} has no view model to bind or select from")]
    NoModel { directive: String },

    #[error("{0} has no root widget yet")]
    Unmounted(String),

    #[error("component {0} has no template")]
    MissingTemplate(String),

    #[error("malformed binding expression {value:?} on \"{attribute}\"")]
    InvalidBindingExpr { attribute: String, value: String },

    #[error("invalid value {value:?} for option \"{option}\"")]
    InvalidOption { option: String, value: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Toolkit(#[from] ToolkitError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
