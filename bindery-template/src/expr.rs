//! The attribute mini-language of templates.
//!
//! Keys decide where an attribute goes (widget configuration, a layout engine,
//! or the directive's own options); values decide how it is resolved (literal,
//! handler name, or binding expression).

/// Registers the widget under this name in the owning directive.
pub const NAME_ATTR: &str = "name";
/// Selects a nested view model for a structural directive.
pub const MODEL_ATTR: &str = "view-model";

/// A parsed `[prop]`, `(prop)`, `[(prop)]` or `([prop])` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingExpr {
    pub property: String,
    pub to_view: bool,
    pub to_model: bool,
}

fn wrapped(value: &str, open: char, close: char) -> Option<&str> {
    value.strip_prefix(open)?.strip_suffix(close)
}

/// Whether `value` is syntactically a binding expression.
pub fn is_binding_expr(value: &str) -> bool {
    wrapped(value, '[', ']').is_some() || wrapped(value, '(', ')').is_some()
}

/// Parse a binding expression. Square brackets bind to the view, round
/// brackets bind to the model; nesting one inside the other binds both ways.
/// Returns `None` for anything else, including an empty property name.
pub fn parse_binding_expr(value: &str) -> Option<BindingExpr> {
    let mut rest = value;
    let mut to_view = false;
    let mut to_model = false;
    loop {
        if !to_view {
            if let Some(inner) = wrapped(rest, '[', ']') {
                to_view = true;
                rest = inner;
                continue;
            }
        }
        if !to_model {
            if let Some(inner) = wrapped(rest, '(', ')') {
                to_model = true;
                rest = inner;
                continue;
            }
        }
        break;
    }

    let property = rest.trim();
    let valid = !property.is_empty()
        && property
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_');
    if (to_view || to_model) && valid {
        Some(BindingExpr {
            property: property.to_string(),
            to_view,
            to_model,
        })
    } else {
        None
    }
}

/// The sub-model name inside a model selector: `(child)`, `[child]` or `child`.
pub fn model_selector(value: &str) -> &str {
    wrapped(value, '(', ')')
        .or_else(|| wrapped(value, '[', ']'))
        .unwrap_or(value)
        .trim()
}

/// Whether the attribute names an event handler.
pub fn is_command_key(key: &str) -> bool {
    key.contains("command")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutEngine {
    Pack,
    Grid,
    Place,
}

impl LayoutEngine {
    /// Engines in the order they win when a widget names more than one.
    pub const PRECEDENCE: [LayoutEngine; 3] = [LayoutEngine::Grid, LayoutEngine::Place, LayoutEngine::Pack];

    pub fn prefix(self) -> &'static str {
        match self {
            LayoutEngine::Pack => "pack-",
            LayoutEngine::Grid => "grid-",
            LayoutEngine::Place => "place-",
        }
    }
}

/// Where an attribute is routed, decided by its key alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrTarget {
    /// Plain widget configuration (no dash in the key).
    Config,
    /// A layout option, prefix stripped.
    Layout(LayoutEngine, String),
    /// Any other dashed key: an option of the directive itself.
    Custom,
}

pub fn classify_key(key: &str) -> AttrTarget {
    for engine in LayoutEngine::PRECEDENCE {
        if let Some(option) = key.strip_prefix(engine.prefix()) {
            return AttrTarget::Layout(engine, option.to_string());
        }
    }
    if key.contains('-') {
        AttrTarget::Custom
    } else {
        AttrTarget::Config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_strips_one_pair_of_brackets() {
        assert_eq!(model_selector("(component_model)"), "component_model");
        assert_eq!(model_selector("[inner]"), "inner");
        assert_eq!(model_selector("bare"), "bare");
    }
}
