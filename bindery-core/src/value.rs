use std::fmt;

use thiserror::Error;

/// Declared type of a view-model property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Str,
    Bool,
    Float,
    /// A sequence of strings, such as the choices of an option menu.
    List,
}

/// A runtime value flowing between a model property and a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
    Float(f64),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot read {value:?} as {target}")]
pub struct CoerceError {
    pub value: Value,
    pub target: DataType,
}

impl DataType {
    /// The value a property of this type falls back to.
    pub fn zero(self) -> Value {
        match self {
            DataType::Int => Value::Int(0),
            DataType::Str => Value::Str(String::new()),
            DataType::Bool => Value::Bool(false),
            DataType::Float => Value::Float(0.0),
            DataType::List => Value::List(Vec::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Str => "str",
            DataType::Bool => "bool",
            DataType::Float => "float",
            DataType::List => "list",
        }
    }

    /// Accepts the short names used in model descriptions (`int`, `str`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Some(DataType::Int),
            "str" | "string" => Some(DataType::Str),
            "bool" | "boolean" => Some(DataType::Bool),
            "float" | "double" => Some(DataType::Float),
            "list" => Some(DataType::List),
            _ => None,
        }
    }

    /// Convert `value` into this type.
    ///
    /// Strings are parsed the way a toolkit variable would read them back:
    /// surrounding whitespace is ignored, booleans accept `1/0`, `true/false`,
    /// `yes/no` and `on/off`. Lists read strings as Tcl lists. Anything unparseable is an error; callers that
    /// must not fail substitute [`DataType::zero`].
    pub fn coerce(self, value: &Value) -> Result<Value, CoerceError> {
        let fail = || CoerceError {
            value: value.clone(),
            target: self,
        };
        match (self, value) {
            (DataType::Str, v) => Ok(Value::Str(v.to_string())),

            (DataType::Int, Value::Int(n)) => Ok(Value::Int(*n)),
            (DataType::Int, Value::Bool(b)) => Ok(Value::Int(i64::from(*b))),
            (DataType::Int, Value::Float(f)) => {
                if f.is_finite() {
                    Ok(Value::Int(f.trunc() as i64))
                } else {
                    Err(fail())
                }
            }
            (DataType::Int, Value::Str(s)) => s.trim().parse().map(Value::Int).map_err(|_| fail()),

            (DataType::Float, Value::Float(f)) => Ok(Value::Float(*f)),
            (DataType::Float, Value::Int(n)) => Ok(Value::Float(*n as f64)),
            (DataType::Float, Value::Bool(b)) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
            (DataType::Float, Value::Str(s)) => {
                s.trim().parse().map(Value::Float).map_err(|_| fail())
            }

            (DataType::Bool, Value::Bool(b)) => Ok(Value::Bool(*b)),
            (DataType::Bool, Value::Int(n)) => Ok(Value::Bool(*n != 0)),
            (DataType::Bool, Value::Float(f)) => Ok(Value::Bool(*f != 0.0)),
            (DataType::Bool, Value::Str(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(Value::Bool(true)),
                "0" | "false" | "no" | "off" => Ok(Value::Bool(false)),
                _ => Err(fail()),
            },

            (DataType::List, Value::List(items)) => Ok(Value::List(items.clone())),
            (DataType::List, Value::Str(s)) => parse_list(s).map(Value::List).ok_or_else(fail),
            (DataType::List, v) => Ok(Value::List(vec![v.to_string()])),

            (_, Value::List(_)) => Err(fail()),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Str(_) => DataType::Str,
            Value::Bool(_) => DataType::Bool,
            Value::Float(_) => DataType::Float,
            Value::List(_) => DataType::List,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            // Debug keeps the trailing `.0` so floats stay recognisable as floats.
            Value::Float(x) => write!(f, "{x:?}"),
            Value::List(items) => f.write_str(&format_list(items)),
        }
    }
}

/// Render `items` as a Tcl list: space separated, with items that are empty
/// or contain whitespace or braces wrapped in braces.
pub fn format_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| {
            if item.is_empty() || item.chars().any(|c| c.is_whitespace() || c == '{' || c == '}') {
                format!("{{{item}}}")
            } else {
                item.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a Tcl list. Braces group words and may nest; `None` when they do
/// not balance.
pub fn parse_list(s: &str) -> Option<Vec<String>> {
    let mut items = Vec::new();
    let mut chars = s.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(first) = chars.next() else {
            return Some(items);
        };
        let mut item = String::new();
        if first == '{' {
            let mut depth = 1;
            loop {
                let c = chars.next()?;
                match c {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                item.push(c);
            }
            if chars.peek().is_some_and(|c| !c.is_whitespace()) {
                return None;
            }
        } else if first == '}' {
            return None;
        } else {
            item.push(first);
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                item.push(c);
            }
        }
        items.push(item);
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::List(v)
    }
}

impl From<&[&str]> for Value {
    fn from(v: &[&str]) -> Self {
        Value::List(v.iter().map(|s| s.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_display_keeps_fraction() {
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
    }

    #[test]
    fn type_names_round_trip() {
        for t in [DataType::Int, DataType::Str, DataType::Bool, DataType::Float, DataType::List] {
            assert_eq!(DataType::from_name(t.name()), Some(t));
        }
        assert_eq!(DataType::from_name("tuple"), None);
    }

    #[test]
    fn lists_use_tcl_syntax() {
        let items = vec!["a".to_string(), "two words".to_string(), String::new()];
        let text = format_list(&items);
        assert_eq!(text, "a {two words} {}");
        assert_eq!(parse_list(&text), Some(items));
        assert_eq!(parse_list("  x {y {z}} "), Some(vec!["x".to_string(), "y {z}".to_string()]));
        assert_eq!(parse_list("{open"), None);
        assert_eq!(parse_list("{a}b"), None);
    }
}
