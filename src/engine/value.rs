/*!
Typed argument values.

  Value     - result of a command invocation
  Carrier   - shared handle on one Value, labelled `<module.Type@id>`
  ArgValue  - what the binder receives: raw text or a resolved carrier

A nested invocation's result travels to its parent as
`ArgValue::Resolved(carrier)`; plain command-line tokens stay
`ArgValue::Text`.
*/

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::data::Dataset;

/* ---- Value ---- */

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Nothing to pass on (e.g. the result was already written to a file).
    None,
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Json(serde_json::Value),
    Dataset(Dataset),
    /// Argument list echoed instead of executing (dry-run mode).
    DryRun(Vec<String>),
}

impl Value {
    /// Qualified type name used in carrier labels.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "toolbox.None",
            Value::Text(_) => "toolbox.Text",
            Value::Integer(_) => "toolbox.Integer",
            Value::Number(_) => "toolbox.Number",
            Value::Bool(_) => "toolbox.Bool",
            Value::Json(_) => "toolbox.Json",
            Value::Dataset(_) => "toolbox.data.Dataset",
            Value::DryRun(_) => "toolbox.DryRun",
        }
    }

    /// Short kind name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "nothing",
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Json(_) => "json",
            Value::Dataset(_) => "dataset",
            Value::DryRun(_) => "dry-run arguments",
        }
    }

    /// Text printed for a top-level result, if any.
    pub fn render(&self) -> Option<String> {
        match self {
            Value::None | Value::DryRun(_) => None,
            Value::Json(v) => {
                Some(serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()))
            }
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Text(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Json(v) => write!(f, "{v}"),
            Value::Dataset(ds) => write!(f, "{ds}"),
            Value::DryRun(args) => write!(f, "[ {} ]", args.join(" ")),
        }
    }
}

impl From<Dataset> for Value {
    fn from(ds: Dataset) -> Self {
        Value::Dataset(ds)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/* ---- Carrier ---- */

/// Opaque handle passing an in-memory result through the argument list.
///
/// `Carrier::wrap` on a carrier returns it as is, so there is never more
/// than one level of indirection.
#[derive(Debug, Clone)]
pub struct Carrier {
    label: String,
    object: Rc<Value>,
}

impl Carrier {
    pub fn wrap(object: impl Into<Carrier>) -> Carrier {
        object.into()
    }

    /// `<module.Type@id>`; a bare token with no whitespace or brackets.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn object(&self) -> &Value {
        &self.object
    }

    /// Same wrapped object.
    pub fn ptr_eq(&self, other: &Carrier) -> bool {
        Rc::ptr_eq(&self.object, &other.object)
    }

    /// Release the wrapped object, cloning only if another handle is alive.
    pub fn into_value(self) -> Value {
        Rc::try_unwrap(self.object).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl From<Value> for Carrier {
    fn from(value: Value) -> Self {
        let object = Rc::new(value);
        let label = format!("<{}@{}>", object.type_name(), Rc::as_ptr(&object) as usize);
        Carrier { label, object }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/* ---- ArgValue ---- */

/// One argument as seen by the binder.
#[derive(Debug, Clone)]
pub enum ArgValue {
    Text(String),
    Resolved(Carrier),
}

impl ArgValue {
    pub fn text(s: impl Into<String>) -> Self {
        ArgValue::Text(s.into())
    }

    pub fn resolved(object: impl Into<Carrier>) -> Self {
        ArgValue::Resolved(Carrier::wrap(object))
    }

    /// Form used in verbose / dry-run echo lines.
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            ArgValue::Text(s) => shell_words::quote(s),
            ArgValue::Resolved(c) => match c.object() {
                Value::DryRun(args) => Cow::Owned(format!("[ {} ]", args.join(" "))),
                _ => Cow::Borrowed(c.label()),
            },
        }
    }
}
