/*!
coerce.rs - turn an argument into the value a parameter expects.

  carrier  -> unwrap; a carried Text is treated like a literal, anything
              else passes through untouched
  literal  -> kind-specific conversion:
                Text     as is
                Integer  / Number / Boolean  parsed (failure = binding error)
                Dataset  path loaded as a dataset (failure = coercion error)
                Json     path loaded as JSON/YAML (failure = coercion error)

A value of the wrong kind after unwrapping is a binding error.
*/

use crate::cmd::binder::{Param, ParamKind};
use crate::data::{self, DataError};
use crate::engine::{ArgValue, Value};
use crate::error::ToolboxError;

/// Apply `convert` to text, pass any other carried object through.
pub fn maybe_coerce_with<E>(
    arg: ArgValue,
    convert: impl FnOnce(&str) -> Result<Value, E>,
) -> Result<Value, E> {
    match arg {
        ArgValue::Text(s) => convert(&s),
        ArgValue::Resolved(carrier) => match carrier.into_value() {
            Value::Text(s) => convert(&s),
            other => Ok(other),
        },
    }
}

/// Accepted boolean spellings (case-insensitive).
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn parse_primitive(kind: ParamKind, raw: &str) -> Option<Value> {
    match kind {
        ParamKind::Text => Some(Value::Text(raw.to_string())),
        ParamKind::Integer => raw.trim().parse::<i64>().ok().map(Value::Integer),
        ParamKind::Number => raw.trim().parse::<f64>().ok().map(Value::Number),
        ParamKind::Boolean => parse_bool(raw).map(Value::Bool),
        ParamKind::Dataset | ParamKind::Json => None,
    }
}

fn load(kind: ParamKind, path: &str) -> Result<Value, DataError> {
    match kind {
        ParamKind::Json => data::load_json(path).map(Value::Json),
        _ => data::load_dataset(path).map(Value::Dataset),
    }
}

fn accepts(kind: ParamKind, value: &Value) -> bool {
    matches!(
        (kind, value),
        (ParamKind::Text, Value::Text(_))
            | (ParamKind::Integer, Value::Integer(_))
            | (ParamKind::Number, Value::Number(_) | Value::Integer(_))
            | (ParamKind::Boolean, Value::Bool(_))
            | (ParamKind::Dataset, Value::Dataset(_))
            | (ParamKind::Json, Value::Json(_))
    )
}

/// Coerce one argument for `param` at 1-based `position` (0 for defaults).
pub fn coerce(
    command: &str,
    param: &Param,
    position: usize,
    arg: ArgValue,
) -> Result<Value, ToolboxError> {
    let kind = param.kind;
    let value = maybe_coerce_with(arg, |raw| match kind {
        ParamKind::Dataset | ParamKind::Json => {
            load(kind, raw).map_err(|source| ToolboxError::Coercion {
                command: command.to_string(),
                param: param.name.to_string(),
                position,
                source,
            })
        }
        _ => parse_primitive(kind, raw).ok_or_else(|| {
            ToolboxError::binding(
                command,
                format!(
                    "argument {position} ({}): expected {}, got '{raw}'",
                    param.name,
                    kind.metavar()
                ),
            )
        }),
    })?;

    if !accepts(kind, &value) {
        return Err(ToolboxError::binding(
            command,
            format!(
                "argument {position} ({}): expected {}, got {}",
                param.name,
                kind.metavar(),
                value.kind()
            ),
        ));
    }
    Ok(match (kind, value) {
        (ParamKind::Number, Value::Integer(n)) => Value::Number(n as f64),
        (_, v) => v,
    })
}
