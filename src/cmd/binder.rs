/*!
binder.rs - declarative parameter binding on top of clap.

Each command declares a static `Signature`. `command_for` turns it into a
`clap::Command` once, when the registry is built:

  positional   NAME / [NAME] / NAME...
  option       --name=value | --name value
  flag         --name | --name=yes|no
  `--`         ends option parsing

`_` and `-` are interchangeable in option names. `bind` parses one
invocation with that command. Carried objects cannot travel through clap as
text, so each one is sent as a slot reference (`\0<slot>`, which no OS
argument can contain) and swapped back after parsing. Every matched value
goes through the coercion adapter (`coerce.rs`); defaults are coerced like
literal text.
*/

use std::collections::{HashMap, HashSet};

use anyhow::{Result, anyhow};
use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use super::{CommandDefinition, coerce};
use crate::data::Dataset;
use crate::engine::output::{self, Destinations};
use crate::engine::{ArgValue, Carrier, Value};
use crate::error::ToolboxError;

/// Names the binder or finalizer handles itself.
pub const RESERVED_NAMES: &[&str] = &["help", "output", "intermediate-output"];

const CARRIER_SLOT: char = '\0';

/* ---- Signature ---- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Text,
    Integer,
    Number,
    Boolean,
    Dataset,
    Json,
}

impl ParamKind {
    pub fn metavar(&self) -> &'static str {
        match self {
            ParamKind::Text => "TEXT",
            ParamKind::Integer => "INT",
            ParamKind::Number => "NUMBER",
            ParamKind::Boolean => "BOOL",
            ParamKind::Dataset => "DATASET",
            ParamKind::Json => "JSON",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    Required,
    Optional,
    /// One or more positional values; last positional.
    Variadic,
    Option,
    Flag,
}

impl ParamMode {
    pub fn is_positional(&self) -> bool {
        matches!(self, ParamMode::Required | ParamMode::Optional | ParamMode::Variadic)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub mode: ParamMode,
    pub default: Option<&'static str>,
    pub help: &'static str,
}

impl Param {
    pub const fn required(name: &'static str, kind: ParamKind, help: &'static str) -> Self {
        Self {
            name,
            kind,
            mode: ParamMode::Required,
            default: None,
            help,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, help: &'static str) -> Self {
        Self {
            name,
            kind,
            mode: ParamMode::Optional,
            default: None,
            help,
        }
    }

    pub const fn variadic(name: &'static str, kind: ParamKind, help: &'static str) -> Self {
        Self {
            name,
            kind,
            mode: ParamMode::Variadic,
            default: None,
            help,
        }
    }

    pub const fn option(name: &'static str, kind: ParamKind, help: &'static str) -> Self {
        Self {
            name,
            kind,
            mode: ParamMode::Option,
            default: None,
            help,
        }
    }

    pub const fn flag(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Boolean,
            mode: ParamMode::Flag,
            default: None,
            help,
        }
    }

    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub params: &'static [Param],
}

impl Signature {
    pub const fn new(params: &'static [Param]) -> Self {
        Self {
            params,
        }
    }

    pub fn positionals(self) -> impl Iterator<Item = &'static Param> {
        self.params.iter().filter(|p| p.mode.is_positional())
    }

    /// Structural checks run once when the registry is built.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for p in self.params {
            if !seen.insert(p.name) {
                return Err(format!("parameter '{}' declared twice", p.name));
            }
            if RESERVED_NAMES.contains(&p.name) {
                return Err(format!("parameter name '{}' is reserved", p.name));
            }
            if p.mode == ParamMode::Flag && p.kind != ParamKind::Boolean {
                return Err(format!("flag '{}' must be boolean", p.name));
            }
        }
        let mut after_optional = false;
        let mut after_variadic = false;
        for p in self.positionals() {
            if after_variadic {
                return Err(format!("positional '{}' follows a variadic parameter", p.name));
            }
            match p.mode {
                ParamMode::Required if after_optional => {
                    return Err(format!("required '{}' follows an optional parameter", p.name));
                }
                ParamMode::Optional => after_optional = true,
                ParamMode::Variadic if after_optional => {
                    return Err(format!("variadic '{}' follows an optional parameter", p.name));
                }
                ParamMode::Variadic => after_variadic = true,
                _ => {}
            }
        }
        Ok(())
    }
}

/* ---- clap Commands ---- */

/// `--name`, also accepted with `_` in place of `-`.
pub(crate) fn long_arg(name: &'static str) -> Arg {
    let arg = Arg::new(name).long(name);
    if name.contains('-') {
        arg.alias(name.replace('-', "_"))
    } else {
        arg
    }
}

impl Param {
    fn to_arg(&self) -> Arg {
        let arg = match self.mode {
            ParamMode::Required | ParamMode::Optional | ParamMode::Variadic => {
                Arg::new(self.name)
                    .value_name(self.name.to_uppercase().replace('-', "_"))
                    .required(self.mode != ParamMode::Optional && self.default.is_none())
                    .allow_negative_numbers(true)
            }
            ParamMode::Option => long_arg(self.name)
                .value_name(self.kind.metavar())
                .allow_hyphen_values(true),
            ParamMode::Flag => long_arg(self.name)
                .value_name(self.kind.metavar())
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true"),
        };
        let arg = match self.mode {
            ParamMode::Variadic => arg.num_args(1..).action(ArgAction::Append),
            _ => arg.action(ArgAction::Set),
        };
        let arg = arg.help(self.help);
        match self.default {
            Some(default) => arg.default_value(default),
            None => arg,
        }
    }
}

/// The clap command for `def`, output options included.
pub fn command_for(def: &CommandDefinition) -> Command {
    Command::new(def.name)
        .about(def.summary)
        .long_about(def.description)
        .disable_version_flag(true)
        .args(def.signature.params.iter().map(Param::to_arg))
        .args(output::destination_args(def.output))
}

/* ---- Bound Arguments ---- */

/// Coerced values keyed by parameter name, handed to a command handler.
#[derive(Debug, Default)]
pub struct BoundArgs {
    values: HashMap<&'static str, Vec<Value>>,
}

impl BoundArgs {
    fn insert(&mut self, name: &'static str, value: Value) {
        self.values.entry(name).or_default().push(value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Remove and return all values bound to `name`.
    pub fn take_all(&mut self, name: &str) -> Vec<Value> {
        self.values.remove(name).unwrap_or_default()
    }

    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.take_all(name).into_iter().next()
    }

    pub fn dataset(&mut self, name: &str) -> Result<Dataset> {
        match self.take(name) {
            Some(Value::Dataset(ds)) => Ok(ds),
            Some(other) => Err(anyhow!("'{name}' is {}, not a dataset", other.kind())),
            None => Err(anyhow!("missing dataset '{name}'")),
        }
    }

    pub fn datasets(&mut self, name: &str) -> Result<Vec<Dataset>> {
        self.take_all(name)
            .into_iter()
            .map(|v| match v {
                Value::Dataset(ds) => Ok(ds),
                other => Err(anyhow!("'{name}' contains {}, not a dataset", other.kind())),
            })
            .collect()
    }

    pub fn json(&mut self, name: &str) -> Result<Option<serde_json::Value>> {
        match self.take(name) {
            Some(Value::Json(v)) => Ok(Some(v)),
            Some(other) => Err(anyhow!("'{name}' is {}, not json", other.kind())),
            None => Ok(None),
        }
    }

    pub fn text(&mut self, name: &str) -> Option<String> {
        match self.take(name) {
            Some(Value::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn number(&mut self, name: &str) -> Result<f64> {
        match self.take(name) {
            Some(Value::Number(n)) => Ok(n),
            Some(Value::Integer(n)) => Ok(n as f64),
            Some(other) => Err(anyhow!("'{name}' is {}, not a number", other.kind())),
            None => Err(anyhow!("missing number '{name}'")),
        }
    }

    pub fn integer(&mut self, name: &str) -> Result<i64> {
        match self.take(name) {
            Some(Value::Integer(n)) => Ok(n),
            Some(other) => Err(anyhow!("'{name}' is {}, not an integer", other.kind())),
            None => Err(anyhow!("missing integer '{name}'")),
        }
    }

    pub fn flag(&mut self, name: &str) -> bool {
        matches!(self.take(name), Some(Value::Bool(true)))
    }
}

/* ---- Binding ---- */

/// Outcome of binding one invocation.
#[derive(Debug)]
pub enum Binding {
    Args {
        args: BoundArgs,
        destinations: Destinations,
    },
    /// `--help` was given; the rendered help text.
    Help(String),
}

/// Bind `args` for `def` using its registry-built `parser`, coercing every
/// value.
pub fn bind(
    progname: &str,
    def: &CommandDefinition,
    parser: &Command,
    args: Vec<ArgValue>,
) -> Result<Binding, ToolboxError> {
    let mut carriers: Vec<Option<Carrier>> = Vec::new();
    let argv: Vec<String> = args
        .into_iter()
        .map(|arg| match arg {
            ArgValue::Text(s) => s,
            ArgValue::Resolved(carrier) => {
                carriers.push(Some(carrier));
                format!("{CARRIER_SLOT}{}", carriers.len() - 1)
            }
        })
        .collect();

    let bin_name = format!("{progname} {}", def.name);
    let parsed = parser
        .clone()
        .bin_name(bin_name.clone())
        .try_get_matches_from(std::iter::once(bin_name).chain(argv));
    let matches = match parsed {
        Ok(matches) => matches,
        Err(err) if err.kind() == ErrorKind::DisplayHelp => {
            let help = err.render().to_string();
            return Ok(Binding::Help(help.trim_end().to_string()));
        }
        Err(err) => {
            return Err(ToolboxError::binding(def.name, clap_message(&err, &carriers)));
        }
    };

    let mut resolve =
        |raw: &str| take_carrier(raw, &mut carriers).unwrap_or_else(|| ArgValue::text(raw));
    let mut bound = BoundArgs::default();
    for param in def.signature.params {
        for (position, arg) in matched(&matches, param.name, &mut resolve) {
            bound.insert(param.name, coerce::coerce(def.name, param, position, arg)?);
        }
        if param.mode == ParamMode::Flag && !bound.contains(param.name) {
            bound.insert(param.name, Value::Bool(false));
        }
    }
    let destinations = output::destinations(def.name, &matches, resolve)?;
    Ok(Binding::Args {
        args: bound,
        destinations,
    })
}

/// Values clap matched for `id`, with their positions (0 for defaults).
fn matched(
    matches: &ArgMatches,
    id: &str,
    mut resolve: impl FnMut(&str) -> ArgValue,
) -> Vec<(usize, ArgValue)> {
    let from_line = matches.value_source(id) == Some(ValueSource::CommandLine);
    let mut positions = matches.indices_of(id).into_iter().flatten();
    matches
        .get_many::<String>(id)
        .into_iter()
        .flatten()
        .map(|raw| {
            let position = positions.next().filter(|_| from_line).unwrap_or(0);
            (position, resolve(raw))
        })
        .collect()
}

fn take_carrier(raw: &str, carriers: &mut [Option<Carrier>]) -> Option<ArgValue> {
    let slot: usize = raw.strip_prefix(CARRIER_SLOT)?.parse().ok()?;
    carriers.get_mut(slot)?.take().map(ArgValue::Resolved)
}

/// First block of clap's error on one line, slot references shown as labels.
fn clap_message(err: &clap::Error, carriers: &[Option<Carrier>]) -> String {
    let rendered = err.render().to_string();
    let block = rendered.split("\n\n").next().unwrap_or_default();
    let block = block.strip_prefix("error: ").unwrap_or(block);
    let mut message = block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    for (slot, carrier) in carriers.iter().enumerate().rev() {
        if let Some(carrier) = carrier {
            message = message.replace(&format!("{CARRIER_SLOT}{slot}"), carrier.label());
        }
    }
    message
}

/* ---- Tests ---- */
