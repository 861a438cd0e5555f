//! Output finalizer.
//!
//! `--output` (and `--intermediate-output` for commands that produce a
//! secondary result) are declared on every command's clap parser and split
//! off from the bound arguments. After the command returns, requested
//! results are written and the primary result is either handed back for
//! further composition or replaced by `Value::None`.

use std::path::{Path, PathBuf};

use clap::builder::NonEmptyStringValueParser;
use clap::{Arg, ArgAction, ArgMatches};
use log::info;

use super::{ArgValue, Value};
use crate::cmd::binder::long_arg;
use crate::data;
use crate::error::ToolboxError;

pub const OUTPUT_OPTION: &str = "output";
pub const INTERMEDIATE_OPTION: &str = "intermediate-output";

/// Which output options a command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Result is always returned (help, version).
    None,
    /// `--output`.
    Single,
    /// `--output` and `--intermediate-output`.
    WithIntermediate,
}

/// What a command handler returns.
#[derive(Debug)]
pub enum CommandOutput {
    Single(Value),
    WithIntermediate { primary: Value, intermediate: Value },
}

impl CommandOutput {
    pub fn primary(self) -> Value {
        match self {
            CommandOutput::Single(v) => v,
            CommandOutput::WithIntermediate { primary, .. } => primary,
        }
    }
}

impl From<Value> for CommandOutput {
    fn from(v: Value) -> Self {
        CommandOutput::Single(v)
    }
}

/// Destinations requested on the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Destinations {
    pub output: Option<PathBuf>,
    pub intermediate: Option<PathBuf>,
}

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    long_arg(name)
        .value_name("PATH")
        .value_parser(NonEmptyStringValueParser::new())
        .action(ArgAction::Set)
        .help(help)
}

/// The clap options a command with `mode` accepts.
pub fn destination_args(mode: OutputMode) -> Vec<Arg> {
    let output = || path_arg(OUTPUT_OPTION, "Write the result to PATH instead of passing it on");
    match mode {
        OutputMode::None => Vec::new(),
        OutputMode::Single => vec![output()],
        OutputMode::WithIntermediate => vec![
            output(),
            path_arg(INTERMEDIATE_OPTION, "Also write the intermediate result to PATH"),
        ],
    }
}

fn destination_value(command: &str, option: &str, arg: ArgValue) -> Result<PathBuf, ToolboxError> {
    let path = match arg {
        ArgValue::Text(s) => s,
        ArgValue::Resolved(c) => match c.into_value() {
            Value::Text(s) => s,
            other => {
                return Err(ToolboxError::binding(
                    command,
                    format!("option --{option} expects a path, got {}", other.kind()),
                ));
            }
        },
    };
    if path.is_empty() {
        return Err(ToolboxError::binding(
            command,
            format!("option --{option} requires a value"),
        ));
    }
    Ok(PathBuf::from(path))
}

/// Read the destinations clap matched; `resolve` maps a raw value back to
/// the argument it stands for.
pub fn destinations(
    command: &str,
    matches: &ArgMatches,
    mut resolve: impl FnMut(&str) -> ArgValue,
) -> Result<Destinations, ToolboxError> {
    let mut found = |option: &str| match matches.try_get_one::<String>(option) {
        Ok(Some(raw)) => destination_value(command, option, resolve(raw)).map(Some),
        _ => Ok(None),
    };
    Ok(Destinations {
        output: found(OUTPUT_OPTION)?,
        intermediate: found(INTERMEDIATE_OPTION)?,
    })
}

/// Persist requested results; return what the caller may pass on.
pub fn finalize(output: CommandOutput, dest: &Destinations) -> Result<Value, ToolboxError> {
    let primary = match output {
        CommandOutput::Single(v) => v,
        CommandOutput::WithIntermediate {
            primary,
            intermediate,
        } => {
            if let Some(path) = &dest.intermediate {
                persist(&intermediate, path)?;
            }
            primary
        }
    };
    match &dest.output {
        Some(path) => {
            persist(&primary, path)?;
            Ok(Value::None)
        }
        None => Ok(primary),
    }
}

fn persist(value: &Value, path: &Path) -> Result<(), ToolboxError> {
    data::save_value(value, path).map_err(|source| ToolboxError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote {} to {}", value.kind(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Command;

    use super::*;
    use crate::data::Dataset;
    use crate::engine::Carrier;

    fn parse(mode: OutputMode, args: &[&str]) -> Result<Destinations, String> {
        let matches = Command::new("c")
            .args(destination_args(mode))
            .try_get_matches_from(std::iter::once("c").chain(args.iter().copied()))
            .map_err(|e| e.kind().to_string())?;
        destinations("c", &matches, |raw: &str| ArgValue::text(raw))
            .map_err(|e| e.to_string())
    }

    #[test]
    fn inline_separate_and_underscored_forms() {
        let dest = parse(OutputMode::Single, &["--output=o.json"]).unwrap();
        assert_eq!(dest.output, Some(PathBuf::from("o.json")));
        let dest = parse(OutputMode::Single, &["--output", "o.json"]).unwrap();
        assert_eq!(dest.output, Some(PathBuf::from("o.json")));
        let underscored = ["--intermediate_output=i.json"];
        let dest = parse(OutputMode::WithIntermediate, &underscored).unwrap();
        assert_eq!(dest.intermediate, Some(PathBuf::from("i.json")));
    }

    #[test]
    fn intermediate_only_for_capable_commands() {
        let args = ["--intermediate-output=i.json", "--output=o.json"];
        let dest = parse(OutputMode::WithIntermediate, &args).unwrap();
        assert_eq!(dest.intermediate, Some(PathBuf::from("i.json")));
        assert_eq!(dest.output, Some(PathBuf::from("o.json")));
        assert!(parse(OutputMode::Single, &args).is_err());
    }

    #[test]
    fn no_options_when_mode_is_none() {
        assert!(destination_args(OutputMode::None).is_empty());
        assert_eq!(parse(OutputMode::None, &[]).unwrap(), Destinations::default());
        assert!(parse(OutputMode::None, &["--output=x"]).is_err());
    }

    #[test]
    fn empty_and_repeated_values_are_rejected() {
        assert!(parse(OutputMode::Single, &["--output"]).is_err());
        assert!(parse(OutputMode::Single, &["--output="]).is_err());
        assert!(parse(OutputMode::Single, &["--output=a", "--output=b"]).is_err());
    }

    #[test]
    fn carried_destination_must_be_text() {
        let text = ArgValue::Resolved(Carrier::wrap(Value::Text("o.json".into())));
        let path = destination_value("c", OUTPUT_OPTION, text).unwrap();
        assert_eq!(path, PathBuf::from("o.json"));
        let number = ArgValue::Resolved(Carrier::wrap(Value::Integer(3)));
        let err = destination_value("c", OUTPUT_OPTION, number).unwrap_err();
        assert!(err.to_string().contains("option --output expects a path, got integer"));
    }

    #[test]
    fn finalize_persists_and_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let ds = Dataset::new("x", "1", vec![1], vec![5.0]);
        let dest = Destinations {
            output: Some(path.clone()),
            intermediate: None,
        };
        let v = finalize(CommandOutput::Single(Value::Dataset(ds.clone())), &dest).unwrap();
        assert_eq!(v, Value::None);
        assert_eq!(data::load_dataset(&path).unwrap(), ds);
    }

    #[test]
    fn finalize_without_output_returns_object() {
        let ds = Dataset::new("x", "1", vec![1], vec![5.0]);
        let out = CommandOutput::Single(Value::Dataset(ds.clone()));
        let v = finalize(out, &Destinations::default()).unwrap();
        assert_eq!(v, Value::Dataset(ds));
    }

    #[test]
    fn finalize_writes_intermediate_and_chains_primary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mid.json");
        let out = CommandOutput::WithIntermediate {
            primary: Value::Integer(1),
            intermediate: Value::Dataset(Dataset::new("mid", "", vec![1], vec![0.5])),
        };
        let dest = Destinations {
            output: None,
            intermediate: Some(path.clone()),
        };
        assert_eq!(finalize(out, &dest).unwrap(), Value::Integer(1));
        assert_eq!(data::load_dataset(&path).unwrap().name, "mid");
    }
}
