/*!
Command registry.

Every command exposed by the toolbox is one `CommandDefinition` in
`BUILTIN_COMMANDS`. The registry is built once at start-up, validated, and
read-only afterwards.

Layout:
  src/cmd/
    mod.rs          (this file: definitions + registry)
    binder.rs       (Signature / Param -> clap::Command, bind)
    coerce.rs       (text -> typed value, carrier passthrough)
    help.rs         (help + version, rendered by clap)
    combine.rs      (combine)
    threshold.rs    (threshold)
    attributes.rs   (update-attributes)
    describe.rs     (describe)

Conventions:
  - Each command module exposes a `SIGNATURE` const and a `run` handler.
  - Handlers return `anyhow::Result<CommandOutput>`; the evaluator turns
    failures into `ToolboxError::Execution`.
*/

pub mod attributes;
pub mod binder;
pub mod coerce;
pub mod combine;
pub mod describe;
pub mod help;
pub mod threshold;

use std::collections::BTreeMap;

use log::debug;

pub use binder::{Binding, BoundArgs, Param, ParamKind, ParamMode, Signature, bind};

use crate::engine::{CommandOutput, OutputMode};
use crate::error::ToolboxError;

/// What a handler can see besides its arguments.
pub struct CallContext<'a> {
    pub progname: &'a str,
    pub registry: &'a Registry,
}

pub type Handler = fn(&CallContext<'_>, BoundArgs) -> anyhow::Result<CommandOutput>;

#[derive(Clone, Copy)]
pub struct CommandDefinition {
    pub name: &'static str,
    /// One line for the command table.
    pub summary: &'static str,
    pub description: &'static str,
    pub signature: Signature,
    pub output: OutputMode,
    pub handler: Handler,
}

impl std::fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/* ---- Static Table ---- */

pub static BUILTIN_COMMANDS: &[CommandDefinition] = &[
    CommandDefinition {
        name: "combine",
        summary: "Combine datasets element-wise",
        description: combine::DESCRIPTION,
        signature: combine::SIGNATURE,
        output: OutputMode::Single,
        handler: combine::run,
    },
    CommandDefinition {
        name: "describe",
        summary: "Summarise a dataset as text",
        description: describe::DESCRIPTION,
        signature: describe::SIGNATURE,
        output: OutputMode::Single,
        handler: describe::run,
    },
    CommandDefinition {
        name: "help",
        summary: "Show command help",
        description: help::HELP_DESCRIPTION,
        signature: help::HELP_SIGNATURE,
        output: OutputMode::None,
        handler: help::run_help,
    },
    CommandDefinition {
        name: "threshold",
        summary: "Flag values above (or below) a threshold",
        description: threshold::DESCRIPTION,
        signature: threshold::SIGNATURE,
        output: OutputMode::WithIntermediate,
        handler: threshold::run,
    },
    CommandDefinition {
        name: "update-attributes",
        summary: "Apply attribute changes from a JSON or YAML file",
        description: attributes::DESCRIPTION,
        signature: attributes::SIGNATURE,
        output: OutputMode::Single,
        handler: attributes::run,
    },
    CommandDefinition {
        name: "version",
        summary: "Print version",
        description: help::VERSION_DESCRIPTION,
        signature: help::VERSION_SIGNATURE,
        output: OutputMode::None,
        handler: help::run_version,
    },
];

/* ---- Registry ---- */

#[derive(Debug)]
struct Entry {
    def: CommandDefinition,
    parser: clap::Command,
}

/// Name -> command lookup, sorted by name.
#[derive(Debug)]
pub struct Registry {
    commands: BTreeMap<&'static str, Entry>,
}

impl Registry {
    /// The toolbox's own command table.
    pub fn builtin() -> Result<Self, ToolboxError> {
        Self::from_definitions(BUILTIN_COMMANDS.iter().copied())
    }

    /// Build from an explicit table, validating signatures and names and
    /// building each command's clap parser.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = CommandDefinition>,
    ) -> Result<Self, ToolboxError> {
        let mut commands = BTreeMap::new();
        for def in definitions {
            def.signature
                .validate()
                .map_err(|reason| ToolboxError::InvalidSignature {
                    command: def.name.to_string(),
                    reason,
                })?;
            let parser = binder::command_for(&def);
            if commands.insert(def.name, Entry { def, parser }).is_some() {
                return Err(ToolboxError::DuplicateCommand {
                    name: def.name.to_string(),
                });
            }
        }
        debug!("registered {} command(s)", commands.len());
        Ok(Self { commands })
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name).map(|entry| &entry.def)
    }

    /// The clap parser built for `name`.
    pub fn parser(&self, name: &str) -> Option<&clap::Command> {
        self.commands.get(name).map(|entry| &entry.parser)
    }

    /// Like `get`, failing with `UnknownCommand`.
    pub fn lookup(&self, name: &str) -> Result<&CommandDefinition, ToolboxError> {
        self.get(name).ok_or_else(|| ToolboxError::UnknownCommand {
            name: name.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.commands.values().map(|entry| &entry.def)
    }

    pub fn parsers(&self) -> impl Iterator<Item = &clap::Command> {
        self.commands.values().map(|entry| &entry.parser)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
