//! Error taxonomy for the composition engine.
//!
//! `ToolboxError` is what every engine entry point returns. Command handlers
//! work with `anyhow` internally; their failures surface as `Execution`.

use std::path::PathBuf;

use thiserror::Error;

use crate::data::DataError;

/// Errors raised while parsing, binding, evaluating or persisting a command line.
#[derive(Error, Debug)]
pub enum ToolboxError {
    #[error("Mismatched bracket at position {position}.")]
    BracketMismatch { position: usize },

    #[error("unknown command '{name}' (see `help` for available commands)")]
    UnknownCommand { name: String },

    #[error("missing command name in nested invocation")]
    MissingCommand,

    #[error("{command}: {message}")]
    Binding { command: String, message: String },

    #[error("{command}: cannot convert argument {position} ({param}): {source}")]
    Coercion {
        command: String,
        param: String,
        position: usize,
        #[source]
        source: DataError,
    },

    #[error("{command}: {error:#}")]
    Execution {
        command: String,
        error: anyhow::Error,
    },

    #[error("bracket nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("invalid signature for command '{command}': {reason}")]
    InvalidSignature { command: String, reason: String },

    #[error("command '{name}' registered more than once")]
    DuplicateCommand { name: String },

    #[error("failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: DataError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ToolboxError {
    pub(crate) fn binding(command: impl Into<String>, message: impl Into<String>) -> Self {
        ToolboxError::Binding {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Usage-class failures exit with 2, everything else with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolboxError::BracketMismatch { .. }
            | ToolboxError::UnknownCommand { .. }
            | ToolboxError::MissingCommand
            | ToolboxError::Binding { .. }
            | ToolboxError::NestingTooDeep { .. } => 2,
            _ => 1,
        }
    }
}
