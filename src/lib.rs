//! Toolbox: a command-line dispatcher whose commands compose inline.
//!
//! ```text
//! toolbox combine [ threshold rain.json 0.5 ] [ threshold snow.json 0.5 ] --output=both.json
//! ```
//!
//! Every `[ ... ]` group is a nested invocation; its in-memory result is
//! passed to the enclosing command as a typed argument.
//!
//! Modules:
//!   cmd     registry, binder, coercion, help and the built-in commands
//!   engine  bracket parser, values and carriers, evaluator, output finalizer
//!   data    dataset model and persistence
//!   config  settings from flags and environment
//!   utils   env_logger set-up

pub mod cmd;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod utils;

pub use cmd::{CommandDefinition, Registry};
pub use config::{Flags, Settings};
pub use engine::{ArgValue, Carrier, EvalOptions, Value, execute_command_line};
pub use error::ToolboxError;
