/*!
Composition engine.

  bracket.rs   tokens -> nested `Node`s
  value.rs     Value / Carrier / ArgValue
  evaluate.rs  work-stack evaluator with verbose / dry-run echo
  output.rs    `--output` / `--intermediate-output` handling

Entry point: `execute_command_line(registry, progname, tokens, options, echo)`.
*/

pub mod bracket;
pub mod evaluate;
pub mod output;
pub mod value;

use std::io::Write;

pub use bracket::{Node, unbracket};
pub use evaluate::{EvalOptions, Evaluator};
pub use output::{CommandOutput, OutputMode};
pub use value::{ArgValue, Carrier, Value};

use crate::cmd::Registry;
use crate::error::ToolboxError;

/// Parse `tokens` (command name first) and evaluate them.
///
/// The first token is always the command name; only the arguments after it
/// are unbracketed, so bracket positions count from the first argument.
pub fn execute_command_line<S: AsRef<str>>(
    registry: &Registry,
    progname: &str,
    tokens: &[S],
    options: EvalOptions,
    echo: &mut dyn Write,
) -> Result<Value, ToolboxError> {
    let Some((command, args)) = tokens.split_first() else {
        return Err(ToolboxError::MissingCommand);
    };
    let mut nodes = vec![Node::leaf(command.as_ref())];
    nodes.extend(unbracket(args, options.max_depth)?);
    Evaluator::new(registry, progname, options).evaluate(nodes, echo)
}
