/*!
evaluate.rs - composition evaluator.

Walks the bracket tree depth-first with an explicit work stack:

  leaf            -> ArgValue::Text, appended to the current frame
  nested list     -> new frame pushed (bounded by `max_depth`)
  frame exhausted -> invoke; result wrapped in a Carrier and appended to the
                     parent frame, or returned when the stack is empty

Siblings resolve left to right, children before their parent. Any error
aborts the whole command line.

Per-invocation echo (verbose / dry-run), innermost first:

  <progname> <args...>  ->  <result>
*/

use std::io::Write;
use std::vec;

use log::debug;

use super::bracket::Node;
use super::output::{self, CommandOutput};
use super::{ArgValue, Carrier, Value};
use crate::cmd::{self, Binding, CallContext, CommandDefinition, Registry};
use crate::error::ToolboxError;

pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    /// Echo every invocation.
    pub verbose: bool,
    /// Echo instead of invoking.
    pub dry_run: bool,
    /// Deepest bracket nesting accepted.
    pub max_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            dry_run: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

struct Frame {
    pending: vec::IntoIter<Node>,
    resolved: Vec<ArgValue>,
}

impl Frame {
    fn new(nodes: Vec<Node>) -> Self {
        let resolved = Vec::with_capacity(nodes.len());
        Self {
            pending: nodes.into_iter(),
            resolved,
        }
    }
}

pub struct Evaluator<'a> {
    registry: &'a Registry,
    progname: &'a str,
    options: EvalOptions,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a Registry, progname: &'a str, options: EvalOptions) -> Self {
        Self {
            registry,
            progname,
            options,
        }
    }

    /// Evaluate a parsed command line (`command args...`).
    pub fn evaluate(&self, nodes: Vec<Node>, echo: &mut dyn Write) -> Result<Value, ToolboxError> {
        let mut stack = vec![Frame::new(nodes)];
        loop {
            let Some(frame) = stack.last_mut() else {
                return Err(ToolboxError::MissingCommand);
            };
            match frame.pending.next() {
                Some(Node::Leaf(token)) => frame.resolved.push(ArgValue::Text(token)),
                Some(Node::Nested(children)) => {
                    if stack.len() > self.options.max_depth {
                        return Err(ToolboxError::NestingTooDeep {
                            limit: self.options.max_depth,
                        });
                    }
                    stack.push(Frame::new(children));
                }
                None => {
                    let Some(done) = stack.pop() else {
                        return Err(ToolboxError::MissingCommand);
                    };
                    let result = self.invoke(done.resolved, echo)?;
                    match stack.last_mut() {
                        Some(parent) => parent.resolved.push(ArgValue::Resolved(result)),
                        None => return Ok(result.into_value()),
                    }
                }
            }
        }
    }

    /// Run one fully resolved invocation and echo it if requested.
    fn invoke(&self, args: Vec<ArgValue>, echo: &mut dyn Write) -> Result<Carrier, ToolboxError> {
        let name = match args.first() {
            Some(ArgValue::Text(name)) => name.clone(),
            _ => return Err(ToolboxError::MissingCommand),
        };
        let def = self.registry.lookup(&name)?;

        let echoing = self.options.verbose || self.options.dry_run;
        let shown: Vec<String> = if echoing {
            args.iter().map(|a| a.display().into_owned()).collect()
        } else {
            Vec::new()
        };

        let value = if self.options.dry_run {
            Value::DryRun(shown.clone())
        } else {
            let rest = args.into_iter().skip(1).collect();
            self.dispatch(def, rest)?
        };
        let result = Carrier::wrap(value);

        if echoing {
            let display = ArgValue::Resolved(result.clone());
            writeln!(
                echo,
                "{} {}  ->  {}",
                self.progname,
                shown.join(" "),
                display.display()
            )?;
        }
        Ok(result)
    }

    fn dispatch(
        &self,
        def: &CommandDefinition,
        args: Vec<ArgValue>,
    ) -> Result<Value, ToolboxError> {
        let parser = self
            .registry
            .parser(def.name)
            .ok_or_else(|| ToolboxError::UnknownCommand {
                name: def.name.to_string(),
            })?;
        let (bound, destinations) = match cmd::bind(self.progname, def, parser, args)? {
            Binding::Args { args, destinations } => (args, destinations),
            Binding::Help(text) => return Ok(Value::Text(text)),
        };

        debug!("dispatching {}", def.name);
        let ctx = CallContext {
            progname: self.progname,
            registry: self.registry,
        };
        let produced: CommandOutput = (def.handler)(&ctx, bound).map_err(|error| {
            match error.downcast::<ToolboxError>() {
                Ok(inner) => inner,
                Err(error) => ToolboxError::Execution {
                    command: def.name.to_string(),
                    error,
                },
            }
        })?;
        output::finalize(produced, &destinations)
    }
}
