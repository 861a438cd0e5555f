/*!
help.rs - `help` and `version` commands.

Help text comes from the clap command each definition is built into:

  help COMMAND           that command's long help
  help --usage COMMAND   its usage line
  help                   toolbox overview with the command list
  help --usage           one usage line per command

A command called with `--help` gets the same text straight from clap.
*/

use anyhow::Result;
use clap::Command;

use super::binder::{Param, ParamKind, Signature};
use super::{BoundArgs, CallContext, Registry};
use crate::engine::{CommandOutput, Value};
use crate::error::ToolboxError;

pub const HELP_DESCRIPTION: &str = "Show help for the toolbox, or for one command.";

pub const HELP_SIGNATURE: Signature = Signature::new(&[
    Param::optional("command", ParamKind::Text, "Command to describe"),
    Param::flag("usage", "Only print usage lines"),
]);

pub const VERSION_DESCRIPTION: &str = "Print the toolbox version.";

pub const VERSION_SIGNATURE: Signature = Signature::new(&[]);

const TOOLBOX_DESCRIPTION: &str = "Composable data-processing toolbox.";

/* ---- Commands ---- */

pub fn run_help(ctx: &CallContext<'_>, mut args: BoundArgs) -> Result<CommandOutput> {
    let usage_only = args.flag("usage");
    let text = match args.text("command") {
        Some(name) => {
            let parser = ctx
                .registry
                .parser(&name)
                .ok_or_else(|| ToolboxError::UnknownCommand { name })?;
            render_command(ctx.progname, parser, usage_only)
        }
        None => render_toolbox(ctx.progname, ctx.registry, usage_only),
    };
    Ok(CommandOutput::Single(Value::Text(text)))
}

pub fn run_version(_: &CallContext<'_>, _: BoundArgs) -> Result<CommandOutput> {
    Ok(CommandOutput::Single(Value::Text(
        env!("CARGO_PKG_VERSION").to_string(),
    )))
}

/* ---- Rendering ---- */

fn plain(text: impl ToString) -> String {
    text.to_string().trim_end().to_string()
}

/// Help (or only the usage line) for one command.
pub fn render_command(progname: &str, parser: &Command, usage_only: bool) -> String {
    let mut cmd = parser
        .clone()
        .bin_name(format!("{progname} {}", parser.get_name()));
    if usage_only {
        let usage = plain(cmd.render_usage());
        return usage.strip_prefix("Usage: ").unwrap_or(&usage).to_string();
    }
    plain(cmd.render_long_help())
}

/// Help for the whole toolbox.
pub fn render_toolbox(progname: &str, registry: &Registry, usage_only: bool) -> String {
    if usage_only {
        return registry
            .parsers()
            .filter(|p| p.get_name() != "help")
            .map(|p| render_command(progname, p, true))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let after = format!(
        "Results from commands can be passed into file-like arguments of other commands \
         by surrounding them by square brackets:\n\n    {progname} command [ command ... ] ...\n\n\
         Spaces around brackets are mandatory.\n\n\
         See {progname} help [--usage] [command] for more information on available command(s)."
    );
    let mut toolbox = Command::new(progname.to_string())
        .about(TOOLBOX_DESCRIPTION)
        .override_usage(format!("{progname} [-v]... [-q] [--dry-run] COMMAND [ARGS]..."))
        .after_help(after)
        .disable_help_flag(true)
        .disable_help_subcommand(true)
        .subcommands(registry.parsers().cloned());
    plain(toolbox.render_help())
}
