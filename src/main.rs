use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, warn};

use toolbox::config::{Flags, Settings};
use toolbox::{Registry, ToolboxError, execute_command_line, utils};

/// Toolbox - composable data-processing commands
///
/// Results from commands can be passed into file-like arguments of other
/// commands by surrounding them by square brackets:
///
///   toolbox command [ command ... ] ...
///
/// Spaces around brackets are mandatory.
///
/// Examples:
///   toolbox help
///   toolbox help combine
///   toolbox describe [ combine rain.json snow.json --new-name=precip ]
///   toolbox --dry-run threshold [ combine a.json b.json ] 0.5 --output=out.json
///
/// Env:
///   TOOLBOX_LOG                 log filter, e.g. debug or toolbox::engine=trace
///   TOOLBOX_MAX_NESTING         deepest accepted bracket nesting (default 64, max 1024)
///   TOOLBOX_USE_LEGACY_BINDING  ignored (warns)
#[derive(Parser, Debug)]
#[command(
    name = "toolbox",
    version,
    author,
    about = "Toolbox - composable data-processing commands",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Print every executed command (-v); more for debug logs (-vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Errors only
    #[arg(short, long)]
    quiet: bool,

    /// Print commands that would be executed without running them
    #[arg(long)]
    dry_run: bool,

    /// COMMAND followed by its arguments; `[` and `]` delimit nested commands
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND [ARGS]"
    )]
    tokens: Vec<String>,
}

fn run(cli: Cli) -> Result<(), ToolboxError> {
    let settings = Settings::from_env(Flags {
        verbose: cli.verbose,
        quiet: cli.quiet,
        dry_run: cli.dry_run,
    });
    utils::init_logging(settings.log_level);
    for w in &settings.warnings {
        warn!("{w}");
    }

    let registry = Registry::builtin()?;
    debug!("evaluating {:?}", cli.tokens);

    let mut stdout = std::io::stdout().lock();
    let result = execute_command_line(
        &registry,
        "toolbox",
        cli.tokens.as_slice(),
        settings.eval_options(),
        &mut stdout,
    )?;
    if let Some(text) = result.render() {
        writeln!(stdout, "{text}")?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
