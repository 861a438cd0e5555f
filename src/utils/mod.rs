//! Utilities: `env_logger` set-up for the `log` facade (stderr, elapsed-time prefix).
//!
//! Key items:
//!   init_logging / derive_level

/// Logging helpers.
pub mod logging {
    use std::io::Write;
    use std::time::{Duration, Instant};

    use env_logger::{Builder, Env};
    use log::{LevelFilter, Record};

    use crate::config::ENV_LOG;

    /// `[elapsed] [LEVEL] target - message`
    fn write_line(out: &mut impl Write, elapsed: Duration, record: &Record) -> std::io::Result<()> {
        writeln!(
            out,
            "[{:.3}s] [{}] {} - {}",
            elapsed.as_secs_f64(),
            record.level(),
            record.target(),
            record.args()
        )
    }

    /// Install the stderr logger at `level`; `TOOLBOX_LOG` filter directives
    /// (e.g. `debug` or `toolbox::engine=trace`) override it. Later calls
    /// keep the first logger.
    pub fn init_logging(level: LevelFilter) {
        let start = Instant::now();
        let _ = Builder::new()
            .filter_level(level)
            .parse_env(Env::new().filter(ENV_LOG))
            .format(move |buf, record| write_line(buf, start.elapsed(), record))
            .try_init();
    }

    /// `--quiet` -> error; default -> warn; each `-v` one step louder.
    pub fn derive_level(verbose: u8, quiet: bool) -> LevelFilter {
        if quiet {
            return LevelFilter::Error;
        }
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

}

pub use logging::{derive_level, init_logging};
