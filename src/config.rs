//! Run-time settings: CLI flags merged with environment overrides.
//!
//!   TOOLBOX_LOG                 env_logger filter directives, read by `init_logging`
//!   TOOLBOX_MAX_NESTING         deepest accepted bracket nesting (default 64, 1..=1024)
//!   TOOLBOX_USE_LEGACY_BINDING  accepted and ignored; a warning is logged
//!
//! Invalid values are reported (`Settings::warnings`) and defaults kept;
//! nesting above the ceiling is clamped to it.

use log::LevelFilter;

use crate::engine::EvalOptions;
use crate::engine::evaluate::DEFAULT_MAX_DEPTH;
use crate::utils::derive_level;

pub const ENV_LOG: &str = "TOOLBOX_LOG";
pub const ENV_MAX_NESTING: &str = "TOOLBOX_MAX_NESTING";
/// Highest nesting limit `TOOLBOX_MAX_NESTING` may raise to.
pub const MAX_NESTING_CEILING: usize = 1024;
pub const ENV_LEGACY_BINDING: &str = "TOOLBOX_USE_LEGACY_BINDING";

/// Flags taken from the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct Flags {
    pub verbose: u8,
    pub quiet: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub verbose: bool,
    pub dry_run: bool,
    pub log_level: LevelFilter,
    pub max_nesting: usize,
    pub legacy_binding_requested: bool,
    /// Problems found while resolving; logged once logging is up.
    pub warnings: Vec<String>,
}

impl Settings {
    /// Resolve from `flags` and an environment lookup (`std::env::var` in
    /// the binary, a closure over a map in tests).
    pub fn resolve(flags: Flags, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut warnings = Vec::new();

        let mut max_nesting = DEFAULT_MAX_DEPTH;
        if let Some(raw) = env(ENV_MAX_NESTING) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > MAX_NESTING_CEILING => {
                    max_nesting = MAX_NESTING_CEILING;
                    warnings.push(format!(
                        "{ENV_MAX_NESTING}={n} is above {MAX_NESTING_CEILING}; \
                         using {MAX_NESTING_CEILING}"
                    ));
                }
                Ok(n) if n >= 1 => max_nesting = n,
                _ => warnings.push(format!(
                    "ignoring {ENV_MAX_NESTING}={raw:?}: expected a positive integer"
                )),
            }
        }

        let legacy_binding_requested = env(ENV_LEGACY_BINDING).is_some_and(|raw| {
            let raw = raw.trim().to_ascii_lowercase();
            !raw.is_empty() && !matches!(raw.as_str(), "0" | "false" | "no" | "off")
        });
        if legacy_binding_requested {
            warnings.push(format!(
                "{ENV_LEGACY_BINDING} is set but only declarative binding is available; ignoring it"
            ));
        }

        Self {
            verbose: flags.verbose > 0,
            dry_run: flags.dry_run,
            log_level: derive_level(flags.verbose, flags.quiet),
            max_nesting,
            legacy_binding_requested,
            warnings,
        }
    }

    /// Resolve against the process environment.
    pub fn from_env(flags: Flags) -> Self {
        Self::resolve(flags, |key| std::env::var(key).ok())
    }

    pub fn eval_options(&self) -> EvalOptions {
        EvalOptions {
            verbose: self.verbose,
            dry_run: self.dry_run,
            max_depth: self.max_nesting,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn resolve(flags: Flags, pairs: &[(&str, &str)]) -> Settings {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::resolve(flags, |key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let s = resolve(Flags::default(), &[]);
        assert_eq!(s.log_level, LevelFilter::Warn);
        assert_eq!(s.max_nesting, 64);
        assert!(!s.verbose && !s.dry_run && !s.legacy_binding_requested);
        assert!(s.warnings.is_empty());
    }

    #[test]
    fn flags_feed_options() {
        let flags = Flags {
            verbose: 2,
            quiet: false,
            dry_run: true,
        };
        let s = resolve(flags, &[]);
        assert_eq!(s.log_level, LevelFilter::Debug);
        let opts = s.eval_options();
        assert!(opts.verbose && opts.dry_run);
        assert_eq!(opts.max_depth, 64);
    }

    #[test]
    fn env_overrides() {
        let s = resolve(Flags::default(), &[(ENV_MAX_NESTING, "3")]);
        assert_eq!(s.max_nesting, 3);
        assert!(s.warnings.is_empty());
    }

    #[test]
    fn log_filter_is_left_to_env_logger() {
        let s = resolve(Flags::default(), &[(ENV_LOG, "trace")]);
        assert_eq!(s.log_level, LevelFilter::Warn);
        assert!(s.warnings.is_empty());
    }

    #[test]
    fn invalid_values_warn_and_fall_back() {
        let s = resolve(Flags::default(), &[(ENV_MAX_NESTING, "0")]);
        assert_eq!(s.max_nesting, 64);
        let s = resolve(Flags::default(), &[(ENV_MAX_NESTING, "deep")]);
        assert_eq!(s.max_nesting, 64);
        assert_eq!(s.warnings.len(), 1);
    }

    #[test]
    fn nesting_is_clamped_to_ceiling() {
        let s = resolve(Flags::default(), &[(ENV_MAX_NESTING, "1000000")]);
        assert_eq!(s.max_nesting, MAX_NESTING_CEILING);
        assert!(s.warnings[0].contains("above 1024"));
    }

    #[test]
    fn legacy_toggle_is_noted_not_honoured() {
        let s = resolve(Flags::default(), &[(ENV_LEGACY_BINDING, "1")]);
        assert!(s.legacy_binding_requested);
        assert!(s.warnings[0].contains("only declarative binding"));
        let s = resolve(Flags::default(), &[(ENV_LEGACY_BINDING, "false")]);
        assert!(!s.legacy_binding_requested);
    }
}
