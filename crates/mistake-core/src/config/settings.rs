//! Resolved settings for one process

use serde::Serialize;

use super::env_flags::{EnvSource, ProcessEnv, read_bool_flag_from};
use super::ConfigWarning;
use crate::debugger::BackendKind;

/// Skip installing the hook entirely
pub const DISABLE_VAR: &str = "MISTAKE_DISABLE";
/// Use the emphasizing renderer (otherwise the previous hook prints)
pub const TRACEBACK_VAR: &str = "MISTAKE_TRACEBACK";
/// Start a post-mortem debugger after the trace is printed
pub const DEBUG_UNCAUGHT_VAR: &str = "MISTAKE_DEBUG_UNCAUGHT";
/// Allow-list of development directories
pub const DEV_DIRS_VAR: &str = "MISTAKE_DEV_DIRS";
/// Deny-list of third-party directories
pub const NON_DEV_DIRS_VAR: &str = "MISTAKE_NON_DEV_DIRS";
/// Verbose classification tracing
pub const VERBOSE_VAR: &str = "MISTAKE_DEBUG";
/// Force a debugger backend (`gdb` or `lldb`)
pub const DEBUGGER_VAR: &str = "MISTAKE_DEBUGGER";

/// Settings resolved from the environment
///
/// Directory lists are kept raw here; the classifier resolves them lazily the
/// first time a frame needs classifying.
#[derive(Debug, Clone, Serialize)]
pub struct MistakeSettings {
    pub disabled: bool,
    pub custom_traceback: bool,
    pub debug_uncaught: bool,
    pub verbose: bool,
    pub dev_dirs: Option<String>,
    pub non_dev_dirs: Option<String>,
    pub debugger: Option<BackendKind>,
    pub warnings: Vec<ConfigWarning>,
}

impl Default for MistakeSettings {
    fn default() -> Self {
        Self {
            disabled: false,
            custom_traceback: true,
            debug_uncaught: true,
            verbose: false,
            dev_dirs: None,
            non_dev_dirs: None,
            debugger: None,
            warnings: Vec::new(),
        }
    }
}

impl MistakeSettings {
    /// Resolve settings from the process environment
    pub fn from_env() -> Self {
        Self::from_source(&ProcessEnv)
    }

    /// Resolve settings from any environment source
    pub fn from_source(env: &dyn EnvSource) -> Self {
        let defaults = Self::default();
        let mut warnings = Vec::new();
        let mut flag = |name: &str, default: bool| {
            let read = read_bool_flag_from(env, name, default);
            warnings.extend(read.warning);
            read.value
        };

        let disabled = flag(DISABLE_VAR, defaults.disabled);
        let custom_traceback = flag(TRACEBACK_VAR, defaults.custom_traceback);
        let debug_uncaught = flag(DEBUG_UNCAUGHT_VAR, defaults.debug_uncaught);
        let verbose = flag(VERBOSE_VAR, defaults.verbose);

        let debugger = env.var(DEBUGGER_VAR).and_then(|value| {
            match BackendKind::parse(&value) {
                Some(kind) => Some(kind),
                None => {
                    let warning = ConfigWarning::UnknownDebugger {
                        var: DEBUGGER_VAR.to_string(),
                        value,
                    };
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                    None
                }
            }
        });

        Self {
            disabled,
            custom_traceback,
            debug_uncaught,
            verbose,
            dev_dirs: env.var(DEV_DIRS_VAR),
            non_dev_dirs: env.var(NON_DEV_DIRS_VAR),
            debugger,
            warnings,
        }
    }
}
