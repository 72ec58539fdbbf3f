//! Configuration for mistake
//!
//! Everything is read from environment variables once, at install time.

mod dir_list;
mod env_flags;
mod settings;

pub use dir_list::{ParsedDirList, parse_dir_list};
pub use env_flags::{
    EnvSource, FlagRead, ProcessEnv, parse_bool_flag, read_bool_flag, read_bool_flag_from,
};
pub use settings::{
    DEBUG_UNCAUGHT_VAR, DEBUGGER_VAR, DEV_DIRS_VAR, DISABLE_VAR, MistakeSettings,
    NON_DEV_DIRS_VAR, TRACEBACK_VAR, VERBOSE_VAR,
};

use serde::Serialize;
use thiserror::Error;

/// Non-fatal configuration problems
///
/// These are logged and the affected setting falls back to its default.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConfigWarning {
    /// A boolean flag held something other than `0` or `1`
    #[error("invalid value of flag {name}: {value} (must be 0 or 1)")]
    InvalidFlag { name: String, value: String },

    /// A directory list entry looked like a path but is not a directory
    #[error("{entry} in {var} seemed like an absolute path but was not a directory")]
    NotADirectory { var: String, entry: String },

    /// Unknown debugger name
    #[error("unknown debugger {value} in {var} (expected gdb or lldb)")]
    UnknownDebugger { var: String, value: String },
}
