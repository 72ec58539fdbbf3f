//! Mistake Core Library
//!
//! This crate decides which stack frames belong to code you are developing,
//! renders panic backtraces with those frames emphasized, and starts a
//! post-mortem debugger already positioned on the last of them.

pub mod classify;
pub mod config;
pub mod debugger;
pub mod error;
pub mod hook;
pub mod logging;
pub mod trace;

// Re-export commonly used types
pub use classify::{Classifier, ClassifierConfig, MatcherList, PathMatcher, Verdict};
pub use config::{ConfigWarning, MistakeSettings};
pub use debugger::{
    BackendKind, DebugBackend, LaunchError, LaunchOutcome, Launcher, SessionContext,
    StackTraceHandle, select_backend,
};
pub use error::{MistakeError, MistakeResult};
pub use hook::{HookEnvironment, InstallOutcome, install, install_with, uninstall};
pub use trace::{
    EmphasisSpan, ExceptionSummary, Formatter, RenderedTrace, StackFrame, StyleOptions,
};
