//! Panic hook wiring
//!
//! The hook is only installed for attended sessions. Once installed it
//! renders the trace with local frames emphasized and then drops the user
//! into a debugger positioned on the last local frame.

mod attended;
mod handler;
mod installer;

pub use attended::{HookEnvironment, is_attended, is_traced, parse_tracer_pid, tracer_pid};
pub use handler::{Deferral, HandlerState, PanicHandler, PreviousHook, ReentrancyGuard, Report};
pub use installer::{
    InstallOutcome, install, install_with, is_installed, report_config_warnings, uninstall,
};
