//! mistake
//!
//! Emphasizes the frames of code you are developing in panic backtraces and
//! drops you into a post-mortem debugger on the last of them.
//!
//! ```no_run
//! fn main() {
//!     mistake::install();
//!     // ...
//! }
//! ```
//!
//! The hook only activates in interactive terminal sessions. See
//! [`MistakeSettings`] for the `MISTAKE_*` environment variables.

pub use mistake_core::*;

/// Install the panic hook configured from the environment
pub fn install() -> InstallOutcome {
    let outcome = mistake_core::install(MistakeSettings::from_env());
    tracing::debug!("mistake install: {:?}", outcome);
    outcome
}
