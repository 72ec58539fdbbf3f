//! Post-mortem debugger launching
//!
//! The formatter publishes how many frames sit below the anchor into a
//! [`SessionContext`]; the [`Launcher`] attaches a debugger backend to the
//! panicking process and replays that many "up" moves before handing over
//! the prompt.

mod backend;
mod discover;
mod gdb;
mod launcher;
mod lldb;
mod session;

pub use backend::{
    BackendError, BackendKind, DebugBackend, DebugTarget, NavCommand, StackTraceHandle,
};
#[cfg(test)]
pub use backend::MockDebugBackend;
pub use discover::{BackendCandidate, discover, discover_with, select_backend};
pub use gdb::GdbBackend;
pub use launcher::{LaunchError, LaunchOutcome, LaunchState, Launcher};
pub use lldb::LldbBackend;
pub use session::SessionContext;

/// Let a child debugger attach to this process under Yama `ptrace_scope=1`
#[cfg(target_os = "linux")]
pub(crate) fn allow_ptrace_attach() {
    // PR_SET_PTRACER_ANY
    let any = libc::c_ulong::MAX;
    // SAFETY: prctl with PR_SET_PTRACER only changes this process's Yama policy.
    let rc = unsafe { libc::prctl(libc::PR_SET_PTRACER, any, 0, 0, 0) };
    if rc != 0 {
        tracing::debug!(
            "PR_SET_PTRACER failed: {}",
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn allow_ptrace_attach() {}

/// Current Yama ptrace scope, if the kernel has Yama
pub fn ptrace_scope() -> Option<u8> {
    std::fs::read_to_string("/proc/sys/kernel/yama/ptrace_scope")
        .ok()
        .and_then(|s| s.trim().parse().ok())
}
