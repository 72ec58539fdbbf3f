//! Diagnostic check functions

use super::types::CheckResult;
use mistake_core::BackendKind;
use mistake_core::MistakeSettings;
use mistake_core::classify::ResolvedLists;
use mistake_core::config::{DEBUG_UNCAUGHT_VAR, DISABLE_VAR, TRACEBACK_VAR};
use mistake_core::debugger::BackendCandidate;

/// Check that a person can interact with the debugger
pub fn check_attended(attended: bool) -> CheckResult {
    if attended {
        CheckResult::pass("Session", "stdin, stdout and stderr are terminals")
    } else {
        CheckResult::warn("Session", "not every standard stream is a terminal")
            .with_hint("The hook only installs in an interactive terminal session")
    }
}

/// Check the on/off flags
pub fn check_flags(settings: &MistakeSettings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    if settings.disabled {
        results.push(
            CheckResult::warn("Hook", format!("disabled by {}=1", DISABLE_VAR))
                .with_hint(format!("Unset {} to enable the hook", DISABLE_VAR)),
        );
    } else {
        results.push(CheckResult::pass("Hook", "enabled"));
    }

    if settings.custom_traceback {
        results.push(CheckResult::pass("Traceback", "local frames are emphasized"));
    } else {
        results.push(CheckResult::warn(
            "Traceback",
            format!("default panic output ({}=0)", TRACEBACK_VAR),
        ));
    }

    if settings.debug_uncaught {
        results.push(CheckResult::pass("Post-mortem", "debugger starts after a panic"));
    } else {
        results.push(CheckResult::warn(
            "Post-mortem",
            format!("turned off ({}=0)", DEBUG_UNCAUGHT_VAR),
        ));
    }

    for warning in &settings.warnings {
        results.push(CheckResult::warn("Configuration", warning.to_string()));
    }
    results
}

/// Check which debugger would be used
pub fn check_backend(backend: Option<&BackendCandidate>) -> CheckResult {
    match backend {
        Some(candidate) if candidate.kind == BackendKind::Gdb => CheckResult::pass(
            "Debugger",
            format!("{} ({})", candidate.kind, candidate.program.display()),
        ),
        Some(candidate) => CheckResult::warn(
            "Debugger",
            format!("{} ({})", candidate.kind, candidate.program.display()),
        )
        .with_hint(
            "lldb cannot navigate on startup; install gdb to land on your frame automatically",
        ),
        None => CheckResult::fail("Debugger", "neither gdb nor lldb found on PATH")
            .with_hint("Install gdb (preferred) or lldb"),
    }
}

/// Check Yama ptrace restrictions
pub fn check_ptrace_scope(scope: Option<u8>) -> CheckResult {
    match scope {
        None => CheckResult::pass("ptrace", "no Yama restrictions"),
        Some(0) => CheckResult::pass("ptrace", "ptrace_scope=0"),
        Some(1) => {
            CheckResult::pass("ptrace", "ptrace_scope=1, attach is allowed via PR_SET_PTRACER")
        }
        Some(2) => CheckResult::warn("ptrace", "ptrace_scope=2, only root may attach")
            .with_hint("Run as root or lower /proc/sys/kernel/yama/ptrace_scope"),
        Some(n) => {
            CheckResult::fail("ptrace", format!("ptrace_scope={}, attaching is disabled", n))
        }
    }
}

/// Check whether a debugger is already attached
pub fn check_tracer(tracer_pid: Option<u32>) -> CheckResult {
    match tracer_pid {
        None => CheckResult::pass("Tracer", "not being debugged"),
        Some(pid) => CheckResult::warn("Tracer", format!("already traced by pid {}", pid))
            .with_hint("Panics are left to the existing debugger"),
    }
}

/// Report the resolved allow/deny lists
pub fn check_lists(lists: &ResolvedLists) -> Vec<CheckResult> {
    let mut results = Vec::new();
    if lists.allow.is_empty() {
        results.push(CheckResult::warn("Allow-list", "empty").with_hint(
            "Without a home directory or MISTAKE_DEV_DIRS only path packages count as local",
        ));
    } else {
        results.push(CheckResult::pass("Allow-list", lists.allow.to_string()));
    }
    results.push(CheckResult::pass("Deny-list", lists.deny.to_string()));
    for warning in &lists.warnings {
        results.push(CheckResult::warn("Configuration", warning.to_string()));
    }
    results
}
