//! Doctor command implementation

mod checks;
mod types;

use checks::{
    check_attended, check_backend, check_flags, check_lists, check_ptrace_scope, check_tracer,
};
use colored::*;
use mistake_core::debugger::{discover, ptrace_scope};
use mistake_core::hook::{is_attended, tracer_pid};
use mistake_core::{Classifier, MistakeSettings};
pub use types::{CheckResult, CheckStatus, DoctorReport};

/// Collect every check for the current process
pub fn build_report() -> DoctorReport {
    let settings = MistakeSettings::from_env();
    let attended = is_attended();
    let tracer_pid = tracer_pid();
    let ptrace_scope = ptrace_scope();
    let backend = discover(settings.debugger);
    let lists = Classifier::from_settings(&settings).lists().clone();

    let mut checks = vec![check_attended(attended)];
    checks.extend(check_flags(&settings));
    checks.push(check_backend(backend.as_ref()));
    if cfg!(target_os = "linux") {
        checks.push(check_ptrace_scope(ptrace_scope));
        checks.push(check_tracer(tracer_pid));
    }
    checks.extend(check_lists(&lists));

    DoctorReport {
        attended,
        tracer_pid,
        ptrace_scope,
        backend,
        settings,
        lists,
        checks,
    }
}

/// Run environment checks (doctor command)
pub fn doctor(json: bool) -> anyhow::Result<()> {
    let report = build_report();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("{}", "mistake Health Check".bold().underline());
    println!("{}", "=".repeat(50).dimmed());
    println!();

    for check in &report.checks {
        println!("{} {} - {}", check.icon(), check.name.bold(), check.message);
        if let Some(hint) = &check.hint {
            println!("    {} {}", "→".dimmed(), hint.dimmed());
        }
    }

    println!();
    println!("{}", "-".repeat(50).dimmed());
    println!(
        "Summary: {} passed, {} warnings, {} failed",
        report.count(CheckStatus::Pass).to_string().green(),
        report.count(CheckStatus::Warn).to_string().yellow(),
        report.count(CheckStatus::Fail).to_string().red()
    );
    Ok(())
}
