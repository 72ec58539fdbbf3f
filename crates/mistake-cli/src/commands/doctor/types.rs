//! Doctor report types

use colored::*;
use mistake_core::MistakeSettings;
use mistake_core::classify::ResolvedLists;
use mistake_core::debugger::BackendCandidate;
use serde::Serialize;

/// Check item result for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

/// Status of a diagnostic check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Pass,
            message: message.into(),
            hint: None,
        }
    }

    pub fn warn(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warn,
            message: message.into(),
            hint: None,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Fail,
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn icon(&self) -> ColoredString {
        match self.status {
            CheckStatus::Pass => "✓".green().bold(),
            CheckStatus::Warn => "⚠".yellow().bold(),
            CheckStatus::Fail => "✗".red().bold(),
        }
    }
}

/// Everything `mistake doctor --json` prints
#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub attended: bool,
    pub tracer_pid: Option<u32>,
    pub ptrace_scope: Option<u8>,
    pub backend: Option<BackendCandidate>,
    pub settings: MistakeSettings,
    pub lists: ResolvedLists,
    pub checks: Vec<CheckResult>,
}

impl DoctorReport {
    pub fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }
}
