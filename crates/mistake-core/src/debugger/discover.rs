//! Backend selection
//!
//! Looked up once at install time; the chosen backend is used for every panic
//! afterwards.

use serde::Serialize;
use std::path::PathBuf;

use super::backend::{BackendKind, DebugBackend};
use super::gdb::GdbBackend;
use super::lldb::LldbBackend;

/// A located debugger executable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendCandidate {
    pub kind: BackendKind,
    pub program: PathBuf,
}

impl BackendCandidate {
    pub fn into_backend(self) -> Box<dyn DebugBackend> {
        match self.kind {
            BackendKind::Gdb => Box::new(GdbBackend::new(self.program)),
            BackendKind::Lldb => Box::new(LldbBackend::new(self.program)),
        }
    }
}

/// Find the best available debugger using `lookup` to resolve executables.
///
/// A forced kind is tried first; if it is missing the normal preference order
/// still applies.
pub fn discover_with<F>(preference: Option<BackendKind>, lookup: F) -> Option<BackendCandidate>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    let mut order: Vec<BackendKind> = preference.into_iter().collect();
    for kind in BackendKind::preference_order() {
        if !order.contains(&kind) {
            order.push(kind);
        }
    }

    for kind in order {
        for executable in kind.executables() {
            if let Some(program) = lookup(executable) {
                if preference.is_some_and(|wanted| wanted != kind) {
                    tracing::warn!(
                        "requested debugger {} not found, falling back to {}",
                        preference.map(|p| p.to_string()).unwrap_or_default(),
                        kind
                    );
                }
                return Some(BackendCandidate { kind, program });
            }
        }
    }
    None
}

/// Find the best debugger on `PATH`
pub fn discover(preference: Option<BackendKind>) -> Option<BackendCandidate> {
    discover_with(preference, |name| which::which(name).ok())
}

/// Search `PATH` and build the chosen backend
pub fn select_backend(preference: Option<BackendKind>) -> Option<Box<dyn DebugBackend>> {
    let candidate = discover(preference)?;
    tracing::debug!(
        "selected {} backend at {}",
        candidate.kind,
        candidate.program.display()
    );
    Some(candidate.into_backend())
}
