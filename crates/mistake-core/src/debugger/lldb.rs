//! lldb adapter, the baseline backend
//!
//! lldb echoes every startup command it runs, so it cannot replay navigation
//! quietly. It is attached as-is and the launcher tells the user how far to
//! move up.

use std::path::PathBuf;
use std::process::Command;

use super::backend::{BackendError, BackendKind, DebugBackend, NavCommand, StackTraceHandle};
use super::allow_ptrace_attach;

#[derive(Debug, Clone)]
pub struct LldbBackend {
    program: PathBuf,
    name: String,
}

impl LldbBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "lldb".to_string());
        Self { program, name }
    }

    pub fn command_line(&self, handle: &StackTraceHandle) -> Vec<String> {
        vec!["-p".to_string(), handle.target.pid.to_string()]
    }
}

impl DebugBackend for LldbBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Lldb
    }

    fn supports_command_queue(&self) -> bool {
        false
    }

    fn can_position(&self, _handle: &StackTraceHandle) -> bool {
        false
    }

    fn suppress_output(&mut self) {}

    fn restore_output(&mut self) {}

    fn queue_commands(&mut self, _commands: &[NavCommand]) -> Result<(), BackendError> {
        Err(BackendError::Unsupported {
            backend: self.name.clone(),
            capability: "queued startup commands",
        })
    }

    fn interact(&mut self, handle: &StackTraceHandle) -> Result<(), BackendError> {
        allow_ptrace_attach();
        let args = self.command_line(handle);
        tracing::debug!("starting {} {:?}", self.program.display(), args);

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| BackendError::Spawn {
                program: self.name.clone(),
                message: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(BackendError::Exited {
                program: self.name.clone(),
                code: status.code(),
            })
        }
    }
}
