//! gdb adapter
//!
//! gdb is attached to the panicking process while the panic hook is blocked
//! waiting for it. The session switches to the panicking thread, is parked on
//! the innermost frame the user was shown, then queued moves are replayed with
//! `up-silently` so only the final `frame` printout is visible.
//!
//! Parking goes through `select-frame function`, which only resolves plain
//! paths. When the innermost frame is a closure or a generic instance the
//! backend reports that it cannot position the session and the launcher falls
//! back to manual steps.

use std::path::PathBuf;
use std::process::Command;

use super::backend::{BackendError, BackendKind, DebugBackend, NavCommand, StackTraceHandle};
use super::allow_ptrace_attach;

#[derive(Debug, Clone)]
pub struct GdbBackend {
    program: PathBuf,
    name: String,
    suppressed: bool,
    queued: Vec<String>,
}

impl GdbBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "gdb".to_string());
        Self {
            program,
            name,
            suppressed: false,
            queued: Vec::new(),
        }
    }

    /// Commands queued so far, in gdb syntax
    pub fn queued(&self) -> &[String] {
        &self.queued
    }

    /// Full argument list for attaching to `handle`
    pub fn command_line(&self, handle: &StackTraceHandle) -> Vec<String> {
        let mut args = vec![
            "-q".to_string(),
            "-p".to_string(),
            handle.target.pid.to_string(),
            "-ex".to_string(),
            "set pagination off".to_string(),
        ];

        if let Some(switch) = thread_switch(handle) {
            args.push("-ex".to_string());
            args.push(switch);
        }

        if let Some(function) = parking_function(handle) {
            args.push("-ex".to_string());
            args.push(format!("select-frame function {}", function));
        }

        for command in &self.queued {
            args.push("-ex".to_string());
            args.push(command.clone());
        }
        args
    }
}

/// gdb selects the main thread on attach; any other thread is chosen by LWP.
fn thread_switch(handle: &StackTraceHandle) -> Option<String> {
    let target = &handle.target;
    if target.main_thread || target.thread_id == 0 {
        return None;
    }
    Some(format!(
        "python [t.switch() for t in gdb.selected_inferior().threads() if t.ptid[1] == {}]",
        target.thread_id
    ))
}

/// Innermost function, if `select-frame function` can resolve it
fn parking_function(handle: &StackTraceHandle) -> Option<&str> {
    handle
        .target
        .innermost_function
        .as_deref()
        .filter(|function| is_linespec(function))
}

/// `{{closure}}`, `<T as Trait>::f` and `f::<T>` do not parse as a linespec.
fn is_linespec(function: &str) -> bool {
    !function.is_empty() && !function.contains(['{', '}', '<', '>', ' '])
}

impl DebugBackend for GdbBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Gdb
    }

    fn supports_command_queue(&self) -> bool {
        true
    }

    fn can_position(&self, handle: &StackTraceHandle) -> bool {
        let thread_known = handle.target.main_thread || thread_switch(handle).is_some();
        thread_known && parking_function(handle).is_some()
    }

    fn suppress_output(&mut self) {
        self.suppressed = true;
    }

    fn restore_output(&mut self) {
        if self.suppressed {
            // Show where the silent replay ended up.
            self.queued.push("frame".to_string());
        }
        self.suppressed = false;
    }

    fn queue_commands(&mut self, commands: &[NavCommand]) -> Result<(), BackendError> {
        for command in commands {
            let text = match (command, self.suppressed) {
                (NavCommand::Up, true) => "up-silently",
                (NavCommand::Up, false) => "up",
            };
            self.queued.push(text.to_string());
        }
        Ok(())
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
        self.queued.clear();

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
