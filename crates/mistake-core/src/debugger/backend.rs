//! Debugger backend adapter interface
//!
//! A backend always starts at the innermost frame. What it may additionally
//! offer is a queue of startup navigation commands and a way to keep their
//! output quiet; the launcher asks for both through this trait.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::trace::StackFrame;

/// Debugger families mistake knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// gdb: attaches, accepts queued commands, can navigate silently
    Gdb,
    /// lldb: attaches, no quiet startup queue
    Lldb,
}

impl BackendKind {
    /// Parse a user-supplied name
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gdb" | "rust-gdb" => Some(Self::Gdb),
            "lldb" | "rust-lldb" => Some(Self::Lldb),
            _ => None,
        }
    }

    /// Executables to look for, best first
    pub fn executables(&self) -> &'static [&'static str] {
        match self {
            Self::Gdb => &["rust-gdb", "gdb"],
            Self::Lldb => &["rust-lldb", "lldb"],
        }
    }

    /// Preference order used when nothing is forced
    pub fn preference_order() -> [Self; 2] {
        [Self::Gdb, Self::Lldb]
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gdb => write!(f, "gdb"),
            Self::Lldb => write!(f, "lldb"),
        }
    }
}

/// Startup navigation command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    /// Move to the caller's frame
    Up,
}

/// Backend failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("failed to start {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("{program} exited with status {code:?}")]
    Exited { program: String, code: Option<i32> },

    #[error("{backend} does not support {capability}")]
    Unsupported {
        backend: String,
        capability: &'static str,
    },
}

/// Identity of the process and thread a debugger should attach to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugTarget {
    pub pid: u32,
    pub thread_id: u64,
    pub main_thread: bool,
    /// Innermost frame the user was shown; the debugger is parked here first
    pub innermost_function: Option<String>,
}

impl DebugTarget {
    /// The calling thread of the current process
    pub fn current_thread() -> Self {
        let pid = std::process::id();
        let thread_id = current_thread_id();
        let main_thread = if cfg!(target_os = "linux") {
            thread_id == u64::from(pid)
        } else {
            std::thread::current().name() == Some("main")
        };
        Self {
            pid,
            thread_id,
            main_thread,
            innermost_function: None,
        }
    }
}

#[cfg(target_os = "linux")]
fn current_thread_id() -> u64 {
    // SAFETY: gettid has no preconditions and cannot fail.
    let tid = unsafe { libc::syscall(libc::SYS_gettid) };
    u64::try_from(tid).unwrap_or_default()
}

#[cfg(not(target_os = "linux"))]
fn current_thread_id() -> u64 {
    0
}

/// The stack a post-mortem session is opened against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTraceHandle {
    pub frames: Vec<StackFrame>,
    pub target: DebugTarget,
}

impl StackTraceHandle {
    pub fn new(frames: Vec<StackFrame>, mut target: DebugTarget) -> Self {
        target.innermost_function = frames.last().map(|frame| frame.function.clone());
        Self { frames, target }
    }

    /// Handle for `frames` on the calling thread
    pub fn for_current_thread(frames: Vec<StackFrame>) -> Self {
        Self::new(frames, DebugTarget::current_thread())
    }
}

/// Narrow interface every debugger adapter implements
#[cfg_attr(test, mockall::automock)]
pub trait DebugBackend: Send {
    /// Executable or adapter name, for messages
    fn name(&self) -> &str;

    fn kind(&self) -> BackendKind;

    /// Whether startup navigation commands can be queued
    fn supports_command_queue(&self) -> bool;

    /// Whether the session is known to start on the handle's innermost frame,
    /// so queued moves land where they should
    fn can_position(&self, handle: &StackTraceHandle) -> bool;

    /// Stop showing the backend's own output until `restore_output`
    fn suppress_output(&mut self);

    fn restore_output(&mut self);

    /// Queue commands to run before the user gets the prompt
    fn queue_commands(&mut self, commands: &[NavCommand]) -> Result<(), BackendError>;

    /// Start the session and block until the user leaves it
    fn interact(&mut self, handle: &StackTraceHandle) -> Result<(), BackendError>;
}
