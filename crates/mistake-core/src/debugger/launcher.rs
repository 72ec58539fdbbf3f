//! Post-mortem launch state machine
//!
//! `NotStarted -> AwaitingAnchorCount -> ReplayingNavigation ->
//! InteractivePrompt -> Terminated`. The published anchor offset is consumed
//! exactly once per launch, whatever the outcome.

use serde::Serialize;
use thiserror::Error;

use super::backend::{BackendError, DebugBackend, NavCommand, StackTraceHandle};
use super::session::SessionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchState {
    NotStarted,
    AwaitingAnchorCount,
    ReplayingNavigation,
    InteractivePrompt,
    Terminated,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error(
        "no frame offset was published for this panic; \
         render or locate the trace before launching the debugger"
    )]
    AnchorNotPublished,

    #[error("no supported debugger (gdb or lldb) found on PATH")]
    NoBackend,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// What a finished launch did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchOutcome {
    pub backend: String,
    /// Frames moved up automatically before the prompt
    pub replayed: usize,
    /// Frames the user was asked to move up by hand
    pub manual_steps: Option<usize>,
}

pub struct Launcher {
    backend: Option<Box<dyn DebugBackend>>,
    state: LaunchState,
    history: Vec<LaunchState>,
}

impl std::fmt::Debug for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher")
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("state", &self.state)
            .finish()
    }
}

impl Launcher {
    pub fn new(backend: Option<Box<dyn DebugBackend>>) -> Self {
        Self {
            backend,
            state: LaunchState::NotStarted,
            history: vec![LaunchState::NotStarted],
        }
    }

    pub fn with_backend(backend: Box<dyn DebugBackend>) -> Self {
        Self::new(Some(backend))
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    /// Every state entered by the most recent launch, in order
    pub fn history(&self) -> &[LaunchState] {
        &self.history
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|b| b.name())
    }

    fn enter(&mut self, state: LaunchState) {
        tracing::debug!("launcher {:?} -> {:?}", self.state, state);
        self.state = state;
        self.history.push(state);
    }

    /// Open a debugger on `handle` and move it up to the anchor frame.
    ///
    /// Blocks until the user quits the debugger.
    pub fn launch_post_mortem(
        &mut self,
        ctx: &mut SessionContext,
        handle: &StackTraceHandle,
    ) -> Result<LaunchOutcome, LaunchError> {
        self.state = LaunchState::NotStarted;
        self.history = vec![LaunchState::NotStarted];

        let result = self.run(ctx, handle);
        ctx.clear();
        self.enter(LaunchState::Terminated);

        if let Err(err) = &result {
            tracing::warn!("post-mortem session failed: {}", err);
        }
        result
    }

    fn run(
        &mut self,
        ctx: &SessionContext,
        handle: &StackTraceHandle,
    ) -> Result<LaunchOutcome, LaunchError> {
        self.enter(LaunchState::AwaitingAnchorCount);
        let count = ctx.pending().ok_or(LaunchError::AnchorNotPublished)?;

        if self.backend.is_none() {
            return Err(LaunchError::NoBackend);
        }
        self.enter(LaunchState::ReplayingNavigation);

        let Some(backend) = self.backend.as_deref_mut() else {
            return Err(LaunchError::NoBackend);
        };
        let name = backend.name().to_string();

        let (replayed, manual_steps) =
            if backend.supports_command_queue() && backend.can_position(handle) {
                backend.suppress_output();
                let queued = backend.queue_commands(&vec![NavCommand::Up; count]);
                backend.restore_output();
                queued?;
                (count, None)
            } else {
                if count > 0 {
                    let innermost = handle
                        .target
                        .innermost_function
                        .as_deref()
                        .unwrap_or("<unknown>");
                    eprintln!(
                        "note: {} cannot be positioned on startup; move up {} frame(s) from `{}` \
                         to reach the last local frame",
                        name, count, innermost
                    );
                }
                (0, Some(count))
            };

        self.state = LaunchState::InteractivePrompt;
        self.history.push(LaunchState::InteractivePrompt);
        tracing::debug!("launcher -> InteractivePrompt via {}", name);
        backend.interact(handle)?;

        Ok(LaunchOutcome {
            backend: name,
            replayed,
            manual_steps,
        })
    }
}
