//! The panic hook body

use parking_lot::Mutex;
use std::cell::Cell;
use std::fmt;
use std::io::Write;
use std::panic::PanicHookInfo;
use std::sync::Arc;

use crate::classify::Classifier;
use crate::config::MistakeSettings;
use crate::debugger::{LaunchError, LaunchOutcome, Launcher, SessionContext, StackTraceHandle};
use crate::trace::{EmphasisSpan, ExceptionSummary, Formatter, StackFrame, capture_frames};

/// The hook that was installed before ours
pub type PreviousHook = Arc<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

thread_local! {
    static IN_HANDLER: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as running the handler until dropped
pub struct ReentrancyGuard {
    outer: bool,
}

impl ReentrancyGuard {
    pub fn enter() -> Self {
        let outer = IN_HANDLER.with(|flag| flag.replace(true));
        Self { outer }
    }

    pub fn active() -> bool {
        IN_HANDLER.with(Cell::get)
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        IN_HANDLER.with(|flag| flag.set(self.outer));
    }
}

/// Why a panic was handed to the previous hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferral {
    /// Panicked while the handler was already running on this thread
    Nested,
    /// A debugger is already attached to the process
    Traced,
    /// Another thread is being reported right now
    Busy,
}

impl fmt::Display for Deferral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nested => write!(f, "nested panic inside the handler"),
            Self::Traced => write!(f, "process is already being debugged"),
            Self::Busy => write!(f, "another panic is being reported"),
        }
    }
}

/// What the handler did for one panic
#[derive(Debug)]
pub struct Report {
    pub span: EmphasisSpan,
    /// The trace as printed, when the custom renderer is on
    pub rendered: Option<String>,
    /// Debugger launch result, when post-mortem debugging is on
    pub launch: Option<Result<LaunchOutcome, LaunchError>>,
}

/// Mutable state shared by every invocation of the hook
#[derive(Debug)]
pub struct HandlerState {
    pub settings: MistakeSettings,
    pub classifier: Classifier,
    pub formatter: Formatter,
    pub launcher: Launcher,
    pub ctx: SessionContext,
}

impl HandlerState {
    pub fn new(
        settings: MistakeSettings,
        classifier: Classifier,
        formatter: Formatter,
        launcher: Launcher,
    ) -> Self {
        Self {
            settings,
            classifier,
            formatter,
            launcher,
            ctx: SessionContext::new(),
        }
    }
}

pub struct PanicHandler {
    state: Mutex<HandlerState>,
    previous: Option<PreviousHook>,
    is_traced: fn() -> bool,
}

impl fmt::Debug for PanicHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanicHandler")
            .field("has_previous", &self.previous.is_some())
            .finish()
    }
}

impl PanicHandler {
    pub fn new(state: HandlerState) -> Self {
        Self {
            state: Mutex::new(state),
            previous: None,
            is_traced: || false,
        }
    }

    pub fn with_previous(mut self, previous: PreviousHook) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn with_tracer_check(mut self, is_traced: fn() -> bool) -> Self {
        self.is_traced = is_traced;
        self
    }

    /// Whether the current panic should go to the previous hook instead
    pub fn deferral(&self) -> Option<Deferral> {
        if ReentrancyGuard::active() {
            Some(Deferral::Nested)
        } else if (self.is_traced)() {
            Some(Deferral::Traced)
        } else {
            None
        }
    }

    fn call_previous(&self, info: &PanicHookInfo<'_>) {
        if let Some(previous) = &self.previous {
            previous(info);
        }
    }

    /// Entry point installed with `std::panic::set_hook`
    pub fn handle(&self, info: &PanicHookInfo<'_>) {
        if let Some(reason) = self.deferral() {
            tracing::debug!("deferring to previous hook: {}", reason);
            self.call_previous(info);
            return;
        }

        let _guard = ReentrancyGuard::enter();
        let summary = ExceptionSummary::from_panic(info);
        let frames = capture_frames();
        let mut stderr = std::io::stderr();

        match self.report(&summary, frames, &|| self.call_previous(info), &mut stderr) {
            Ok(report) => {
                tracing::debug!("reported panic, anchor {:?}", report.span.anchor_index)
            }
            Err(reason) => {
                tracing::debug!("deferring to previous hook: {}", reason);
                self.call_previous(info);
            }
        }
    }

    /// Render `frames`, publish the anchor offset and start the debugger.
    ///
    /// `fallback` prints the trace when the custom renderer is off. Errors are
    /// written to `out` and never propagated.
    pub fn report(
        &self,
        summary: &ExceptionSummary,
        frames: Vec<StackFrame>,
        fallback: &dyn Fn(),
        out: &mut dyn Write,
    ) -> Result<Report, Deferral> {
        let mut guard = self.state.try_lock().ok_or(Deferral::Busy)?;
        let HandlerState {
            settings,
            classifier,
            formatter,
            launcher,
            ctx,
        } = &mut *guard;

        let is_local = |frame: &StackFrame| {
            frame
                .file
                .as_deref()
                .is_some_and(|file| classifier.is_local_source(file))
        };

        let (span, rendered) = if settings.custom_traceback {
            let trace = formatter.render(summary, &frames, is_local, ctx);
            let text = trace.to_text();
            if let Err(e) = out.write_all(text.as_bytes()) {
                tracing::warn!("failed to write trace: {}", e);
            }
            (trace.span, Some(text))
        } else {
            fallback();
            (Formatter::locate_and_publish(&frames, is_local, ctx), None)
        };

        let launch = if settings.debug_uncaught {
            let handle = StackTraceHandle::for_current_thread(frames);
            let result = launcher.launch_post_mortem(ctx, &handle);
            if let Err(e) = &result {
                let _ = writeln!(out, "mistake: {}", e);
            }
            Some(result)
        } else {
            ctx.clear();
            None
        };

        Ok(Report {
            span,
            rendered,
            launch,
        })
    }
}
