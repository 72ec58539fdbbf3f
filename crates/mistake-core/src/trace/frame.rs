//! Stack frame snapshots and backtrace capture
//!
//! The standard library does not expose backtrace frames programmatically, so
//! the captured backtrace is rendered with `Display` and parsed back. Frames
//! come out innermost first and are reversed so index 0 is the outermost call.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::backtrace::Backtrace;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::classify::paths;

/// One call-stack entry at panic time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    pub function: String,
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub source_line: Option<String>,
}

impl StackFrame {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            file: None,
            line: None,
            column: None,
            source_line: None,
        }
    }

    pub fn at(mut self, file: impl Into<PathBuf>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_line = Some(source.into());
        self
    }

    /// `file:line:column`, as much of it as is known
    pub fn location(&self) -> String {
        let Some(file) = &self.file else {
            return "<unknown>".to_string();
        };
        match (self.line, self.column) {
            (Some(line), Some(column)) => format!("{}:{}:{}", file.display(), line, column),
            (Some(line), None) => format!("{}:{}", file.display(), line),
            _ => file.display().to_string(),
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.function, self.location())
    }
}

static FRAME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d+:\s+)?(\S.*?)\s*$").expect("valid frame regex"));
static LOCATION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+at\s+(.+?)(?::(\d+))?(?::(\d+))?\s*$").expect("valid location regex")
});

/// Symbols that sit between the capture point and the code that panicked:
/// the backtrace itself, this crate's hook, the boxed hook shim and the
/// panic entry points.
const PANIC_MACHINERY: &[&str] = &[
    "std::backtrace",
    "std::backtrace_rs",
    "std::panicking::rust_panic",
    "std::panicking::panic_with_hook",
    "std::panicking::begin_panic",
    "std::panicking::default_hook",
    "core::panicking::",
    "rust_begin_unwind",
    "__rustc::rust_begin_unwind",
    "std::sys::backtrace::__rust_end_short_backtrace",
    "std::sys_common::backtrace::__rust_end_short_backtrace",
    "std::sys::pal::unix::backtrace",
    "mistake_core::",
    "mistake::",
    "<alloc::boxed::Box<F,A> as core::ops::function::Fn<Args>>::call",
];

/// Marker the runtime puts just outside `main` and thread entry points
const ENTRY_MARKER: &str = "__rust_begin_short_backtrace";

fn is_panic_machinery(function: &str) -> bool {
    PANIC_MACHINERY
        .iter()
        .any(|prefix| function.starts_with(prefix))
}

/// Parse the `Display` form of a backtrace into frames, innermost first.
///
/// Relative paths (the short format prints `./src/...`) are resolved against `cwd`.
pub fn parse_backtrace(text: &str, cwd: &Path) -> Vec<StackFrame> {
    let mut frames: Vec<StackFrame> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = LOCATION_LINE.captures(line) {
            let Some(frame) = frames.last_mut() else {
                continue;
            };
            let file = Path::new(&caps[1]);
            frame.file = Some(paths::absolutize(file, cwd));
            frame.line = caps.get(2).and_then(|m| m.as_str().parse().ok());
            frame.column = caps.get(3).and_then(|m| m.as_str().parse().ok());
            continue;
        }

        if let Some(caps) = FRAME_LINE.captures(line) {
            frames.push(StackFrame::new(&caps[1]));
        }
    }

    frames
}

/// Drop panic machinery (innermost side) and runtime entry frames (outermost
/// side), then reorder outermost first.
///
/// Only the unbroken run of machinery frames at the innermost end is
/// dropped. The same symbols further out (`catch_unwind`, a `Box<dyn Fn>`
/// call) belong to the user's side of the stack and are kept.
pub fn trim_and_order(mut innermost_first: Vec<StackFrame>) -> Vec<StackFrame> {
    if let Some(entry) = innermost_first
        .iter()
        .position(|frame| frame.function.contains(ENTRY_MARKER))
    {
        innermost_first.truncate(entry);
    }

    let machinery = innermost_first
        .iter()
        .take_while(|frame| is_panic_machinery(&frame.function))
        .count();
    innermost_first.drain(..machinery);

    innermost_first.reverse();
    innermost_first
}

/// Read the 1-based `line` of `file`, trimmed
pub fn read_source_line(file: &Path, line: u32) -> Option<String> {
    let index = usize::try_from(line).ok()?.checked_sub(1)?;
    let content = std::fs::read_to_string(file).ok()?;
    content
        .lines()
        .nth(index)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Fill in `source_line` for frames whose file is readable
pub fn attach_source_lines(frames: &mut [StackFrame]) {
    for frame in frames.iter_mut() {
        if frame.source_line.is_some() {
            continue;
        }
        if let (Some(file), Some(line)) = (&frame.file, frame.line) {
            frame.source_line = read_source_line(file, line);
        }
    }
}

/// Capture the current thread's stack, outermost first, without panic
/// machinery frames.
pub fn capture_frames() -> Vec<StackFrame> {
    let backtrace = Backtrace::force_capture();
    let cwd = paths::current_dir_or_root();
    let mut frames = trim_and_order(parse_backtrace(&backtrace.to_string(), &cwd));
    attach_source_lines(&mut frames);
    frames
}
