//! Stack capture and rendering

mod frame;
mod render;
mod style;

pub use frame::{
    StackFrame, attach_source_lines, capture_frames, parse_backtrace, read_source_line,
    trim_and_order,
};
pub use render::{
    EmphasisSpan, ExceptionSummary, Formatter, RenderedTrace, StyleOptions, TRACE_HEADER,
};
pub use style::{Painter, Style};

use std::panic::PanicHookInfo;

/// Extract the panic payload as text
pub fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

impl ExceptionSummary {
    /// Summary in the shape of the default panic message
    pub fn from_panic(info: &PanicHookInfo<'_>) -> Self {
        let thread = std::thread::current();
        let name = thread.name().unwrap_or("<unnamed>");
        let kind = match info.location() {
            Some(location) => format!("thread '{}' panicked at {}", name, location),
            None => format!("thread '{}' panicked", name),
        };
        Self::new(kind, panic_message(info))
    }
}
