//! Backtrace rendering with emphasis on locally developed frames
//!
//! The deepest frame accepted by the predicate is the anchor. Frames up to and
//! including the anchor get the emphasis scheme, frames below it are
//! de-emphasized, and the distance from the anchor to the innermost frame is
//! published for the debugger launcher.

use colored::Color;
use serde::Serialize;
use std::fmt;

use super::frame::StackFrame;
use super::style::{Painter, Style};
use crate::debugger::SessionContext;

/// First line of every rendered trace
pub const TRACE_HEADER: &str = "stack backtrace (most recent call last):";

/// Where emphasis ends and how far the anchor is from the innermost frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EmphasisSpan {
    pub anchor_index: Option<usize>,
    pub frames_below_anchor: usize,
}

impl EmphasisSpan {
    /// Span for `frame_count` frames with the given anchor
    pub fn new(frame_count: usize, anchor_index: Option<usize>) -> Self {
        let frames_below_anchor = anchor_index
            .map(|anchor| frame_count.saturating_sub(1).saturating_sub(anchor))
            .unwrap_or(0);
        Self {
            anchor_index,
            frames_below_anchor,
        }
    }

    pub fn is_emphasized(&self, index: usize) -> bool {
        self.anchor_index.is_some_and(|anchor| index <= anchor)
    }
}

/// The one-line description of what went wrong
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionSummary {
    pub kind: String,
    pub message: String,
}

impl ExceptionSummary {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ExceptionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

/// Rendering knobs
#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub emphasis_prefix: String,
    pub deemphasis_prefix: String,
    /// Replace the line's leading characters with the prefix instead of prepending
    pub emphasis_prefix_replace: bool,
    pub deemphasis_prefix_replace: bool,
    pub emphasis_prefix_style: Option<Style>,
    pub emphasis_line_style: Option<Style>,
    pub deemphasis_line_style: Option<Style>,
    /// Blank line before the first de-emphasized frame
    pub post_emphasis_delim: bool,
    /// Blank line before the summary
    pub pre_summary_delim: bool,
    pub painter: Painter,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            emphasis_prefix: ">".to_string(),
            deemphasis_prefix: " ".to_string(),
            emphasis_prefix_replace: true,
            deemphasis_prefix_replace: false,
            emphasis_prefix_style: Some(Style::new().fg(Color::Red).bold()),
            emphasis_line_style: Some(Style::new().bold()),
            deemphasis_line_style: None,
            post_emphasis_delim: true,
            pre_summary_delim: true,
            painter: Painter::detect(),
        }
    }
}

impl StyleOptions {
    /// Defaults with styling disabled
    pub fn plain() -> Self {
        Self {
            painter: Painter::Plain,
            ..Self::default()
        }
    }

    pub fn with_painter(mut self, painter: Painter) -> Self {
        self.painter = painter;
        self
    }
}

/// Output of [`Formatter::render`]
///
/// `lines` is `[header, one block per frame, summary]`; a frame block holds
/// several physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTrace {
    pub lines: Vec<String>,
    pub span: EmphasisSpan,
}

impl RenderedTrace {
    /// All lines joined, newline terminated
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// Renders stack traces
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    options: StyleOptions,
}

enum Scheme {
    Plain,
    Emphasis,
    Deemphasis,
}

impl Formatter {
    pub fn new(options: StyleOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &StyleOptions {
        &self.options
    }

    /// Find the deepest frame accepted by `predicate`
    pub fn locate<P>(frames: &[StackFrame], predicate: P) -> EmphasisSpan
    where
        P: Fn(&StackFrame) -> bool,
    {
        let anchor = frames.iter().rposition(predicate);
        EmphasisSpan::new(frames.len(), anchor)
    }

    /// Locate the anchor and publish its offset without rendering anything
    pub fn locate_and_publish<P>(
        frames: &[StackFrame],
        predicate: P,
        ctx: &mut SessionContext,
    ) -> EmphasisSpan
    where
        P: Fn(&StackFrame) -> bool,
    {
        let span = Self::locate(frames, predicate);
        ctx.publish(span.frames_below_anchor);
        span
    }

    /// Render `frames` (outermost first) followed by `summary`.
    pub fn render<P>(
        &self,
        summary: &ExceptionSummary,
        frames: &[StackFrame],
        predicate: P,
        ctx: &mut SessionContext,
    ) -> RenderedTrace
    where
        P: Fn(&StackFrame) -> bool,
    {
        let span = Self::locate_and_publish(frames, predicate, ctx);
        tracing::debug!(
            "anchor {:?} of {} frames, {} below",
            span.anchor_index,
            frames.len(),
            span.frames_below_anchor
        );

        let mut lines = Vec::with_capacity(frames.len() + 2);
        lines.push(TRACE_HEADER.to_string());

        let mut delim_pending = self.options.post_emphasis_delim;
        for (index, frame) in frames.iter().enumerate() {
            let scheme = match span.anchor_index {
                None => Scheme::Plain,
                Some(_) if span.is_emphasized(index) => Scheme::Emphasis,
                Some(_) => Scheme::Deemphasis,
            };

            let mut block = self.render_frame(frame, &scheme);
            if matches!(scheme, Scheme::Deemphasis) && delim_pending {
                block.insert(0, '\n');
                delim_pending = false;
            }
            lines.push(block);
        }

        let mut summary_line = summary.to_string();
        if self.options.pre_summary_delim {
            summary_line.insert(0, '\n');
        }
        lines.push(summary_line);

        RenderedTrace { lines, span }
    }

    fn frame_lines(frame: &StackFrame) -> Vec<String> {
        let mut out = vec![
            format!("  {}", frame.function),
            format!("      at {}", frame.location()),
        ];
        if let Some(source) = &frame.source_line {
            out.push(format!("        {}", source));
        }
        out
    }

    fn render_frame(&self, frame: &StackFrame, scheme: &Scheme) -> String {
        Self::frame_lines(frame)
            .iter()
            .map(|line| match scheme {
                Scheme::Plain => line.clone(),
                Scheme::Emphasis => self.modify_line(line, true),
                Scheme::Deemphasis => self.modify_line(line, false),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn modify_line(&self, line: &str, emphasize: bool) -> String {
        let opts = &self.options;
        let (prefix, replace, line_style) = if emphasize {
            (
                &opts.emphasis_prefix,
                opts.emphasis_prefix_replace,
                opts.emphasis_line_style.as_ref(),
            )
        } else {
            (
                &opts.deemphasis_prefix,
                opts.deemphasis_prefix_replace,
                opts.deemphasis_line_style.as_ref(),
            )
        };

        // Strip before styling; escape sequences must not be cut.
        let body: String = if replace {
            line.chars().skip(prefix.chars().count()).collect()
        } else {
            line.to_string()
        };

        let painted_prefix = if emphasize {
            opts.painter.paint(prefix, opts.emphasis_prefix_style.as_ref())
        } else {
            prefix.clone()
        };
        format!("{}{}", painted_prefix, opts.painter.paint(&body, line_style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: usize) -> Vec<StackFrame> {
        (0..n)
            .map(|i| {
                StackFrame::new(format!("app::f{}", i)).at(format!("/src/f{}.rs", i), i as u32 + 1)
            })
            .collect()
    }

    fn local_at(indices: &'static [usize]) -> impl Fn(&StackFrame) -> bool {
        move |frame: &StackFrame| {
            indices
                .iter()
                .any(|i| frame.function == format!("app::f{}", i))
        }
    }

    #[test]
    fn test_anchor_is_last_match() {
        let stack = frames(8);
        let span = Formatter::locate(&stack, local_at(&[2, 5]));
        assert_eq!(span.anchor_index, Some(5));
        assert_eq!(span.frames_below_anchor, 8 - 1 - 5);
    }

    #[test]
    fn test_no_match_has_no_anchor() {
        let stack = frames(4);
        let span = Formatter::locate(&stack, |_| false);
        assert_eq!(span, EmphasisSpan::default());
    }

    #[test]
    fn test_all_match_anchor_is_innermost() {
        let stack = frames(4);
        let span = Formatter::locate(&stack, |_| true);
        assert_eq!(span.anchor_index, Some(3));
        assert_eq!(span.frames_below_anchor, 0);
    }

    #[test]
    fn test_render_publishes_offset() {
        let mut ctx = SessionContext::new();
        let formatter = Formatter::new(StyleOptions::plain());
        let summary = ExceptionSummary::new("thread 'main' panicked at src/main.rs:3:5", "boom");

        let trace = formatter.render(&summary, &frames(6), local_at(&[1]), &mut ctx);
        assert_eq!(trace.span.anchor_index, Some(1));
        assert_eq!(ctx.pending(), Some(4));

        let trace = formatter.render(&summary, &frames(6), |_| false, &mut ctx);
        assert_eq!(trace.span.anchor_index, None);
        assert_eq!(ctx.pending(), Some(0));
    }

    #[test]
    fn test_render_layout() {
        let mut ctx = SessionContext::new();
        let formatter = Formatter::new(StyleOptions::plain());
        let summary = ExceptionSummary::new("thread 'main' panicked at src/main.rs:3:5", "boom");
        let stack = frames(3);

        let trace = formatter.render(&summary, &stack, local_at(&[1]), &mut ctx);
        assert_eq!(trace.lines.len(), 1 + 3 + 1);
        assert_eq!(trace.lines[0], TRACE_HEADER);
        assert_eq!(
            trace.lines[1],
            "> app::f0\n>     at /src/f0.rs:1"
        );
        assert_eq!(
            trace.lines[2],
            "> app::f1\n>     at /src/f1.rs:2"
        );
        // Delimiter, then the de-emphasis prefix prepended
        assert_eq!(
            trace.lines[3],
            "\n   app::f2\n       at /src/f2.rs:3"
        );
        assert_eq!(
            trace.lines[4],
            "\nthread 'main' panicked at src/main.rs:3:5: boom"
        );
    }

    #[test]
    fn test_render_without_anchor_is_unstyled() {
        let mut ctx = SessionContext::new();
        let formatter = Formatter::new(StyleOptions::plain());
        let summary = ExceptionSummary::new("panicked", "x");
        let stack = vec![StackFrame::new("lib::g").at("/x.rs", 9).with_source("g();")];

        let trace = formatter.render(&summary, &stack, |_| false, &mut ctx);
        assert_eq!(trace.lines[1], "  lib::g\n      at /x.rs:9\n        g();");
    }

    #[test]
    fn test_empty_stack() {
        let mut ctx = SessionContext::new();
        let formatter = Formatter::new(StyleOptions::plain());
        let summary = ExceptionSummary::new("panicked", "empty");

        let trace = formatter.render(&summary, &[], |_| true, &mut ctx);
        assert_eq!(trace.lines.len(), 2);
        assert_eq!(trace.lines[0], TRACE_HEADER);
        assert_eq!(trace.span.anchor_index, None);
        assert_eq!(ctx.pending(), Some(0));
    }

    #[test]
    fn test_plain_rendering_is_repeatable() {
        let formatter = Formatter::new(StyleOptions::plain());
        let summary = ExceptionSummary::new("panicked", "again");
        let stack = frames(5);

        let first = formatter.render(&summary, &stack, local_at(&[2]), &mut SessionContext::new());
        let second = formatter.render(&summary, &stack, local_at(&[2]), &mut SessionContext::new());
        assert_eq!(first.to_text(), second.to_text());
        assert!(!first.to_text().contains('\u{1b}'));
    }

    #[test]
    fn test_text_has_one_header_and_one_summary() {
        let formatter = Formatter::new(StyleOptions::plain());
        let summary = ExceptionSummary::new("thread 'main' panicked at a.rs:1:1", "only once");
        let stack = frames(7);

        let text = formatter
            .render(&summary, &stack, local_at(&[0, 3]), &mut SessionContext::new())
            .to_text();

        assert_eq!(text.matches(TRACE_HEADER).count(), 1);
        assert_eq!(text.matches("only once").count(), 1);
        assert!(text.trim_end().ends_with("only once"));
        for i in 0..7 {
            assert_eq!(text.matches(&format!("app::f{}\n", i)).count(), 1);
        }
        // Exactly one blank delimiter after the anchor
        assert_eq!(text.matches(">     at /src/f3.rs:4\n\n").count(), 1);
    }

    #[test]
    fn test_summary_display_without_message() {
        assert_eq!(ExceptionSummary::new("panicked", "").to_string(), "panicked");
    }
}
