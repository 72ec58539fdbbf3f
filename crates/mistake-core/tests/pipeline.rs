//! End-to-end: classify frames, render, then launch a debugger at the anchor

use mistake_core::classify::NoPackageIndex;
use mistake_core::debugger::{
    BackendError, BackendKind, DebugBackend, LaunchState, Launcher, NavCommand, SessionContext,
    StackTraceHandle,
};
use mistake_core::trace::{ExceptionSummary, Formatter, StackFrame, StyleOptions, capture_frames};
use mistake_core::{Classifier, ClassifierConfig};
use mockall::mock;
use std::path::Path;
use tempfile::TempDir;

mock! {
    pub Backend {}

    impl DebugBackend for Backend {
        fn name(&self) -> &str;
        fn kind(&self) -> BackendKind;
        fn supports_command_queue(&self) -> bool;
        fn can_position(&self, handle: &StackTraceHandle) -> bool;
        fn suppress_output(&mut self);
        fn restore_output(&mut self);
        fn queue_commands(&mut self, commands: &[NavCommand]) -> Result<(), BackendError>;
        fn interact(&mut self, handle: &StackTraceHandle) -> Result<(), BackendError>;
    }
}

/// A project checkout and a registry checkout side by side
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        for (rel, body) in [
            ("project/src/main.rs", "fn main() {\n    app::run();\n}\n"),
            (
                "project/src/app.rs",
                "pub fn run() {\n    load();\n}\nfn load() {\n    dep::parse();\n}\n",
            ),
            (
                ".cargo/registry/src/index/dep-1.2.0/src/lib.rs",
                "pub fn parse() {\n    inner();\n}\nfn inner() {\n    panic!();\n}\n",
            ),
        ] {
            let path = dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }
        Self { dir }
    }

    fn path(&self, rel: &str) -> std::path::PathBuf {
        self.dir.path().join(rel)
    }

    fn classifier(&self) -> Classifier {
        let allow = self.path("project").display().to_string();
        Classifier::new(ClassifierConfig::with_lists(&allow, ".cargo"))
            .with_package_index(NoPackageIndex)
    }

    /// Outermost first: main, run, load, then two dependency frames
    fn frames(&self) -> Vec<StackFrame> {
        let lib = ".cargo/registry/src/index/dep-1.2.0/src/lib.rs";
        vec![
            StackFrame::new("app::main").at(self.path("project/src/main.rs"), 2),
            StackFrame::new("app::run").at(self.path("project/src/app.rs"), 2),
            StackFrame::new("app::load").at(self.path("project/src/app.rs"), 5),
            StackFrame::new("dep::parse").at(self.path(lib), 2),
            StackFrame::new("dep::inner").at(self.path(lib), 5),
        ]
    }
}

fn is_local<'a>(classifier: &'a Classifier) -> impl Fn(&StackFrame) -> bool + 'a {
    move |frame| {
        frame
            .file
            .as_deref()
            .is_some_and(|file| classifier.is_local_source(file))
    }
}

#[test]
fn test_render_then_launch_moves_up_to_last_local_frame() {
    let ws = Workspace::new();
    let classifier = ws.classifier();
    let frames = ws.frames();
    let mut ctx = SessionContext::new();

    let formatter = Formatter::new(StyleOptions::plain());
    let summary =
        ExceptionSummary::new("thread 'main' panicked at dep/src/lib.rs:5:5", "explicit panic");
    let trace = formatter.render(&summary, &frames, is_local(&classifier), &mut ctx);

    assert_eq!(trace.span.anchor_index, Some(2));
    assert_eq!(ctx.pending(), Some(2));
    let text = trace.to_text();
    assert!(text.contains("> app::load"));
    assert!(text.contains("\n   dep::parse"));

    let mut backend = MockBackend::new();
    backend.expect_name().return_const("gdb".to_string());
    backend.expect_supports_command_queue().return_const(true);
    backend.expect_can_position().return_const(true);
    backend.expect_suppress_output().times(1).return_const(());
    backend
        .expect_queue_commands()
        .withf(|cmds| cmds == [NavCommand::Up, NavCommand::Up])
        .times(1)
        .returning(|_| Ok(()));
    backend.expect_restore_output().times(1).return_const(());
    backend
        .expect_interact()
        .withf(|handle| handle.target.innermost_function.as_deref() == Some("dep::inner"))
        .times(1)
        .returning(|_| Ok(()));

    let mut launcher = Launcher::with_backend(Box::new(backend));
    let handle = StackTraceHandle::for_current_thread(frames);
    let outcome = launcher.launch_post_mortem(&mut ctx, &handle).unwrap();

    assert_eq!(outcome.replayed, 2);
    assert_eq!(launcher.state(), LaunchState::Terminated);
    assert!(!ctx.is_published());
}

#[test]
fn test_locate_without_rendering_still_publishes() {
    let ws = Workspace::new();
    let classifier = ws.classifier();
    let mut ctx = SessionContext::new();

    let span = Formatter::locate_and_publish(&ws.frames(), is_local(&classifier), &mut ctx);
    assert_eq!(span.anchor_index, Some(2));
    assert_eq!(ctx.pending(), Some(2));
}

#[test]
fn test_nothing_local_launches_at_innermost_frame() {
    let ws = Workspace::new();
    let classifier = Classifier::new(ClassifierConfig::with_lists("", ".cargo:project"))
        .with_package_index(NoPackageIndex);
    let mut ctx = SessionContext::new();

    let trace = Formatter::new(StyleOptions::plain()).render(
        &ExceptionSummary::new("panicked", "x"),
        &ws.frames(),
        is_local(&classifier),
        &mut ctx,
    );
    assert_eq!(trace.span.anchor_index, None);
    assert!(!trace.to_text().contains('>'));

    let mut backend = MockBackend::new();
    backend.expect_name().return_const("gdb".to_string());
    backend.expect_supports_command_queue().return_const(true);
    backend.expect_can_position().return_const(true);
    backend.expect_suppress_output().return_const(());
    backend
        .expect_queue_commands()
        .withf(|cmds| cmds.is_empty())
        .returning(|_| Ok(()));
    backend.expect_restore_output().return_const(());
    backend.expect_interact().returning(|_| Ok(()));

    let outcome = Launcher::with_backend(Box::new(backend))
        .launch_post_mortem(&mut ctx, &StackTraceHandle::for_current_thread(ws.frames()))
        .unwrap();
    assert_eq!(outcome.replayed, 0);
}

#[test]
fn test_launch_before_render_is_rejected() {
    let mut backend = MockBackend::new();
    backend.expect_name().return_const("gdb".to_string());
    backend.expect_interact().times(0);

    let err = Launcher::with_backend(Box::new(backend))
        .launch_post_mortem(
            &mut SessionContext::new(),
            &StackTraceHandle::for_current_thread(Vec::new()),
        )
        .unwrap_err();
    assert!(err.to_string().contains("no frame offset was published"));
}

#[inline(never)]
fn captures_local_frames() -> Vec<StackFrame> {
    capture_frames()
}

#[test]
fn test_captured_stack_classifies_this_file_as_local() {
    let frames = captures_local_frames();
    let this = frames
        .iter()
        .find(|frame| frame.function.contains("captures_local_frames"))
        .expect("the capturing function should be on the stack");
    assert!(!frames.iter().any(|frame| {
        frame.function.contains("capture_frames") && frame.function.starts_with("mistake_core")
    }));

    let Some(file) = this.file.as_deref() else {
        // No line tables in this build.
        return;
    };
    assert!(file.ends_with("tests/pipeline.rs"), "{}", file.display());

    let root = Path::new(env!("CARGO_MANIFEST_DIR")).display().to_string();
    let classifier = Classifier::new(ClassifierConfig::with_lists(&root, ""))
        .with_package_index(NoPackageIndex);
    assert!(classifier.is_local_source(file));
}

fn has_frame(frames: &[StackFrame], name: &str) -> bool {
    frames.iter().any(|frame| frame.function.contains(name))
}

#[inline(never)]
fn runs_under_catch_unwind() -> Vec<StackFrame> {
    std::panic::catch_unwind(captures_local_frames).unwrap()
}

#[test]
fn test_captured_stack_keeps_frames_inside_catch_unwind() {
    let frames = runs_under_catch_unwind();
    if !has_frame(&frames, "runs_under_catch_unwind") {
        // Symbols stripped.
        return;
    }
    assert!(has_frame(&frames, "captures_local_frames"));
    assert!(frames.last().unwrap().function.contains("captures_local_frames"));
}

#[inline(never)]
fn calls_boxed(f: Box<dyn Fn() -> Vec<StackFrame> + Send>) -> Vec<StackFrame> {
    f()
}

#[test]
fn test_captured_stack_keeps_boxed_closure_on_spawned_thread() {
    let frames = std::thread::spawn(|| calls_boxed(Box::new(captures_local_frames)))
        .join()
        .unwrap();
    if !has_frame(&frames, "calls_boxed") {
        return;
    }
    assert!(frames.last().unwrap().function.contains("captures_local_frames"));
}
