//! `mistake demo`: panic through nested local frames
//!
//! The innermost local frame parses a port number and the parse failure
//! surfaces inside `core`, so the rendered trace shows emphasized local frames
//! followed by library frames, and the debugger has to move up to reach
//! `read_port`.

use colored::*;
use mistake_core::hook::{InstallOutcome, install};
use mistake_core::MistakeSettings;

/// Install the hook, then panic `depth` frames down
pub fn demo(depth: usize) -> anyhow::Result<()> {
    match install(MistakeSettings::from_env()) {
        InstallOutcome::Installed { backend } => match backend {
            Some(name) => eprintln!("{} hook installed, debugger: {}", "✓".green().bold(), name),
            None => eprintln!("{} hook installed, no debugger available", "⚠".yellow().bold()),
        },
        InstallOutcome::Disabled => eprintln!(
            "{} MISTAKE_DISABLE=1, showing the default panic output",
            "⚠".yellow().bold()
        ),
        InstallOutcome::NotAttended => eprintln!(
            "{} not an interactive terminal, showing the default panic output",
            "⚠".yellow().bold()
        ),
        InstallOutcome::AlreadyInstalled => {}
    }

    let port = descend(depth.max(1), "eighty");
    println!("unreachable: parsed port {}", port);
    Ok(())
}

#[inline(never)]
fn descend(remaining: usize, raw: &str) -> u16 {
    if remaining <= 1 {
        read_port(raw)
    } else {
        descend(remaining - 1, raw)
    }
}

#[inline(never)]
fn read_port(raw: &str) -> u16 {
    // Panicking is the point of the demo.
    raw.parse().expect("port must be a number")
}
