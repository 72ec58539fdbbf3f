//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Frame depth used by `mistake demo` when none is given
pub const DEFAULT_DEMO_DEPTH: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "mistake")]
#[command(about = "Emphasize your own frames in panic backtraces and debug them post-mortem")]
#[command(
    long_about = r#"Emphasize your own frames in panic backtraces and debug them post-mortem

USAGE:
  mistake classify src/main.rs   # Is this file developed locally, and why
  mistake doctor                 # Can a debugger attach in this session
  mistake demo --depth 4         # Panic through four local frames

ENVIRONMENT:
  MISTAKE_DISABLE=1              # Never install the hook
  MISTAKE_TRACEBACK=0            # Keep the default panic output
  MISTAKE_DEBUG_UNCAUGHT=0       # Print the trace but do not start a debugger
  MISTAKE_DEV_DIRS=a:b           # Allow-list (default: home directory)
  MISTAKE_NON_DEV_DIRS=a:b       # Deny-list (default: .cargo, .rustup)
  MISTAKE_DEBUGGER=gdb|lldb      # Force a debugger
  MISTAKE_DEBUG=1                # Trace classification decisions"#
)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Explain how source files are classified
    Classify {
        /// Files to classify
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print verdicts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the environment for post-mortem debugging
    Doctor {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Install the hook and panic on purpose
    Demo {
        /// Number of nested local frames before the panic
        #[arg(long, default_value_t = DEFAULT_DEMO_DEPTH)]
        depth: usize,
    },
}
