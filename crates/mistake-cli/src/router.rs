//! Command routing logic for CLI

use crate::args::{Cli, Commands};
use crate::commands;

/// Route CLI commands to their respective handlers
pub fn route(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Classify { paths, json } => commands::classify::classify(&paths, json),
        Commands::Doctor { json } => commands::doctor::doctor(json),
        Commands::Demo { depth } => commands::demo::demo(depth),
    }
}
