//! Command dispatch: bridges CLI args -> session edits -> output formatting.

pub mod apply;
pub mod config_cmd;
pub mod list;
pub mod plan;
pub mod shell;
pub mod util;

use crate::cli::Command;
use crate::config::Settings;
use crate::error::CliError;

/// Dispatch a session-bound command to the appropriate handler.
pub fn dispatch(cmd: Command, settings: &Settings) -> Result<(), CliError> {
    let mut session = settings.open_session()?;
    match cmd {
        Command::List => list::handle(&session, settings),
        Command::Plan(args) => plan::handle(&mut session, &args, settings),
        Command::Apply(args) => apply::handle(&mut session, &args, settings),
        Command::Shell(args) => shell::handle(&mut session, &args, settings),
        // Config and Completions are handled before a session is opened
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
