//! Shared helpers for command handlers.

use std::io::{IsTerminal, Read};

use mpxedit_core::Session;
use tracing::debug;

use crate::cli::EditArgs;
use crate::error::CliError;
use crate::script::{self, Edit};

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Collect edits from `-e` arguments, then from `-f FILE`.
///
/// Each `-e` counts as one line; file lines are numbered after them.
pub fn read_edits(args: &EditArgs) -> Result<Vec<(usize, Edit)>, CliError> {
    let mut edits = Vec::new();
    for (idx, raw) in args.edits.iter().enumerate() {
        match Edit::parse(raw) {
            Ok(Some(edit)) => edits.push((idx + 1, edit)),
            Ok(None) => {}
            Err(reason) => return Err(CliError::Script { line: idx + 1, reason }),
        }
    }

    if let Some(path) = &args.file {
        let text = if path.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            std::fs::read_to_string(path).map_err(|source| CliError::Read {
                context: format!("failed to read edits from {}", path.display()),
                source,
            })?
        };
        edits.extend(script::parse_script(&text, args.edits.len() + 1)?);
    }
    Ok(edits)
}

/// Stage every edit in order, stopping at the first rejection.
pub fn stage(session: &mut Session, edits: &[(usize, Edit)]) -> Result<(), CliError> {
    for (line, edit) in edits {
        let summary = edit.apply(session)?;
        debug!(line, %edit, summary = %summary, "edit staged");
    }
    Ok(())
}
