//! `plan`: stage edits and show where they lead, without dispatching.

use mpxedit_core::Session;

use crate::cli::EditArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(session: &mut Session, args: &EditArgs, settings: &Settings) -> Result<(), CliError> {
    let edits = util::read_edits(args)?;
    util::stage(session, &edits)?;

    let out = output::render_plan(settings.output, session.plan())?;
    output::print_output(&out, settings.quiet);
    Ok(())
}
