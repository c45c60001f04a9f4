//! `list`: the hierarchy as it is right now.

use mpxedit_core::Session;

use crate::config::Settings;
use crate::error::CliError;
use crate::output;

pub fn handle(session: &Session, settings: &Settings) -> Result<(), CliError> {
    let out = output::render_hierarchy(settings.output, session.hierarchy())?;
    output::print_output(&out, settings.quiet);
    Ok(())
}
