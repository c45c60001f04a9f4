//! `apply`: stage edits, confirm, and dispatch the xinput commands.

use mpxedit_core::Session;

use crate::cli::{ApplyArgs, OutputFormat};
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(session: &mut Session, args: &ApplyArgs, settings: &Settings) -> Result<(), CliError> {
    let edits = util::read_edits(&args.edits)?;
    util::stage(session, &edits)?;

    if session.commands().is_empty() {
        if !settings.quiet {
            eprintln!("{}", output::notice("Nothing to apply", settings.color));
        }
        return Ok(());
    }

    if !args.dry_run {
        let count = session.commands().len();
        if !settings.yes {
            eprintln!(
                "{}",
                output::render_commands(OutputFormat::Table, session.commands())?
            );
        }
        let prompt = format!("Dispatch {count} xinput command(s)?");
        if !util::confirm(&prompt, "apply", settings.yes)? {
            eprintln!("{}", output::notice("Aborted; nothing was dispatched", settings.color));
            return Ok(());
        }
    }

    let runner = settings.runner(args.dry_run);
    let dispatched = session.commit(runner.as_ref());

    let out = output::render_commands(settings.output, &dispatched)?;
    output::print_output(&out, settings.quiet);
    if !settings.quiet {
        let verb = if args.dry_run { "printed" } else { "dispatched" };
        eprintln!(
            "{}",
            output::success(&format!("{} command(s) {verb}", dispatched.len()), settings.color)
        );
    }
    Ok(())
}
