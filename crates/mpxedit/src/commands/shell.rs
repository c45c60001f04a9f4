//! `shell`: an interactive session over one live change set.
//!
//! Reads one line at a time from stdin. Edit verbs stage changes; the
//! words below inspect, refresh or apply them. Errors are reported and
//! the loop carries on.

use std::io::{self, IsTerminal, Write};

use mpxedit_core::{CommandRunner, Session, SnapshotSource};

use crate::cli::ShellArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;
use crate::script::Edit;

use super::util;

const HELP: &str = "\
Edits:
  move <device> <group>    detach <device>         undo-move <device>
  create <name>            undo-create <#n|name>
  delete <group>           undo-delete <group>
  reset <group>            detach-all <group>
Session:
  show       print the hierarchy with staged changes
  commands   print the xinput commands that apply would run
  refresh    reload devices (asks before discarding staged changes)
  apply      run the commands, then reload
  help       this text
  quit       leave (staged changes are dropped)";

/// Words the shell handles itself instead of parsing as an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Show,
    Commands,
    Refresh,
    Apply,
    Help,
    Quit,
}

impl Builtin {
    fn parse(word: &str) -> Option<Self> {
        Some(match word {
            "show" | "ls" => Self::Show,
            "commands" | "plan" => Self::Commands,
            "refresh" | "reload" => Self::Refresh,
            "apply" => Self::Apply,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => return None,
        })
    }
}

pub fn handle(session: &mut Session, args: &ShellArgs, settings: &Settings) -> Result<(), CliError> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let source = settings.source();
    let runner = settings.runner(args.dry_run);

    if interactive && !settings.quiet {
        eprintln!(
            "mpxedit shell: {} device(s). Type 'help' for commands.",
            session.model().device_count()
        );
    }

    let mut line = String::new();
    loop {
        if interactive {
            let mark = if session.has_changes() { "*" } else { "" };
            eprint!("mpxedit{mark}> ");
            io::stderr().flush()?;
        }
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let result = match Builtin::parse(input) {
            Some(Builtin::Quit) => break,
            Some(builtin) => {
                run_builtin(builtin, session, source.as_ref(), runner.as_ref(), settings)
            }
            None => stage_line(input, session, settings),
        };
        if let Err(err) = result {
            eprintln!("{:?}", miette::Report::new(err));
        }
    }

    if session.has_changes() && !settings.quiet {
        eprintln!(
            "{}",
            output::notice(
                &format!("{} staged change(s) dropped", session.changes().len()),
                settings.color
            )
        );
    }
    Ok(())
}

fn stage_line(input: &str, session: &mut Session, settings: &Settings) -> Result<(), CliError> {
    let edit = Edit::parse(input)
        .map_err(|reason| CliError::Script { line: 1, reason })?;
    if let Some(edit) = edit {
        let summary = edit.apply(session)?;
        if !settings.quiet {
            eprintln!("{}", output::success(&summary, settings.color));
        }
    }
    Ok(())
}

fn run_builtin(
    builtin: Builtin,
    session: &mut Session,
    source: &dyn SnapshotSource,
    runner: &dyn CommandRunner,
    settings: &Settings,
) -> Result<(), CliError> {
    match builtin {
        Builtin::Show => {
            let out = output::render_hierarchy(settings.output, session.hierarchy())?;
            output::print_output(&out, settings.quiet);
        }
        Builtin::Commands => {
            let out = output::render_commands(settings.output, session.commands())?;
            output::print_output(&out, settings.quiet);
        }
        Builtin::Refresh => {
            let discard = if session.has_changes() {
                let prompt = format!(
                    "Discard {} staged change(s) and reload?",
                    session.changes().len()
                );
                util::confirm(&prompt, "refresh", settings.yes)?
            } else {
                false
            };
            if session.has_changes() && !discard {
                return Ok(());
            }
            session.reload(source.snapshot()?, discard)?;
            if !settings.quiet {
                eprintln!(
                    "{}",
                    output::success(
                        &format!("reloaded {} device(s)", session.model().device_count()),
                        settings.color
                    )
                );
            }
        }
        Builtin::Apply => {
            if !session.has_changes() {
                eprintln!("{}", output::notice("Nothing to apply", settings.color));
                return Ok(());
            }
            let dispatched = session.commit(runner);
            let out = output::render_commands(settings.output, &dispatched)?;
            output::print_output(&out, settings.quiet);
            session.reload(source.snapshot()?, false)?;
        }
        Builtin::Help => println!("{HELP}"),
        Builtin::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_take_precedence_over_edits() {
        assert_eq!(Builtin::parse("show"), Some(Builtin::Show));
        assert_eq!(Builtin::parse("exit"), Some(Builtin::Quit));
        assert_eq!(Builtin::parse("detach"), None);
    }
}
