// ── xinput commands ──
//
// The four verbs the planner emits, and the runners that dispatch them.
// Dispatch is fire-and-forget: nothing flows back into the core.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::model::DeviceId;

/// One `xinput` invocation, minus the program name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "verb", rename_all = "kebab-case")]
pub enum Command {
    RemoveMaster { id: DeviceId },
    Float { device: DeviceId },
    Reattach { device: DeviceId, master: DeviceId },
    CreateMaster { name: String },
}

impl Command {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::RemoveMaster { .. } => "remove-master",
            Self::Float { .. } => "float",
            Self::Reattach { .. } => "reattach",
            Self::CreateMaster { .. } => "create-master",
        }
    }

    /// Argument vector, verb first.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = vec![self.verb().to_owned()];
        match self {
            Self::RemoveMaster { id } => tokens.push(id.to_string()),
            Self::Float { device } => tokens.push(device.to_string()),
            Self::Reattach { device, master } => {
                tokens.push(device.to_string());
                tokens.push(master.to_string());
            }
            Self::CreateMaster { name } => tokens.push(name.clone()),
        }
        tokens
    }
}

impl fmt::Display for Command {
    /// Space-joined tokens; arguments containing whitespace are quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in self.tokens() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            if token.is_empty() || token.chars().any(char::is_whitespace) {
                write!(f, "{token:?}")?;
            } else {
                f.write_str(&token)?;
            }
        }
        Ok(())
    }
}

// ── Runners ─────────────────────────────────────────────────────────

/// Something that can fire a command at the outside world.
///
/// Implementations must not block on completion and report nothing back;
/// each command succeeds or fails on its own.
pub trait CommandRunner {
    fn dispatch(&self, command: &Command);
}

/// Spawns `<program> <tokens…>` for every command without waiting.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

impl CommandRunner for ProcessRunner {
    // The child is never waited on; xinput exits on its own.
    #[allow(clippy::zombie_processes)]
    fn dispatch(&self, command: &Command) {
        let spawned = std::process::Command::new(&self.program)
            .args(command.tokens())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => debug!(pid = child.id(), %command, "command dispatched"),
            Err(e) => warn!(
                program = %self.program.display(),
                %command,
                error = %e,
                "failed to dispatch command"
            ),
        }
    }
}

/// Logs commands instead of running them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn dispatch(&self, command: &Command) {
        info!(%command, "dry run: not dispatched");
    }
}
