//! Edit script language shared by `plan`, `apply` and `shell`.
//!
//! One edit per line: a verb followed by device or group references.
//! References are numeric ids or exact names; names with spaces are
//! quoted. A single-argument verb also accepts the unquoted remainder of
//! the line.

use std::fmt;

use mpxedit_core::{
    DeviceId, GroupRef, MoveOutcome, PendingId, Session,
    model::UNATTACHED_NAME,
};

use crate::error::CliError;

/// Alias accepted for the unattached group.
pub const FLOATING_ALIAS: &str = "floating";

/// One parsed, not yet resolved, edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Move { device: String, group: String },
    Detach { device: String },
    UndoMove { device: String },
    Create { name: String },
    UndoCreate { group: String },
    Delete { group: String },
    UndoDelete { group: String },
    Reset { group: String },
    DetachAll { group: String },
}

impl Edit {
    /// Parse one line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let trimmed = line.trim();
        // `#n` only ever names a group argument, so a leading `#` is a comment.
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        let words = split_words(trimmed)?;
        let Some((verb, args)) = words.split_first() else {
            return Ok(None);
        };

        let edit = match verb.as_str() {
            "move" | "mv" => match args {
                [device, group] => Self::Move {
                    device: device.clone(),
                    group: group.clone(),
                },
                _ => return Err("usage: move <device> <group> (quote names with spaces)".into()),
            },
            "detach" | "float" => Self::Detach {
                device: rest(verb, args)?,
            },
            "undo-move" => Self::UndoMove {
                device: rest(verb, args)?,
            },
            "create" => Self::Create {
                name: rest(verb, args)?,
            },
            "undo-create" => Self::UndoCreate {
                group: rest(verb, args)?,
            },
            "delete" | "rm" => Self::Delete {
                group: rest(verb, args)?,
            },
            "undo-delete" => Self::UndoDelete {
                group: rest(verb, args)?,
            },
            "reset" => Self::Reset {
                group: rest(verb, args)?,
            },
            "detach-all" => Self::DetachAll {
                group: rest(verb, args)?,
            },
            other => return Err(format!("unknown edit '{other}'")),
        };
        Ok(Some(edit))
    }

    /// Resolve references against the session and stage the edit.
    ///
    /// Returns a short description of what happened.
    pub fn apply(&self, session: &mut Session) -> Result<String, CliError> {
        match self {
            Self::Move { device, group } => {
                let device = resolve_device(session, device)?;
                let target = resolve_group(session, group)?;
                let outcome = session.move_device(device, target)?;
                Ok(describe_move(device, outcome, &format!("into {group}")))
            }
            Self::Detach { device } => {
                let device = resolve_device(session, device)?;
                let outcome = session.detach(device)?;
                Ok(describe_move(device, outcome, "to float"))
            }
            Self::UndoMove { device } => {
                let device = resolve_device(session, device)?;
                session.undo_move(device)?;
                Ok(format!("device {device} goes back to its real parent"))
            }
            Self::Create { name } => {
                let pending = session.create_group(name.clone());
                Ok(format!("staged new group {} as {}", pending.name, pending.id))
            }
            Self::UndoCreate { group } => {
                let pending = resolve_pending(session, group)?;
                let removed = session.undo_create(pending)?;
                Ok(format!("dropped staged group {}", removed.name))
            }
            Self::Delete { group } => {
                let target = resolve_group(session, group)?;
                let detached = session.delete_group(target)?;
                Ok(format!("staged removal of {group} ({detached} device(s) detached)"))
            }
            Self::UndoDelete { group } => {
                let id = resolve_master(session, group)?;
                session.undo_delete(id)?;
                Ok(format!("kept {group}"))
            }
            Self::Reset { group } => {
                let id = resolve_master(session, group)?;
                let cancelled = session.reset_group(id)?;
                Ok(format!("reset {group} ({cancelled} move(s) cancelled)"))
            }
            Self::DetachAll { group } => {
                let id = resolve_master(session, group)?;
                let changed = session.detach_all(id)?;
                Ok(format!("detached {changed} device(s) from {group}"))
            }
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { device, group } => write!(f, "move {device:?} {group:?}"),
            Self::Detach { device } => write!(f, "detach {device:?}"),
            Self::UndoMove { device } => write!(f, "undo-move {device:?}"),
            Self::Create { name } => write!(f, "create {name:?}"),
            Self::UndoCreate { group } => write!(f, "undo-create {group:?}"),
            Self::Delete { group } => write!(f, "delete {group:?}"),
            Self::UndoDelete { group } => write!(f, "undo-delete {group:?}"),
            Self::Reset { group } => write!(f, "reset {group:?}"),
            Self::DetachAll { group } => write!(f, "detach-all {group:?}"),
        }
    }
}

/// Parse every line of `text`, numbering from `first_line`.
pub fn parse_script(text: &str, first_line: usize) -> Result<Vec<(usize, Edit)>, CliError> {
    let mut edits = Vec::new();
    for (offset, line) in text.lines().enumerate() {
        let number = first_line + offset;
        match Edit::parse(line) {
            Ok(Some(edit)) => edits.push((number, edit)),
            Ok(None) => {}
            Err(reason) => return Err(CliError::Script { line: number, reason }),
        }
    }
    Ok(edits)
}

fn describe_move(device: DeviceId, outcome: MoveOutcome, staged: &str) -> String {
    match outcome {
        MoveOutcome::Staged => format!("staged device {device} {staged}"),
        MoveOutcome::Cancelled => format!("device {device} stays where it is; move cancelled"),
        MoveOutcome::Unchanged => format!("device {device}: nothing to change"),
    }
}

fn rest(verb: &str, args: &[String]) -> Result<String, String> {
    if args.is_empty() {
        return Err(format!("'{verb}' needs an argument"));
    }
    Ok(args.join(" "))
}

/// Whitespace split honouring single and double quotes.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

// ── Reference resolution ─────────────────────────────────────────────

fn not_found(resource_type: &str, identifier: &str) -> CliError {
    CliError::NotFound {
        resource_type: resource_type.into(),
        identifier: identifier.into(),
        list_command: "list".into(),
    }
}

/// A slave device by id or exact name.
pub fn resolve_device(session: &Session, reference: &str) -> Result<DeviceId, CliError> {
    let model = session.model();
    if let Ok(id) = reference.parse::<DeviceId>() {
        if model.device(id).is_some() {
            return Ok(id);
        }
    }
    model
        .device_by_name(reference)
        .map(|device| device.id)
        .ok_or_else(|| not_found("device", reference))
}

/// Any group: master by either half's id or name, the unattached group,
/// or a staged group by `#n` or name.
pub fn resolve_group(session: &Session, reference: &str) -> Result<GroupRef, CliError> {
    let model = session.model();
    if reference.eq_ignore_ascii_case(FLOATING_ALIAS) || reference == UNATTACHED_NAME {
        return Ok(GroupRef::Master(DeviceId::FLOATING));
    }
    if reference.starts_with('#') {
        return resolve_pending(session, reference).map(GroupRef::Pending);
    }
    if let Ok(id) = reference.parse::<DeviceId>() {
        if let Some(group) = model.group_by_member(id) {
            return Ok(GroupRef::Master(group.id()));
        }
    }
    if let Some(group) = model.group_by_name(reference) {
        return Ok(GroupRef::Master(group.id()));
    }
    if let Some(pending) = session.changes().pending_by_name(reference) {
        return Ok(GroupRef::Pending(pending.id));
    }
    Err(not_found("group", reference))
}

/// A group staged for creation, by `#n` or name.
pub fn resolve_pending(session: &Session, reference: &str) -> Result<PendingId, CliError> {
    let changes = session.changes();
    if reference.starts_with('#') {
        let id = reference
            .parse::<PendingId>()
            .map_err(|_| not_found("pending group", reference))?;
        return changes
            .pending(id)
            .map(|pending| pending.id)
            .ok_or_else(|| not_found("pending group", reference));
    }
    changes
        .pending_by_name(reference)
        .map(|pending| pending.id)
        .ok_or_else(|| not_found("pending group", reference))
}

/// A group that exists on the X server right now.
fn resolve_master(session: &Session, reference: &str) -> Result<DeviceId, CliError> {
    match resolve_group(session, reference)? {
        GroupRef::Master(id) => Ok(id),
        GroupRef::Pending(_) => Err(CliError::Validation {
            field: "group".into(),
            reason: format!("'{reference}' is only staged; use undo-create to drop it"),
        }),
    }
}
