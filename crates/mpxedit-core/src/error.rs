// ── Core error types ──
//
// User-facing errors from mpxedit-core. Edit rejections never mutate
// the change set; snapshot errors abort a load before the model is
// replaced.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Edit rejections ──────────────────────────────────────────────
    #[error("Cannot move into {target}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("Unknown {entity_type}: {identifier}")]
    UnknownEntity {
        entity_type: String,
        identifier: String,
    },

    #[error("Cannot delete {group}: {reason}")]
    IllegalDeletion { group: String, reason: String },

    // ── Session lifecycle ────────────────────────────────────────────
    #[error("{pending} pending change(s) would be discarded")]
    UnsavedChanges { pending: usize },

    // ── Snapshot ingestion ───────────────────────────────────────────
    #[error("Invalid device snapshot: {message}")]
    Snapshot { message: String },

    #[error("Cannot parse listing line {line}: {reason}")]
    ListingParse { line: usize, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    pub(crate) fn unknown(entity_type: &str, identifier: impl ToString) -> Self {
        Self::UnknownEntity {
            entity_type: entity_type.into(),
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn snapshot(message: impl Into<String>) -> Self {
        Self::Snapshot {
            message: message.into(),
        }
    }
}
