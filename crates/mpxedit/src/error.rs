//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use mpxedit_config::ConfigError;
use mpxedit_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const SNAPSHOT: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Edits ────────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(mpxedit::not_found),
        help("Run: mpxedit {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Cannot move into {target}: {reason}")]
    #[diagnostic(code(mpxedit::invalid_target))]
    InvalidTarget { target: String, reason: String },

    #[error("Cannot delete {group}: {reason}")]
    #[diagnostic(code(mpxedit::illegal_deletion))]
    IllegalDeletion { group: String, reason: String },

    #[error("{pending} pending change(s) would be discarded")]
    #[diagnostic(
        code(mpxedit::unsaved_changes),
        help("Apply them first, or confirm discarding them (--yes).")
    )]
    UnsavedChanges { pending: usize },

    #[error("Invalid edit on line {line}: {reason}")]
    #[diagnostic(
        code(mpxedit::script),
        help("Run: mpxedit plan --help for the edit syntax")
    )]
    Script { line: usize, reason: String },

    // ── Snapshot ─────────────────────────────────────────────────────
    #[error("Could not read the device hierarchy: {message}")]
    #[diagnostic(
        code(mpxedit::snapshot),
        help(
            "Check that xinput is installed and an X server is reachable,\n\
             or pass a saved listing with --listing FILE."
        )
    )]
    Snapshot { message: String },

    #[error("Listing line {line} is malformed: {reason}")]
    #[diagnostic(
        code(mpxedit::listing),
        help("The file should be the unmodified output of `xinput list`.")
    )]
    ListingParse { line: usize, reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(mpxedit::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists")]
    #[diagnostic(
        code(mpxedit::config_exists),
        help("Found at: {path}\nUse --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(mpxedit::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(mpxedit::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error("{context}")]
    #[diagnostic(code(mpxedit::io))]
    Read {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(mpxedit::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(mpxedit::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidTarget { .. }
            | Self::IllegalDeletion { .. }
            | Self::UnsavedChanges { .. }
            | Self::ConfigExists { .. } => exit_code::CONFLICT,
            Self::Script { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Snapshot { .. } | Self::ListingParse { .. } => exit_code::SNAPSHOT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidTarget { target, reason } => CliError::InvalidTarget { target, reason },

            CoreError::UnknownEntity {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: if entity_type.starts_with("pending") {
                    "plan".into()
                } else {
                    "list".into()
                },
                resource_type: entity_type,
                identifier,
            },

            CoreError::IllegalDeletion { group, reason } => {
                CliError::IllegalDeletion { group, reason }
            }

            CoreError::UnsavedChanges { pending } => CliError::UnsavedChanges { pending },

            CoreError::Snapshot { message } => CliError::Snapshot { message },

            CoreError::ListingParse { line, reason } => CliError::ListingParse { line, reason },

            CoreError::Io { context, source } => CliError::Read { context, source },
        }
    }
}
