//! CLI configuration: a thin wrapper around `mpxedit_config` shared types.
//!
//! Resolves the effective settings for one invocation: command-line flags
//! win over the environment, which wins over the config file.

use std::path::PathBuf;

use clap::ValueEnum;

use mpxedit_core::{
    CommandRunner, DryRunRunner, ListingFile, ProcessRunner, Session, SnapshotSource,
    XinputLister,
};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Re-exports from shared crate ────────────────────────────────────

pub use mpxedit_config::{Config, config_path, load_config, save_config};

/// Everything a command handler needs to know about this invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub yes: bool,
    pub program: String,
    pub synthetic_marker: String,
    pub listing: Option<PathBuf>,
}

impl Settings {
    /// Merge global flags over the loaded config.
    pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Self, CliError> {
        let output = match global.output {
            Some(format) => format,
            None => parse_enum::<OutputFormat>("defaults.output", &cfg.defaults.output)?,
        };
        let color = match global.color {
            Some(mode) => mode,
            None => parse_enum::<ColorMode>("defaults.color", &cfg.defaults.color)?,
        };

        Ok(Self {
            output,
            color: output::should_color(color),
            quiet: global.quiet,
            yes: global.yes,
            program: global
                .xinput
                .clone()
                .unwrap_or_else(|| cfg.xinput.program.clone()),
            synthetic_marker: global
                .marker
                .clone()
                .unwrap_or_else(|| cfg.xinput.synthetic_marker.clone()),
            listing: global.listing.clone(),
        })
    }

    /// Where fresh snapshots come from: a saved listing or live xinput.
    pub fn source(&self) -> Box<dyn SnapshotSource> {
        match &self.listing {
            Some(path) => Box::new(ListingFile::new(path)),
            None => Box::new(XinputLister::new(&self.program)),
        }
    }

    pub fn runner(&self, dry_run: bool) -> Box<dyn CommandRunner> {
        if dry_run {
            Box::new(DryRunRunner)
        } else {
            Box::new(ProcessRunner::new(&self.program))
        }
    }

    pub fn open_session(&self) -> Result<Session, CliError> {
        let session = Session::from_source(self.source().as_ref(), &self.synthetic_marker)?;
        tracing::debug!(
            devices = session.model().device_count(),
            listing = ?self.listing,
            "session opened"
        );
        Ok(session)
    }
}

fn parse_enum<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}
