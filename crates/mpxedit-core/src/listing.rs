//! `xinput list` ingestion and snapshot sources.
//!
//! Each device line of the listing looks like
//!
//! ```text
//! ⎜   ↳ Logitech USB Receiver                 	id=9	[slave  pointer  (2)]
//! ```
//!
//! i.e. a decorated name, an `id=` field and a bracketed class, separated
//! by tabs.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CoreError;
use crate::model::{DeviceId, DeviceRecord, DeviceSnapshot};

/// Tree-drawing glyphs xinput prefixes names with.
const DECORATIONS: &[char] = &['⎡', '⎜', '↳', '⎣', '∼'];

/// Parse the full text of `xinput list`.
///
/// Blank lines are skipped; any other line that does not have the
/// expected shape is an error.
pub fn parse(text: &str) -> Result<DeviceSnapshot, CoreError> {
    let mut snapshot = DeviceSnapshot::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (id, record) = parse_line(line).map_err(|reason| CoreError::ListingParse {
            line: idx + 1,
            reason,
        })?;
        snapshot.insert(id, record);
    }
    debug!(devices = snapshot.len(), "listing parsed");
    Ok(snapshot)
}

fn parse_line(line: &str) -> Result<(DeviceId, DeviceRecord), String> {
    let mut fields = line.split('\t');

    let name = fields
        .next()
        .map(|raw| raw.trim_matches(|c: char| c.is_whitespace() || DECORATIONS.contains(&c)))
        .filter(|name| !name.is_empty())
        .ok_or("missing device name")?;

    let id_field = fields.next().ok_or("missing id field")?.trim();
    let id = id_field
        .strip_prefix("id=")
        .ok_or_else(|| format!("expected 'id=<n>', got '{id_field}'"))?;
    let id: DeviceId = id.parse().map_err(|_| format!("invalid device id '{id}'"))?;

    let class_field = fields.next().ok_or("missing class field")?.trim();
    let class = class_field
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| format!("expected '[...]' class, got '{class_field}'"))?;
    let tokens = class
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| c == '(' || c == ')'))
        .filter(|token| !token.is_empty());

    Ok((id, DeviceRecord::new(name, tokens)))
}

// ── Sources ─────────────────────────────────────────────────────────

/// Producer of fresh device snapshots.
pub trait SnapshotSource {
    fn snapshot(&self) -> Result<DeviceSnapshot, CoreError>;
}

/// Runs `<program> list` and parses its output.
#[derive(Debug, Clone)]
pub struct XinputLister {
    program: PathBuf,
}

impl XinputLister {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SnapshotSource for XinputLister {
    fn snapshot(&self) -> Result<DeviceSnapshot, CoreError> {
        let output = std::process::Command::new(&self.program)
            .arg("list")
            .output()
            .map_err(|source| CoreError::Io {
                context: format!("failed to run {} list", self.program.display()),
                source,
            })?;
        if !output.status.success() {
            return Err(CoreError::snapshot(format!(
                "{} list exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        parse(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Reads a listing previously saved with `xinput list > file`.
#[derive(Debug, Clone)]
pub struct ListingFile {
    path: PathBuf,
}

impl ListingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSource for ListingFile {
    fn snapshot(&self) -> Result<DeviceSnapshot, CoreError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| CoreError::Io {
            context: format!("failed to read {}", self.path.display()),
            source,
        })?;
        parse(&text)
    }
}
