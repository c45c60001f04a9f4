// ── Device snapshot ──
//
// Raw per-device records as produced by a listing. Class tokens stay
// untyped here; `DeviceClass::from_tokens` interprets them when the
// model is built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::device::DeviceKind;
use super::entity_id::DeviceId;
use crate::error::CoreError;

/// Substring identifying the X server's synthetic test devices.
pub const DEFAULT_SYNTHETIC_MARKER: &str = "XTEST";

/// One device line of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub name: String,
    /// `[role, kind?, paired-or-owner id?]`, e.g. `["slave", "pointer", "2"]`.
    pub class_tokens: Vec<String>,
}

impl DeviceRecord {
    pub fn new<I, S>(name: impl Into<String>, class_tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            class_tokens: class_tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn class(&self) -> Result<DeviceClass, CoreError> {
        DeviceClass::from_tokens(&self.class_tokens)
    }
}

/// Every device reported by one listing, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    records: BTreeMap<DeviceId, DeviceRecord>,
}

impl DeviceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any earlier record with the same id.
    pub fn insert(&mut self, id: DeviceId, record: DeviceRecord) {
        self.records.insert(id, record);
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with<I, S>(mut self, id: i32, name: &str, class_tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(DeviceId::new(id), DeviceRecord::new(name, class_tokens));
        self
    }

    pub fn get(&self, id: DeviceId) -> Option<&DeviceRecord> {
        self.records.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &DeviceRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop records whose name contains `marker`.
    ///
    /// An empty marker disables filtering.
    pub fn without_synthetic(mut self, marker: &str) -> Self {
        if marker.is_empty() {
            return self;
        }
        self.records.retain(|id, record| {
            let keep = !record.name.contains(marker);
            if !keep {
                debug!(%id, name = %record.name, "skipping synthetic device");
            }
            keep
        });
        self
    }
}

/// Typed interpretation of a record's class tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// Half of a master pair; `paired` is the id of the other half.
    Master { kind: DeviceKind, paired: DeviceId },
    /// Attached slave; `master` is the owning master pointer or keyboard.
    Slave {
        kind: DeviceKind,
        master: DeviceId,
    },
    /// Slave attached to nothing.
    Floating { kind: Option<DeviceKind> },
}

impl DeviceClass {
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, CoreError> {
        let token = |idx: usize| tokens.get(idx).map(AsRef::as_ref);

        let role = token(0).ok_or_else(|| CoreError::snapshot("empty device class"))?;
        match role {
            "master" => Ok(Self::Master {
                kind: parse_kind(token(1))?,
                paired: parse_id(token(2), "paired device")?,
            }),
            "slave" => Ok(Self::Slave {
                kind: parse_kind(token(1))?,
                master: parse_id(token(2), "master device")?,
            }),
            // xinput prints `[floating slave]`; the kind is unknown then.
            "floating" => Ok(Self::Floating {
                kind: token(1).and_then(|t| t.parse().ok()),
            }),
            other => Err(CoreError::snapshot(format!("unknown device role '{other}'"))),
        }
    }
}

fn parse_kind(token: Option<&str>) -> Result<DeviceKind, CoreError> {
    let token = token.ok_or_else(|| CoreError::snapshot("missing device kind"))?;
    token
        .parse()
        .map_err(|_| CoreError::snapshot(format!("unknown device kind '{token}'")))
}

fn parse_id(token: Option<&str>, what: &str) -> Result<DeviceId, CoreError> {
    let token = token.ok_or_else(|| CoreError::snapshot(format!("missing {what} id")))?;
    let id: DeviceId = token
        .parse()
        .map_err(|_| CoreError::snapshot(format!("invalid {what} id '{token}'")))?;
    if !id.is_real() {
        return Err(CoreError::snapshot(format!("negative {what} id '{token}'")));
    }
    Ok(id)
}
