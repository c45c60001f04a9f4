// ── Core identity types ──
//
// DeviceId is the integer identity xinput assigns to every device. The
// X server only hands out non-negative ids, which leaves the negative
// range free for the two sentinels used here. PendingId names groups
// that exist only inside a change set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

// ── DeviceId ────────────────────────────────────────────────────────

/// Stable identity of a master or slave device as reported by xinput.
///
/// Equality and hashing are by value, so a device rebuilt from a fresh
/// snapshot compares equal to its previous incarnation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(i32);

impl DeviceId {
    /// Identity of the reserved group holding floating devices.
    pub const FLOATING: Self = Self(-1);

    /// Placeholder for a master keyboard that has not been paired yet.
    pub const UNASSIGNED: Self = Self(-2);

    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    /// True for ids the X server could actually have assigned.
    pub const fn is_real(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeviceId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i32> for DeviceId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

// ── PendingId ───────────────────────────────────────────────────────

/// Session-local handle for a group awaiting creation.
///
/// Two pending groups may share a name; the handle keeps them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingId(u32);

impl PendingId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PendingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for PendingId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.strip_prefix('#').unwrap_or(s).parse().map(Self)
    }
}

// ── GroupRef ────────────────────────────────────────────────────────

/// Either a live master group or a group staged for creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum GroupRef {
    Master(DeviceId),
    Pending(PendingId),
}

impl GroupRef {
    pub fn as_master(self) -> Option<DeviceId> {
        match self {
            Self::Master(id) => Some(id),
            Self::Pending(_) => None,
        }
    }

    pub fn as_pending(self) -> Option<PendingId> {
        match self {
            Self::Pending(id) => Some(id),
            Self::Master(_) => None,
        }
    }
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master(id) => write!(f, "{id}"),
            Self::Pending(id) => write!(f, "{id}"),
        }
    }
}

impl From<DeviceId> for GroupRef {
    fn from(id: DeviceId) -> Self {
        Self::Master(id)
    }
}

impl From<PendingId> for GroupRef {
    fn from(id: PendingId) -> Self {
        Self::Pending(id)
    }
}
