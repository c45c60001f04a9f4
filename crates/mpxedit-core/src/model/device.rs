// ── Device domain types ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::{DeviceId, PendingId};

/// Display name of the reserved unattached group.
pub const UNATTACHED_NAME: &str = "Unattached Devices";

/// Pointer or keyboard half of a device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Pointer,
    Keyboard,
}

/// A master pointer/keyboard pair that slave devices attach to.
///
/// The pointer and keyboard ids are fixed at construction. The group's
/// identity is its pointer id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterGroup {
    name: String,
    pointer_id: DeviceId,
    keyboard_id: DeviceId,
    children: BTreeSet<DeviceId>,
}

impl MasterGroup {
    pub fn new(name: impl Into<String>, pointer_id: DeviceId, keyboard_id: DeviceId) -> Self {
        Self {
            name: name.into(),
            pointer_id,
            keyboard_id,
            children: BTreeSet::new(),
        }
    }

    /// The reserved group for floating devices.
    pub fn unattached() -> Self {
        Self::new(UNATTACHED_NAME, DeviceId::FLOATING, DeviceId::FLOATING)
    }

    pub fn id(&self) -> DeviceId {
        self.pointer_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pointer_id(&self) -> DeviceId {
        self.pointer_id
    }

    pub fn keyboard_id(&self) -> DeviceId {
        self.keyboard_id
    }

    pub fn is_unattached(&self) -> bool {
        self.pointer_id == DeviceId::FLOATING
    }

    /// Slaves this group really owns, ascending by id.
    pub fn children(&self) -> &BTreeSet<DeviceId> {
        &self.children
    }

    pub(crate) fn adopt(&mut self, device: DeviceId) {
        self.children.insert(device);
    }
}

/// A physical (or virtual-but-real) input device attached to one master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaveDevice {
    pub id: DeviceId,
    pub name: String,
    pub kind: Option<DeviceKind>,
    /// The group that owns this device right now, ignoring staged edits.
    pub parent: DeviceId,
}

/// A master group requested by the user but not yet created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingGroup {
    pub id: PendingId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_pointer_id() {
        let group = MasterGroup::new("Second pointer", DeviceId::new(15), DeviceId::new(16));
        assert_eq!(group.id(), DeviceId::new(15));
        assert_eq!(group.keyboard_id(), DeviceId::new(16));
        assert!(!group.is_unattached());
    }

    #[test]
    fn unattached_uses_floating_sentinel_for_both_halves() {
        let group = MasterGroup::unattached();
        assert!(group.is_unattached());
        assert_eq!(group.pointer_id(), DeviceId::FLOATING);
        assert_eq!(group.keyboard_id(), DeviceId::FLOATING);
        assert_eq!(group.name(), UNATTACHED_NAME);
    }

    #[test]
    fn device_kind_parses_lowercase() {
        assert_eq!("pointer".parse::<DeviceKind>().ok(), Some(DeviceKind::Pointer));
        assert_eq!(DeviceKind::Keyboard.to_string(), "keyboard");
        assert!("mouse".parse::<DeviceKind>().is_err());
    }
}
