// ── Device model ──
//
// Ground-truth hierarchy rebuilt wholesale from each snapshot. Nothing
// here knows about staged edits; `ChangeSet` and the planner layer
// those on top.

use std::collections::{BTreeMap, HashMap};
use std::iter;

use tracing::debug;

use super::device::{DeviceKind, MasterGroup, SlaveDevice};
use super::entity_id::DeviceId;
use super::snapshot::{DeviceClass, DeviceSnapshot};
use crate::error::CoreError;

/// Master groups and slave devices as they exist right now.
#[derive(Debug, Clone)]
pub struct DeviceModel {
    unattached: MasterGroup,
    /// Real master groups keyed by pointer id.
    groups: BTreeMap<DeviceId, MasterGroup>,
    devices: BTreeMap<DeviceId, SlaveDevice>,
    /// Both halves of every master pair -> owning group id.
    members: HashMap<DeviceId, DeviceId>,
}

/// A master pair while its records are still being collected.
struct GroupDraft {
    name: String,
    keyboard_id: DeviceId,
}

impl DeviceModel {
    /// A model containing only the unattached group.
    pub fn empty() -> Self {
        Self {
            unattached: MasterGroup::unattached(),
            groups: BTreeMap::new(),
            devices: BTreeMap::new(),
            members: HashMap::new(),
        }
    }

    /// Filter synthetic devices out of `snapshot`, then build the model.
    pub fn ingest(snapshot: DeviceSnapshot, synthetic_marker: &str) -> Result<Self, CoreError> {
        Self::from_snapshot(&snapshot.without_synthetic(synthetic_marker))
    }

    /// Build the model from an already-filtered snapshot.
    pub fn from_snapshot(snapshot: &DeviceSnapshot) -> Result<Self, CoreError> {
        let mut model = Self::empty();

        let classified = snapshot
            .iter()
            .map(|(id, record)| record.class().map(|class| (id, record.name.as_str(), class)))
            .collect::<Result<Vec<_>, _>>()?;

        // 1. Master pointers open a draft each.
        let mut drafts: BTreeMap<DeviceId, GroupDraft> = BTreeMap::new();
        for (id, name, class) in &classified {
            if let DeviceClass::Master {
                kind: DeviceKind::Pointer,
                ..
            } = class
            {
                drafts.insert(
                    *id,
                    GroupDraft {
                        name: (*name).to_owned(),
                        keyboard_id: DeviceId::UNASSIGNED,
                    },
                );
            }
        }

        // 2. Master keyboards complete the draft of the pointer they pair with.
        for (id, _, class) in &classified {
            if let DeviceClass::Master {
                kind: DeviceKind::Keyboard,
                paired,
            } = class
            {
                let draft = drafts.get_mut(paired).ok_or_else(|| {
                    CoreError::snapshot(format!(
                        "master keyboard {id} is paired with unknown master pointer {paired}"
                    ))
                })?;
                if draft.keyboard_id != DeviceId::UNASSIGNED {
                    return Err(CoreError::snapshot(format!(
                        "master pointer {paired} is paired with both keyboard {} and keyboard {id}",
                        draft.keyboard_id
                    )));
                }
                draft.keyboard_id = *id;
            }
        }

        for (pointer_id, draft) in drafts {
            if draft.keyboard_id == DeviceId::UNASSIGNED {
                return Err(CoreError::snapshot(format!(
                    "master pointer {pointer_id} has no paired master keyboard"
                )));
            }
            model.members.insert(pointer_id, pointer_id);
            model.members.insert(draft.keyboard_id, pointer_id);
            model.groups.insert(
                pointer_id,
                MasterGroup::new(draft.name, pointer_id, draft.keyboard_id),
            );
        }

        // 3. Slaves attach to their real owner.
        for (id, name, class) in &classified {
            let (kind, parent) = match *class {
                DeviceClass::Master { .. } => continue,
                DeviceClass::Slave { kind, master } => {
                    let parent = model.members.get(&master).copied().ok_or_else(|| {
                        CoreError::snapshot(format!(
                            "slave device {id} is attached to unknown master {master}"
                        ))
                    })?;
                    (Some(kind), parent)
                }
                DeviceClass::Floating { kind } => (kind, DeviceId::FLOATING),
            };
            model.attach(SlaveDevice {
                id: *id,
                name: (*name).to_owned(),
                kind,
                parent,
            });
        }

        debug!(
            groups = model.groups.len(),
            devices = model.devices.len(),
            "device model built"
        );
        Ok(model)
    }

    fn attach(&mut self, device: SlaveDevice) {
        let group = if device.parent == DeviceId::FLOATING {
            Some(&mut self.unattached)
        } else {
            self.groups.get_mut(&device.parent)
        };
        if let Some(group) = group {
            group.adopt(device.id);
        }
        self.devices.insert(device.id, device);
    }

    // ── Groups ───────────────────────────────────────────────────────

    /// Every group in display order: ascending id, unattached group last.
    pub fn all_groups(&self) -> Vec<&MasterGroup> {
        self.groups
            .values()
            .chain(iter::once(&self.unattached))
            .collect()
    }

    /// Every group in plain numeric id order (unattached group first).
    pub fn groups_by_identity(&self) -> impl Iterator<Item = &MasterGroup> {
        iter::once(&self.unattached).chain(self.groups.values())
    }

    pub fn unattached_group(&self) -> &MasterGroup {
        &self.unattached
    }

    /// Look up a group by its identity (pointer id).
    pub fn group(&self, id: DeviceId) -> Option<&MasterGroup> {
        if id == DeviceId::FLOATING {
            Some(&self.unattached)
        } else {
            self.groups.get(&id)
        }
    }

    /// Look up a group by either half of its master pair.
    pub fn group_by_member(&self, id: DeviceId) -> Option<&MasterGroup> {
        if id == DeviceId::FLOATING {
            return Some(&self.unattached);
        }
        self.members.get(&id).and_then(|group| self.groups.get(group))
    }

    pub fn group_by_name(&self, name: &str) -> Option<&MasterGroup> {
        self.groups_by_identity().find(|g| g.name() == name)
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub fn device(&self, id: DeviceId) -> Option<&SlaveDevice> {
        self.devices.get(&id)
    }

    pub fn device_by_name(&self, name: &str) -> Option<&SlaveDevice> {
        self.devices.values().find(|d| d.name == name)
    }

    /// All slave devices, ascending by id.
    pub fn devices(&self) -> impl Iterator<Item = &SlaveDevice> {
        self.devices.values()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

impl Default for DeviceModel {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_SYNTHETIC_MARKER;

    fn core_snapshot() -> DeviceSnapshot {
        DeviceSnapshot::new()
            .with(2, "Virtual core pointer", ["master", "pointer", "3"])
            .with(3, "Virtual core keyboard", ["master", "keyboard", "2"])
            .with(4, "Virtual core XTEST pointer", ["slave", "pointer", "2"])
            .with(5, "Virtual core XTEST keyboard", ["slave", "keyboard", "3"])
            .with(9, "Logitech USB Receiver", ["slave", "pointer", "2"])
            .with(11, "AT Translated Set 2 keyboard", ["slave", "keyboard", "3"])
            .with(14, "Second pointer", ["master", "pointer", "15"])
            .with(15, "Second keyboard", ["master", "keyboard", "14"])
            .with(16, "Wacom tablet", ["floating", "slave"])
    }

    #[test]
    fn builds_pairs_and_attaches_slaves() {
        let model = DeviceModel::ingest(core_snapshot(), DEFAULT_SYNTHETIC_MARKER).unwrap();

        let core = model.group(DeviceId::new(2)).unwrap();
        assert_eq!(core.keyboard_id(), DeviceId::new(3));
        assert_eq!(
            core.children().iter().copied().collect::<Vec<_>>(),
            vec![DeviceId::new(9), DeviceId::new(11)]
        );

        let second = model.group(DeviceId::new(14)).unwrap();
        assert_eq!(second.keyboard_id(), DeviceId::new(15));
        assert!(second.children().is_empty());

        let floating = model.unattached_group();
        assert!(floating.children().contains(&DeviceId::new(16)));
        assert_eq!(model.device(DeviceId::new(16)).unwrap().parent, DeviceId::FLOATING);
    }

    #[test]
    fn keyboard_slaves_resolve_through_master_keyboard() {
        let model = DeviceModel::ingest(core_snapshot(), DEFAULT_SYNTHETIC_MARKER).unwrap();
        assert_eq!(model.device(DeviceId::new(11)).unwrap().parent, DeviceId::new(2));
        assert_eq!(
            model.group_by_member(DeviceId::new(3)).unwrap().id(),
            DeviceId::new(2)
        );
    }

    #[test]
    fn synthetic_devices_never_reach_the_model() {
        let model = DeviceModel::ingest(core_snapshot(), DEFAULT_SYNTHETIC_MARKER).unwrap();
        assert!(model.device(DeviceId::new(4)).is_none());
        assert!(model.device(DeviceId::new(5)).is_none());
        assert_eq!(model.device_count(), 3);
    }

    #[test]
    fn display_order_puts_unattached_last() {
        let model = DeviceModel::ingest(core_snapshot(), DEFAULT_SYNTHETIC_MARKER).unwrap();
        let order: Vec<DeviceId> = model.all_groups().iter().map(|g| g.id()).collect();
        assert_eq!(order, vec![DeviceId::new(2), DeviceId::new(14), DeviceId::FLOATING]);

        let numeric: Vec<DeviceId> = model.groups_by_identity().map(MasterGroup::id).collect();
        assert_eq!(numeric.first(), Some(&DeviceId::FLOATING));
    }

    #[test]
    fn unpaired_master_pointer_is_rejected() {
        let snap = DeviceSnapshot::new().with(2, "Lonely pointer", ["master", "pointer", "3"]);
        let err = DeviceModel::from_snapshot(&snap).unwrap_err();
        assert!(matches!(err, CoreError::Snapshot { .. }), "{err}");
    }

    #[test]
    fn second_keyboard_for_one_pointer_is_rejected() {
        let snap = DeviceSnapshot::new()
            .with(2, "Shared pointer", ["master", "pointer", "3"])
            .with(3, "First keyboard", ["master", "keyboard", "2"])
            .with(7, "Second keyboard", ["master", "keyboard", "2"]);
        let err = DeviceModel::from_snapshot(&snap).unwrap_err();
        assert!(matches!(err, CoreError::Snapshot { .. }), "{err}");
        assert!(err.to_string().contains("paired with both"), "{err}");
    }

    #[test]
    fn slave_of_unknown_master_is_rejected() {
        let snap = DeviceSnapshot::new().with(9, "Mouse", ["slave", "pointer", "42"]);
        assert!(DeviceModel::from_snapshot(&snap).is_err());
    }

    #[test]
    fn lookup_by_name() {
        let model = DeviceModel::ingest(core_snapshot(), DEFAULT_SYNTHETIC_MARKER).unwrap();
        assert_eq!(
            model.group_by_name("Second pointer").map(MasterGroup::id),
            Some(DeviceId::new(14))
        );
        assert_eq!(
            model.device_by_name("Wacom tablet").map(|d| d.id),
            Some(DeviceId::new(16))
        );
    }
}
