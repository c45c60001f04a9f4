// ── Planner ──
//
// Pure recompute of the virtual hierarchy and the xinput command list
// from the model plus the change set. Always recomputed from scratch so
// the two outputs cannot disagree.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::changeset::ChangeSet;
use crate::command::Command;
use crate::model::{DeviceId, DeviceModel, GroupRef, SlaveDevice};

/// Output of one recompute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub hierarchy: VirtualHierarchy,
    pub commands: Vec<Command>,
}

/// Status shown next to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    Live,
    Unattached,
    Deleted,
    Pending,
}

impl GroupStatus {
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Deleted => Some("(deleted)"),
            Self::Pending => Some("(pending)"),
            Self::Live | Self::Unattached => None,
        }
    }
}

/// Status shown next to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Settled,
    MovePending,
}

impl DeviceStatus {
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            Self::MovePending => Some("(move pending)"),
            Self::Settled => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualDevice {
    pub id: DeviceId,
    pub name: String,
    pub real_parent: DeviceId,
    pub status: DeviceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualGroup {
    pub group: GroupRef,
    pub name: String,
    pub status: GroupStatus,
    /// Set once a staged move lands a device here.
    pub expanded: bool,
    pub devices: Vec<VirtualDevice>,
}

impl VirtualGroup {
    /// Name plus status suffix, as shown in a tree.
    pub fn label(&self) -> String {
        match self.status.suffix() {
            Some(suffix) => format!("{} {suffix}", self.name),
            None => self.name.clone(),
        }
    }
}

/// The hierarchy as it would look once every staged edit is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VirtualHierarchy {
    /// Display order: real groups by id, pending groups, unattached last.
    groups: Vec<VirtualGroup>,
    #[serde(skip)]
    parents: BTreeMap<DeviceId, GroupRef>,
}

impl VirtualHierarchy {
    pub fn groups(&self) -> &[VirtualGroup] {
        &self.groups
    }

    pub fn group(&self, group: GroupRef) -> Option<&VirtualGroup> {
        self.groups.iter().find(|g| g.group == group)
    }

    /// Where `device` currently appears.
    pub fn parent_of(&self, device: DeviceId) -> Option<GroupRef> {
        self.parents.get(&device).copied()
    }

    /// Devices currently appearing under `group`, ascending by id.
    pub fn devices_in(&self, group: GroupRef) -> Vec<DeviceId> {
        self.group(group)
            .map(|g| g.devices.iter().map(|d| d.id).collect())
            .unwrap_or_default()
    }
}

/// Recompute the virtual hierarchy and command list.
///
/// Deterministic and side-effect free. Commands come out in emission
/// order: per real group in id order, `remove-master` for a deleted group
/// followed by the move commands of its real children; then one
/// `create-master` per pending group in request order.
pub fn plan(model: &DeviceModel, changes: &ChangeSet) -> Plan {
    let mut buckets: BTreeMap<GroupRef, Vec<VirtualDevice>> = BTreeMap::new();
    for group in model.groups_by_identity() {
        buckets.insert(GroupRef::Master(group.id()), Vec::new());
    }
    for pending in changes.creations() {
        buckets.insert(GroupRef::Pending(pending.id), Vec::new());
    }

    let mut commands = Vec::new();
    for group in model.groups_by_identity() {
        if changes.is_deleted(group.id()) {
            commands.push(Command::RemoveMaster { id: group.id() });
        }
        for device in group.children().iter().filter_map(|id| model.device(*id)) {
            let (home, status) = match changes.target_of(device.id) {
                Some(target) => {
                    emit_move(model, changes, device, target, &mut commands);
                    (target, DeviceStatus::MovePending)
                }
                None => (group.id(), DeviceStatus::Settled),
            };
            buckets
                .entry(GroupRef::Master(home))
                .or_default()
                .push(VirtualDevice {
                    id: device.id,
                    name: device.name.clone(),
                    real_parent: device.parent,
                    status,
                });
        }
    }

    for pending in changes.creations() {
        commands.push(Command::CreateMaster {
            name: pending.name.clone(),
        });
    }

    Plan {
        hierarchy: assemble(model, changes, buckets),
        commands,
    }
}

fn emit_move(
    model: &DeviceModel,
    changes: &ChangeSet,
    device: &SlaveDevice,
    target: DeviceId,
    commands: &mut Vec<Command>,
) {
    if target == DeviceId::FLOATING {
        // Removing a master floats its slaves already.
        if !changes.is_deleted(device.parent) {
            commands.push(Command::Float { device: device.id });
        }
        return;
    }
    let Some(group) = model.group(target) else {
        return;
    };
    commands.push(Command::Reattach {
        device: device.id,
        master: group.pointer_id(),
    });
    commands.push(Command::Reattach {
        device: device.id,
        master: group.keyboard_id(),
    });
}

fn assemble(
    model: &DeviceModel,
    changes: &ChangeSet,
    mut buckets: BTreeMap<GroupRef, Vec<VirtualDevice>>,
) -> VirtualHierarchy {
    let mut take = |group: GroupRef| {
        let mut devices = buckets.remove(&group).unwrap_or_default();
        devices.sort_by_key(|d| d.id);
        devices
    };

    let mut groups = Vec::new();
    for master in model.all_groups().into_iter().filter(|g| !g.is_unattached()) {
        let group = GroupRef::Master(master.id());
        groups.push(VirtualGroup {
            group,
            name: master.name().to_owned(),
            status: if changes.is_deleted(master.id()) {
                GroupStatus::Deleted
            } else {
                GroupStatus::Live
            },
            expanded: changes.is_expanded(group),
            devices: take(group),
        });
    }
    for pending in changes.creations() {
        let group = GroupRef::Pending(pending.id);
        groups.push(VirtualGroup {
            group,
            name: pending.name.clone(),
            status: GroupStatus::Pending,
            expanded: changes.is_expanded(group),
            devices: take(group),
        });
    }
    let unattached = model.unattached_group();
    let group = GroupRef::Master(unattached.id());
    groups.push(VirtualGroup {
        group,
        name: unattached.name().to_owned(),
        status: GroupStatus::Unattached,
        expanded: changes.is_expanded(group),
        devices: take(group),
    });

    let parents = groups
        .iter()
        .flat_map(|g| g.devices.iter().map(move |d| (d.id, g.group)))
        .collect();

    VirtualHierarchy { groups, parents }
}
