// ── Pending-change store ──
//
// Staged moves, deletions and creations. Every operation validates
// against the ground-truth model before touching state, so a rejected
// edit leaves the set exactly as it was. Operations that depend on
// where a device currently *appears* take the latest virtual hierarchy
// from the planner; the set never recomputes on its own.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{DeviceId, DeviceModel, GroupRef, MasterGroup, PendingGroup, PendingId};
use crate::planner::VirtualHierarchy;

/// Result of a successful move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// A new or changed pending move was recorded.
    Staged,
    /// The device went back to its real parent; its pending move is gone.
    Cancelled,
    /// Nothing to do: the exact state was already staged.
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// Device -> desired parent group. Never holds a move to the real parent.
    moves: BTreeMap<DeviceId, DeviceId>,
    deletions: BTreeSet<DeviceId>,
    creations: IndexMap<PendingId, PendingGroup>,
    /// Groups that received a device and should render expanded.
    expanded: BTreeSet<GroupRef>,
    next_pending: u32,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Moves ────────────────────────────────────────────────────────

    /// Stage moving `device` into `target`.
    ///
    /// Moving a device back to its real parent always collapses to "no
    /// pending move", however many intermediate moves came before.
    pub fn request_move(
        &mut self,
        model: &DeviceModel,
        device: DeviceId,
        target: GroupRef,
    ) -> Result<MoveOutcome, CoreError> {
        let slave = model
            .device(device)
            .ok_or_else(|| CoreError::unknown("device", device))?;

        let target = match target {
            GroupRef::Master(id) => id,
            GroupRef::Pending(id) => {
                let name = self
                    .creations
                    .get(&id)
                    .map_or_else(|| id.to_string(), |p| p.name.clone());
                return Err(CoreError::InvalidTarget {
                    target: name,
                    reason: "the group has not been created yet; apply pending changes first"
                        .into(),
                });
            }
        };
        let group = model
            .group(target)
            .ok_or_else(|| CoreError::unknown("group", target))?;

        // A device can never appear under a group pending deletion, not
        // even its real parent: removing the master floats it anyway.
        if self.deletions.contains(&target) {
            return Err(CoreError::InvalidTarget {
                target: group.name().to_owned(),
                reason: "the group is pending deletion".into(),
            });
        }

        if target == slave.parent {
            let outcome = if self.moves.remove(&device).is_some() {
                debug!(%device, "pending move cancelled");
                MoveOutcome::Cancelled
            } else {
                MoveOutcome::Unchanged
            };
            return Ok(outcome);
        }

        if self.moves.get(&device) == Some(&target) {
            return Ok(MoveOutcome::Unchanged);
        }

        debug!(%device, %target, "move staged");
        self.moves.insert(device, target);
        self.expanded.insert(GroupRef::Master(target));
        Ok(MoveOutcome::Staged)
    }

    /// Stage floating `device`.
    pub fn request_detach(
        &mut self,
        model: &DeviceModel,
        device: DeviceId,
    ) -> Result<MoveOutcome, CoreError> {
        self.request_move(model, device, GroupRef::Master(DeviceId::FLOATING))
    }

    /// Send `device` back to its real parent.
    ///
    /// Fails with `UnknownEntity` when the device has no pending move.
    pub fn undo_move(
        &mut self,
        model: &DeviceModel,
        device: DeviceId,
    ) -> Result<MoveOutcome, CoreError> {
        let slave = model
            .device(device)
            .ok_or_else(|| CoreError::unknown("device", device))?;
        if !self.moves.contains_key(&device) {
            return Err(CoreError::unknown("pending move", device));
        }
        self.request_move(model, device, GroupRef::Master(slave.parent))
    }

    /// Detach every device that currently appears under `group`.
    ///
    /// Devices whose real parent is the unattached group simply have
    /// their pending move cancelled. Returns how many devices changed.
    pub fn detach_all(
        &mut self,
        model: &DeviceModel,
        hierarchy: &VirtualHierarchy,
        group: DeviceId,
    ) -> Result<usize, CoreError> {
        let group = self.live_group(model, group)?;
        let members = hierarchy.devices_in(GroupRef::Master(group.id()));
        if let Some(missing) = members.iter().find(|d| model.device(**d).is_none()) {
            return Err(CoreError::unknown("device", missing));
        }

        let mut changed = 0;
        for device in members {
            if self.request_detach(model, device)? != MoveOutcome::Unchanged {
                changed += 1;
            }
        }
        Ok(changed)
    }

    // ── Creations ────────────────────────────────────────────────────

    /// Stage creation of a new master group called `name`.
    pub fn request_create(&mut self, name: impl Into<String>) -> PendingGroup {
        self.next_pending += 1;
        let pending = PendingGroup {
            id: PendingId::new(self.next_pending),
            name: name.into(),
        };
        debug!(id = %pending.id, name = %pending.name, "creation staged");
        self.creations.insert(pending.id, pending.clone());
        pending
    }

    pub fn undo_create(&mut self, pending: PendingId) -> Result<PendingGroup, CoreError> {
        let removed = self
            .creations
            .shift_remove(&pending)
            .ok_or_else(|| CoreError::unknown("pending group", pending))?;
        self.expanded.remove(&GroupRef::Pending(pending));
        debug!(id = %pending, "creation cancelled");
        Ok(removed)
    }

    // ── Deletions ────────────────────────────────────────────────────

    /// Stage deletion of `group`, detaching everything that currently
    /// appears under it first.
    ///
    /// The detaches are recorded as ordinary pending moves, so undoing the
    /// deletion leaves them in place.
    pub fn request_delete(
        &mut self,
        model: &DeviceModel,
        hierarchy: &VirtualHierarchy,
        group: GroupRef,
    ) -> Result<usize, CoreError> {
        let id = match group {
            GroupRef::Master(id) => id,
            GroupRef::Pending(id) => {
                let name = self
                    .creations
                    .get(&id)
                    .map_or_else(|| id.to_string(), |p| p.name.clone());
                return Err(CoreError::IllegalDeletion {
                    group: name,
                    reason: "the group is only pending creation; undo the creation instead".into(),
                });
            }
        };
        let master = model
            .group(id)
            .ok_or_else(|| CoreError::unknown("group", id))?;
        if master.is_unattached() {
            return Err(CoreError::IllegalDeletion {
                group: master.name().to_owned(),
                reason: "the unattached group always exists".into(),
            });
        }
        if self.deletions.contains(&id) {
            return Err(CoreError::IllegalDeletion {
                group: master.name().to_owned(),
                reason: "the group is already pending deletion".into(),
            });
        }

        let detached = self.detach_all(model, hierarchy, id)?;
        self.deletions.insert(id);
        debug!(group = %id, detached, "deletion staged");
        Ok(detached)
    }

    pub fn undo_delete(&mut self, group: DeviceId) -> Result<(), CoreError> {
        if !self.deletions.remove(&group) {
            return Err(CoreError::unknown("pending deletion", group));
        }
        debug!(%group, "deletion cancelled");
        Ok(())
    }

    // ── Reset ────────────────────────────────────────────────────────

    /// Cancel every pending move into or out of `group`.
    ///
    /// Afterwards every device whose real or virtual parent was `group`
    /// appears under its real parent again. Returns how many moves were
    /// cancelled.
    pub fn reset_group(
        &mut self,
        model: &DeviceModel,
        hierarchy: &VirtualHierarchy,
        group: DeviceId,
    ) -> Result<usize, CoreError> {
        let master = model
            .group(group)
            .ok_or_else(|| CoreError::unknown("group", group))?;
        let here = GroupRef::Master(group);

        let moved_in = hierarchy
            .devices_in(here)
            .into_iter()
            .filter(|d| model.device(*d).is_some_and(|s| s.parent != group));
        let moved_out = master
            .children()
            .iter()
            .copied()
            .filter(|d| hierarchy.parent_of(*d) != Some(here));
        let touched: BTreeSet<DeviceId> = moved_in
            .chain(moved_out)
            .filter(|d| self.moves.contains_key(d))
            .collect();

        // Validate every device up front so a rejected reset changes nothing.
        for device in &touched {
            let slave = model
                .device(*device)
                .ok_or_else(|| CoreError::unknown("device", *device))?;
            if self.is_deleted(slave.parent) {
                let home = self.live_group(model, slave.parent)?;
                return Err(CoreError::InvalidTarget {
                    target: home.name().to_owned(),
                    reason: format!(
                        "device {device} cannot return to a group pending deletion; undo the deletion first"
                    ),
                });
            }
        }

        let mut cancelled = 0;
        for device in touched {
            self.undo_move(model, device)?;
            cancelled += 1;
        }
        debug!(%group, cancelled, "group reset");
        Ok(cancelled)
    }

    // ── Whole-set operations ─────────────────────────────────────────

    /// Forget every staged edit.
    pub fn clear(&mut self) {
        self.moves.clear();
        self.deletions.clear();
        self.creations.clear();
        self.expanded.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.deletions.is_empty() && self.creations.is_empty()
    }

    /// Number of staged entries across all three categories.
    pub fn len(&self) -> usize {
        self.moves.len() + self.deletions.len() + self.creations.len()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn target_of(&self, device: DeviceId) -> Option<DeviceId> {
        self.moves.get(&device).copied()
    }

    pub fn moves(&self) -> impl Iterator<Item = (DeviceId, DeviceId)> + '_ {
        self.moves.iter().map(|(d, t)| (*d, *t))
    }

    pub fn is_deleted(&self, group: DeviceId) -> bool {
        self.deletions.contains(&group)
    }

    pub fn deletions(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.deletions.iter().copied()
    }

    /// Pending groups in the order they were requested.
    pub fn creations(&self) -> impl Iterator<Item = &PendingGroup> {
        self.creations.values()
    }

    pub fn pending(&self, id: PendingId) -> Option<&PendingGroup> {
        self.creations.get(&id)
    }

    pub fn pending_by_name(&self, name: &str) -> Option<&PendingGroup> {
        self.creations.values().find(|p| p.name == name)
    }

    pub fn is_expanded(&self, group: GroupRef) -> bool {
        self.expanded.contains(&group)
    }

    fn live_group<'m>(
        &self,
        model: &'m DeviceModel,
        group: DeviceId,
    ) -> Result<&'m MasterGroup, CoreError> {
        model
            .group(group)
            .ok_or_else(|| CoreError::unknown("group", group))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DeviceSnapshot;
    use crate::planner::plan;

    const A: DeviceId = DeviceId::new(2);
    const B: DeviceId = DeviceId::new(4);
    const S1: DeviceId = DeviceId::new(10);
    const S2: DeviceId = DeviceId::new(11);
    const F: DeviceId = DeviceId::new(12);
    const U: DeviceId = DeviceId::FLOATING;

    fn model() -> DeviceModel {
        let snap = DeviceSnapshot::new()
            .with(2, "Pointer A", ["master", "pointer", "3"])
            .with(3, "Keyboard A", ["master", "keyboard", "2"])
            .with(4, "Pointer B", ["master", "pointer", "5"])
            .with(5, "Keyboard B", ["master", "keyboard", "4"])
            .with(10, "Mouse", ["slave", "pointer", "2"])
            .with(11, "Keyboard", ["slave", "keyboard", "3"])
            .with(12, "Tablet", ["floating", "slave"]);
        DeviceModel::from_snapshot(&snap).unwrap()
    }

    fn hierarchy(model: &DeviceModel, changes: &ChangeSet) -> VirtualHierarchy {
        plan(model, changes).hierarchy
    }

    #[test]
    fn move_back_to_real_parent_collapses() {
        let model = model();
        let mut changes = ChangeSet::new();

        assert_eq!(
            changes.request_move(&model, S1, B.into()).unwrap(),
            MoveOutcome::Staged
        );
        assert_eq!(
            changes.request_move(&model, S1, U.into()).unwrap(),
            MoveOutcome::Staged
        );
        assert_eq!(
            changes.request_move(&model, S1, A.into()).unwrap(),
            MoveOutcome::Cancelled
        );
        assert!(changes.target_of(S1).is_none());
        assert!(changes.is_empty());
    }

    #[test]
    fn repeated_move_is_unchanged() {
        let model = model();
        let mut changes = ChangeSet::new();
        changes.request_move(&model, S1, B.into()).unwrap();
        assert_eq!(
            changes.request_move(&model, S1, B.into()).unwrap(),
            MoveOutcome::Unchanged
        );
        assert!(changes.is_expanded(GroupRef::Master(B)));
    }

    #[test]
    fn move_into_pending_group_is_rejected() {
        let model = model();
        let mut changes = ChangeSet::new();
        let pending = changes.request_create("New pointer");

        let err = changes
            .request_move(&model, S1, GroupRef::Pending(pending.id))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTarget { .. }), "{err}");
        assert!(changes.target_of(S1).is_none());
    }

    #[test]
    fn move_into_deleted_group_is_rejected() {
        let model = model();
        let mut changes = ChangeSet::new();
        let h = hierarchy(&model, &changes);
        changes.request_delete(&model, &h, B.into()).unwrap();

        let err = changes.request_move(&model, F, B.into()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTarget { .. }), "{err}");
        assert!(changes.target_of(F).is_none());
    }

    #[test]
    fn unknown_device_or_group_is_reported() {
        let model = model();
        let mut changes = ChangeSet::new();
        assert!(matches!(
            changes.request_move(&model, DeviceId::new(99), A.into()),
            Err(CoreError::UnknownEntity { .. })
        ));
        assert!(matches!(
            changes.request_move(&model, S1, DeviceId::new(99).into()),
            Err(CoreError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn undo_move_requires_a_pending_move() {
        let model = model();
        let mut changes = ChangeSet::new();
        assert!(matches!(
            changes.undo_move(&model, S1),
            Err(CoreError::UnknownEntity { .. })
        ));

        changes.request_detach(&model, S1).unwrap();
        assert_eq!(changes.undo_move(&model, S1).unwrap(), MoveOutcome::Cancelled);
        assert!(changes.is_empty());
    }

    #[test]
    fn undo_create_of_unknown_group_fails() {
        let mut changes = ChangeSet::new();
        let pending = changes.request_create("Foo");
        changes.undo_create(pending.id).unwrap();
        assert!(matches!(
            changes.undo_create(pending.id),
            Err(CoreError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn pending_ids_are_unique_even_for_equal_names() {
        let mut changes = ChangeSet::new();
        let first = changes.request_create("Foo");
        let second = changes.request_create("Foo");
        assert_ne!(first.id, second.id);
        assert_eq!(changes.creations().count(), 2);
    }

    #[test]
    fn unattached_group_cannot_be_deleted() {
        let model = model();
        let mut changes = ChangeSet::new();
        let h = hierarchy(&model, &changes);

        let err = changes.request_delete(&model, &h, U.into()).unwrap_err();
        assert!(matches!(err, CoreError::IllegalDeletion { .. }), "{err}");
        assert!(changes.is_empty());
    }

    #[test]
    fn pending_group_cannot_be_deleted() {
        let model = model();
        let mut changes = ChangeSet::new();
        let pending = changes.request_create("Foo");
        let h = hierarchy(&model, &changes);

        let err = changes
            .request_delete(&model, &h, GroupRef::Pending(pending.id))
            .unwrap_err();
        assert!(matches!(err, CoreError::IllegalDeletion { .. }), "{err}");
    }

    #[test]
    fn double_delete_is_rejected() {
        let model = model();
        let mut changes = ChangeSet::new();
        let h = hierarchy(&model, &changes);
        changes.request_delete(&model, &h, A.into()).unwrap();
        let h = hierarchy(&model, &changes);
        assert!(changes.request_delete(&model, &h, A.into()).is_err());
    }

    #[test]
    fn delete_detaches_virtual_members_not_real_children() {
        let model = model();
        let mut changes = ChangeSet::new();
        // Tablet moved into A, Keyboard moved out of A before deleting A.
        changes.request_move(&model, F, A.into()).unwrap();
        changes.request_move(&model, S2, B.into()).unwrap();
        let h = hierarchy(&model, &changes);

        let detached = changes.request_delete(&model, &h, A.into()).unwrap();
        assert_eq!(detached, 2);
        assert_eq!(changes.target_of(S1), Some(U));
        // Floating tablet goes home: its move is cancelled.
        assert_eq!(changes.target_of(F), None);
        // Keyboard stays where it was moved.
        assert_eq!(changes.target_of(S2), Some(B));
        assert!(changes.is_deleted(A));
    }

    #[test]
    fn undo_delete_keeps_auto_detaches() {
        let model = model();
        let mut changes = ChangeSet::new();
        let h = hierarchy(&model, &changes);
        changes.request_delete(&model, &h, A.into()).unwrap();

        changes.undo_delete(A).unwrap();
        assert!(!changes.is_deleted(A));
        assert_eq!(changes.target_of(S1), Some(U));
        assert_eq!(changes.target_of(S2), Some(U));

        assert!(matches!(
            changes.undo_delete(A),
            Err(CoreError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn undo_move_into_deleted_parent_is_rejected() {
        let model = model();
        let mut changes = ChangeSet::new();
        let h = hierarchy(&model, &changes);
        changes.request_delete(&model, &h, A.into()).unwrap();

        let err = changes.undo_move(&model, S1).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTarget { .. }), "{err}");
        let err = changes.request_move(&model, S1, A.into()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTarget { .. }), "{err}");
        assert_eq!(changes.target_of(S1), Some(U));

        let p = plan(&model, &changes);
        assert_eq!(p.hierarchy.parent_of(S1), Some(U.into()));
        assert_eq!(
            p.commands.iter().map(ToString::to_string).collect::<Vec<_>>(),
            ["remove-master 2"]
        );
    }

    #[test]
    fn rejected_reset_changes_nothing() {
        let snap = DeviceSnapshot::new()
            .with(2, "Pointer A", ["master", "pointer", "3"])
            .with(3, "Keyboard A", ["master", "keyboard", "2"])
            .with(4, "Pointer B", ["master", "pointer", "5"])
            .with(5, "Keyboard B", ["master", "keyboard", "4"])
            .with(12, "Tablet", ["floating", "slave"])
            .with(13, "Trackball", ["slave", "pointer", "4"]);
        let model = DeviceModel::from_snapshot(&snap).unwrap();
        let trackball = DeviceId::new(13);

        let mut changes = ChangeSet::new();
        changes.request_move(&model, F, A.into()).unwrap();
        changes.request_move(&model, trackball, A.into()).unwrap();
        let h = hierarchy(&model, &changes);
        changes.request_delete(&model, &h, B.into()).unwrap();

        // Trackball cannot go home to B, so nothing is reset.
        let h = hierarchy(&model, &changes);
        let err = changes.reset_group(&model, &h, A).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTarget { .. }), "{err}");
        assert_eq!(changes.target_of(F), Some(A));
        assert_eq!(changes.target_of(trackball), Some(A));

        changes.undo_delete(B).unwrap();
        let h = hierarchy(&model, &changes);
        assert_eq!(changes.reset_group(&model, &h, A).unwrap(), 2);
        assert!(changes.is_empty());
    }

    #[test]
    fn reset_cancels_moves_in_both_directions() {
        let model = model();
        let mut changes = ChangeSet::new();
        changes.request_move(&model, S1, B.into()).unwrap();
        changes.request_move(&model, F, A.into()).unwrap();
        changes.request_move(&model, S2, U.into()).unwrap();
        let h = hierarchy(&model, &changes);

        assert_eq!(changes.reset_group(&model, &h, A).unwrap(), 3);
        assert!(changes.is_empty());
    }

    #[test]
    fn reset_leaves_unrelated_moves_alone() {
        let model = model();
        let mut changes = ChangeSet::new();
        changes.request_move(&model, S1, B.into()).unwrap();
        changes.request_move(&model, F, B.into()).unwrap();
        let h = hierarchy(&model, &changes);

        // F: real parent U, virtual parent B; untouched by resetting A.
        assert_eq!(changes.reset_group(&model, &h, A).unwrap(), 1);
        assert_eq!(changes.target_of(F), Some(B));
        assert_eq!(changes.target_of(S1), None);
    }

    #[test]
    fn clear_empties_everything() {
        let model = model();
        let mut changes = ChangeSet::new();
        changes.request_detach(&model, S1).unwrap();
        changes.request_create("Foo");
        let h = hierarchy(&model, &changes);
        changes.request_delete(&model, &h, B.into()).unwrap();
        assert_eq!(changes.len(), 3);

        changes.clear();
        assert!(changes.is_empty());
        assert_eq!(changes.len(), 0);
    }
}
