// ── Editing session ──
//
// Owns the model, the change set and the latest plan. Every edit goes
// through the change set and is followed by a full recompute, so callers
// always read a hierarchy and command list that match the staged edits.

use tracing::{debug, info};

use crate::changeset::{ChangeSet, MoveOutcome};
use crate::command::{Command, CommandRunner};
use crate::error::CoreError;
use crate::listing::SnapshotSource;
use crate::model::{
    DEFAULT_SYNTHETIC_MARKER, DeviceId, DeviceModel, DeviceSnapshot, GroupRef, PendingGroup,
    PendingId,
};
use crate::planner::{Plan, VirtualHierarchy, plan};

/// A single user's editing session over one loaded snapshot.
#[derive(Debug, Clone)]
pub struct Session {
    model: DeviceModel,
    changes: ChangeSet,
    plan: Plan,
    synthetic_marker: String,
}

impl Session {
    /// Start a session over an already-built model.
    pub fn new(model: DeviceModel) -> Self {
        let changes = ChangeSet::new();
        let plan = plan(&model, &changes);
        Self {
            model,
            changes,
            plan,
            synthetic_marker: DEFAULT_SYNTHETIC_MARKER.into(),
        }
    }

    /// Build the model from `snapshot`, dropping devices whose name
    /// contains `synthetic_marker`.
    pub fn load(snapshot: DeviceSnapshot, synthetic_marker: &str) -> Result<Self, CoreError> {
        let model = DeviceModel::ingest(snapshot, synthetic_marker)?;
        let mut session = Self::new(model);
        session.synthetic_marker = synthetic_marker.to_owned();
        Ok(session)
    }

    pub fn from_source(
        source: &dyn SnapshotSource,
        synthetic_marker: &str,
    ) -> Result<Self, CoreError> {
        Self::load(source.snapshot()?, synthetic_marker)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn model(&self) -> &DeviceModel {
        &self.model
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn hierarchy(&self) -> &VirtualHierarchy {
        &self.plan.hierarchy
    }

    pub fn commands(&self) -> &[Command] {
        &self.plan.commands
    }

    /// Whether there is anything to apply.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    // ── Edits ────────────────────────────────────────────────────────

    pub fn move_device(
        &mut self,
        device: DeviceId,
        target: GroupRef,
    ) -> Result<MoveOutcome, CoreError> {
        let outcome = self.changes.request_move(&self.model, device, target)?;
        self.replan();
        Ok(outcome)
    }

    pub fn detach(&mut self, device: DeviceId) -> Result<MoveOutcome, CoreError> {
        let outcome = self.changes.request_detach(&self.model, device)?;
        self.replan();
        Ok(outcome)
    }

    pub fn undo_move(&mut self, device: DeviceId) -> Result<MoveOutcome, CoreError> {
        let outcome = self.changes.undo_move(&self.model, device)?;
        self.replan();
        Ok(outcome)
    }

    pub fn detach_all(&mut self, group: DeviceId) -> Result<usize, CoreError> {
        let changed = self
            .changes
            .detach_all(&self.model, &self.plan.hierarchy, group)?;
        self.replan();
        Ok(changed)
    }

    pub fn create_group(&mut self, name: impl Into<String>) -> PendingGroup {
        let pending = self.changes.request_create(name);
        self.replan();
        pending
    }

    pub fn undo_create(&mut self, pending: PendingId) -> Result<PendingGroup, CoreError> {
        let removed = self.changes.undo_create(pending)?;
        self.replan();
        Ok(removed)
    }

    pub fn delete_group(&mut self, group: GroupRef) -> Result<usize, CoreError> {
        let detached = self
            .changes
            .request_delete(&self.model, &self.plan.hierarchy, group)?;
        self.replan();
        Ok(detached)
    }

    pub fn undo_delete(&mut self, group: DeviceId) -> Result<(), CoreError> {
        self.changes.undo_delete(group)?;
        self.replan();
        Ok(())
    }

    pub fn reset_group(&mut self, group: DeviceId) -> Result<usize, CoreError> {
        let cancelled = self
            .changes
            .reset_group(&self.model, &self.plan.hierarchy, group)?;
        self.replan();
        Ok(cancelled)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Replace the model with a fresh snapshot.
    ///
    /// Staged edits are discarded; unless `discard` is set, a non-empty
    /// change set refuses the reload with `UnsavedChanges`.
    pub fn reload(&mut self, snapshot: DeviceSnapshot, discard: bool) -> Result<(), CoreError> {
        if self.has_changes() && !discard {
            return Err(CoreError::UnsavedChanges {
                pending: self.changes.len(),
            });
        }
        let model = DeviceModel::ingest(snapshot, &self.synthetic_marker)?;
        info!(
            devices = model.device_count(),
            discarded = self.changes.len(),
            "session reloaded"
        );
        self.model = model;
        self.changes.clear();
        self.replan();
        Ok(())
    }

    /// Dispatch every planned command and clear the change set.
    ///
    /// Success is assumed; callers reload a fresh snapshot afterwards to
    /// see what actually happened. Returns the dispatched commands.
    pub fn commit(&mut self, runner: &dyn CommandRunner) -> Vec<Command> {
        let commands = std::mem::take(&mut self.plan.commands);
        for command in &commands {
            runner.dispatch(command);
        }
        info!(count = commands.len(), "pending changes committed");
        self.changes.clear();
        self.replan();
        commands
    }

    fn replan(&mut self) {
        self.plan = plan(&self.model, &self.changes);
        debug!(
            staged = self.changes.len(),
            commands = self.plan.commands.len(),
            "plan recomputed"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct RecordingRunner {
        seen: RefCell<Vec<String>>,
    }

    impl CommandRunner for RecordingRunner {
        fn dispatch(&self, command: &Command) {
            self.seen.borrow_mut().push(command.to_string());
        }
    }

    fn snapshot() -> DeviceSnapshot {
        DeviceSnapshot::new()
            .with(2, "Virtual core pointer", ["master", "pointer", "3"])
            .with(3, "Virtual core keyboard", ["master", "keyboard", "2"])
            .with(4, "Virtual core XTEST pointer", ["slave", "pointer", "2"])
            .with(9, "Mouse", ["slave", "pointer", "2"])
            .with(16, "Tablet", ["floating", "slave"])
    }

    #[test]
    fn edits_recompute_the_plan() {
        let mut session = Session::load(snapshot(), DEFAULT_SYNTHETIC_MARKER).unwrap();
        assert!(!session.has_changes());

        session.detach(DeviceId::new(9)).unwrap();
        assert_eq!(session.commands().len(), 1);
        assert_eq!(
            session.hierarchy().parent_of(DeviceId::new(9)),
            Some(GroupRef::Master(DeviceId::FLOATING))
        );

        session.undo_move(DeviceId::new(9)).unwrap();
        assert!(session.commands().is_empty());
        assert!(!session.has_changes());
    }

    #[test]
    fn rejected_edit_leaves_plan_untouched() {
        let mut session = Session::load(snapshot(), DEFAULT_SYNTHETIC_MARKER).unwrap();
        session.detach(DeviceId::new(9)).unwrap();
        let before = session.plan().clone();

        assert!(session.delete_group(DeviceId::FLOATING.into()).is_err());
        assert_eq!(session.plan(), &before);
    }

    #[test]
    fn reload_refuses_to_discard_without_consent() {
        let mut session = Session::load(snapshot(), DEFAULT_SYNTHETIC_MARKER).unwrap();
        session.create_group("Foo");

        let err = session.reload(snapshot(), false).unwrap_err();
        assert!(matches!(err, CoreError::UnsavedChanges { pending: 1 }));
        assert!(session.has_changes());

        session.reload(snapshot(), true).unwrap();
        assert!(!session.has_changes());
    }

    #[test]
    fn reload_keeps_the_synthetic_marker() {
        let mut session = Session::load(snapshot(), DEFAULT_SYNTHETIC_MARKER).unwrap();
        session.reload(snapshot(), false).unwrap();
        assert!(session.model().device(DeviceId::new(4)).is_none());
    }

    #[test]
    fn commit_dispatches_in_order_and_clears() {
        let mut session = Session::load(snapshot(), DEFAULT_SYNTHETIC_MARKER).unwrap();
        session.create_group("Second");
        session
            .move_device(DeviceId::new(16), DeviceId::new(2).into())
            .unwrap();

        let runner = RecordingRunner::default();
        let dispatched = session.commit(&runner);

        assert_eq!(dispatched.len(), 3);
        assert_eq!(
            runner.seen.into_inner(),
            vec!["reattach 16 2", "reattach 16 3", "create-master Second"]
        );
        assert!(!session.has_changes());
        assert!(session.commands().is_empty());
    }
}
