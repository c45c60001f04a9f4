//! Pending-change engine for the X.Org Multi-Pointer X device hierarchy.
//!
//! This crate owns the domain model and the staging logic behind `mpxedit`:
//!
//! - **[`DeviceModel`]**: Ground truth built from one [`DeviceSnapshot`]:
//!   master pointer/keyboard pairs ([`MasterGroup`]), the reserved
//!   unattached group, and every [`SlaveDevice`] under its real owner.
//!
//! - **[`ChangeSet`]**: Staged edits (moves, deletions, creations). Each
//!   edit is validated against the model and can be undone independently.
//!
//! - **[`plan()`]**: Pure recompute of the virtual hierarchy and the
//!   ordered `xinput` [`Command`] list from model + change set.
//!
//! - **[`Session`]**: Facade that owns all three and recomputes after
//!   every edit, so the displayed hierarchy and the command list can never
//!   drift apart.
//!
//! - **Collaborators**: [`SnapshotSource`] (`xinput list` or a saved
//!   listing, see [`listing`]) and [`CommandRunner`] (fire-and-forget
//!   process dispatch).

pub mod changeset;
pub mod command;
pub mod error;
pub mod listing;
pub mod model;
pub mod planner;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use changeset::{ChangeSet, MoveOutcome};
pub use command::{Command, CommandRunner, DryRunRunner, ProcessRunner};
pub use error::CoreError;
pub use listing::{ListingFile, SnapshotSource, XinputLister};
pub use planner::{
    DeviceStatus, GroupStatus, Plan, VirtualDevice, VirtualGroup, VirtualHierarchy, plan,
};
pub use session::Session;

pub use model::{
    DEFAULT_SYNTHETIC_MARKER, DeviceClass, DeviceId, DeviceKind, DeviceModel, DeviceRecord,
    DeviceSnapshot, GroupRef, MasterGroup, PendingGroup, PendingId, SlaveDevice,
};
