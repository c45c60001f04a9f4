// ── Domain model ──
//
// Identity types, device entities, raw snapshots, and the ground-truth
// hierarchy built from them.

pub mod device;
pub mod entity_id;
pub mod hierarchy;
pub mod snapshot;

pub use device::{DeviceKind, MasterGroup, PendingGroup, SlaveDevice, UNATTACHED_NAME};
pub use entity_id::{DeviceId, GroupRef, PendingId};
pub use hierarchy::DeviceModel;
pub use snapshot::{DEFAULT_SYNTHETIC_MARKER, DeviceClass, DeviceRecord, DeviceSnapshot};
