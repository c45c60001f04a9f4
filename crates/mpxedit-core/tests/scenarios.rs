#![allow(clippy::unwrap_used)]

// End-to-end edit scenarios driven through the session, checking the
// emitted command lists and the virtual hierarchy together.

use mpxedit_core::listing;
use mpxedit_core::{
    CoreError, DeviceId, DeviceSnapshot, GroupRef, GroupStatus, MoveOutcome, Session,
};
use pretty_assertions::assert_eq;

const A: DeviceId = DeviceId::new(1);
const B: DeviceId = DeviceId::new(3);
const S: DeviceId = DeviceId::new(10);
const S2: DeviceId = DeviceId::new(11);
const U: DeviceId = DeviceId::FLOATING;

fn two_masters() -> Session {
    let snap = DeviceSnapshot::new()
        .with(1, "A pointer", ["master", "pointer", "2"])
        .with(2, "A keyboard", ["master", "keyboard", "1"])
        .with(3, "B pointer", ["master", "pointer", "4"])
        .with(4, "B keyboard", ["master", "keyboard", "3"])
        .with(10, "Mouse", ["slave", "pointer", "1"])
        .with(11, "Keyboard", ["slave", "keyboard", "2"]);
    Session::load(snap, "XTEST").unwrap()
}

fn lines(session: &Session) -> String {
    session
        .commands()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[test]
fn detach_then_undo() {
    let mut session = two_masters();
    session.move_device(S, U.into()).unwrap();
    insta::assert_snapshot!(lines(&session), @"float 10");

    session.undo_move(S).unwrap();
    assert_eq!(lines(&session), "");
    assert!(!session.has_changes());
}

#[test]
fn move_between_masters_reattaches_to_both_halves() {
    let mut session = two_masters();
    session.move_device(S, B.into()).unwrap();
    insta::assert_snapshot!(lines(&session), @"reattach 10 3; reattach 10 4");
    assert_eq!(session.hierarchy().devices_in(B.into()), vec![S]);
}

#[test]
fn many_moves_ending_at_home_leave_nothing_staged() {
    let mut session = two_masters();
    session.move_device(S, B.into()).unwrap();
    session.move_device(S, U.into()).unwrap();
    session.move_device(S, B.into()).unwrap();
    assert_eq!(
        session.move_device(S, A.into()).unwrap(),
        MoveOutcome::Cancelled
    );
    assert!(session.changes().target_of(S).is_none());
    assert!(session.commands().is_empty());
}

#[test]
fn delete_removes_master_without_floating_its_children() {
    let mut session = two_masters();
    assert_eq!(session.delete_group(A.into()).unwrap(), 2);

    insta::assert_snapshot!(lines(&session), @"remove-master 1");

    let hierarchy = session.hierarchy();
    assert_eq!(hierarchy.devices_in(U.into()), vec![S, S2]);
    assert!(hierarchy.devices_in(A.into()).is_empty());
    assert_eq!(
        hierarchy.group(A.into()).unwrap().status,
        GroupStatus::Deleted
    );
}

#[test]
fn delete_keeps_moves_out_and_floats_moves_in() {
    let mut session = two_masters();
    session.move_device(S, B.into()).unwrap();
    session.move_device(S2, B.into()).unwrap();
    session.delete_group(B.into()).unwrap();

    // Both now target the unattached group; their real parent A is live.
    insta::assert_snapshot!(lines(&session), @"float 10; float 11; remove-master 3");
}

#[test]
fn create_and_undo_create() {
    let mut session = two_masters();
    let pending = session.create_group("Foo");

    insta::assert_snapshot!(lines(&session), @"create-master Foo");
    let bucket = session
        .hierarchy()
        .group(GroupRef::Pending(pending.id))
        .unwrap();
    assert!(bucket.devices.is_empty());
    assert_eq!(bucket.label(), "Foo (pending)");

    session.undo_create(pending.id).unwrap();
    assert!(session.commands().is_empty());
    assert!(
        session
            .hierarchy()
            .group(GroupRef::Pending(pending.id))
            .is_none()
    );
}

#[test]
fn reset_restores_real_parents() {
    let mut session = two_masters();
    session.move_device(S, B.into()).unwrap();
    session.move_device(S2, U.into()).unwrap();
    session.create_group("Keep me");

    session.reset_group(A).unwrap();

    let hierarchy = session.hierarchy();
    assert_eq!(hierarchy.parent_of(S), Some(A.into()));
    assert_eq!(hierarchy.parent_of(S2), Some(A.into()));
    insta::assert_snapshot!(lines(&session), @r#"create-master "Keep me""#);
}

#[test]
fn invalid_edits_do_not_mutate() {
    let mut session = two_masters();
    let pending = session.create_group("Later");
    session.delete_group(B.into()).unwrap();
    let before = session.plan().clone();

    assert!(matches!(
        session.move_device(S, GroupRef::Pending(pending.id)),
        Err(CoreError::InvalidTarget { .. })
    ));
    assert!(matches!(
        session.move_device(S, B.into()),
        Err(CoreError::InvalidTarget { .. })
    ));
    assert!(matches!(
        session.delete_group(U.into()),
        Err(CoreError::IllegalDeletion { .. })
    ));
    assert!(matches!(
        session.undo_delete(A),
        Err(CoreError::UnknownEntity { .. })
    ));
    assert_eq!(session.plan(), &before);
}

#[test]
fn devices_of_a_deleted_group_cannot_go_home() {
    let mut session = two_masters();
    session.delete_group(A.into()).unwrap();
    let before = session.plan().clone();

    assert!(matches!(
        session.undo_move(S),
        Err(CoreError::InvalidTarget { .. })
    ));
    assert!(matches!(
        session.reset_group(A),
        Err(CoreError::InvalidTarget { .. })
    ));
    assert_eq!(session.plan(), &before);
    assert_eq!(session.hierarchy().parent_of(S), Some(U.into()));
    insta::assert_snapshot!(lines(&session), @"remove-master 1");

    session.undo_delete(A).unwrap();
    session.undo_move(S).unwrap();
    assert_eq!(session.hierarchy().parent_of(S), Some(A.into()));
}

#[test]
fn listing_text_drives_a_full_session() {
    let text = "\
⎡ Virtual core pointer                    \tid=2\t[master pointer  (3)]
⎜   ↳ Virtual core XTEST pointer              \tid=4\t[slave  pointer  (2)]
⎜   ↳ Logitech USB Receiver                   \tid=9\t[slave  pointer  (2)]
⎣ Virtual core keyboard                   \tid=3\t[master keyboard (2)]
    ↳ Virtual core XTEST keyboard             \tid=5\t[slave  keyboard (3)]
    ↳ AT Translated Set 2 keyboard            \tid=11\t[slave  keyboard (3)]
∼ Wacom Intuos Pen                          \tid=16\t[floating slave]
";
    let mut session = Session::load(listing::parse(text).unwrap(), "XTEST").unwrap();
    assert_eq!(session.model().device_count(), 3);

    session
        .move_device(DeviceId::new(16), DeviceId::new(2).into())
        .unwrap();
    session.detach(DeviceId::new(9)).unwrap();

    // Unattached bucket is emitted first, by group id.
    insta::assert_snapshot!(lines(&session), @"reattach 16 2; reattach 16 3; float 9");
}
