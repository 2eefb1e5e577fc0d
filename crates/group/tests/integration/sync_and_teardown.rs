//! Cursor synchronization across a group and the two teardown paths.

use esilink_group::{GroupError, LinkGroup};
use esilink_primitives::{SyncOp, TeardownContext, ViewEvent, ViewKind};
use esilink_registry::Linker;

use crate::common;

/// A two-recording group with electrode coordinates: two synchronized
/// primary views, one per recording.
fn two_recording_group(
	dir: &std::path::Path,
) -> (esilink_registry::Registry, common::PromptLog, LinkGroup) {
	let lines = [
		dir.join("cap.xyz").display().to_string(),
		dir.join("rec1.sef").display().to_string(),
		dir.join("rec2.sef").display().to_string(),
	];
	let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
	let lm = common::write_lm(dir, "session.lm", &refs);
	let (mut reg, log) = common::registry();
	let group = LinkGroup::open(&mut reg, &lm).unwrap();
	(reg, log, group)
}

fn primary_view(
	reg: &esilink_registry::Registry,
	group: &LinkGroup,
	tracks_index: usize,
) -> esilink_primitives::ViewId {
	let doc = group.members().tracks[tracks_index];
	reg.views_of(doc)
		.iter()
		.copied()
		.find(|v| reg.view(*v).unwrap().kind == ViewKind::Tracks)
		.unwrap()
}

#[test]
fn cursor_moves_reach_one_view_per_document() {
	let dir = tempfile::tempdir().unwrap();
	let (mut reg, _log, group) = two_recording_group(dir.path());

	let v1 = primary_view(&reg, &group, 0);
	let v2 = primary_view(&reg, &group, 1);
	// An independent window on the first recording, outside the group.
	let external = reg.create_view(group.members().tracks[0], ViewKind::Tracks, None);

	assert!(reg.broadcast_from(v1, ViewEvent::CursorMoved { time_frame: 42 }));

	let inbox = |v| reg.view(v).unwrap().inbox().to_vec();
	// The sender's friend on the other recording hears the move; the
	// free-floating window on the same recording does not.
	assert_eq!(inbox(v2), [ViewEvent::CursorMoved { time_frame: 42 }]);
	assert!(inbox(external).is_empty());
	assert!(inbox(v1).is_empty());
}

#[test]
fn desync_all_makes_every_view_private() {
	let dir = tempfile::tempdir().unwrap();
	let (mut reg, _log, group) = two_recording_group(dir.path());

	let v1 = primary_view(&reg, &group, 0);
	let v2 = primary_view(&reg, &group, 1);
	assert!(reg.is_friend(v1, v2));

	group.sync_utility(&mut reg, SyncOp::DesyncAll);
	assert!(!reg.is_friend(v1, v2));

	assert!(!reg.broadcast_from(v1, ViewEvent::CursorMoved { time_frame: 7 }));
	assert!(reg.view(v2).unwrap().inbox().is_empty());
}

#[test]
fn sync_between_eeg_groups_views_per_recording() {
	let dir = tempfile::tempdir().unwrap();
	let (mut reg, _log, group) = two_recording_group(dir.path());

	// A second group-owned tracks view on the first recording.
	let extra = reg.create_view(group.members().tracks[0], ViewKind::Tracks, Some(group.doc_id()));
	let v1 = primary_view(&reg, &group, 0);
	let v2 = primary_view(&reg, &group, 1);

	group.sync_utility(&mut reg, SyncOp::DesyncAll);
	group.sync_utility(&mut reg, SyncOp::SyncBetweenEeg);

	assert!(reg.is_friend(v1, extra));
	assert!(!reg.is_friend(v1, v2));
}

#[test]
fn desync_between_eeg_splits_a_global_group_per_recording() {
	let dir = tempfile::tempdir().unwrap();
	let (mut reg, _log, group) = two_recording_group(dir.path());

	let extra = reg.create_view(group.members().tracks[0], ViewKind::Tracks, Some(group.doc_id()));
	group.sync_utility(&mut reg, SyncOp::SyncAll);

	let v1 = primary_view(&reg, &group, 0);
	let v2 = primary_view(&reg, &group, 1);
	assert!(reg.is_friend(v1, v2));
	assert!(reg.is_friend(v1, extra));

	group.sync_utility(&mut reg, SyncOp::DesyncBetweenEeg);

	// Same-recording views stay synchronized; the cross-recording link is
	// severed.
	assert!(reg.is_friend(v1, extra));
	assert!(!reg.is_friend(v1, v2));
}

#[test]
fn members_are_locked_while_the_group_is_open() {
	let dir = tempfile::tempdir().unwrap();
	let (mut reg, log, mut group) = two_recording_group(dir.path());

	let rec1 = group.members().tracks[0];
	assert!(!reg.can_close(rec1, false, TeardownContext::NORMAL));
	assert_eq!(log.messages().len(), 1);

	group.close(&mut reg, TeardownContext::NORMAL);
	// Everything the group opened is gone with it.
	assert_eq!(reg.documents().count(), 1);
	assert!(reg.doc(rec1).is_none());
}

#[test]
fn app_shutdown_skips_member_teardown() {
	let dir = tempfile::tempdir().unwrap();
	let (mut reg, _log, mut group) = two_recording_group(dir.path());
	let count = reg.documents().count();

	group.close(&mut reg, TeardownContext::APP_CLOSING);

	// Member records are left for the surrounding shutdown to reap.
	assert!(group.members().is_empty());
	assert_eq!(reg.documents().count(), count);
}

#[test]
fn view_held_lock_keeps_a_member_alive_through_group_close() {
	let dir = tempfile::tempdir().unwrap();
	let (mut reg, _log, mut group) = two_recording_group(dir.path());

	// An independent window on the first recording takes its own lock.
	let rec1 = group.members().tracks[0];
	let external = reg.create_view(rec1, ViewKind::Tracks, None);
	reg.link(Linker::Doc(rec1), Linker::View(external));

	group.close(&mut reg, TeardownContext::NORMAL);

	// The held recording and its window survive; the rest of the session
	// is gone.
	assert!(reg.doc(rec1).is_some());
	assert!(reg.view(external).is_some());
	assert_eq!(reg.documents().count(), 2);
	assert_eq!(reg.doc(rec1).unwrap().used_by(), [Linker::View(external)]);

	// Closing the window releases the lock and frees the recording.
	reg.destroy_view(external, TeardownContext::NORMAL);
	assert!(reg.can_close(rec1, true, TeardownContext::NORMAL));
}

#[test]
fn shared_members_survive_one_group_closing() {
	let dir = tempfile::tempdir().unwrap();
	let rec = dir.path().join("rec1.sef").display().to_string();
	let lm_a = common::write_lm(dir.path(), "a.lm", &[rec.as_str()]);
	let lm_b = common::write_lm(dir.path(), "b.lm", &[rec.as_str()]);
	let (mut reg, _log) = common::registry();
	let mut a = LinkGroup::open(&mut reg, &lm_a).unwrap();
	let mut b = LinkGroup::open(&mut reg, &lm_b).unwrap();

	let rec1 = a.members().tracks[0];
	assert_eq!(b.members().tracks, [rec1]);
	assert_eq!(reg.doc(rec1).unwrap().used_by().len(), 2);

	a.close(&mut reg, TeardownContext::NORMAL);

	// Still held by b.
	assert!(reg.doc(rec1).is_some());
	assert_eq!(reg.doc(rec1).unwrap().used_by().len(), 1);

	b.close(&mut reg, TeardownContext::NORMAL);
	assert!(reg.doc(rec1).is_none());
}

#[test]
fn revert_restores_the_committed_membership() {
	let dir = tempfile::tempdir().unwrap();
	let (mut reg, _log, mut group) = two_recording_group(dir.path());

	let rec3 = reg.open_or_find(&dir.path().join("rec3.sef"), false).unwrap();
	assert!(group.add_to_group(&mut reg, rec3));
	assert_eq!(group.members().tracks.len(), 3);
	assert!(group.is_dirty(&reg));

	group.revert(&mut reg).unwrap();

	assert_eq!(group.members().tracks.len(), 2);
	assert!(!group.is_dirty(&reg));
}

#[test]
fn failed_revert_leaves_the_group_clean() {
	let dir = tempfile::tempdir().unwrap();
	let (mut reg, _log, mut group) = two_recording_group(dir.path());

	let rec3 = reg.open_or_find(&dir.path().join("rec3.sef"), false).unwrap();
	assert!(group.add_to_group(&mut reg, rec3));
	assert!(group.is_dirty(&reg));

	// The committed file has vanished from under the session.
	std::fs::remove_file(dir.path().join("session.lm")).unwrap();
	let err = group.revert(&mut reg).unwrap_err();

	assert!(matches!(err, GroupError::LinkFile(_)));
	// The membership stays as it was, but the abandoned revert leaves the
	// dirty flag clear.
	assert_eq!(group.members().tracks.len(), 3);
	assert!(!group.is_dirty(&reg));
}
