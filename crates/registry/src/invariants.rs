//! Machine-checkable invariant proofs for the lock and friendship relations.

use std::path::{Path, PathBuf};

use esilink_primitives::{DocId, TeardownContext, ViewEvent, ViewKind};
use rustc_hash::FxHashMap;

use crate::{DocMeta, DocumentSource, Linker, Prompter, Registry, SourceError};

struct MapSource(FxHashMap<PathBuf, DocMeta>);

impl DocumentSource for MapSource {
	fn probe(&mut self, path: &Path) -> Result<DocMeta, SourceError> {
		self.0
			.get(path)
			.cloned()
			.ok_or_else(|| SourceError::UnknownKind { path: path.to_path_buf() })
	}
}

/// Declines everything, confirms nothing. Invariant tests must never depend
/// on a prompt answer.
struct MutePrompter;

impl Prompter for MutePrompter {
	fn confirm_open_failure(&mut self, _path: &Path, _error: &SourceError) -> bool {
		false
	}
	fn select_files(&mut self) -> Option<Vec<PathBuf>> {
		None
	}
	fn select_save_path(&mut self, _suggested: Option<&Path>) -> Option<PathBuf> {
		None
	}
	fn blocking_message(&mut self, _title: &str, _message: &str) {}
	fn confirm_close(&mut self, _title: &str) -> bool {
		false
	}
}

fn tracks_meta() -> DocMeta {
	DocMeta::Tracks { electrodes: 32, time_frames: 500, frequency_bands: 0, segmentation: false }
}

fn registry_with_tracks(n: usize) -> (Registry, Vec<DocId>) {
	let mut files = FxHashMap::default();
	let mut paths = Vec::new();
	for i in 0..n {
		let path = PathBuf::from(format!("/data/rec{i}.sef"));
		files.insert(path.clone(), tracks_meta());
		paths.push(path);
	}
	let mut reg = Registry::new(Box::new(MapSource(files)), Box::new(MutePrompter));
	let docs = paths
		.iter()
		.map(|p| reg.open_or_find(p, false).expect("probe scripted"))
		.collect();
	(reg, docs)
}

/// Invariant: after `link(a, b)`, `b` appears in `a.used_by` and `a` in
/// `b.using`; after the matching `unlink`, neither appears in the other.
#[test]
fn lock_symmetry() {
	let (mut reg, docs) = registry_with_tracks(2);
	let (a, b) = (docs[0], docs[1]);

	reg.link(Linker::Doc(a), Linker::Doc(b));
	assert!(reg.doc(a).unwrap().used_by().contains(&Linker::Doc(b)));
	assert!(reg.doc(b).unwrap().using().contains(&Linker::Doc(a)));

	reg.unlink(Linker::Doc(a), Linker::Doc(b));
	assert!(reg.doc(a).unwrap().used_by().is_empty());
	assert!(reg.doc(b).unwrap().using().is_empty());
}

/// Invariant: a document with live dependents can never be closed.
#[test]
fn no_close_while_used() {
	let (mut reg, docs) = registry_with_tracks(2);
	reg.link(Linker::Doc(docs[0]), Linker::Doc(docs[1]));

	assert!(!reg.can_close(docs[0], false, TeardownContext::NORMAL));
	assert!(!reg.can_close(docs[0], true, TeardownContext::NORMAL));

	reg.unlink(Linker::Doc(docs[0]), Linker::Doc(docs[1]));
	assert!(reg.can_close(docs[0], true, TeardownContext::NORMAL));
}

/// Invariant: a silent close clears the dirty flag and never prompts.
#[test]
fn silent_close_bypasses_save_prompt() {
	let (mut reg, docs) = registry_with_tracks(1);
	reg.doc_mut(docs[0]).unwrap().set_dirty(true);

	// MutePrompter would answer "no" if a prompt were shown.
	assert!(reg.can_close(docs[0], true, TeardownContext::NORMAL));
	assert!(!reg.doc(docs[0]).unwrap().is_dirty());
}

/// Invariant: during application shutdown every close check succeeds.
#[test]
fn app_closing_bypasses_lock_checks() {
	let (mut reg, docs) = registry_with_tracks(2);
	reg.link(Linker::Doc(docs[0]), Linker::Doc(docs[1]));
	reg.doc_mut(docs[0]).unwrap().set_do_not_close(true);

	assert!(reg.can_close(docs[0], false, TeardownContext::APP_CLOSING));
}

/// Invariant: the do-not-close mark fails the close silently, before the
/// dependent list is even consulted.
#[test]
fn do_not_close_blocks_silently() {
	let (mut reg, docs) = registry_with_tracks(1);
	reg.doc_mut(docs[0]).unwrap().set_do_not_close(true);
	assert!(!reg.can_close(docs[0], false, TeardownContext::NORMAL));
}

/// Invariant: friendship is transitive through id merges.
#[test]
fn friendship_transitivity() {
	let (mut reg, docs) = registry_with_tracks(3);
	let p = reg.views_of(docs[0])[0];
	let q = reg.views_of(docs[1])[0];
	let r = reg.views_of(docs[2])[0];

	reg.set_friend(p, q);
	reg.set_friend(q, r);
	assert!(reg.is_friend(p, r));
}

/// Invariant: cancelling a non-anchor member leaves the rest paired.
#[test]
fn cancel_leaves_group_intact() {
	let (mut reg, docs) = registry_with_tracks(3);
	let p = reg.views_of(docs[0])[0];
	let q = reg.views_of(docs[1])[0];
	let r = reg.views_of(docs[2])[0];
	reg.set_friend(p, q);
	reg.set_friend(p, r);

	reg.cancel_friendship(q);
	assert!(!reg.is_friend(p, q));
	assert!(reg.is_friend(p, r));
}

/// Invariant: cancelling the anchor re-anchors the survivors on the next
/// member in enumeration order without breaking their pairing.
#[test]
fn cancel_anchor_hands_off() {
	let (mut reg, docs) = registry_with_tracks(3);
	let p = reg.views_of(docs[0])[0];
	let q = reg.views_of(docs[1])[0];
	let r = reg.views_of(docs[2])[0];
	reg.set_friend(p, q);
	reg.set_friend(p, r);
	// p's own id is the shared id: p is the anchor.
	assert_eq!(reg.friendship_id(q), Some(p.own_friendship()));

	reg.cancel_friendship(p);
	assert!(!reg.is_friend(p, q));
	assert!(reg.is_friend(q, r));
	assert_eq!(reg.friendship_id(q), Some(q.own_friendship()));
}

/// Invariant: friendship delivery reaches at most one view per document.
#[test]
fn single_delivery_per_document() {
	let (mut reg, docs) = registry_with_tracks(2);
	let a1 = reg.views_of(docs[0])[0];
	let a2 = reg.create_view(docs[0], ViewKind::Tracks, None);
	let b1 = reg.views_of(docs[1])[0];
	reg.set_friend(a1, a2);
	reg.set_friend(a1, b1);

	let event = ViewEvent::CursorMoved { time_frame: 42 };
	let handled = reg.broadcast_from(b1, event);
	assert!(handled);

	// a1 is the first friended view of its document; a2 must be skipped.
	assert!(reg.view(a1).unwrap().inbox().contains(&event));
	assert!(!reg.view(a2).unwrap().inbox().contains(&event));
	// The sender is excluded from its own broadcast.
	assert!(!reg.view(b1).unwrap().inbox().contains(&event));
}

/// Invariant: destroying a view scrubs it from every peer's lists and
/// notifies the document's surviving views.
#[test]
fn view_teardown_scrubs_peers() {
	let (mut reg, docs) = registry_with_tracks(2);
	let a = reg.views_of(docs[0])[0];
	let b = reg.views_of(docs[1])[0];
	let a2 = reg.create_view(docs[0], ViewKind::Tracks, None);
	reg.link(Linker::View(a), Linker::View(b));

	reg.destroy_view(a, TeardownContext::NORMAL);
	assert!(reg.view(b).unwrap().using().is_empty());
	assert!(
		reg.view(a2)
			.unwrap()
			.inbox()
			.contains(&ViewEvent::PeerViewClosed { view: a })
	);
}

/// Invariant: closing a document that still has dependents removes the
/// dangling edges from both sides (leak containment, not approval).
#[test]
fn close_doc_scrubs_leaked_locks() {
	let (mut reg, docs) = registry_with_tracks(2);
	reg.link(Linker::Doc(docs[0]), Linker::Doc(docs[1]));

	reg.close_doc(docs[0], TeardownContext::NORMAL);
	assert!(reg.doc(docs[0]).is_none());
	assert!(reg.doc(docs[1]).unwrap().using().is_empty());
}
