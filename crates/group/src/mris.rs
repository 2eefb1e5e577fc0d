//! Head/brain/grey volume role assignment.
//!
//! A group displaying inverse solutions needs three volume roles. Volumes
//! that classify themselves (full head / segmented tissue / binary mask) are
//! taken in list order, first match per role. The fallbacks below are
//! heuristic and load-bearing for existing link files: do not extend them to
//! new scenarios.

use esilink_primitives::DocId;
use esilink_registry::{DocMeta, Registry, VolumeContent};

/// The three volume roles of an inverse display.
///
/// Always fully populated when the volume list is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeRoles {
	/// Full-head volume.
	pub head: DocId,
	/// Brain volume.
	pub brain: DocId,
	/// Grey-matter volume; target grid of the interpolation.
	pub grey: DocId,
}

fn content_of(registry: &Registry, id: DocId) -> VolumeContent {
	match registry.doc(id).map(|d| &d.meta) {
		Some(DocMeta::Volume { content, .. }) => *content,
		_ => VolumeContent::Unknown,
	}
}

/// Assigns head/brain/grey roles over a volume sequence.
///
/// Scans in list order taking the first full-head volume as head, the first
/// segmented non-mask as brain, the first binary mask as grey. When nothing
/// classified at all, roles fall back to fixed positions (grey first, brain
/// second-or-last, head third-or-last). When only some roles were found, the
/// missing ones are backfilled in the cascade head←brain←grey exactly as the
/// legacy behavior requires.
pub fn guess_head_brain_grey(registry: &Registry, volumes: &[DocId]) -> Option<VolumeRoles> {
	if volumes.is_empty() {
		return None;
	}

	let mut head = None;
	let mut brain = None;
	let mut grey = None;
	for id in volumes.iter().copied() {
		match content_of(registry, id) {
			VolumeContent::FullHead => head = head.or(Some(id)),
			VolumeContent::SegmentedTissue => brain = brain.or(Some(id)),
			VolumeContent::BinaryMask => grey = grey.or(Some(id)),
			VolumeContent::Unknown => {}
		}
	}

	if head.is_none() && brain.is_none() && grey.is_none() {
		let n = volumes.len();
		return Some(VolumeRoles {
			grey: volumes[0],
			brain: volumes[1.min(n - 1)],
			head: volumes[2.min(n - 1)],
		});
	}

	// Backfill cascade; order matters, later steps may use earlier results.
	if head.is_none() {
		head = brain.or(grey);
	}
	if brain.is_none() {
		brain = grey.or(head);
	}
	if grey.is_none() {
		grey = brain.or(head);
	}

	Some(VolumeRoles { head: head?, brain: brain?, grey: grey? })
}
