//! Group-wide view synchronization.
//!
//! The sync utility rearranges friendship groups over the group-tagged
//! time-series views (tracks and frequency views of the tracks and RIS
//! members, in member order). All four modes are idempotent.

use esilink_primitives::{DocId, FriendshipId, SyncOp, ViewId};
use esilink_registry::Registry;

use crate::group::LinkGroup;

impl LinkGroup {
	/// The group-tagged time-series views, in member order (tracks members
	/// first, then RIS members, views in creation order within a document).
	fn time_series_views(&self, registry: &Registry) -> Vec<(DocId, ViewId)> {
		let mut out = Vec::new();
		for doc in self.members.tracks.iter().chain(&self.members.ris).copied() {
			for view in registry.views_of(doc) {
				if let Some(w) = registry.view(*view)
					&& w.group() == Some(self.doc)
					&& w.kind.is_time_series()
				{
					out.push((doc, *view));
				}
			}
		}
		out
	}

	/// Applies one synchronization mode to the group's time-series views.
	pub fn sync_utility(&self, registry: &mut Registry, op: SyncOp) {
		let views = self.time_series_views(registry);
		tracing::debug!(group = self.doc.0, ?op, views = views.len(), "sync utility");
		match op {
			SyncOp::SyncAll => {
				// The first view anchors every other one; merging is
				// transitive so pre-existing groups collapse into one.
				let Some(&(_, anchor)) = views.first() else {
					return;
				};
				for &(_, view) in &views[1..] {
					registry.set_friend(anchor, view);
				}
			}
			SyncOp::SyncBetweenEeg => {
				// One friendship group per member document.
				let mut anchor: Option<(DocId, ViewId)> = None;
				for &(doc, view) in &views {
					match anchor {
						Some((adoc, aview)) if adoc == doc => {
							registry.set_friend(aview, view);
						}
						_ => anchor = Some((doc, view)),
					}
				}
			}
			SyncOp::DesyncAll => {
				for &(_, view) in &views {
					registry.cancel_friendship(view);
				}
			}
			SyncOp::DesyncBetweenEeg => {
				self.desync_between_eeg(registry, &views);
			}
		}
	}

	/// Splits every friendship group spanning two or more member documents
	/// into per-document subgroups; single-document groups are untouched.
	fn desync_between_eeg(&self, registry: &mut Registry, views: &[(DocId, ViewId)]) {
		// Bucket by current friendship id, keeping member order. Ordered
		// vectors, not hash maps: the split must be deterministic.
		let mut buckets: Vec<(FriendshipId, Vec<(DocId, ViewId)>)> = Vec::new();
		for &(doc, view) in views {
			let Some(fid) = registry.friendship_id(view) else {
				continue;
			};
			match buckets.iter_mut().find(|(f, _)| *f == fid) {
				Some((_, members)) => members.push((doc, view)),
				None => buckets.push((fid, vec![(doc, view)])),
			}
		}

		for (_, members) in buckets {
			let mut docs: Vec<DocId> = Vec::new();
			for &(doc, _) in &members {
				if !docs.contains(&doc) {
					docs.push(doc);
				}
			}
			if docs.len() < 2 {
				continue;
			}
			for doc in docs {
				let subset: Vec<ViewId> =
					members.iter().filter(|(d, _)| *d == doc).map(|(_, v)| *v).collect();
				let anchor = subset[0];
				for view in subset {
					registry.rebind_friendship(view, anchor);
				}
			}
		}
	}
}
