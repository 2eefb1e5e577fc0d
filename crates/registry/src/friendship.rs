//! Friendship id bookkeeping.
//!
//! Two views are friends iff their friendship ids are equal. A group's id is
//! the own id of one of its members (the anchor); merging two groups
//! rewrites every member of the absorbed group to the surviving id, which
//! makes friendship transitive by construction. The enumeration-order parts
//! of the protocol (anchor hand-off, single delivery per document) live in
//! the registry, which owns the ordering.

use esilink_primitives::{FriendshipId, ViewId};
use rustc_hash::FxHashMap;

/// Friendship id assignment for every live view.
#[derive(Debug, Default)]
pub(crate) struct Friendships {
	by_view: FxHashMap<ViewId, FriendshipId>,
}

impl Friendships {
	/// Registers a new view, friendless (friends with itself only).
	pub(crate) fn insert(&mut self, view: ViewId) {
		self.by_view.insert(view, view.own_friendship());
	}

	/// Forgets a destroyed view.
	pub(crate) fn remove(&mut self, view: ViewId) {
		self.by_view.remove(&view);
	}

	/// Current friendship id of a view.
	pub(crate) fn id_of(&self, view: ViewId) -> Option<FriendshipId> {
		self.by_view.get(&view).copied()
	}

	/// Reassigns a single view.
	pub(crate) fn assign(&mut self, view: ViewId, id: FriendshipId) {
		if let Some(slot) = self.by_view.get_mut(&view) {
			*slot = id;
		}
	}

	/// Rewrites every view currently holding `from` to `to`.
	///
	/// Returns the number of views rewritten. This is the merge primitive:
	/// operating on the id value, not pairwise links, keeps transitivity.
	pub(crate) fn rewrite(&mut self, from: FriendshipId, to: FriendshipId) -> usize {
		if from == to {
			return 0;
		}
		let mut rewritten = 0;
		for slot in self.by_view.values_mut() {
			if *slot == from {
				*slot = to;
				rewritten += 1;
			}
		}
		rewritten
	}

	/// Number of views currently holding `id`.
	pub(crate) fn member_count(&self, id: FriendshipId) -> usize {
		self.by_view.values().filter(|slot| **slot == id).count()
	}
}
