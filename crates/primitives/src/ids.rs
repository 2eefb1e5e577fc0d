//! Identifier newtypes for documents, views, and friendship groups.
//!
//! Ids are assigned by the registry from monotonic counters and are never
//! reused within a process, so a stale id can only miss, never alias.

/// Unique identifier for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocId(pub u64);

/// Unique identifier for a view (window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl ViewId {
	/// The friendship id a view starts out with: friendship with itself.
	pub fn own_friendship(self) -> FriendshipId {
		FriendshipId(self.0)
	}
}

/// Friendship group identifier.
///
/// Friendship ids are view-id values: a group's id is always the own id of
/// one of its (current or former) members, and two views are friends iff
/// their friendship ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FriendshipId(pub u64);
