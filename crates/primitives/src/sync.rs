//! Batch sync/desync operations over a group's time-series views.

/// A cursor-synchronization batch operation.
///
/// "Between EEG" operations scope pairing to each tracks document's own
/// views; the "all" operations span every time-series view of the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOp {
	/// Pair every time-series view of the group with a single anchor.
	SyncAll,
	/// Pair the views of each tracks document with a per-document anchor.
	SyncBetweenEeg,
	/// Dissolve every pairing carried by the group's time-series views.
	DesyncAll,
	/// Dissolve only pairings spanning two different documents, preserving
	/// pairings internal to one document.
	DesyncBetweenEeg,
}
