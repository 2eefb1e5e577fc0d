//! Events broadcast between views.

use crate::ids::ViewId;

/// An event delivered to a view through the notification machinery.
///
/// The rendering reaction is out of scope; views record delivered events so
/// callers (and tests) can observe propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
	/// The time cursor moved to the given time frame.
	CursorMoved {
		/// New cursor position, in time frames.
		time_frame: u64,
	},
	/// The highlighted item (track, solution point, ROI) changed.
	SelectionChanged {
		/// Index of the newly selected item.
		item: u32,
	},
	/// A sibling view of the same document was destroyed.
	PeerViewClosed {
		/// The destroyed view.
		view: ViewId,
	},
	/// The owning document was reloaded from disk.
	DocReverted,
}
