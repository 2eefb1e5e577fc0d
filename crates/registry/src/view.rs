//! View (window) records.

use esilink_primitives::{DocId, Rect, ViewEvent, ViewId, ViewKind};
use smallvec::SmallVec;

use crate::document::Linker;

/// An open view of a document.
///
/// Views are windows in the hosting shell; this crate tracks their identity,
/// ownership, geometry, and the events delivered to them. Rendering is out
/// of scope: the inbox stands in for the drawing reaction so propagation is
/// observable.
#[derive(Debug)]
pub struct View {
	/// Process-unique identifier; also this view's initial friendship id.
	pub id: ViewId,

	/// The document this view displays.
	pub doc: DocId,

	/// What this view shows.
	pub kind: ViewKind,

	/// The link group that created (or claimed) this view; `None` for a
	/// free-floating view.
	pub(crate) group: Option<DocId>,

	/// Whether the window is minimized.
	pub(crate) minimized: bool,

	/// Window geometry.
	pub(crate) frame: Rect,

	/// Who depends on this view.
	pub(crate) used_by: SmallVec<[Linker; 2]>,

	/// What this view depends on.
	pub(crate) using: SmallVec<[Linker; 2]>,

	/// Events delivered to this view, in order.
	pub(crate) inbox: Vec<ViewEvent>,
}

impl View {
	pub(crate) fn new(id: ViewId, doc: DocId, kind: ViewKind, group: Option<DocId>) -> Self {
		Self {
			id,
			doc,
			kind,
			group,
			minimized: false,
			frame: Rect::default(),
			used_by: SmallVec::new(),
			using: SmallVec::new(),
			inbox: Vec::new(),
		}
	}

	/// The link group owning this view, if any.
	pub fn group(&self) -> Option<DocId> {
		self.group
	}

	/// Whether the window is minimized.
	pub fn is_minimized(&self) -> bool {
		self.minimized
	}

	/// Window geometry.
	pub fn frame(&self) -> Rect {
		self.frame
	}

	/// Who depends on this view.
	pub fn used_by(&self) -> &[Linker] {
		&self.used_by
	}

	/// What this view depends on.
	pub fn using(&self) -> &[Linker] {
		&self.using
	}

	/// Events delivered to this view so far, oldest first.
	pub fn inbox(&self) -> &[ViewEvent] {
		&self.inbox
	}

	/// Delivers an event. Returns whether the view consumed it.
	pub(crate) fn deliver(&mut self, event: ViewEvent) -> bool {
		self.inbox.push(event);
		true
	}
}
