//! Document records and the reference-lock relation.

use std::path::PathBuf;

use esilink_primitives::{DocId, DocumentKind, ViewId};
use smallvec::SmallVec;

use crate::meta::DocMeta;

/// A participant in the reference-lock relation.
///
/// Both documents and views can depend on (and be depended on by) other
/// documents and views; the relation is kept symmetric by the registry's
/// single `link`/`unlink` mutation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linker {
	/// A document, e.g. a link group locking its members.
	Doc(DocId),
	/// A view, e.g. a derived display holding its data document open.
	View(ViewId),
}

/// An open document.
///
/// Owned by the registry; identified by a never-reused [`DocId`]. The
/// `used_by`/`using` lists are private so the symmetry invariant can only be
/// maintained through [`Registry::link`]/[`Registry::unlink`].
///
/// [`Registry::link`]: crate::Registry::link
/// [`Registry::unlink`]: crate::Registry::unlink
#[derive(Debug)]
pub struct Document {
	/// Unique identifier.
	pub id: DocId,

	/// Absolute file path this document was opened from.
	pub path: PathBuf,

	/// Kind, derived from the probed metadata.
	pub kind: DocumentKind,

	/// Probed metadata.
	pub meta: DocMeta,

	/// Whether the document has unsaved changes.
	pub(crate) dirty: bool,

	/// Set while a long-running process owns the document; blocks closing
	/// silently regardless of the lock lists.
	pub(crate) do_not_close: bool,

	/// Views of this document, in creation order.
	pub(crate) views: Vec<ViewId>,

	/// Who depends on this document.
	pub(crate) used_by: SmallVec<[Linker; 4]>,

	/// What this document depends on.
	pub(crate) using: SmallVec<[Linker; 4]>,
}

impl Document {
	pub(crate) fn new(id: DocId, path: PathBuf, meta: DocMeta) -> Self {
		let kind = meta.kind();
		Self {
			id,
			path,
			kind,
			meta,
			dirty: false,
			do_not_close: false,
			views: Vec::new(),
			used_by: SmallVec::new(),
			using: SmallVec::new(),
		}
	}

	/// Display title: the file stem, falling back to the full path.
	pub fn title(&self) -> String {
		self.path
			.file_stem()
			.map(|s| s.to_string_lossy().into_owned())
			.unwrap_or_else(|| self.path.display().to_string())
	}

	/// Whether the document has unsaved changes.
	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	/// Sets the dirty flag.
	pub fn set_dirty(&mut self, dirty: bool) {
		self.dirty = dirty;
	}

	/// Marks the document as owned by a long-running process; while set,
	/// every close attempt fails silently.
	pub fn set_do_not_close(&mut self, flag: bool) {
		self.do_not_close = flag;
	}

	/// Views of this document, in creation order.
	pub fn views(&self) -> &[ViewId] {
		&self.views
	}

	/// Who depends on this document.
	pub fn used_by(&self) -> &[Linker] {
		&self.used_by
	}

	/// What this document depends on.
	pub fn using(&self) -> &[Linker] {
		&self.using
	}
}
