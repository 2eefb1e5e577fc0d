//! Document/view registry for the linking core.
//!
//! The registry owns every open document and view, assigns their
//! process-unique ids, and implements the three coordination mechanisms the
//! link groups build on:
//!
//! - **lifecycle**: open-or-find by path, close, enumeration in open order;
//! - **reference locks**: the symmetric `UsedBy`/`Using` relation that keeps
//!   a document alive while something depends on it;
//! - **friendship broadcast**: id-based view pairing and the
//!   one-view-per-document event delivery that mirrors cursor and selection
//!   changes across windows.
//!
//! The registry is single-threaded by design: the hosting shell dispatches
//! one event at a time, and every operation here runs to completion before
//! the next. Format readers and dialogs are injected through
//! [`DocumentSource`] and [`Prompter`] so the whole graph can be driven by
//! scripted fakes in tests.

mod document;
mod friendship;
/// Invariant proofs for the lock and friendship relations.
#[cfg(test)]
mod invariants;
mod meta;
mod source;
mod view;

use std::path::{Path, PathBuf};

pub use document::{Document, Linker};
use esilink_primitives::{
	DocId, FriendshipId, Rect, TeardownContext, ViewEvent, ViewId, ViewKind,
};
use friendship::Friendships;
pub use meta::{DocMeta, VolumeContent};
use rustc_hash::FxHashMap;
pub use source::{DocumentSource, Prompter, SourceError};
pub use view::View;

/// The document/view registry.
///
/// All mutation of the document/view graph goes through this type; the
/// per-record lists (`views`, `used_by`, `using`) are only reachable through
/// its methods, which keeps the symmetry and ordering invariants structural.
pub struct Registry {
	docs: FxHashMap<DocId, Document>,
	/// Documents in open order; scan order for friendship delivery.
	doc_order: Vec<DocId>,
	views: FxHashMap<ViewId, View>,
	friendships: Friendships,
	next_doc: u64,
	next_view: u64,
	source: Box<dyn DocumentSource>,
	prompter: Box<dyn Prompter>,
}

impl Registry {
	/// Creates an empty registry over the given collaborator seams.
	pub fn new(source: Box<dyn DocumentSource>, prompter: Box<dyn Prompter>) -> Self {
		Self {
			docs: FxHashMap::default(),
			doc_order: Vec::new(),
			views: FxHashMap::default(),
			friendships: Friendships::default(),
			next_doc: 1,
			next_view: 1,
			source,
			prompter,
		}
	}

	// ---- lifecycle -------------------------------------------------------

	/// Probes a path without opening it.
	pub fn probe_path(&mut self, path: &Path) -> Result<DocMeta, SourceError> {
		self.source.probe(path)
	}

	/// Pre-checks a batch of paths, prompting per failure.
	///
	/// A probe failure asks the user whether to continue the batch anyway;
	/// any "no" fails the whole batch.
	pub fn can_open_files(&mut self, paths: &[PathBuf]) -> bool {
		for path in paths {
			if let Err(error) = self.source.probe(path)
				&& !self.prompter.confirm_open_failure(path, &error)
			{
				tracing::debug!(path = %path.display(), "open pre-check declined");
				return false;
			}
		}
		true
	}

	/// Returns the open document for `path`, if any.
	pub fn find_by_path(&self, path: &Path) -> Option<DocId> {
		self.doc_order
			.iter()
			.copied()
			.find(|id| self.docs[id].path == path)
	}

	/// Opens the document at `path`, or returns it if already open.
	///
	/// A newly opened document gets its default view (derived from the
	/// document kind) unless `suppress_default_view` is set; link groups
	/// suppress it for tracks-like members and construct the primary view
	/// themselves.
	pub fn open_or_find(
		&mut self,
		path: &Path,
		suppress_default_view: bool,
	) -> Result<DocId, SourceError> {
		if let Some(existing) = self.find_by_path(path) {
			return Ok(existing);
		}
		let meta = self.source.probe(path)?;
		let id = DocId(self.next_doc);
		self.next_doc += 1;
		let doc = Document::new(id, path.to_path_buf(), meta);
		let kind = doc.kind;
		tracing::debug!(doc = id.0, path = %path.display(), ?kind, "document opened");
		self.docs.insert(id, doc);
		self.doc_order.push(id);
		if !suppress_default_view {
			self.create_view(id, ViewKind::default_for(kind), None);
		}
		Ok(id)
	}

	/// Registers a link-group document record.
	///
	/// Group documents have no probeable backing file until first committed;
	/// they are registered directly so they can participate in the lock
	/// relation and carry the dirty flag.
	pub fn register_group_doc(&mut self, path: PathBuf) -> DocId {
		let id = DocId(self.next_doc);
		self.next_doc += 1;
		self.docs.insert(id, Document::new(id, path, DocMeta::LinkGroup));
		self.doc_order.push(id);
		id
	}

	/// Closes a document unconditionally, destroying its views first.
	///
	/// Callers are responsible for the [`can_close`](Self::can_close) check;
	/// a close with live dependents is a lock leak and is logged.
	pub fn close_doc(&mut self, id: DocId, ctx: TeardownContext) {
		let Some(doc) = self.docs.get(&id) else {
			return;
		};
		let views: Vec<ViewId> = doc.views.clone();
		for view in views {
			self.destroy_view(view, ctx);
		}

		let Some(doc) = self.docs.remove(&id) else {
			return;
		};
		self.doc_order.retain(|d| *d != id);

		if !ctx.app_closing {
			for target in doc.using.iter().copied() {
				self.remove_from_used_by(target, Linker::Doc(id));
			}
			if !doc.used_by.is_empty() {
				tracing::warn!(
					doc = id.0,
					dependents = doc.used_by.len(),
					"document closed while still referenced"
				);
				for dependent in doc.used_by.iter().copied() {
					self.remove_from_using(dependent, Linker::Doc(id));
				}
			}
		}
		tracing::debug!(doc = id.0, "document closed");
	}

	/// Whether a document may be closed.
	///
	/// During application shutdown every close succeeds (teardown order is
	/// irrelevant at that point). Otherwise a do-not-close mark fails
	/// silently; live dependents fail with the titled blocking list unless
	/// `silent`; a silent close clears the dirty flag and succeeds without
	/// ever prompting; a normal close of a dirty document asks the user.
	pub fn can_close(&mut self, id: DocId, silent: bool, ctx: TeardownContext) -> bool {
		if ctx.app_closing {
			return true;
		}
		let Some(doc) = self.docs.get(&id) else {
			return true;
		};
		if doc.do_not_close {
			return false;
		}
		if !doc.used_by.is_empty() {
			if !silent {
				let title = doc.title();
				let blockers = self.lock_titles(id);
				self.prompter.blocking_message(
					&title,
					&format!("close these first: {}", blockers.join(", ")),
				);
			}
			return false;
		}
		if silent {
			if let Some(doc) = self.docs.get_mut(&id) {
				doc.dirty = false;
			}
			return true;
		}
		let doc = &self.docs[&id];
		if doc.dirty {
			let title = doc.title();
			return self.prompter.confirm_close(&title);
		}
		true
	}

	/// Titles of everything holding a lock on `id`, for the blocking list.
	fn lock_titles(&self, id: DocId) -> Vec<String> {
		self.docs[&id]
			.used_by
			.iter()
			.map(|linker| match linker {
				Linker::Doc(d) => self
					.docs
					.get(d)
					.map(|doc| doc.title())
					.unwrap_or_else(|| format!("document #{}", d.0)),
				Linker::View(v) => self
					.views
					.get(v)
					.and_then(|view| self.docs.get(&view.doc))
					.map(|doc| format!("view of {}", doc.title()))
					.unwrap_or_else(|| format!("view #{}", v.0)),
			})
			.collect()
	}

	// ---- accessors -------------------------------------------------------

	/// Open documents, in open order.
	pub fn documents(&self) -> impl Iterator<Item = DocId> + '_ {
		self.doc_order.iter().copied()
	}

	/// A document record.
	pub fn doc(&self, id: DocId) -> Option<&Document> {
		self.docs.get(&id)
	}

	/// Mutable document record.
	pub fn doc_mut(&mut self, id: DocId) -> Option<&mut Document> {
		self.docs.get_mut(&id)
	}

	/// A view record.
	pub fn view(&self, id: ViewId) -> Option<&View> {
		self.views.get(&id)
	}

	/// Views of a document, in creation order.
	pub fn views_of(&self, doc: DocId) -> &[ViewId] {
		self.docs.get(&doc).map(|d| d.views.as_slice()).unwrap_or(&[])
	}

	/// The user-interaction seam.
	pub fn prompter_mut(&mut self) -> &mut dyn Prompter {
		&mut *self.prompter
	}

	// ---- views -----------------------------------------------------------

	/// Creates a view of `doc`, optionally tagged with an owning group.
	///
	/// A view takes no lock on its document: a free-floating view that must
	/// keep the document alive across a group teardown registers one through
	/// [`link`](Self::link) with a [`Linker::View`] holder. [`destroy_view`]
	/// releases such a lock with the window.
	///
	/// [`destroy_view`]: Self::destroy_view
	pub fn create_view(&mut self, doc: DocId, kind: ViewKind, group: Option<DocId>) -> ViewId {
		let id = ViewId(self.next_view);
		self.next_view += 1;
		self.views.insert(id, View::new(id, doc, kind, group));
		self.friendships.insert(id);
		if let Some(doc) = self.docs.get_mut(&doc) {
			doc.views.push(id);
		}
		tracing::debug!(view = id.0, ?kind, "view created");
		id
	}

	/// Destroys a view: unlinks it from every peer, notifies its document's
	/// surviving views, and forgets its friendship id.
	///
	/// Peer notification is skipped during application shutdown, when sibling
	/// windows may already be gone.
	pub fn destroy_view(&mut self, id: ViewId, ctx: TeardownContext) {
		let Some(view) = self.views.remove(&id) else {
			return;
		};
		self.friendships.remove(id);
		if let Some(doc) = self.docs.get_mut(&view.doc) {
			doc.views.retain(|v| *v != id);
		}
		if !ctx.app_closing {
			for target in view.using.iter().copied() {
				self.remove_from_used_by(target, Linker::View(id));
			}
			for dependent in view.used_by.iter().copied() {
				self.remove_from_using(dependent, Linker::View(id));
			}
			self.notify_views(view.doc, ViewEvent::PeerViewClosed { view: id });
		}
	}

	/// Minimizes a view's window.
	pub fn minimize_view(&mut self, id: ViewId) {
		if let Some(view) = self.views.get_mut(&id) {
			view.minimized = true;
		}
	}

	/// Restores a minimized view.
	pub fn restore_view(&mut self, id: ViewId) {
		if let Some(view) = self.views.get_mut(&id) {
			view.minimized = false;
		}
	}

	/// Moves/resizes a view's window.
	pub fn set_view_frame(&mut self, id: ViewId, frame: Rect) {
		if let Some(view) = self.views.get_mut(&id) {
			view.frame = frame;
		}
	}

	/// Tags a free-floating view as owned by `group`.
	///
	/// Returns false if the view is already owned by a different group.
	pub fn claim_view_for_group(&mut self, id: ViewId, group: DocId) -> bool {
		let Some(view) = self.views.get_mut(&id) else {
			return false;
		};
		match view.group {
			Some(owner) if owner != group => false,
			_ => {
				view.group = Some(group);
				true
			}
		}
	}

	/// Releases a view's group claim, returning it to free-floating.
	pub fn release_view_claim(&mut self, id: ViewId) {
		if let Some(view) = self.views.get_mut(&id) {
			view.group = None;
		}
	}

	// ---- reference locks -------------------------------------------------

	/// Records that `by` depends on `target`.
	///
	/// The symmetric pair (`target.used_by` gains `by`, `by.using` gains
	/// `target`) is written in one place so it cannot drift.
	pub fn link(&mut self, target: Linker, by: Linker) {
		self.push_used_by(target, by);
		self.push_using(by, target);
	}

	/// Removes one `by` → `target` dependency edge.
	pub fn unlink(&mut self, target: Linker, by: Linker) {
		self.remove_from_used_by(target, by);
		self.remove_from_using(by, target);
	}

	fn push_used_by(&mut self, target: Linker, entry: Linker) {
		match target {
			Linker::Doc(d) => {
				if let Some(doc) = self.docs.get_mut(&d) {
					doc.used_by.push(entry);
				}
			}
			Linker::View(v) => {
				if let Some(view) = self.views.get_mut(&v) {
					view.used_by.push(entry);
				}
			}
		}
	}

	fn push_using(&mut self, owner: Linker, entry: Linker) {
		match owner {
			Linker::Doc(d) => {
				if let Some(doc) = self.docs.get_mut(&d) {
					doc.using.push(entry);
				}
			}
			Linker::View(v) => {
				if let Some(view) = self.views.get_mut(&v) {
					view.using.push(entry);
				}
			}
		}
	}

	fn remove_from_used_by(&mut self, target: Linker, entry: Linker) {
		match target {
			Linker::Doc(d) => {
				if let Some(doc) = self.docs.get_mut(&d)
					&& let Some(pos) = doc.used_by.iter().position(|l| *l == entry)
				{
					doc.used_by.remove(pos);
				}
			}
			Linker::View(v) => {
				if let Some(view) = self.views.get_mut(&v)
					&& let Some(pos) = view.used_by.iter().position(|l| *l == entry)
				{
					view.used_by.remove(pos);
				}
			}
		}
	}

	fn remove_from_using(&mut self, owner: Linker, entry: Linker) {
		match owner {
			Linker::Doc(d) => {
				if let Some(doc) = self.docs.get_mut(&d)
					&& let Some(pos) = doc.using.iter().position(|l| *l == entry)
				{
					doc.using.remove(pos);
				}
			}
			Linker::View(v) => {
				if let Some(view) = self.views.get_mut(&v)
					&& let Some(pos) = view.using.iter().position(|l| *l == entry)
				{
					view.using.remove(pos);
				}
			}
		}
	}

	// ---- notification ----------------------------------------------------

	/// Delivers an event to every view of a document.
	pub fn notify_views(&mut self, doc: DocId, event: ViewEvent) {
		self.query_views(doc, event);
	}

	/// Delivers an event to every view of a document, reporting whether any
	/// view consumed it.
	///
	/// Delivery is never short-circuited: every view is visited even after
	/// one has already consumed the event.
	pub fn query_views(&mut self, doc: DocId, event: ViewEvent) -> bool {
		let views: Vec<ViewId> = self.views_of(doc).to_vec();
		let mut handled = false;
		for id in views {
			if let Some(view) = self.views.get_mut(&id) {
				handled |= view.deliver(event);
			}
		}
		handled
	}

	/// Hierarchical notification: delivers to the views of every dependent
	/// of `doc`, then to `doc`'s own views.
	pub fn notify_doc_users(&mut self, doc: DocId, event: ViewEvent) {
		let Some(record) = self.docs.get(&doc) else {
			return;
		};
		let dependents: Vec<Linker> = record.used_by.to_vec();
		for dependent in dependents {
			match dependent {
				Linker::Doc(d) => self.notify_views(d, event),
				Linker::View(v) => {
					if let Some(view) = self.views.get_mut(&v) {
						view.deliver(event);
					}
				}
			}
		}
		self.notify_views(doc, event);
	}

	// ---- friendship ------------------------------------------------------

	/// Current friendship id of a view.
	pub fn friendship_id(&self, view: ViewId) -> Option<FriendshipId> {
		self.friendships.id_of(view)
	}

	/// Whether two views are friends (share a friendship id).
	pub fn is_friend(&self, p: ViewId, q: ViewId) -> bool {
		match (self.friendships.id_of(p), self.friendships.id_of(q)) {
			(Some(a), Some(b)) => a == b,
			_ => false,
		}
	}

	/// Makes `p` and `q` friends, merging their entire friendship groups.
	///
	/// Every view sharing `q`'s current id is rewritten to `p`'s id, so the
	/// relation stays transitive: merging two groups is an id rewrite, not a
	/// pairwise link.
	pub fn set_friend(&mut self, p: ViewId, q: ViewId) {
		let (Some(pid), Some(qid)) = (self.friendships.id_of(p), self.friendships.id_of(q))
		else {
			return;
		};
		if pid == qid {
			return;
		}
		let moved = self.friendships.rewrite(qid, pid);
		tracing::debug!(anchor = p.0, merged = q.0, moved, "friendship groups merged");
	}

	/// Removes a view from its friendship group without disturbing the
	/// remaining members.
	///
	/// If the view shares its id with others and is not the anchor, it simply
	/// takes back its own private id. If it *is* the anchor (the shared id is
	/// its own), the remaining members are re-anchored on the next member in
	/// enumeration order before the view goes private.
	pub fn cancel_friendship(&mut self, view: ViewId) {
		let Some(fid) = self.friendships.id_of(view) else {
			return;
		};
		if self.friendships.member_count(fid) <= 1 {
			// Friendless already; make sure the id is the private one.
			self.friendships.assign(view, view.own_friendship());
			return;
		}
		if fid != view.own_friendship() {
			self.friendships.assign(view, view.own_friendship());
			return;
		}
		// Anchor case: hand the group over to the next member before leaving.
		let successor = self
			.views_in_order()
			.into_iter()
			.find(|v| *v != view && self.friendships.id_of(*v) == Some(fid));
		if let Some(successor) = successor {
			self.friendships.rewrite(fid, successor.own_friendship());
			self.friendships.assign(view, view.own_friendship());
			tracing::debug!(
				view = view.0,
				successor = successor.0,
				"friendship anchor handed off"
			);
		}
	}

	/// Moves `view` into the friendship group anchored on `anchor`'s own id.
	///
	/// Unlike [`set_friend`](Self::set_friend) this moves one view, not its
	/// whole group; the view's former peers keep their id. Used to split a
	/// friendship group into per-document subgroups.
	pub fn rebind_friendship(&mut self, view: ViewId, anchor: ViewId) {
		if self.friendships.id_of(view).is_none() || self.friendships.id_of(anchor).is_none() {
			return;
		}
		self.friendships.assign(anchor, anchor.own_friendship());
		self.friendships.assign(view, anchor.own_friendship());
	}

	/// Every live view, in document open order then view creation order.
	///
	/// This is the canonical scan order of the friendship protocol.
	pub fn views_in_order(&self) -> Vec<ViewId> {
		self.doc_order
			.iter()
			.flat_map(|d| self.docs[d].views.iter().copied())
			.collect()
	}

	/// Delivers an event to at most one friended view per document.
	///
	/// For every document, in open order, the first view sharing `fid` (and
	/// not excluded) receives the event and the scan moves to the next
	/// document. Every document's query result is folded in without
	/// short-circuiting, matching the query (not notify) delivery contract.
	pub fn notify_friend_views(
		&mut self,
		fid: FriendshipId,
		event: ViewEvent,
		exclude: Option<ViewId>,
	) -> bool {
		let order = self.doc_order.clone();
		let mut handled = false;
		for doc in order {
			let target = self.docs[&doc]
				.views
				.iter()
				.copied()
				.find(|v| Some(*v) != exclude && self.friendships.id_of(*v) == Some(fid));
			if let Some(target) = target
				&& let Some(view) = self.views.get_mut(&target)
			{
				handled |= view.deliver(event);
			}
		}
		handled
	}

	/// Mirrors an event from `from` to its friends (one view per document).
	pub fn broadcast_from(&mut self, from: ViewId, event: ViewEvent) -> bool {
		let Some(fid) = self.friendships.id_of(from) else {
			return false;
		};
		self.notify_friend_views(fid, event, Some(from))
	}
}
