//! Link groups: validated aggregates of cooperating documents.
//!
//! A [`LinkGroup`] owns seven ordered member sequences (tracks, electrodes,
//! solution points, inverse operators, RIS, ROIs, volumes), holds a
//! reference lock on every member, derives secondary views (potentials,
//! inverse solutions) from the member combination, and persists itself as a
//! `.lm` link file.
//!
//! Every fallible operation is transactional at the group level: a
//! compatibility failure, declined prompt, or interpolation failure leaves
//! the member sequences and the lock relation exactly as they were, with the
//! dirty flag forced off.

use std::path::{Path, PathBuf};

use esilink_primitives::{DocId, DocumentKind, SyncOp, TeardownContext, ViewId, ViewKind};
use esilink_registry::{DocMeta, Linker, Registry, SourceError};
use thiserror::Error;

use crate::compat::{self, CompatError, CompatInputs};
use crate::interpolation::{self, Interpolation, InterpolationError};
use crate::linkfile::{self, LinkFileError, LinkLists};
use crate::mris;

/// Failure of a group-level operation.
#[derive(Debug, Error)]
pub enum GroupError {
	/// Member files cannot be combined.
	#[error(transparent)]
	Compat(#[from] CompatError),
	/// Link-file I/O failed.
	#[error(transparent)]
	LinkFile(#[from] LinkFileError),
	/// The point-to-voxel interpolation could not be built.
	#[error(transparent)]
	Interpolation(#[from] InterpolationError),
	/// A member path could not be resolved.
	#[error(transparent)]
	Source(#[from] SourceError),
	/// The user declined a prompt; the operation was abandoned whole.
	#[error("operation cancelled")]
	Cancelled,
	/// No on-disk path has been chosen for this group yet.
	#[error("link file path was never chosen")]
	UnspecifiedPath,
}

/// The seven member sequences, in insertion (or canonical-sort) order.
#[derive(Debug, Default)]
pub struct Members {
	/// Tracks documents (time- and frequency-domain), canonically sorted by
	/// path.
	pub tracks: Vec<DocId>,
	/// Electrode-coordinate documents.
	pub electrodes: Vec<DocId>,
	/// Solution-point documents.
	pub solution_points: Vec<DocId>,
	/// Inverse-operator documents.
	pub inverse: Vec<DocId>,
	/// RIS documents, canonically sorted by path.
	pub ris: Vec<DocId>,
	/// ROI documents.
	pub rois: Vec<DocId>,
	/// MRI volume documents.
	pub volumes: Vec<DocId>,
}

impl Members {
	/// Every member, sequence by sequence.
	pub fn all(&self) -> impl Iterator<Item = DocId> + '_ {
		self.tracks
			.iter()
			.chain(&self.electrodes)
			.chain(&self.solution_points)
			.chain(&self.inverse)
			.chain(&self.ris)
			.chain(&self.rois)
			.chain(&self.volumes)
			.copied()
	}

	/// Whether the group has no members at all.
	pub fn is_empty(&self) -> bool {
		self.all().next().is_none()
	}

	/// Whether `doc` already appears in any sequence.
	pub fn contains(&self, doc: DocId) -> bool {
		self.all().any(|d| d == doc)
	}

	fn remove(&mut self, doc: DocId) {
		self.tracks.retain(|d| *d != doc);
		self.electrodes.retain(|d| *d != doc);
		self.solution_points.retain(|d| *d != doc);
		self.inverse.retain(|d| *d != doc);
		self.ris.retain(|d| *d != doc);
		self.rois.retain(|d| *d != doc);
		self.volumes.retain(|d| *d != doc);
	}

	fn clear(&mut self) {
		self.tracks.clear();
		self.electrodes.clear();
		self.solution_points.clear();
		self.inverse.clear();
		self.ris.clear();
		self.rois.clear();
		self.volumes.clear();
	}
}

/// A group of cooperating documents analyzed and displayed together.
///
/// Created empty, interactively, or from a `.lm` link file; mutated through
/// [`add_to_group`](Self::add_to_group) and [`close`](Self::close) only.
/// [`close`] must run before the group is dropped or the member locks leak
/// (the hosting shell does not guarantee a close notification, so the drop
/// guard below logs the leak).
#[derive(Debug)]
pub struct LinkGroup {
	/// This group's own document record in the registry.
	pub(crate) doc: DocId,
	/// True until an on-disk path is chosen (explicitly or derived).
	unspecified_path: bool,
	pub(crate) members: Members,
	interpolation: Option<Interpolation>,
}

impl LinkGroup {
	/// Creates an empty group with no on-disk path.
	///
	/// The path is derived automatically on the first successful
	/// [`add_to_group`](Self::add_to_group).
	pub fn new_empty(registry: &mut Registry) -> Self {
		let doc = registry.register_group_doc(PathBuf::new());
		Self { doc, unspecified_path: true, members: Members::default(), interpolation: None }
	}

	/// Opens a group from a serialized `.lm` link file.
	///
	/// Parses the file into per-kind path lists, sorts the tracks-like
	/// lists, then resolves, validates, opens, locks, and wires up the
	/// members. Any failure rolls the whole operation back: no member stays
	/// locked, no synthesized view survives, and the error is returned.
	pub fn open(registry: &mut Registry, lm_path: &Path) -> Result<Self, GroupError> {
		let mut lists = linkfile::load(lm_path)?;
		lists.sort_tracks_like();
		Self::open_from_lists(registry, lm_path.to_path_buf(), lists)
	}

	/// Creates a group interactively: a file multi-selection classified by
	/// extension, then a destination `.lm` path.
	///
	/// Cancelling either prompt, or an unwritable destination, aborts with
	/// no mutation.
	pub fn open_interactive(registry: &mut Registry) -> Result<Self, GroupError> {
		let files = registry.prompter_mut().select_files().ok_or(GroupError::Cancelled)?;
		let mut lists = LinkLists::default();
		for file in files {
			lists.push_classified(file);
		}
		let dest = registry
			.prompter_mut()
			.select_save_path(None)
			.ok_or(GroupError::Cancelled)?;
		// Early writability check; a pre-existing file at the destination
		// must survive untouched if validation aborts the open.
		linkfile::probe_writable(&dest)?;
		lists.sort_tracks_like();
		Self::open_from_lists(registry, dest, lists)
	}

	fn open_from_lists(
		registry: &mut Registry,
		lm_path: PathBuf,
		lists: LinkLists,
	) -> Result<Self, GroupError> {
		let doc = registry.register_group_doc(lm_path);
		let mut group =
			Self { doc, unspecified_path: false, members: Members::default(), interpolation: None };
		match group.populate(registry, &lists) {
			Ok(()) => Ok(group),
			Err(err) => {
				group.close(registry, TeardownContext::NORMAL);
				if let Some(record) = registry.doc_mut(doc) {
					record.set_dirty(false);
				}
				registry.close_doc(doc, TeardownContext::NORMAL);
				Err(err)
			}
		}
	}

	/// This group's registry document id.
	pub fn doc_id(&self) -> DocId {
		self.doc
	}

	/// Member sequences.
	pub fn members(&self) -> &Members {
		&self.members
	}

	/// The current point-to-voxel interpolation, when solution points and
	/// volumes are both present.
	pub fn interpolation(&self) -> Option<&Interpolation> {
		self.interpolation.as_ref()
	}

	/// Whether the group has unsaved membership changes.
	pub fn is_dirty(&self, registry: &Registry) -> bool {
		registry.doc(self.doc).is_some_and(|d| d.is_dirty())
	}

	/// Whether no on-disk path has been chosen yet.
	pub fn has_unspecified_path(&self) -> bool {
		self.unspecified_path
	}

	// ---- open pipeline ---------------------------------------------------

	fn populate(&mut self, registry: &mut Registry, lists: &LinkLists) -> Result<(), GroupError> {
		// Resolution pre-check, one prompt per failing path; any "no"
		// aborts before anything is opened.
		for list in [
			&lists.tracks,
			&lists.electrodes,
			&lists.solution_points,
			&lists.inverse,
			&lists.ris,
			&lists.rois,
			&lists.volumes,
		] {
			if !list.is_empty() && !registry.can_open_files(list) {
				return Err(GroupError::Cancelled);
			}
		}

		// Compatibility over probed metadata. ROIs are excluded here; they
		// are validated individually when attached.
		let tracks_meta = probe_list(registry, &lists.tracks)?;
		let electrodes_meta = probe_list(registry, &lists.electrodes)?;
		let sp_meta = probe_list(registry, &lists.solution_points)?;
		let inverse_meta = probe_list(registry, &lists.inverse)?;
		let ris_meta = probe_list(registry, &lists.ris)?;
		let inputs = CompatInputs {
			tracks: &tracks_meta,
			rois: &[],
			electrodes: &electrodes_meta,
			solution_points: &sp_meta,
			inverse: &inverse_meta,
			ris: &ris_meta,
		};
		if let Err(err) = compat::check_compatibility(&inputs) {
			tracing::debug!(%err, "group rejected by compatibility check");
			registry.prompter_mut().blocking_message("incompatible files", &err.to_string());
			return Err(err.into());
		}

		if let Err(err) = self.open_members(registry, lists) {
			self.close(registry, TeardownContext::NORMAL);
			return Err(err);
		}

		if !self.members.solution_points.is_empty()
			&& !self.members.volumes.is_empty()
			&& let Err(err) = self.rebuild_interpolation(registry)
		{
			self.close(registry, TeardownContext::NORMAL);
			return Err(err.into());
		}

		self.create_derived_views(registry, None);
		self.pair_potentials_inverse(registry);
		self.sync_utility(registry, SyncOp::SyncAll);
		self.commit(registry)?;
		Ok(())
	}

	/// Opens and locks every member, in the fixed kind order.
	///
	/// Electrodes, solution points, inverse operators, volumes, and ROIs
	/// open first with their default views minimized; tracks and RIS open
	/// last (so they can see their siblings) with the default view
	/// suppressed and a group-tagged primary view built manually.
	fn open_members(&mut self, registry: &mut Registry, lists: &LinkLists) -> Result<(), GroupError> {
		for path in &lists.electrodes {
			let id = open_minimized(registry, path)?;
			self.append(registry, id, |m| &mut m.electrodes);
		}
		for path in &lists.solution_points {
			let id = open_minimized(registry, path)?;
			self.append(registry, id, |m| &mut m.solution_points);
		}
		for path in &lists.inverse {
			let id = open_minimized(registry, path)?;
			self.append(registry, id, |m| &mut m.inverse);
		}
		for path in &lists.volumes {
			let id = open_minimized(registry, path)?;
			self.append(registry, id, |m| &mut m.volumes);
		}
		for path in &lists.rois {
			let id = open_minimized(registry, path)?;
			self.append(registry, id, |m| &mut m.rois);
		}

		for path in &lists.tracks {
			let id = registry.open_or_find(path, true)?;
			if self.members.contains(id) {
				continue;
			}
			self.create_primary_view(registry, id);
			self.append(registry, id, |m| &mut m.tracks);
		}
		for path in &lists.ris {
			let id = registry.open_or_find(path, true)?;
			if self.members.contains(id) {
				continue;
			}
			self.create_primary_view(registry, id);
			self.append(registry, id, |m| &mut m.ris);
		}

		if let Some(record) = registry.doc_mut(self.doc) {
			record.set_dirty(true);
		}
		Ok(())
	}

	/// Appends a member (skipping duplicates) and locks it to this group.
	fn append(
		&mut self,
		registry: &mut Registry,
		id: DocId,
		slot: impl FnOnce(&mut Members) -> &mut Vec<DocId>,
	) {
		if self.members.contains(id) {
			return;
		}
		slot(&mut self.members).push(id);
		registry.link(Linker::Doc(id), Linker::Doc(self.doc));
	}

	/// Builds the group-tagged primary view of a tracks-like document:
	/// a frequency view for frequency-domain content, a tracks view
	/// otherwise. Minimized.
	fn create_primary_view(&self, registry: &mut Registry, id: DocId) {
		let kind = match registry.doc(id).map(|d| d.kind) {
			Some(DocumentKind::Frequency) => ViewKind::Frequency,
			_ => ViewKind::Tracks,
		};
		let view = registry.create_view(id, kind, Some(self.doc));
		registry.minimize_view(view);
	}

	// ---- interpolation ---------------------------------------------------

	/// Rebuilds the point-to-voxel map of the first solution-points document
	/// onto the grey volume's grid.
	fn rebuild_interpolation(&mut self, registry: &mut Registry) -> Result<(), InterpolationError> {
		let Some(roles) = mris::guess_head_brain_grey(registry, &self.members.volumes) else {
			return Ok(());
		};
		let Some(&sp_doc) = self.members.solution_points.first() else {
			return Ok(());
		};
		let positions = match registry.doc(sp_doc).map(|d| &d.meta) {
			Some(DocMeta::SolutionPoints { positions }) => positions.clone(),
			_ => Vec::new(),
		};
		let Some(grey) = registry.doc(roles.grey) else {
			return Ok(());
		};
		let DocMeta::Volume { dims, voxel_size, origin, .. } = grey.meta else {
			return Ok(());
		};
		let title = grey.title();
		self.interpolation =
			Some(interpolation::build_nearest(&positions, dims, voxel_size, origin, &title)?);
		tracing::debug!(
			group = self.doc.0,
			solution_points = positions.len(),
			?dims,
			"interpolation rebuilt"
		);
		Ok(())
	}

	// ---- derived views ---------------------------------------------------

	/// Synthesizes the missing derived views for the current member
	/// combination.
	///
	/// A potentials view per tracks document when tracks and electrodes are
	/// both present; an inverse-solution view per tracks document when
	/// tracks, solution points, inverse operators, and volumes are all
	/// present; an inverse-solution view per RIS document when RIS, solution
	/// points, and volumes are present.
	///
	/// `gate` carries the document an add just inserted: for solution
	/// points, inverse operators, and volumes, views are only synthesized
	/// when the insertion was the first of its kind, so re-adding a second
	/// MRI does not regenerate an existing display.
	fn create_derived_views(&self, registry: &mut Registry, gate: Option<(DocId, DocumentKind)>) {
		if let Some((id, kind)) = gate {
			let first = match kind {
				DocumentKind::SolutionPoints => self.members.solution_points.first(),
				DocumentKind::InverseMatrix => self.members.inverse.first(),
				DocumentKind::Volume => self.members.volumes.first(),
				_ => None,
			};
			if let Some(&f) = first
				&& f != id
			{
				return;
			}
		}

		let m = &self.members;
		if !m.tracks.is_empty() && !m.electrodes.is_empty() {
			for doc in m.tracks.clone() {
				self.ensure_derived_view(registry, doc, ViewKind::Potentials);
			}
		}
		if !m.tracks.is_empty()
			&& !m.solution_points.is_empty()
			&& !m.inverse.is_empty()
			&& !m.volumes.is_empty()
		{
			for doc in m.tracks.clone() {
				self.ensure_derived_view(registry, doc, ViewKind::InverseSolution);
			}
		}
		if !m.ris.is_empty() && !m.solution_points.is_empty() && !m.volumes.is_empty() {
			for doc in m.ris.clone() {
				self.ensure_derived_view(registry, doc, ViewKind::InverseSolution);
			}
		}
	}

	/// Creates a group-tagged, minimized derived view unless one exists.
	fn ensure_derived_view(&self, registry: &mut Registry, doc: DocId, kind: ViewKind) {
		let exists = registry.views_of(doc).iter().any(|v| {
			registry
				.view(*v)
				.is_some_and(|w| w.kind == kind && w.group() == Some(self.doc))
		});
		if exists {
			return;
		}
		let view = registry.create_view(doc, kind, Some(self.doc));
		registry.minimize_view(view);
	}

	/// Pairs same-time-frame potentials/inverse view pairs.
	///
	/// Only runs when tracks, solution points, inverse operators,
	/// electrodes, and volumes are all present; pairing is restricted to
	/// views tagged to this group.
	fn pair_potentials_inverse(&self, registry: &mut Registry) {
		let m = &self.members;
		if m.tracks.is_empty()
			|| m.solution_points.is_empty()
			|| m.inverse.is_empty()
			|| m.electrodes.is_empty()
			|| m.volumes.is_empty()
		{
			return;
		}

		let mut potentials: Vec<(ViewId, u64)> = Vec::new();
		let mut inverse: Vec<(ViewId, u64)> = Vec::new();
		for doc in m.tracks.iter().chain(&m.ris).copied() {
			let Some(tf) = registry.doc(doc).and_then(|d| d.meta.time_frames()) else {
				continue;
			};
			for view in registry.views_of(doc).to_vec() {
				let Some(w) = registry.view(view) else { continue };
				if w.group() != Some(self.doc) {
					continue;
				}
				match w.kind {
					ViewKind::Potentials => potentials.push((view, tf)),
					ViewKind::InverseSolution => inverse.push((view, tf)),
					_ => {}
				}
			}
		}
		for (pot, tf) in &potentials {
			for (inv, itf) in &inverse {
				if tf == itf {
					registry.set_friend(*pot, *inv);
				}
			}
		}
	}

	// ---- mutation --------------------------------------------------------

	/// Adds one already-open document to the group.
	///
	/// Rejections (unknown document, self, unsupported or segmentation
	/// kinds, duplicate membership) return false silently; compatibility
	/// failures surface a blocking message, force the dirty flag off, and
	/// return false. On success the member is locked, views are claimed or
	/// synthesized, the interpolation and derived views are refreshed under
	/// their first-of-kind gates, and the group turns dirty.
	pub fn add_to_group(&mut self, registry: &mut Registry, candidate: DocId) -> bool {
		let Some(record) = registry.doc(candidate) else {
			return false;
		};
		if candidate == self.doc {
			return false;
		}
		let kind = record.kind;
		let path = record.path.clone();
		let meta = record.meta.clone();

		if kind == DocumentKind::LinkGroup {
			// Group documents are merged member-wise through `add_group`.
			tracing::debug!(candidate = candidate.0, "cannot nest a link group as a member");
			return false;
		}
		if matches!(meta, DocMeta::Tracks { segmentation: true, .. }) {
			return false;
		}
		if self.members.contains(candidate) {
			return false;
		}

		// Re-validate compatibility over the current members plus the
		// candidate. ROIs already in the group stay excluded; a ROI
		// candidate is the one being validated.
		let mut tracks_meta = metas_of(registry, &self.members.tracks);
		let mut electrodes_meta = metas_of(registry, &self.members.electrodes);
		let mut sp_meta = metas_of(registry, &self.members.solution_points);
		let mut inverse_meta = metas_of(registry, &self.members.inverse);
		let mut ris_meta = metas_of(registry, &self.members.ris);
		let mut rois_meta = Vec::new();
		match kind {
			DocumentKind::Tracks | DocumentKind::Frequency => tracks_meta.push(meta.clone()),
			DocumentKind::Ris => ris_meta.push(meta.clone()),
			DocumentKind::Electrodes => electrodes_meta.push(meta.clone()),
			DocumentKind::SolutionPoints => sp_meta.push(meta.clone()),
			DocumentKind::InverseMatrix => inverse_meta.push(meta.clone()),
			DocumentKind::Rois => rois_meta.push(meta.clone()),
			DocumentKind::Volume | DocumentKind::LinkGroup => {}
		}
		let inputs = CompatInputs {
			tracks: &tracks_meta,
			rois: &rois_meta,
			electrodes: &electrodes_meta,
			solution_points: &sp_meta,
			inverse: &inverse_meta,
			ris: &ris_meta,
		};
		if let Err(err) = compat::check_compatibility(&inputs) {
			tracing::debug!(candidate = candidate.0, %err, "addition rejected");
			registry.prompter_mut().blocking_message("incompatible files", &err.to_string());
			if let Some(d) = registry.doc_mut(self.doc) {
				d.set_dirty(false);
			}
			return false;
		}

		// Insert. Tracks keep a canonical sort order: the whole sequence is
		// rebuilt from sorted paths rather than appended to.
		if kind.is_tracks_slot() {
			let mut paths: Vec<PathBuf> = self
				.members
				.tracks
				.iter()
				.filter_map(|d| registry.doc(*d).map(|doc| doc.path.clone()))
				.collect();
			paths.push(path);
			paths.sort();
			let mut rebuilt = Vec::with_capacity(paths.len());
			for p in &paths {
				match registry.open_or_find(p, true) {
					Ok(id) => rebuilt.push(id),
					Err(_) => {
						if let Some(d) = registry.doc_mut(self.doc) {
							d.set_dirty(false);
						}
						return false;
					}
				}
			}
			self.members.tracks = rebuilt;
		} else {
			let slot = match kind {
				DocumentKind::Ris => &mut self.members.ris,
				DocumentKind::Electrodes => &mut self.members.electrodes,
				DocumentKind::SolutionPoints => &mut self.members.solution_points,
				DocumentKind::InverseMatrix => &mut self.members.inverse,
				DocumentKind::Rois => &mut self.members.rois,
				DocumentKind::Volume => &mut self.members.volumes,
				_ => return false,
			};
			slot.push(candidate);
		}
		registry.link(Linker::Doc(candidate), Linker::Doc(self.doc));

		// Claim the free-floating default view, or synthesize a primary one.
		let mut created_view = None;
		let mut claimed_view = None;
		if kind.has_time_series() {
			let free = registry
				.views_of(candidate)
				.iter()
				.copied()
				.find(|v| registry.view(*v).is_some_and(|w| w.group().is_none()));
			match free {
				Some(v) => {
					registry.claim_view_for_group(v, self.doc);
					claimed_view = Some(v);
				}
				None => {
					let vk = if kind == DocumentKind::Frequency {
						ViewKind::Frequency
					} else {
						ViewKind::Tracks
					};
					created_view = Some(registry.create_view(candidate, vk, Some(self.doc)));
				}
			}
		}

		// Interpolation is only recomputed when the newly completed
		// solution-points/volume pair is the primary one.
		let recompute = match kind {
			DocumentKind::SolutionPoints => {
				self.members.solution_points.first() == Some(&candidate)
					&& !self.members.volumes.is_empty()
			}
			DocumentKind::Volume => {
				self.members.volumes.first() == Some(&candidate)
					&& !self.members.solution_points.is_empty()
			}
			_ => false,
		};
		if recompute && let Err(err) = self.rebuild_interpolation(registry) {
			tracing::warn!(candidate = candidate.0, %err, "interpolation failed; addition rolled back");
			if let Some(v) = created_view {
				registry.destroy_view(v, TeardownContext::NORMAL);
			}
			if let Some(v) = claimed_view {
				registry.release_view_claim(v);
			}
			registry.unlink(Linker::Doc(candidate), Linker::Doc(self.doc));
			self.members.remove(candidate);
			if let Some(d) = registry.doc_mut(self.doc) {
				d.set_dirty(false);
			}
			return false;
		}

		self.create_derived_views(registry, Some((candidate, kind)));
		self.pair_potentials_inverse(registry);

		if self.unspecified_path {
			self.derive_link_path(registry);
		}
		if let Some(d) = registry.doc_mut(self.doc) {
			d.set_dirty(true);
		}
		tracing::debug!(group = self.doc.0, candidate = candidate.0, ?kind, "member added");
		true
	}

	/// Merges another group member-wise: every member of `other` is
	/// re-dispatched through [`add_to_group`](Self::add_to_group); the
	/// result is the logical AND across members.
	pub fn add_group(&mut self, registry: &mut Registry, other: &LinkGroup) -> bool {
		let members: Vec<DocId> = other.members.all().collect();
		let mut all_added = true;
		for member in members {
			all_added &= self.add_to_group(registry, member);
		}
		all_added
	}

	/// Derives a `.lm` path from the member paths when none was ever chosen.
	///
	/// Prefers tracks and RIS paths, then volumes/inverse/solution points,
	/// then electrodes/ROIs; takes their longest common prefix and adopts it
	/// only when the result is absolute.
	fn derive_link_path(&mut self, registry: &mut Registry) {
		let m = &self.members;
		let pools: [Vec<DocId>; 3] = [
			m.tracks.iter().chain(&m.ris).copied().collect(),
			m.volumes.iter().chain(&m.inverse).chain(&m.solution_points).copied().collect(),
			m.electrodes.iter().chain(&m.rois).copied().collect(),
		];
		let Some(pool) = pools.iter().find(|p| !p.is_empty()) else {
			return;
		};
		let paths: Vec<String> = pool
			.iter()
			.filter_map(|d| registry.doc(*d).map(|doc| doc.path.display().to_string()))
			.collect();
		let Some(prefix) = longest_common_prefix(&paths) else {
			return;
		};
		let trimmed = prefix.trim_end_matches(['/', '\\', '.']);
		if trimmed.is_empty() {
			return;
		}
		let path = PathBuf::from(format!("{trimmed}.{}", esilink_primitives::LM_EXTENSION));
		if !path.is_absolute() {
			return;
		}
		tracing::debug!(group = self.doc.0, path = %path.display(), "link path derived");
		if let Some(record) = registry.doc_mut(self.doc) {
			record.path = path;
		}
		self.unspecified_path = false;
	}

	// ---- persistence -----------------------------------------------------

	/// Member paths in the seven-list layout.
	pub fn member_lists(&self, registry: &Registry) -> LinkLists {
		let path_of = |d: &DocId| registry.doc(*d).map(|doc| doc.path.clone());
		LinkLists {
			tracks: self.members.tracks.iter().filter_map(path_of).collect(),
			electrodes: self.members.electrodes.iter().filter_map(path_of).collect(),
			solution_points: self.members.solution_points.iter().filter_map(path_of).collect(),
			inverse: self.members.inverse.iter().filter_map(path_of).collect(),
			ris: self.members.ris.iter().filter_map(path_of).collect(),
			rois: self.members.rois.iter().filter_map(path_of).collect(),
			volumes: self.members.volumes.iter().filter_map(path_of).collect(),
		}
	}

	/// Writes the `.lm` file and clears the dirty flag. Idempotent.
	pub fn commit(&mut self, registry: &mut Registry) -> Result<(), GroupError> {
		if self.unspecified_path {
			return Err(GroupError::UnspecifiedPath);
		}
		let Some(path) = registry.doc(self.doc).map(|d| d.path.clone()) else {
			return Err(GroupError::UnspecifiedPath);
		};
		let lists = self.member_lists(registry);
		linkfile::store(&path, &lists)?;
		if let Some(record) = registry.doc_mut(self.doc) {
			record.set_dirty(false);
		}
		Ok(())
	}

	/// Reloads the group from its committed `.lm` file.
	pub fn revert(&mut self, registry: &mut Registry) -> Result<(), GroupError> {
		if self.unspecified_path {
			return Err(GroupError::UnspecifiedPath);
		}
		let Some(path) = registry.doc(self.doc).map(|d| d.path.clone()) else {
			return Err(GroupError::UnspecifiedPath);
		};
		let mut lists = match linkfile::load(&path) {
			Ok(lists) => lists,
			Err(err) => {
				// An abandoned revert leaves the dirty flag clear.
				if let Some(record) = registry.doc_mut(self.doc) {
					record.set_dirty(false);
				}
				return Err(err.into());
			}
		};
		lists.sort_tracks_like();
		self.close(registry, TeardownContext::NORMAL);
		let result = self.populate(registry, &lists);
		if result.is_err()
			&& let Some(record) = registry.doc_mut(self.doc)
		{
			record.set_dirty(false);
		}
		result
	}

	// ---- teardown --------------------------------------------------------

	/// Releases every member: unlocks it from this group, closes its
	/// group-owned windows, and closes the document itself only when
	/// nothing else holds it open.
	///
	/// "Held open" means a lock in the registry's `used_by` list, another
	/// group or a `Linker::View` holder; a free-floating window alone does
	/// not keep its document alive.
	///
	/// During application shutdown member documents may already be gone and
	/// are not touched; the sequences are emptied either way.
	pub fn close(&mut self, registry: &mut Registry, ctx: TeardownContext) {
		if self.members.is_empty() {
			self.interpolation = None;
			return;
		}
		if !ctx.app_closing {
			let members: Vec<DocId> = self.members.all().collect();
			for id in members {
				// Unlock before the closure check; close before the
				// sequence is emptied.
				registry.unlink(Linker::Doc(id), Linker::Doc(self.doc));
				let group_views: Vec<ViewId> = registry
					.views_of(id)
					.iter()
					.copied()
					.filter(|v| {
						registry.view(*v).is_some_and(|w| w.group() == Some(self.doc))
					})
					.collect();
				for view in group_views {
					registry.destroy_view(view, ctx);
				}
				if registry.can_close(id, true, ctx) {
					registry.close_doc(id, ctx);
				}
			}
		}
		self.members.clear();
		self.interpolation = None;
		tracing::debug!(group = self.doc.0, "group closed");
	}
}

impl Drop for LinkGroup {
	fn drop(&mut self) {
		if !self.members.is_empty() {
			tracing::warn!(
				group = self.doc.0,
				"link group dropped without close; member locks leak"
			);
		}
	}
}

fn probe_list(registry: &mut Registry, paths: &[PathBuf]) -> Result<Vec<DocMeta>, GroupError> {
	paths.iter().map(|p| registry.probe_path(p).map_err(GroupError::from)).collect()
}

fn metas_of(registry: &Registry, docs: &[DocId]) -> Vec<DocMeta> {
	docs.iter().filter_map(|d| registry.doc(*d).map(|doc| doc.meta.clone())).collect()
}

/// Opens a non-tracks member, minimizing its default view when the open is
/// fresh (an already-open document keeps its window state).
fn open_minimized(registry: &mut Registry, path: &Path) -> Result<DocId, GroupError> {
	let existed = registry.find_by_path(path).is_some();
	let id = registry.open_or_find(path, false)?;
	if !existed && let Some(&view) = registry.views_of(id).first() {
		registry.minimize_view(view);
	}
	Ok(id)
}

fn longest_common_prefix(paths: &[String]) -> Option<String> {
	let first = paths.first()?;
	let mut len = first.len();
	for path in &paths[1..] {
		len = len.min(
			first
				.bytes()
				.zip(path.bytes())
				.take_while(|(a, b)| a == b)
				.count(),
		);
	}
	// Avoid splitting a UTF-8 sequence.
	while len > 0 && !first.is_char_boundary(len) {
		len -= 1;
	}
	Some(first[..len].to_owned())
}
