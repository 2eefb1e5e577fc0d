//! The `.lm` link-file codec.
//!
//! A link file is UTF-8 text, one absolute member path per line, no header
//! and no per-line kind tag: the kind is re-derived at load time from each
//! path's extension. Writing is idempotent and always emits the fixed kind
//! order {electrodes, solution points, inverse, tracks, RIS, ROIs, volumes};
//! kinds with no members are simply omitted.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use esilink_primitives::{DocumentKind, classify_path};
use thiserror::Error;

/// Link-file I/O failure.
#[derive(Debug, Error)]
pub enum LinkFileError {
	/// The link file could not be read.
	#[error("cannot read link file {}: {error}", path.display())]
	Read {
		/// Link-file path.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		error: std::io::Error,
	},
	/// The link file could not be written.
	#[error("cannot write link file {}: {error}", path.display())]
	Write {
		/// Link-file path.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		error: std::io::Error,
	},
}

/// The seven per-kind path lists of a link file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkLists {
	/// Tracks paths (time- and frequency-domain share this slot).
	pub tracks: Vec<PathBuf>,
	/// Electrode-coordinate paths.
	pub electrodes: Vec<PathBuf>,
	/// Solution-point paths.
	pub solution_points: Vec<PathBuf>,
	/// Inverse-operator paths.
	pub inverse: Vec<PathBuf>,
	/// RIS paths.
	pub ris: Vec<PathBuf>,
	/// ROI paths.
	pub rois: Vec<PathBuf>,
	/// MRI volume paths.
	pub volumes: Vec<PathBuf>,
}

impl LinkLists {
	/// Files a path into the list its extension selects.
	///
	/// Unknown extensions and nested link files are silently skipped, per
	/// the classification contract.
	pub fn push_classified(&mut self, path: PathBuf) {
		match classify_path(&path) {
			Some(DocumentKind::Tracks | DocumentKind::Frequency) => self.tracks.push(path),
			Some(DocumentKind::Electrodes) => self.electrodes.push(path),
			Some(DocumentKind::SolutionPoints) => self.solution_points.push(path),
			Some(DocumentKind::InverseMatrix) => self.inverse.push(path),
			Some(DocumentKind::Ris) => self.ris.push(path),
			Some(DocumentKind::Rois) => self.rois.push(path),
			Some(DocumentKind::Volume) => self.volumes.push(path),
			Some(DocumentKind::LinkGroup) | None => {
				tracing::debug!(path = %path.display(), "path ignored by classification");
			}
		}
	}

	/// Whether every list is empty.
	pub fn is_empty(&self) -> bool {
		self.tracks.is_empty()
			&& self.electrodes.is_empty()
			&& self.solution_points.is_empty()
			&& self.inverse.is_empty()
			&& self.ris.is_empty()
			&& self.rois.is_empty()
			&& self.volumes.is_empty()
	}

	/// Sorts the tracks-like lists (tracks and RIS) into canonical order.
	pub fn sort_tracks_like(&mut self) {
		self.tracks.sort();
		self.ris.sort();
	}
}

/// Parses link-file content into per-kind lists.
pub fn parse(content: &str) -> LinkLists {
	let mut lists = LinkLists::default();
	for line in content.lines() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}
		lists.push_classified(PathBuf::from(line));
	}
	lists
}

/// Serializes the lists in the fixed kind order.
pub fn render(lists: &LinkLists) -> String {
	let mut out = String::new();
	let blocks = [
		&lists.electrodes,
		&lists.solution_points,
		&lists.inverse,
		&lists.tracks,
		&lists.ris,
		&lists.rois,
		&lists.volumes,
	];
	for block in blocks {
		for path in block.iter() {
			let _ = writeln!(out, "{}", path.display());
		}
	}
	out
}

/// Reads and parses a link file.
pub fn load(path: &Path) -> Result<LinkLists, LinkFileError> {
	let content = std::fs::read_to_string(path)
		.map_err(|error| LinkFileError::Read { path: path.to_path_buf(), error })?;
	Ok(parse(&content))
}

/// Writes a link file.
pub fn store(path: &Path, lists: &LinkLists) -> Result<(), LinkFileError> {
	std::fs::write(path, render(lists))
		.map_err(|error| LinkFileError::Write { path: path.to_path_buf(), error })
}

/// Checks that `path` accepts writes without disturbing its contents.
///
/// Opens in append mode, so a pre-existing link file at the destination
/// survives byte-identical if the caller aborts before the first `store`.
pub fn probe_writable(path: &Path) -> Result<(), LinkFileError> {
	std::fs::OpenOptions::new()
		.append(true)
		.create(true)
		.open(path)
		.map(drop)
		.map_err(|error| LinkFileError::Write { path: path.to_path_buf(), error })
}
