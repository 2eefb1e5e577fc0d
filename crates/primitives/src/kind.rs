//! Document kinds and path classification.
//!
//! A path belongs to at most one kind, decided purely by its file extension.
//! The extension sets partition the namespace; a path matching none of them
//! is not a linkable document and is silently skipped during interactive
//! group creation.

use std::path::Path;

/// Extension of a serialized link-group file.
pub const LM_EXTENSION: &str = "lm";

/// Time-domain track (EEG/MEG recording) extensions.
const TRACKS_EXTENSIONS: &[&str] = &["eeg", "sef", "bdf", "edf", "trc", "avg", "ep", "eph", "nsr"];

/// Frequency-domain track extensions.
const FREQUENCY_EXTENSIONS: &[&str] = &["freq"];

/// Electrode-coordinate extensions.
const ELECTRODES_EXTENSIONS: &[&str] = &["xyz", "els"];

/// Solution-point extensions.
const SOLUTION_POINTS_EXTENSIONS: &[&str] = &["spi"];

/// Inverse-operator extensions.
const INVERSE_EXTENSIONS: &[&str] = &["is", "spinv"];

/// Result of Inverse Solution (per-solution-point time series) extensions.
const RIS_EXTENSIONS: &[&str] = &["ris"];

/// Region-of-interest extensions.
const ROIS_EXTENSIONS: &[&str] = &["rois"];

/// MRI volume extensions.
const VOLUME_EXTENSIONS: &[&str] = &["nii", "hdr", "img", "vmr"];

/// The kind of a document, as derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
	/// Time-domain sensor tracks (EEG/MEG recording or average).
	Tracks,
	/// Frequency-domain tracks.
	Frequency,
	/// 3D electrode coordinates.
	Electrodes,
	/// 3D source locations used by inverse computations.
	SolutionPoints,
	/// Precomputed sensor-space to source-space linear operator.
	InverseMatrix,
	/// Precomputed per-solution-point source time series.
	Ris,
	/// Regions of interest over electrode or solution-point space.
	Rois,
	/// MRI volume.
	Volume,
	/// A link group aggregating documents of the other kinds.
	LinkGroup,
}

impl DocumentKind {
	/// Whether this kind occupies the tracks slot for compatibility purposes.
	///
	/// Time-domain and frequency-domain tracks are interchangeable as far as
	/// group compatibility is concerned; RIS files have their own slot.
	pub fn is_tracks_slot(self) -> bool {
		matches!(self, Self::Tracks | Self::Frequency)
	}

	/// Whether documents of this kind carry a time-series payload and get a
	/// manually constructed primary view instead of the registry default.
	pub fn has_time_series(self) -> bool {
		matches!(self, Self::Tracks | Self::Frequency | Self::Ris)
	}
}

impl std::fmt::Display for DocumentKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Tracks => "tracks",
			Self::Frequency => "frequency tracks",
			Self::Electrodes => "electrodes",
			Self::SolutionPoints => "solution points",
			Self::InverseMatrix => "inverse matrices",
			Self::Ris => "results of inverse solution",
			Self::Rois => "regions of interest",
			Self::Volume => "volumes",
			Self::LinkGroup => "link groups",
		})
	}
}

/// Classifies a path into a document kind by extension, case-insensitively.
///
/// Returns `None` for unknown extensions and extension-less paths.
pub fn classify_path(path: &Path) -> Option<DocumentKind> {
	let ext = path.extension()?.to_str()?.to_ascii_lowercase();
	let ext = ext.as_str();
	if ext == LM_EXTENSION {
		Some(DocumentKind::LinkGroup)
	} else if TRACKS_EXTENSIONS.contains(&ext) {
		Some(DocumentKind::Tracks)
	} else if FREQUENCY_EXTENSIONS.contains(&ext) {
		Some(DocumentKind::Frequency)
	} else if ELECTRODES_EXTENSIONS.contains(&ext) {
		Some(DocumentKind::Electrodes)
	} else if SOLUTION_POINTS_EXTENSIONS.contains(&ext) {
		Some(DocumentKind::SolutionPoints)
	} else if INVERSE_EXTENSIONS.contains(&ext) {
		Some(DocumentKind::InverseMatrix)
	} else if RIS_EXTENSIONS.contains(&ext) {
		Some(DocumentKind::Ris)
	} else if ROIS_EXTENSIONS.contains(&ext) {
		Some(DocumentKind::Rois)
	} else if VOLUME_EXTENSIONS.contains(&ext) {
		Some(DocumentKind::Volume)
	} else {
		None
	}
}

/// The kind of a view.
///
/// Primary views display a document directly; derived views (potentials,
/// inverse solution) are synthesized by a link group from combinations of
/// member documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
	/// Scrolling time-series display.
	Tracks,
	/// Frequency-band display.
	Frequency,
	/// 3D electrode montage.
	Electrodes,
	/// 3D solution-point cloud.
	SolutionPoints,
	/// Inverse-operator summary.
	InverseMatrix,
	/// ROI listing.
	Rois,
	/// Volume slice display.
	Volume,
	/// Link-group member listing.
	LinkGroup,
	/// Scalp potential map, derived from tracks + electrodes.
	Potentials,
	/// Source-estimate display, derived from tracks/RIS + solution points.
	InverseSolution,
}

impl ViewKind {
	/// The default view a document of `kind` gets when opened on its own.
	pub fn default_for(kind: DocumentKind) -> Self {
		match kind {
			DocumentKind::Tracks | DocumentKind::Ris => Self::Tracks,
			DocumentKind::Frequency => Self::Frequency,
			DocumentKind::Electrodes => Self::Electrodes,
			DocumentKind::SolutionPoints => Self::SolutionPoints,
			DocumentKind::InverseMatrix => Self::InverseMatrix,
			DocumentKind::Rois => Self::Rois,
			DocumentKind::Volume => Self::Volume,
			DocumentKind::LinkGroup => Self::LinkGroup,
		}
	}

	/// Whether this view displays a time series and participates in the
	/// cursor-synchronization (friendship) batch operations.
	pub fn is_time_series(self) -> bool {
		matches!(self, Self::Tracks | Self::Frequency)
	}
}
