//! Document metadata used for compatibility checks and view derivation.
//!
//! Metadata is produced by a [`DocumentSource`](crate::DocumentSource) probe;
//! the actual format readers live behind that seam and are not part of this
//! crate.

use esilink_primitives::DocumentKind;

/// Content classification of an MRI volume.
///
/// Used by the head/brain/grey guess when a group wires up its inverse
/// display; volumes whose reader cannot classify them report `Unknown` and
/// fall through to the positional heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeContent {
	/// Full-head scan, skin included.
	FullHead,
	/// Segmented tissue (non-mask), typically the brain.
	SegmentedTissue,
	/// Binary mask, typically grey matter.
	BinaryMask,
	/// No usable classification.
	Unknown,
}

/// Per-kind document metadata.
///
/// Carries exactly the counts and geometry the linking core consumes:
/// cardinalities for compatibility checks, positions/grids for the
/// interpolation builder, content classification for volume roles.
#[derive(Debug, Clone, PartialEq)]
pub enum DocMeta {
	/// Sensor-space tracks; `frequency_bands > 0` marks a frequency-domain
	/// document, `segmentation` marks the segmentation-output variant that
	/// is excluded from groups.
	Tracks {
		/// Number of electrodes (channels).
		electrodes: u32,
		/// Number of time frames.
		time_frames: u64,
		/// Number of frequency bands; zero for time-domain documents.
		frequency_bands: u32,
		/// Whether this is a segmentation-output document.
		segmentation: bool,
	},
	/// Per-solution-point source time series.
	Ris {
		/// Number of solution points.
		solution_points: u32,
		/// Number of time frames.
		time_frames: u64,
	},
	/// Electrode coordinates.
	Electrodes {
		/// Number of electrode positions.
		electrodes: u32,
	},
	/// Solution-point cloud.
	SolutionPoints {
		/// 3D positions, one per solution point.
		positions: Vec<[f32; 3]>,
	},
	/// Inverse operator.
	InverseMatrix {
		/// Sensor-space dimension.
		electrodes: u32,
		/// Source-space dimension.
		solution_points: u32,
	},
	/// Regions of interest.
	Rois {
		/// Size of the space the ROIs index into (electrodes or solution
		/// points, depending on the file convention).
		dimension: u32,
		/// Number of ROIs.
		rois: u32,
	},
	/// MRI volume.
	Volume {
		/// Content classification.
		content: VolumeContent,
		/// Grid dimensions in voxels.
		dims: [u32; 3],
		/// Voxel size in millimeters.
		voxel_size: [f32; 3],
		/// Position of voxel (0,0,0) in world coordinates.
		origin: [f32; 3],
	},
	/// A link group; carries no intrinsic data.
	LinkGroup,
}

impl DocMeta {
	/// The document kind this metadata describes.
	pub fn kind(&self) -> DocumentKind {
		match self {
			Self::Tracks { frequency_bands, .. } if *frequency_bands > 0 => {
				DocumentKind::Frequency
			}
			Self::Tracks { .. } => DocumentKind::Tracks,
			Self::Ris { .. } => DocumentKind::Ris,
			Self::Electrodes { .. } => DocumentKind::Electrodes,
			Self::SolutionPoints { .. } => DocumentKind::SolutionPoints,
			Self::InverseMatrix { .. } => DocumentKind::InverseMatrix,
			Self::Rois { .. } => DocumentKind::Rois,
			Self::Volume { .. } => DocumentKind::Volume,
			Self::LinkGroup => DocumentKind::LinkGroup,
		}
	}

	/// Electrode count, for the kinds that carry one.
	pub fn electrodes(&self) -> Option<u32> {
		match self {
			Self::Tracks { electrodes, .. }
			| Self::Electrodes { electrodes }
			| Self::InverseMatrix { electrodes, .. } => Some(*electrodes),
			_ => None,
		}
	}

	/// Solution-point count, for the kinds that carry one.
	pub fn solution_points(&self) -> Option<u32> {
		match self {
			Self::Ris { solution_points, .. }
			| Self::InverseMatrix { solution_points, .. } => Some(*solution_points),
			Self::SolutionPoints { positions } => Some(positions.len() as u32),
			_ => None,
		}
	}

	/// Time-frame count, for the kinds that carry one.
	pub fn time_frames(&self) -> Option<u64> {
		match self {
			Self::Tracks { time_frames, .. } | Self::Ris { time_frames, .. } => {
				Some(*time_frames)
			}
			_ => None,
		}
	}
}
