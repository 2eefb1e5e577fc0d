//! Cross-file compatibility validation.
//!
//! Given the per-kind metadata lists of a prospective group, decides whether
//! the files may be combined: each kind must agree internally on its
//! cardinalities, and the kinds must agree with each other wherever they
//! share a dimension (electrode space, solution-point space).
//!
//! Stateless: recomputed per validation call, never cached.

use esilink_primitives::DocumentKind;
use esilink_registry::DocMeta;
use thiserror::Error;

/// Three-valued outcome of folding a cardinality across a file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consistency {
	/// All files agree on this shared positive count.
	Consistent(u64),
	/// Files carry conflicting counts.
	NotConsistent,
	/// No file carries usable data for this quantity (empty list, or a zero
	/// count somewhere).
	Irrelevant,
}

impl Consistency {
	/// Folds a sequence of counts.
	///
	/// Conflicting non-zero counts dominate (`NotConsistent`); otherwise a
	/// zero anywhere, or an empty sequence, yields `Irrelevant`.
	pub fn fold(counts: impl IntoIterator<Item = u64>) -> Self {
		let mut shared: Option<u64> = None;
		let mut saw_zero = false;
		for count in counts {
			if count == 0 {
				saw_zero = true;
				continue;
			}
			match shared {
				None => shared = Some(count),
				Some(prev) if prev != count => return Self::NotConsistent,
				Some(_) => {}
			}
		}
		match shared {
			Some(_) if saw_zero => Self::Irrelevant,
			Some(n) => Self::Consistent(n),
			None => Self::Irrelevant,
		}
	}

	/// The shared count, when consistent.
	pub fn value(self) -> Option<u64> {
		match self {
			Self::Consistent(n) => Some(n),
			_ => None,
		}
	}
}

/// The quantity a check was about, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
	/// Electrode (channel) count.
	Electrodes,
	/// Solution-point count.
	SolutionPoints,
	/// Time-frame count.
	TimeFrames,
	/// ROI space dimension.
	RoiDimension,
	/// Number of ROIs.
	RoiCount,
}

impl std::fmt::Display for Quantity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Electrodes => "number of electrodes",
			Self::SolutionPoints => "number of solution points",
			Self::TimeFrames => "number of time frames",
			Self::RoiDimension => "ROI dimension",
			Self::RoiCount => "number of ROIs",
		})
	}
}

/// A compatibility failure; aborts the whole group open or add.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompatError {
	/// Files of one kind disagree among themselves.
	#[error("{kind} files disagree on the {quantity}")]
	Inconsistent {
		/// Offending file kind.
		kind: DocumentKind,
		/// The disagreeing quantity.
		quantity: Quantity,
	},
	/// Files of one kind carry no usable data for a required quantity.
	#[error("{kind} files carry no usable {quantity}")]
	Missing {
		/// Offending file kind.
		kind: DocumentKind,
		/// The absent quantity.
		quantity: Quantity,
	},
	/// Two kinds disagree on a shared dimension.
	#[error("{left} and {right} files disagree on the {quantity}")]
	CrossMismatch {
		/// First kind of the disagreeing pair.
		left: DocumentKind,
		/// Second kind of the disagreeing pair.
		right: DocumentKind,
		/// The shared quantity.
		quantity: Quantity,
	},
}

/// Per-kind metadata lists of a prospective group.
///
/// Volumes never participate in compatibility; time-domain and
/// frequency-domain tracks share the `tracks` slot.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompatInputs<'a> {
	/// Tracks metadata (time- or frequency-domain).
	pub tracks: &'a [DocMeta],
	/// ROI metadata; left empty except when a ROI attach is being validated.
	pub rois: &'a [DocMeta],
	/// Electrode metadata.
	pub electrodes: &'a [DocMeta],
	/// Solution-point metadata.
	pub solution_points: &'a [DocMeta],
	/// Inverse-operator metadata.
	pub inverse: &'a [DocMeta],
	/// RIS metadata.
	pub ris: &'a [DocMeta],
}

/// Aggregate agreement of the tracks list.
#[derive(Debug, Clone, Copy)]
pub struct TracksCompat {
	/// Electrode-count agreement.
	pub electrodes: Consistency,
	/// Time-frame agreement.
	pub time_frames: Consistency,
}

/// Aggregate agreement of the RIS list.
#[derive(Debug, Clone, Copy)]
pub struct RisCompat {
	/// Solution-point agreement.
	pub solution_points: Consistency,
	/// Time-frame agreement.
	pub time_frames: Consistency,
}

/// Aggregate agreement of the inverse-operator list.
#[derive(Debug, Clone, Copy)]
pub struct InverseCompat {
	/// Sensor-space agreement.
	pub electrodes: Consistency,
	/// Source-space agreement.
	pub solution_points: Consistency,
}

/// Aggregate agreement of the ROI list.
#[derive(Debug, Clone, Copy)]
pub struct RoisCompat {
	/// Space-dimension agreement.
	pub dimension: Consistency,
	/// ROI-count agreement.
	pub rois: Consistency,
}

fn fold_quantity(metas: &[DocMeta], get: impl Fn(&DocMeta) -> u64) -> Consistency {
	Consistency::fold(metas.iter().map(get))
}

fn require(
	c: Consistency,
	kind: DocumentKind,
	quantity: Quantity,
) -> Result<u64, CompatError> {
	match c {
		Consistency::Consistent(n) => Ok(n),
		Consistency::NotConsistent => Err(CompatError::Inconsistent { kind, quantity }),
		Consistency::Irrelevant => Err(CompatError::Missing { kind, quantity }),
	}
}

fn cross(
	left: (DocumentKind, u64),
	right: (DocumentKind, u64),
	quantity: Quantity,
) -> Result<(), CompatError> {
	if left.1 != right.1 {
		return Err(CompatError::CrossMismatch {
			left: left.0,
			right: right.0,
			quantity,
		});
	}
	Ok(())
}

/// Decides whether the given file lists may form one group.
///
/// Every non-empty list must agree internally (with positive counts), and
/// every cross-kind pair sharing a dimension must match. The first failure
/// aborts; callers surface the message and roll back.
pub fn check_compatibility(inputs: &CompatInputs<'_>) -> Result<(), CompatError> {
	use DocumentKind as K;
	use Quantity as Q;

	let tracks = (!inputs.tracks.is_empty()).then(|| -> Result<_, CompatError> {
		let c = TracksCompat {
			electrodes: fold_quantity(inputs.tracks, |m| {
				u64::from(m.electrodes().unwrap_or(0))
			}),
			time_frames: fold_quantity(inputs.tracks, |m| m.time_frames().unwrap_or(0)),
		};
		let el = require(c.electrodes, K::Tracks, Q::Electrodes)?;
		require(c.time_frames, K::Tracks, Q::TimeFrames)?;
		Ok(el)
	});
	let tracks_el = tracks.transpose()?;

	let ris = (!inputs.ris.is_empty()).then(|| -> Result<_, CompatError> {
		let c = RisCompat {
			solution_points: fold_quantity(inputs.ris, |m| {
				u64::from(m.solution_points().unwrap_or(0))
			}),
			time_frames: fold_quantity(inputs.ris, |m| m.time_frames().unwrap_or(0)),
		};
		let sp = require(c.solution_points, K::Ris, Q::SolutionPoints)?;
		require(c.time_frames, K::Ris, Q::TimeFrames)?;
		Ok(sp)
	});
	let ris_sp = ris.transpose()?;

	let electrodes_el = (!inputs.electrodes.is_empty())
		.then(|| {
			let c = fold_quantity(inputs.electrodes, |m| {
				u64::from(m.electrodes().unwrap_or(0))
			});
			require(c, K::Electrodes, Q::Electrodes)
		})
		.transpose()?;

	let sp_count = (!inputs.solution_points.is_empty())
		.then(|| {
			let c = fold_quantity(inputs.solution_points, |m| {
				u64::from(m.solution_points().unwrap_or(0))
			});
			require(c, K::SolutionPoints, Q::SolutionPoints)
		})
		.transpose()?;

	let inverse = (!inputs.inverse.is_empty()).then(|| -> Result<_, CompatError> {
		let c = InverseCompat {
			electrodes: fold_quantity(inputs.inverse, |m| {
				u64::from(m.electrodes().unwrap_or(0))
			}),
			solution_points: fold_quantity(inputs.inverse, |m| {
				u64::from(m.solution_points().unwrap_or(0))
			}),
		};
		let el = require(c.electrodes, K::InverseMatrix, Q::Electrodes)?;
		let sp = require(c.solution_points, K::InverseMatrix, Q::SolutionPoints)?;
		Ok((el, sp))
	});
	let inverse_dims = inverse.transpose()?;

	let rois = (!inputs.rois.is_empty()).then(|| -> Result<_, CompatError> {
		let c = RoisCompat {
			dimension: fold_quantity(inputs.rois, |m| match m {
				DocMeta::Rois { dimension, .. } => u64::from(*dimension),
				_ => 0,
			}),
			rois: fold_quantity(inputs.rois, |m| match m {
				DocMeta::Rois { rois, .. } => u64::from(*rois),
				_ => 0,
			}),
		};
		let dim = require(c.dimension, K::Rois, Q::RoiDimension)?;
		let count = require(c.rois, K::Rois, Q::RoiCount)?;
		Ok((dim, count))
	});
	let rois_dims = rois.transpose()?;

	// Cross-kind agreement.
	if let (Some(t), Some(e)) = (tracks_el, electrodes_el) {
		cross((K::Tracks, t), (K::Electrodes, e), Q::Electrodes)?;
	}
	if let (Some(t), Some((iel, _))) = (tracks_el, inverse_dims) {
		cross((K::Tracks, t), (K::InverseMatrix, iel), Q::Electrodes)?;
	}
	if let (Some(e), Some((iel, _))) = (electrodes_el, inverse_dims) {
		cross((K::Electrodes, e), (K::InverseMatrix, iel), Q::Electrodes)?;
	}
	if let (Some(sp), Some((_, isp))) = (sp_count, inverse_dims) {
		cross(
			(K::SolutionPoints, sp),
			(K::InverseMatrix, isp),
			Q::SolutionPoints,
		)?;
	}
	if let (Some(sp), Some(rsp)) = (sp_count, ris_sp) {
		cross((K::SolutionPoints, sp), (K::Ris, rsp), Q::SolutionPoints)?;
	}
	if let (Some(sp), Some(dims)) = (sp_count, rois_dims)
		&& !rois_match_solution_points(dims, sp)
	{
		return Err(CompatError::CrossMismatch {
			left: K::SolutionPoints,
			right: K::Rois,
			quantity: Q::SolutionPoints,
		});
	}

	Ok(())
}

/// The deliberately permissive solution-points-vs-ROIs rule: the pair is
/// compatible when *either* the ROI dimension *or* the ROI count equals the
/// solution-point count. Two ROI file conventions exist in the wild; keep
/// this predicate isolated so a future tightening is a one-line change.
pub fn rois_match_solution_points((dimension, rois): (u64, u64), solution_points: u64) -> bool {
	dimension == solution_points || rois == solution_points
}
