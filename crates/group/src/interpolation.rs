//! Point-to-voxel interpolation builder.
//!
//! Precomputes, for every voxel of the target volume grid, the index of the
//! nearest solution point (1NN). The inverse display samples this map to
//! paint source estimates onto MRI slices; 4NN weighting is derived from the
//! same distances at render time and is out of scope here.
//!
//! The voxel scan is a fork-join parallel loop over independent slices; it
//! touches no group state.

use rayon::prelude::*;
use thiserror::Error;

/// Interpolation build failure. Fatal to the surrounding group operation,
/// not to the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterpolationError {
	/// The solution-point document carries no points.
	#[error("no solution points to interpolate from")]
	NoSolutionPoints,
	/// The target volume has a zero-sized grid or voxel.
	#[error("degenerate voxel geometry in volume {title}")]
	DegenerateVolume {
		/// Title of the offending volume.
		title: String,
	},
}

/// A precomputed voxel → nearest-solution-point map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
	/// Grid dimensions in voxels, x-fastest layout.
	pub dims: [u32; 3],
	/// Nearest solution-point index per voxel.
	pub nearest: Vec<u32>,
}

impl Interpolation {
	/// Nearest solution point of one voxel.
	pub fn at(&self, x: u32, y: u32, z: u32) -> Option<u32> {
		if x >= self.dims[0] || y >= self.dims[1] || z >= self.dims[2] {
			return None;
		}
		// Index math in usize: clinical-resolution grids overflow u32.
		let idx = (z as usize * self.dims[1] as usize + y as usize) * self.dims[0] as usize
			+ x as usize;
		self.nearest.get(idx).copied()
	}
}

/// Builds the 1NN map from solution points onto a volume grid.
///
/// `origin` is the world position of voxel (0,0,0); voxel centers sit at
/// `origin + (i + 0.5) * voxel_size` per axis.
pub fn build_nearest(
	points: &[[f32; 3]],
	dims: [u32; 3],
	voxel_size: [f32; 3],
	origin: [f32; 3],
	volume_title: &str,
) -> Result<Interpolation, InterpolationError> {
	if points.is_empty() {
		return Err(InterpolationError::NoSolutionPoints);
	}
	if dims.iter().any(|d| *d == 0) || voxel_size.iter().any(|s| *s <= 0.0) {
		return Err(InterpolationError::DegenerateVolume { title: volume_title.to_owned() });
	}

	let [dx, dy, dz] = dims;
	let slice_len = (dx * dy) as usize;

	let nearest: Vec<u32> = (0..dz)
		.into_par_iter()
		.flat_map_iter(|z| {
			let mut slice = Vec::with_capacity(slice_len);
			let wz = origin[2] + (z as f32 + 0.5) * voxel_size[2];
			for y in 0..dy {
				let wy = origin[1] + (y as f32 + 0.5) * voxel_size[1];
				for x in 0..dx {
					let wx = origin[0] + (x as f32 + 0.5) * voxel_size[0];
					let mut best = 0u32;
					let mut best_d2 = f32::INFINITY;
					for (i, p) in points.iter().enumerate() {
						let d2 = (p[0] - wx).powi(2)
							+ (p[1] - wy).powi(2)
							+ (p[2] - wz).powi(2);
						if d2 < best_d2 {
							best_d2 = d2;
							best = i as u32;
						}
					}
					slice.push(best);
				}
			}
			slice
		})
		.collect();

	Ok(Interpolation { dims, nearest })
}
