//! Tiling flag bitmask.

use bitflags::bitflags;
use thiserror::Error;

bitflags! {
	/// Flags controlling a group tiling pass.
	///
	/// The two size-mode flags are mutually exclusive with each other but
	/// independent of the insertion-mode flags; [`TileFlags::validate`]
	/// enforces this.
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub struct TileFlags: u8 {
		/// Reposition windows.
		const MOVE = 1 << 0;
		/// Resize windows to best fit the client area.
		const BEST_FIT_SIZE = 1 << 1;
		/// Resize windows to the standard size.
		const STAND_SIZE = 1 << 2;
		/// Anchor the arrangement to the right side of the client area.
		const RIGHT_SIDE = 1 << 3;
		/// Shift other groups' overlapping windows out of the way.
		const INSERT = 1 << 4;
	}
}

/// Rejected tiling flag combination.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TileFlagsError {
	/// Both size modes were requested at once.
	#[error("best-fit and standard size modes are mutually exclusive")]
	ConflictingSizeModes,
}

impl TileFlags {
	/// Validates the flag combination.
	pub fn validate(self) -> Result<(), TileFlagsError> {
		if self.contains(Self::BEST_FIT_SIZE | Self::STAND_SIZE) {
			return Err(TileFlagsError::ConflictingSizeModes);
		}
		Ok(())
	}
}
