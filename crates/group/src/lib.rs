//! Link groups over the document registry.
//!
//! This crate implements the multi-file analysis session: the `.lm` link
//! file codec, the cross-file compatibility checker, the [`LinkGroup`]
//! aggregate that opens, locks, and wires up member documents, volume role
//! assignment and point-to-voxel interpolation for inverse displays, view
//! synchronization, and window tiling.

pub mod compat;
pub mod group;
pub mod interpolation;
pub mod linkfile;
pub mod mris;
mod sync;
mod tiling;

pub use compat::{CompatError, CompatInputs, Consistency, Quantity, check_compatibility};
pub use group::{GroupError, LinkGroup, Members};
pub use interpolation::{Interpolation, InterpolationError, build_nearest};
pub use linkfile::{LinkFileError, LinkLists};
pub use mris::{VolumeRoles, guess_head_brain_grey};
