//! Window tiling for a group's minimized views.
//!
//! The tiling trigger is the group's responsibility; layout policy (cell
//! sizes, fill direction) is fixed here. The pass only ever moves windows of
//! this group's arrangement: group-tagged views plus minimized views of
//! member documents. Windows claimed by other groups are never repositioned,
//! except that the insert flag may shift them aside to make room.

use esilink_primitives::{Rect, TileFlags, TileFlagsError, ViewId};
use esilink_registry::Registry;

use crate::group::LinkGroup;

/// Footprint of a minimized window.
const MINIMIZED_W: u32 = 160;
const MINIMIZED_H: u32 = 40;

/// Footprint of a standard (restored) window.
const STAND_W: u32 = 400;
const STAND_H: u32 = 300;

impl LinkGroup {
	/// Retiles this group's windows inside `client`.
	///
	/// Flags select movement, sizing, fill side, and whether overlapping
	/// foreign windows are shifted aside. Without the move flag the call
	/// validates and returns. Minimized windows already inside the client
	/// area stay put, so repeated calls are idempotent.
	pub fn group_tile_views(
		&self,
		registry: &mut Registry,
		flags: TileFlags,
		client: Rect,
	) -> Result<(), TileFlagsError> {
		flags.validate()?;
		if !flags.contains(TileFlags::MOVE) {
			return Ok(());
		}

		let views = self.arranged_views(registry);
		let (cell_w, cell_h) = if flags.contains(TileFlags::BEST_FIT_SIZE) {
			best_fit_cell(client, views.len())
		} else if flags.contains(TileFlags::STAND_SIZE) {
			(STAND_W, STAND_H)
		} else {
			(MINIMIZED_W, MINIMIZED_H)
		};

		let mut placed: Vec<Rect> = Vec::new();
		let mut slot = 0usize;
		for view in &views {
			let Some(w) = registry.view(*view) else { continue };
			let frame = w.frame();
			if w.is_minimized()
				&& !flags.intersects(TileFlags::BEST_FIT_SIZE | TileFlags::STAND_SIZE)
				&& frame.w > 0
				&& client.contains(&frame)
			{
				// Already arranged; leave it and reserve its footprint.
				placed.push(frame);
				continue;
			}
			let rect = slot_rect(client, flags, cell_w, cell_h, slot);
			registry.set_view_frame(*view, rect);
			placed.push(rect);
			slot += 1;
		}

		if flags.contains(TileFlags::INSERT) {
			self.shift_overlapping(registry, &views, &placed);
		}
		Ok(())
	}

	/// The windows this group arranges: its tagged views plus minimized
	/// free-floating views of member documents, in member order.
	fn arranged_views(&self, registry: &Registry) -> Vec<ViewId> {
		let mut out = Vec::new();
		for doc in self.members.all() {
			for view in registry.views_of(doc) {
				let Some(w) = registry.view(*view) else { continue };
				let ours = match w.group() {
					Some(g) => g == self.doc,
					None => w.is_minimized(),
				};
				if ours {
					out.push(*view);
				}
			}
		}
		out
	}

	/// Pushes foreign windows that overlap the new arrangement past its
	/// right edge.
	fn shift_overlapping(&self, registry: &mut Registry, ours: &[ViewId], placed: &[Rect]) {
		let Some(edge) = placed.iter().map(Rect::right).max() else {
			return;
		};
		let foreign: Vec<(ViewId, Rect)> = registry
			.views_in_order()
			.into_iter()
			.filter(|v| !ours.contains(v))
			.filter_map(|v| registry.view(v).map(|w| (v, w.frame())))
			.filter(|(_, frame)| placed.iter().any(|r| r.intersects(frame)))
			.collect();
		for (view, frame) in foreign {
			registry.set_view_frame(view, Rect::new(edge, frame.y, frame.w, frame.h));
		}
	}
}

/// A near-square grid over the client area.
fn best_fit_cell(client: Rect, n: usize) -> (u32, u32) {
	let n = n.max(1) as u32;
	let cols = (n as f64).sqrt().ceil() as u32;
	let rows = n.div_ceil(cols);
	((client.w / cols).max(1), (client.h / rows).max(1))
}

/// The `slot`-th cell, filling rows top-down, from the left or the right
/// edge per the flags.
fn slot_rect(client: Rect, flags: TileFlags, cell_w: u32, cell_h: u32, slot: usize) -> Rect {
	let per_row = (client.w / cell_w).max(1) as usize;
	let col = (slot % per_row) as i32;
	let row = (slot / per_row) as i32;
	let x = if flags.contains(TileFlags::RIGHT_SIDE) {
		client.right() - (col + 1) * cell_w as i32
	} else {
		client.x + col * cell_w as i32
	};
	Rect::new(x, client.y + row * cell_h as i32, cell_w, cell_h)
}
