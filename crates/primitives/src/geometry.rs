//! Integer window geometry used by the tiling pass.

/// An axis-aligned rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
	/// Left edge.
	pub x: i32,
	/// Top edge.
	pub y: i32,
	/// Width in pixels.
	pub w: u32,
	/// Height in pixels.
	pub h: u32,
}

impl Rect {
	/// Creates a rectangle from position and size.
	pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
		Self { x, y, w, h }
	}

	/// Exclusive right edge.
	pub fn right(&self) -> i32 {
		self.x + self.w as i32
	}

	/// Exclusive bottom edge.
	pub fn bottom(&self) -> i32 {
		self.y + self.h as i32
	}

	/// Whether `other` lies entirely within this rectangle.
	pub fn contains(&self, other: &Rect) -> bool {
		other.x >= self.x
			&& other.y >= self.y
			&& other.right() <= self.right()
			&& other.bottom() <= self.bottom()
	}

	/// Whether the two rectangles overlap with non-zero area.
	pub fn intersects(&self, other: &Rect) -> bool {
		self.x < other.right()
			&& other.x < self.right()
			&& self.y < other.bottom()
			&& other.y < self.bottom()
	}
}
