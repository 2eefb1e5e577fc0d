//! Teardown context threaded through close paths.

/// Context describing why a close was requested.
///
/// During application shutdown, peer objects may already be gone: close
/// paths skip peer notification and lock checks instead of consulting a
/// process-global flag, so both behaviors stay independently testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeardownContext {
	/// Whether the whole application is shutting down.
	pub app_closing: bool,
}

impl TeardownContext {
	/// A normal, user-initiated close.
	pub const NORMAL: Self = Self { app_closing: false };

	/// A close happening during application shutdown.
	pub const APP_CLOSING: Self = Self { app_closing: true };
}
