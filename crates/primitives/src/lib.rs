//! Shared vocabulary for the document-linking core: ids, kinds, events, flags.

/// View event types delivered across friendship pairings.
pub mod event;
/// Window geometry for tiling.
pub mod geometry;
/// Identifier types for documents, views, and friendship groups.
pub mod ids;
/// Document kinds and path classification by extension.
pub mod kind;
/// Sync/desync batch operations.
pub mod sync;
/// Teardown context passed through close paths.
pub mod teardown;
/// Window-tiling flag bitmask.
pub mod tile;

pub use event::ViewEvent;
pub use geometry::Rect;
pub use ids::{DocId, FriendshipId, ViewId};
pub use kind::{DocumentKind, LM_EXTENSION, ViewKind, classify_path};
pub use sync::SyncOp;
pub use teardown::TeardownContext;
pub use tile::{TileFlags, TileFlagsError};
