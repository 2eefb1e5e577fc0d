//! Seams to the out-of-scope collaborators: format readers and the user.
//!
//! The registry never touches file formats or dialog boxes directly; it goes
//! through [`DocumentSource`] and [`Prompter`] so the whole linking core can
//! run against scripted fakes in tests.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::meta::DocMeta;

/// Errors produced when probing a document path.
#[derive(Debug, Error)]
pub enum SourceError {
	/// The path's extension matches no known document kind.
	#[error("cannot open {}: unrecognized file kind", path.display())]
	UnknownKind {
		/// The offending path.
		path: PathBuf,
	},
	/// The file exists but could not be read or parsed.
	#[error("cannot open {}: {reason}", path.display())]
	Unreadable {
		/// The offending path.
		path: PathBuf,
		/// Reader-supplied failure description.
		reason: String,
	},
}

/// Provider of document metadata; the boundary to the format readers.
pub trait DocumentSource {
	/// Probes a path, returning its metadata without keeping it open.
	fn probe(&mut self, path: &Path) -> Result<DocMeta, SourceError>;
}

/// User-interaction seam.
///
/// Every question the linking core can ask the user goes through here.
/// A declined prompt aborts the surrounding operation with no partial
/// mutation; see the group open/add contracts.
pub trait Prompter {
	/// A path failed to resolve; asks whether to continue the batch anyway.
	fn confirm_open_failure(&mut self, path: &Path, error: &SourceError) -> bool;

	/// Asks for an arbitrary multi-selection of files (interactive group
	/// creation). `None` means the user cancelled.
	fn select_files(&mut self) -> Option<Vec<PathBuf>>;

	/// Asks for a destination path for a new link file. `None` cancels.
	fn select_save_path(&mut self, suggested: Option<&Path>) -> Option<PathBuf>;

	/// Presents a blocking message (compatibility failures, lock lists).
	fn blocking_message(&mut self, title: &str, message: &str);

	/// Asks whether a dirty document may be closed without saving.
	fn confirm_close(&mut self, title: &str) -> bool;
}
