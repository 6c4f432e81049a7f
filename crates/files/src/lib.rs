//! DRC File Storage
//!
//! Binary document content (the decoded `inhoud` of an informatieobject) is kept apart from the
//! YAML metadata records. Each document family directory owns a content-addressed `files/`
//! folder:
//!
//! ```text
//! documenten/
//! └── <s1>/<s2>/<family uuid>/
//!     ├── informatieobject.yaml
//!     └── files/
//!         └── sha256/
//!             └── ab/
//!                 └── cd/
//!                     └── abcd3f9e…
//! ```
//!
//! - Files are immutable once added; storing identical bytes again returns the existing entry,
//!   so versions that keep their content share a single file.
//! - Metadata records reference files by hash only.
//!
//! ## Example Usage
//!
//! ```no_run
//! use drc_files::FilesService;
//! use drc_uuid::ShardableUuid;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = Path::new("drc_data/documenten");
//! let family = ShardableUuid::parse("550e8400e29b41d4a716446655440000")?;
//!
//! let service = FilesService::new(root, family)?;
//! let stored = service.add_bytes(b"some file content", Some("dummy.txt"))?;
//! assert_eq!(service.read(stored.hash.as_str())?, b"some file content");
//! # Ok(())
//! # }
//! ```

mod constants;
mod files;

pub use constants::{FILES_FOLDER_NAME, HASH_ALGORITHM};
pub use drc_uuid::{Sha256Hash, ShardableUuid};
pub use files::{FileMetadata, FilesService};

/// Errors that can occur during file operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Root directory does not exist or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Record directory does not exist
    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    /// Hash is malformed or does not name a stored file
    #[error("File not found: {0}")]
    NotFound(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UUID or hash error from drc-uuid crate
    #[error("UUID error: {0}")]
    Uuid(#[from] drc_uuid::UuidError),
}
