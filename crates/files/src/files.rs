//! Record-scoped file storage service implementation
//!
//! [`FilesService`] is bound to one document family directory and stores byte content under
//! `files/sha256/<h[0..2]>/<h[2..4]>/<h>` inside it.
//!
//! - The constructor validates that the root and the record directory exist
//! - Paths are derived from the hash only, so callers cannot steer writes outside the record
//! - Writes go to a temporary file first and are renamed into place

use crate::{FilesError, FILES_FOLDER_NAME, HASH_ALGORITHM};
use chrono::{DateTime, Utc};
use drc_types::NonEmptyText;
use drc_uuid::{Sha256Hash, ShardableUuid};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata for a stored file.
///
/// Serialised into the document's YAML record alongside the version that references it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FileMetadata {
    /// Hashing algorithm used (always "sha256")
    pub hash_algorithm: NonEmptyText,

    /// Hexadecimal digest of the file content
    pub hash: Sha256Hash,

    /// Path relative to the record directory where the file is stored
    pub relative_path: NonEmptyText,

    /// Size of the file in bytes
    pub size_bytes: u64,

    /// Detected media type (MIME type), best effort
    pub media_type: Option<NonEmptyText>,

    /// Filename supplied by the client, if any
    pub original_filename: Option<NonEmptyText>,

    /// UTC timestamp when the file was first stored
    pub stored_at: DateTime<Utc>,
}

/// Service for managing content files within one record directory.
#[derive(Debug)]
pub struct FilesService {
    /// Root directory containing all records of this kind
    root_directory: PathBuf,

    /// Record identifier
    repository_id: ShardableUuid,
}

impl FilesService {
    /// Creates a new `FilesService` for a specific record.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - The root directory does not exist or is not a directory
    /// - The record directory does not exist or is not a directory
    /// - Path canonicalisation fails
    pub fn new(root_directory: &Path, repository_id: ShardableUuid) -> Result<Self, FilesError> {
        if !root_directory.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Directory does not exist: {}",
                root_directory.display()
            )));
        }

        let root_directory = root_directory.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        let repository_root = repository_id.sharded_dir(&root_directory);
        if !repository_root.is_dir() {
            return Err(FilesError::RepositoryNotFound(format!(
                "Record directory does not exist: {}",
                repository_root.display()
            )));
        }

        Ok(Self {
            root_directory,
            repository_id,
        })
    }

    /// Stores `content` and returns its metadata.
    ///
    /// Identical content is stored once: if a file with the same hash already exists it is left
    /// untouched and metadata describing it is returned.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::Io` if the storage directory or file cannot be written.
    pub fn add_bytes(
        &self,
        content: &[u8],
        original_filename: Option<&str>,
    ) -> Result<FileMetadata, FilesError> {
        let hash = Sha256Hash::parse(&hex::encode(Sha256::digest(content)))?;
        let storage_path = self.compute_storage_path(hash.as_str());

        if !storage_path.exists() {
            if let Some(parent) = storage_path.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    FilesError::Io(std::io::Error::new(
                        e.kind(),
                        format!(
                            "Failed to create storage directory {}: {}",
                            parent.display(),
                            e
                        ),
                    ))
                })?;
            }

            let tmp_path = storage_path.with_extension("tmp");
            fs::write(&tmp_path, content)
                .and_then(|()| fs::rename(&tmp_path, &storage_path))
                .map_err(|e| {
                    FilesError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to write file to {}: {}", storage_path.display(), e),
                    ))
                })?;
        }

        let media_type = infer::get(content).and_then(|kind| NonEmptyText::new(kind.mime_type()).ok());

        Ok(FileMetadata {
            hash_algorithm: NonEmptyText::new(HASH_ALGORITHM)
                .map_err(|e| FilesError::InvalidRootDirectory(e.to_string()))?,
            relative_path: self.compute_relative_path(&hash)?,
            hash,
            size_bytes: content.len() as u64,
            media_type,
            original_filename: original_filename.and_then(|name| NonEmptyText::new(name).ok()),
            stored_at: Utc::now(),
        })
    }

    /// Retrieves a file by its SHA-256 hash.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - `hash` is not a valid SHA-256 hex digest
    /// - No file with that hash exists in this record
    /// - The file cannot be read (I/O)
    pub fn read(&self, hash: &str) -> Result<Vec<u8>, FilesError> {
        let hash = Sha256Hash::parse(hash)?;
        let storage_path = self.compute_storage_path(hash.as_str());

        if !storage_path.is_file() {
            return Err(FilesError::NotFound(hash.to_string()));
        }

        fs::read(&storage_path).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read file from {}: {}", storage_path.display(), e),
            ))
        })
    }

    /// Deletes the file stored under `hash`. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if `hash` is malformed or the file cannot be removed.
    pub fn remove(&self, hash: &str) -> Result<(), FilesError> {
        let hash = Sha256Hash::parse(hash)?;
        let storage_path = self.compute_storage_path(hash.as_str());

        match fs::remove_file(&storage_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to remove file {}: {}", storage_path.display(), e),
            ))),
        }
    }

    /// Computes `<record root>/files/sha256/<shard1>/<shard2>/<hash>`.
    fn compute_storage_path(&self, hash_hex: &str) -> PathBuf {
        self.files_directory()
            .join(HASH_ALGORITHM)
            .join(&hash_hex[0..2])
            .join(&hash_hex[2..4])
            .join(hash_hex)
    }

    /// Computes `files/sha256/<shard1>/<shard2>/<hash>` relative to the record root.
    fn compute_relative_path(&self, hash: &Sha256Hash) -> Result<NonEmptyText, FilesError> {
        let hex = hash.as_str();
        NonEmptyText::new(format!(
            "{}/{}/{}/{}/{}",
            FILES_FOLDER_NAME,
            HASH_ALGORITHM,
            &hex[0..2],
            &hex[2..4],
            hex
        ))
        .map_err(|e| FilesError::NotFound(e.to_string()))
    }

    #[must_use]
    fn repository_root(&self) -> PathBuf {
        self.repository_id.sharded_dir(&self.root_directory)
    }

    #[must_use]
    fn files_directory(&self) -> PathBuf {
        self.repository_root().join(FILES_FOLDER_NAME)
    }
}
