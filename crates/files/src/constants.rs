/// Folder (inside a record directory) that holds content-addressed files.
pub const FILES_FOLDER_NAME: &str = "files";

/// Hash algorithm name recorded in [`crate::FileMetadata`].
pub const HASH_ALGORITHM: &str = "sha256";
