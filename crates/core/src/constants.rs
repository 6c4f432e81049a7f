//! Constants used throughout the DRC core crate.
//!
//! Path, filename and URL segment constants live here so storage layout and resource URLs stay
//! consistent across the codebase.

/// Default directory for DRC data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "drc_data";

/// Directory name for document families (metadata and content).
pub const DOCUMENTEN_DIR_NAME: &str = "documenten";

/// Directory name for Verzending records.
pub const VERZENDINGEN_DIR_NAME: &str = "verzendingen";

/// Directory name for ObjectInformatieObject relations.
pub const RELATIONS_DIR_NAME: &str = "objectinformatieobjecten";

/// Directory records are moved into while a multi-record removal is in progress.
pub const REMOVAL_DIR_NAME: &str = ".removing";

/// Filename of a document family record.
pub const INFORMATIEOBJECT_YAML_FILENAME: &str = "informatieobject.yaml";

/// Filename of a Verzending record.
pub const VERZENDING_YAML_FILENAME: &str = "verzending.yaml";

/// Filename of a relation record.
pub const RELATION_YAML_FILENAME: &str = "objectinformatieobject.yaml";

/// Path prefix of the versioned API.
pub const API_PREFIX: &str = "/api/v1";

/// Collection segment for documents.
pub const INFORMATIEOBJECT_COLLECTION: &str = "enkelvoudiginformatieobjecten";

/// Collection segment for Verzendingen.
pub const VERZENDING_COLLECTION: &str = "verzendingen";

/// Collection segment for relations.
pub const RELATION_COLLECTION: &str = "objectinformatieobjecten";

/// Name used for validation errors that are not tied to a single field.
pub const NON_FIELD_ERRORS: &str = "nonFieldErrors";

/// Prefix of generated document identifications.
pub const IDENTIFICATIE_PREFIX: &str = "DOCUMENT";

/// Default timeout for fetching remote resources.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Relation events that may wait for the sync worker before new ones are dropped.
pub const DEFAULT_SYNC_QUEUE_CAPACITY: usize = 1024;
