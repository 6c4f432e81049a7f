//! # DRC Core
//!
//! Core business logic of the document registration component.
//!
//! This crate contains the domain model, validation and file-backed persistence:
//! - Documents (enkelvoudige informatieobjecten) with versions, content and check-out locks
//! - Verzendingen with exactly one correspondence address
//! - Relations between documents and remote zaken/besluiten, synchronised in the background
//! - A YAML record store under `DRC_DATA_DIR`
//!
//! **No API concerns**: authentication, HTTP servers and wire DTOs belong in `api-rest` or
//! `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod services;
pub mod store;
pub mod sync;
pub mod validation;
pub mod validators;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{fetch_timeout_from_env_value, flag_from_env_value, CoreConfig};
pub use error::{DrcError, DrcResult};
pub use services::{
    Download, InformatieObjectService, RelationService, StoredDocument, VerzendingService,
};
pub use store::Store;
pub use validation::{Field, FieldError, ValidationErrors, WriteMode};

pub use drc_uuid::ShardableUuid;
