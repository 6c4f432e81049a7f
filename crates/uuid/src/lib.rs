//! UUID, hash and sharded-path utilities.
//!
//! The DRC stores every document family, transmission record and relation under a sharded
//! directory derived from its identifier. To keep path derivation deterministic, identifiers use
//! a *canonical* representation: **32 lowercase hexadecimal characters** (no hyphens). The same
//! form is used in resource URLs.
//!
//! This crate provides:
//! - [`ShardableUuid`], a wrapper that guarantees the canonical format once constructed and
//!   derives sharded storage locations.
//! - [`Sha256Hash`], a validated lowercase hex SHA-256 digest used to address stored content.
//!
//! ## Sharded directory layout
//! For a canonical UUID `u`, records live under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! Example:
//! `drc_data/documenten/55/0e/550e8400e29b41d4a716446655440000/`

mod service;

pub use service::{Sha256Hash, ShardableUuid, Uuid};

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
