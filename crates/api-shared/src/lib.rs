//! # API Shared
//!
//! Shared definitions for the DRC API surface.
//!
//! Contains:
//! - Scopes and the API-key client registry (`auth`)
//! - The health service
//! - Problem-details error bodies with `invalidParams`
//!
//! Used by `drc-core` (scope checks inside guards) and `drc-api-rest`.

pub mod auth;
pub mod health;
pub mod problem;

pub use auth::{AuthError, ClientRegistry, Scope, ScopeSet, API_KEY_HEADER};
pub use health::{HealthRes, HealthService};
pub use problem::{InvalidParam, Problem};
