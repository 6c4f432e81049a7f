//! Business-rule validators.
//!
//! Each validator reports [`FieldError`](crate::validation::FieldError)s on the wire name of the
//! offending field; the services collect them into one response.

pub mod address;
pub mod content;
pub mod lock;
pub mod reference;
pub mod status;

pub use address::{resolve_correspondence, AddressInput, AddressSlots};
pub use content::decode_inhoud;
pub use lock::{check_can_lock, check_definitive, check_unlock, check_update_lock, new_lock_token};
pub use reference::{
    FetchError, Fetcher, HttpFetcher, ReferenceValidator, RequiredKeysShapeChecker, ResourceType,
    ShapeChecker,
};
pub use status::check_status_for_received;
