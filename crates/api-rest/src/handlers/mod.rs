//! Request handlers, one module per resource.

pub mod health;
pub mod informatieobjecten;
pub mod relations;
pub mod verzendingen;
