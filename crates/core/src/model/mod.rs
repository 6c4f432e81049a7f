//! Stored records and request bodies.

pub mod informatieobject;
pub mod relation;
pub mod verzending;

pub use informatieobject::{
    InformatieObjectInput, InformatieObjectRecord, InformatieObjectVersion, Status,
    Vertrouwelijkheidaanduiding,
};
pub use relation::{ObjectInformatieObject, ObjectType, RelationFilter, RelationInput};
pub use verzending::{CorrespondenceAddress, Verzending, VerzendingInput};
