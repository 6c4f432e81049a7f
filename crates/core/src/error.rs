use crate::validation::{FieldError, ValidationErrors};

#[derive(Debug, thiserror::Error)]
pub enum DrcError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to remove record: {0}")]
    FileRemove(std::io::Error),
    #[error(
        "create failed and cleanup also failed (path: {path}): create={create_error}; cleanup={cleanup_error}",
        path = path.display()
    )]
    CleanupAfterCreateFailed {
        path: std::path::PathBuf,
        #[source]
        create_error: Box<DrcError>,
        cleanup_error: std::io::Error,
    },
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("content storage error: {0}")]
    Files(#[from] drc_files::FilesError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl From<ValidationErrors> for DrcError {
    fn from(errors: ValidationErrors) -> Self {
        DrcError::Validation(errors)
    }
}

impl From<FieldError> for DrcError {
    fn from(error: FieldError) -> Self {
        DrcError::Validation(error.into())
    }
}

impl DrcError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        DrcError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type DrcResult<T> = std::result::Result<T, DrcError>;
