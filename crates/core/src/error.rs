use crate::upload::UploadRejection;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Upload(#[from] UploadRejection),

    #[error("Validation failed: {0}")]
    Validation(String),
}
