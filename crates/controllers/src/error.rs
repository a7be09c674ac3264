use client_core::{SessionStorageError, StoreError};
use shared::{domain::UserType, error::FormatError};
use thiserror::Error;

pub const FILE_FORMAT_MESSAGE: &str = "Le fichier doit être au format jpg, jpeg ou png";

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("no valid session descriptor; sign in again")]
    NotAuthenticated,
    #[error("{actual:?} session cannot open a page reserved to {required:?}")]
    Forbidden {
        required: UserType,
        actual: UserType,
    },
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Store rejection; displays the store's message unchanged.
    #[error(transparent)]
    Transport(#[from] StoreError),
    #[error("failed to persist session: {0}")]
    SessionStorage(#[from] SessionStorageError),
    #[error("failed to encode payload: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("failed to render page: {0}")]
    Render(#[from] tera::Error),
}

/// Attachment problems reported inline on the new-bill form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", FILE_FORMAT_MESSAGE)]
    UnsupportedExtension { file_name: String },
}
