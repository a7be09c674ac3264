//! Collaborator seams for the bill controllers: the bill store, the attachment
//! uploader and the persisted session storage, plus the adapters that back them.

use async_trait::async_trait;
use shared::{
    domain::BillId,
    protocol::{CreateResponse, RawBillRecord, UpdateRequest, UploadedFile},
};
use thiserror::Error;

pub mod memory_store;
pub mod rest_store;
pub mod session_storage;

pub use memory_store::{fixture_bills, MemoryStore};
pub use rest_store::RestStore;
pub use session_storage::{
    FileSessionStorage, MemorySessionStorage, SessionStorage, SessionStorageError,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Rejection from the store; the message is shown to users as is.
    #[error("{0}")]
    Transport(String),
    #[error("bill {0} not found")]
    NotFound(BillId),
    #[error("invalid bill payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

#[async_trait]
pub trait BillStore: Send + Sync {
    async fn list(&self) -> Result<Vec<RawBillRecord>, StoreError>;
    async fn create(&self, payload: &RawBillRecord) -> Result<CreateResponse, StoreError>;
    /// Full-record overwrite keyed by `selector`.
    async fn update(&self, request: UpdateRequest) -> Result<RawBillRecord, StoreError>;
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Identity-scoped destination, e.g. `bills/{email}/{file_name}`.
    pub path: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedFile, StoreError>;
}

pub struct MissingFileUploader;

#[async_trait]
impl FileUploader for MissingFileUploader {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedFile, StoreError> {
        Err(StoreError::transport(format!(
            "attachment upload unavailable for {}",
            request.path
        )))
    }
}
