use async_trait::async_trait;
use shared::{
    domain::BillId,
    protocol::{CreateResponse, RawBillRecord, UpdateRequest, UploadedFile},
};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::{BillStore, FileUploader, StoreError, UploadRequest};

const MEMORY_STORAGE_URL: &str = "https://test.storage.tld";

/// In-process bill store for demo runs and controller tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryStoreState>,
}

#[derive(Default)]
struct MemoryStoreState {
    records: Vec<RawBillRecord>,
    list_failure: Option<String>,
    update_failure: Option<String>,
    upload_failure: Option<String>,
    list_calls: usize,
    update_requests: Vec<UpdateRequest>,
    upload_paths: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<RawBillRecord>) -> Self {
        Self {
            inner: Mutex::new(MemoryStoreState {
                records,
                ..MemoryStoreState::default()
            }),
        }
    }

    pub async fn fail_list_with(&self, message: impl Into<String>) {
        self.inner.lock().await.list_failure = Some(message.into());
    }

    pub async fn fail_updates_with(&self, message: impl Into<String>) {
        self.inner.lock().await.update_failure = Some(message.into());
    }

    pub async fn fail_uploads_with(&self, message: impl Into<String>) {
        self.inner.lock().await.upload_failure = Some(message.into());
    }

    pub async fn records(&self) -> Vec<RawBillRecord> {
        self.inner.lock().await.records.clone()
    }

    pub async fn list_calls(&self) -> usize {
        self.inner.lock().await.list_calls
    }

    /// Every update received, including rejected ones.
    pub async fn update_requests(&self) -> Vec<UpdateRequest> {
        self.inner.lock().await.update_requests.clone()
    }

    pub async fn upload_paths(&self) -> Vec<String> {
        self.inner.lock().await.upload_paths.clone()
    }
}

#[async_trait]
impl BillStore for MemoryStore {
    async fn list(&self) -> Result<Vec<RawBillRecord>, StoreError> {
        let mut guard = self.inner.lock().await;
        guard.list_calls += 1;
        if let Some(message) = &guard.list_failure {
            return Err(StoreError::Transport(message.clone()));
        }
        Ok(guard.records.clone())
    }

    async fn create(&self, payload: &RawBillRecord) -> Result<CreateResponse, StoreError> {
        let id = BillId(Uuid::new_v4().to_string());
        let mut record = payload.clone();
        record.id = Some(id.clone());
        self.inner.lock().await.records.push(record);
        debug!(bill_id = %id, "created bill in memory store");
        Ok(CreateResponse { id })
    }

    async fn update(&self, request: UpdateRequest) -> Result<RawBillRecord, StoreError> {
        let mut guard = self.inner.lock().await;
        guard.update_requests.push(request.clone());
        if let Some(message) = &guard.update_failure {
            return Err(StoreError::Transport(message.clone()));
        }

        let mut record: RawBillRecord = serde_json::from_str(&request.data)?;
        match request.selector {
            Some(selector) => {
                let slot = guard
                    .records
                    .iter_mut()
                    .find(|existing| existing.id.as_ref() == Some(&selector))
                    .ok_or_else(|| StoreError::NotFound(selector.clone()))?;
                record.id = Some(selector);
                *slot = record.clone();
            }
            None => {
                record.id = Some(BillId(Uuid::new_v4().to_string()));
                guard.records.push(record.clone());
            }
        }
        Ok(record)
    }
}

#[async_trait]
impl FileUploader for MemoryStore {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedFile, StoreError> {
        let mut guard = self.inner.lock().await;
        guard.upload_paths.push(request.path.clone());
        if let Some(message) = &guard.upload_failure {
            return Err(StoreError::Transport(message.clone()));
        }
        Ok(UploadedFile {
            file_url: format!("{MEMORY_STORAGE_URL}/{}", request.path),
            file_name: request.file_name,
        })
    }
}

/// The four bills the demo store starts with, in store order.
pub fn fixture_bills() -> Vec<RawBillRecord> {
    vec![
        fixture(
            "47qAXb6fIm2zOKkLzMro",
            "a@a",
            "Hôtel et logement",
            "encore",
            400,
            "2004-04-04",
            "80",
            "pending",
            Some("ok"),
        ),
        fixture(
            "BeKy5Mo4jkmdfPGYpTxZ",
            "a@a",
            "Transports",
            "test1",
            100,
            "2001-01-01",
            "",
            "refused",
            Some("en fait non"),
        ),
        fixture(
            "UIUZtnPQvnbFnB0ozvJh",
            "a@a",
            "Services en ligne",
            "test3",
            300,
            "2003-03-03",
            "60",
            "accepted",
            Some("bon bah d'accord"),
        ),
        fixture(
            "qcCK3SzECmaZAGRrHjaC",
            "a@a",
            "Restaurants et bars",
            "test2",
            200,
            "2002-02-02",
            "40",
            "refused",
            Some("pas la bonne facture"),
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn fixture(
    id: &str,
    email: &str,
    expense_type: &str,
    name: &str,
    amount: u64,
    date: &str,
    vat: &str,
    status: &str,
    comment_admin: Option<&str>,
) -> RawBillRecord {
    RawBillRecord {
        id: Some(BillId::from(id)),
        email: email.to_string(),
        expense_type: expense_type.to_string(),
        name: name.to_string(),
        amount,
        date: date.to_string(),
        vat: vat.to_string(),
        pct: 20,
        commentary: "séminaire billed".to_string(),
        file_url: Some(format!(
            "{MEMORY_STORAGE_URL}/v0/b/billable-677b6.appspot.com/o/{id}.jpg"
        )),
        file_name: Some("preview-facture-free-201801-pdf-1.jpg".to_string()),
        status: status.to_string(),
        comment_admin: comment_admin.map(str::to_string),
    }
}

#[cfg(test)]
#[path = "tests/memory_store_tests.rs"]
mod tests;
