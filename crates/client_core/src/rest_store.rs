use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use shared::{
    error::ApiError,
    protocol::{CreateResponse, RawBillRecord, UpdateRequest, UploadedFile},
};
use tracing::debug;
use url::Url;

use crate::{BillStore, FileUploader, StoreError, UploadRequest};

/// HTTP adapter for the bill API.
#[derive(Clone)]
pub struct RestStore {
    http: Client,
    base_url: Url,
}

impl RestStore {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_client(http, api_url)
    }

    pub fn with_client(http: Client, api_url: &str) -> Result<Self, StoreError> {
        let mut raw = api_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw)
            .map_err(|e| StoreError::transport(format!("invalid bill api url '{api_url}': {e}")))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path)
            .map_err(|e| StoreError::transport(format!("invalid bill api path '{path}': {e}")))
    }

    fn bill_endpoint(&self, selector: &str) -> Result<Url, StoreError> {
        let mut url = self.endpoint("bills")?;
        url.path_segments_mut()
            .map_err(|_| StoreError::transport("bill api url cannot carry a path"))?
            .push(selector);
        Ok(url)
    }
}

/// Maps a failing status to the store's `Erreur {status}` message, preferring
/// the server's own message when it sends an [`ApiError`] body.
async fn error_for_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => {
            debug!(status = status.as_u16(), code = ?api_error.code, "bill api rejected the call");
            api_error.message
        }
        Err(_) => format!("Erreur {}", status.as_u16()),
    };
    Err(StoreError::Transport(message))
}

#[async_trait]
impl BillStore for RestStore {
    async fn list(&self) -> Result<Vec<RawBillRecord>, StoreError> {
        let url = self.endpoint("bills")?;
        debug!(%url, "listing bills");
        let response = self.http.get(url).send().await?;
        let records = error_for_status(response).await?.json().await?;
        Ok(records)
    }

    async fn create(&self, payload: &RawBillRecord) -> Result<CreateResponse, StoreError> {
        let url = self.endpoint("bills")?;
        let response = self.http.post(url).json(payload).send().await?;
        let created = error_for_status(response).await?.json().await?;
        Ok(created)
    }

    async fn update(&self, request: UpdateRequest) -> Result<RawBillRecord, StoreError> {
        let url = match &request.selector {
            Some(selector) => self.bill_endpoint(selector.as_str())?,
            None => self.endpoint("bills")?,
        };
        debug!(%url, selector = ?request.selector, "updating bill");
        let response = self
            .http
            .patch(url)
            .header(CONTENT_TYPE, "application/json")
            .body(request.data)
            .send()
            .await?;
        let record = error_for_status(response).await?.json().await?;
        Ok(record)
    }
}

#[async_trait]
impl FileUploader for RestStore {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedFile, StoreError> {
        let url = self.endpoint("bills/upload")?;
        let content_type = request.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&request.file_name)
                .first_or_octet_stream()
                .to_string()
        });
        let response = self
            .http
            .post(url)
            .query(&[("path", request.path.as_str())])
            .header(CONTENT_TYPE, content_type)
            .body(request.bytes)
            .send()
            .await?;
        let uploaded = error_for_status(response).await?.json().await?;
        Ok(uploaded)
    }
}

#[cfg(test)]
#[path = "tests/rest_store_tests.rs"]
mod tests;
