//! New-bill form: attachment validation and upload, then bill submission.

use std::sync::Arc;

use chrono::NaiveDate;
use client_core::{BillStore, FileUploader, UploadRequest};
use shared::{
    domain::{Bill, BillStatus, Session, UserType},
    protocol::{RawBillRecord, UpdateRequest, UploadedFile},
};
use tracing::{error, info, warn};

use crate::{
    error::{ControllerError, ValidationError},
    format::parse_leading_int,
    navigation::{Navigator, Route},
    session_guard::SessionGuard,
};

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Name as the file input reports it; may carry a path.
    pub name: String,
    /// Declared type. Never used for validation.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftState {
    NoFile,
    Uploading { file_name: String },
    Uploaded(UploadedFile),
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChangeOutcome {
    /// Empty file list.
    Ignored,
    Rejected(ValidationError),
    Uploaded(UploadedFile),
    UploadFailed(String),
}

/// Raw form values, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBillForm {
    pub expense_type: String,
    pub name: String,
    pub date: String,
    pub amount: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Amount,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(RawBillRecord),
    Incomplete(Vec<RequiredField>),
    Failed(String),
}

/// Last path segment of a file input value (`C:\fakepath\x.png` -> `x.png`).
pub fn file_name_from_path(raw: &str) -> &str {
    raw.rsplit(['\\', '/']).next().unwrap_or(raw)
}

pub fn validate_attachment_name(raw: &str) -> Result<&str, ValidationError> {
    let file_name = file_name_from_path(raw);
    let allowed = file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false);
    if allowed {
        Ok(file_name)
    } else {
        Err(ValidationError::UnsupportedExtension {
            file_name: file_name.to_string(),
        })
    }
}

pub struct NewBillController {
    store: Arc<dyn BillStore>,
    uploader: Arc<dyn FileUploader>,
    navigator: Arc<dyn Navigator>,
    session: Session,
    draft: DraftState,
    file_error: String,
}

impl NewBillController {
    pub fn new(
        store: Arc<dyn BillStore>,
        uploader: Arc<dyn FileUploader>,
        navigator: Arc<dyn Navigator>,
        session: Session,
    ) -> Self {
        Self {
            store,
            uploader,
            navigator,
            session,
            draft: DraftState::NoFile,
            file_error: String::new(),
        }
    }

    pub fn mount(
        guard: &SessionGuard,
        store: Arc<dyn BillStore>,
        uploader: Arc<dyn FileUploader>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ControllerError> {
        let session = guard.require_role(UserType::Employee)?;
        Ok(Self::new(store, uploader, navigator, session))
    }

    pub fn draft(&self) -> &DraftState {
        &self.draft
    }

    /// Inline attachment error; empty when there is none.
    pub fn file_error(&self) -> &str {
        &self.file_error
    }

    /// Validates the first selected file by extension and uploads it under
    /// `bills/{email}/{file name}`.
    pub async fn handle_file_change(
        &mut self,
        files: impl IntoIterator<Item = SelectedFile>,
    ) -> FileChangeOutcome {
        let Some(file) = files.into_iter().next() else {
            return FileChangeOutcome::Ignored;
        };

        let file_name = match validate_attachment_name(&file.name) {
            Ok(file_name) => file_name.to_string(),
            Err(err) => {
                self.file_error = err.to_string();
                self.draft = DraftState::NoFile;
                return FileChangeOutcome::Rejected(err);
            }
        };

        self.file_error.clear();
        self.draft = DraftState::Uploading {
            file_name: file_name.clone(),
        };
        let request = UploadRequest {
            path: format!("bills/{}/{}", self.session.email, file_name),
            file_name,
            content_type: file.content_type,
            bytes: file.bytes,
        };

        match self.uploader.upload(request).await {
            Ok(uploaded) => {
                info!(file_url = %uploaded.file_url, "attachment uploaded");
                self.draft = DraftState::Uploaded(uploaded.clone());
                FileChangeOutcome::Uploaded(uploaded)
            }
            Err(err) => {
                error!("attachment upload failed: {err}");
                self.draft = DraftState::NoFile;
                FileChangeOutcome::UploadFailed(err.to_string())
            }
        }
    }

    /// Builds a pending bill from the form and writes it through an update
    /// with a null selector. Navigates to the bill list only once the write
    /// succeeds; an incomplete form or a failed write keeps the form open.
    pub async fn handle_submit(&mut self, form: &NewBillForm) -> SubmitOutcome {
        let bill = match self.build_bill(form) {
            Ok(bill) => bill,
            Err(missing) => {
                warn!(missing = ?missing, "new bill submitted without required fields");
                return SubmitOutcome::Incomplete(missing);
            }
        };

        let request = match UpdateRequest::for_bill(&bill, None) {
            Ok(request) => request,
            Err(err) => {
                error!("failed to encode new bill: {err}");
                return SubmitOutcome::Failed(err.to_string());
            }
        };

        let previous = std::mem::replace(&mut self.draft, DraftState::Submitted);
        match self.store.update(request).await {
            Ok(record) => {
                info!(bill_id = ?record.id, "new bill stored");
                self.navigator.on_navigate(Route::Bills);
                SubmitOutcome::Submitted(record)
            }
            Err(err) => {
                error!("new bill write failed: {err}");
                self.draft = previous;
                SubmitOutcome::Failed(err.to_string())
            }
        }
    }

    fn build_bill(&self, form: &NewBillForm) -> Result<Bill, Vec<RequiredField>> {
        let amount = parse_leading_int(&form.amount).and_then(|v| u64::try_from(v).ok());
        let date = form.date.trim();
        let date_ok = NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok();

        let mut missing = Vec::new();
        if amount.is_none() {
            missing.push(RequiredField::Amount);
        }
        if !date_ok {
            missing.push(RequiredField::Date);
        }
        let Some(amount) = amount.filter(|_| missing.is_empty()) else {
            return Err(missing);
        };

        let pct = parse_leading_int(&form.pct)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(Bill::DEFAULT_PCT);
        let (file_url, file_name) = match &self.draft {
            DraftState::Uploaded(uploaded) => (
                Some(uploaded.file_url.clone()),
                Some(uploaded.file_name.clone()),
            ),
            _ => (None, None),
        };

        Ok(Bill {
            id: None,
            employee_email: self.session.email.clone(),
            expense_type: form.expense_type.clone(),
            name: form.name.clone(),
            amount,
            date: date.to_string(),
            vat: form.vat.clone(),
            pct,
            commentary: form.commentary.clone(),
            file_url,
            file_name,
            status: BillStatus::Pending,
            comment_admin: None,
        })
    }
}

#[cfg(test)]
#[path = "tests/new_bill_tests.rs"]
mod tests;
