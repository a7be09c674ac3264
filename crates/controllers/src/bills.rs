//! Employee bill list: fetch, status formatting and the page actions.

use std::sync::Arc;

use client_core::BillStore;
use shared::domain::{Bill, Session, UserType};
use tracing::{error, info};

use crate::{
    error::ControllerError,
    navigation::{Navigator, Route},
    session_guard::SessionGuard,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillRow {
    pub bill: Bill,
    pub status_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillsPage {
    Loaded(Vec<BillRow>),
    /// Store rejection message, unchanged.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDialog {
    pub url: String,
    pub file_name: Option<String>,
}

impl AttachmentDialog {
    pub fn for_bill(bill: &Bill) -> Option<Self> {
        bill.file_url.as_ref().map(|url| Self {
            url: url.clone(),
            file_name: bill.file_name.clone(),
        })
    }
}

pub struct BillsController {
    store: Arc<dyn BillStore>,
    navigator: Arc<dyn Navigator>,
    session: Session,
}

impl BillsController {
    pub fn new(store: Arc<dyn BillStore>, navigator: Arc<dyn Navigator>, session: Session) -> Self {
        Self {
            store,
            navigator,
            session,
        }
    }

    /// Opens the page for an employee session, redirecting to login otherwise.
    pub fn mount(
        guard: &SessionGuard,
        store: Arc<dyn BillStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ControllerError> {
        let session = guard.require_role(UserType::Employee)?;
        Ok(Self::new(store, navigator, session))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Lists bills in store order with French status labels. One record with
    /// an unknown status fails the whole fetch.
    pub async fn fetch_and_format(&self) -> Result<Vec<BillRow>, ControllerError> {
        let records = self.store.list().await?;
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let bill_id = record.id.clone();
            let bill = Bill::try_from(record).map_err(|err| {
                error!(bill_id = ?bill_id, "rejecting bill list: {err}");
                err
            })?;
            rows.push(BillRow {
                status_label: bill.status.label(),
                bill,
            });
        }
        info!(count = rows.len(), email = %self.session.email, "bills loaded");
        Ok(rows)
    }

    pub async fn load_page(&self) -> BillsPage {
        match self.fetch_and_format().await {
            Ok(rows) => BillsPage::Loaded(rows),
            Err(err) => {
                error!("bill list unavailable: {err}");
                BillsPage::Error(err.to_string())
            }
        }
    }

    pub fn on_view_attachment(&self, bill: &Bill) -> Option<AttachmentDialog> {
        AttachmentDialog::for_bill(bill)
    }

    pub fn on_create_new(&self) {
        self.navigator.on_navigate(Route::NewBill);
    }
}

#[cfg(test)]
#[path = "tests/bills_tests.rs"]
mod tests;
