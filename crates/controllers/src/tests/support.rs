//! Fixtures shared by the controller tests.

use std::sync::Arc;

use client_core::{fixture_bills, MemorySessionStorage, MemoryStore, SessionStorage};
use shared::{
    domain::{Bill, BillId},
    protocol::RawBillRecord,
};

use crate::{
    navigation::RecordingNavigator,
    session_guard::{SessionGuard, SESSION_KEY},
};

pub(crate) const EMPLOYEE_DESCRIPTOR: &str = r#"{"type":"Employee","email":"a@a"}"#;
pub(crate) const ADMIN_DESCRIPTOR: &str = r#"{"type":"Admin","email":"admin@company.tld"}"#;

pub(crate) fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_records(fixture_bills()))
}

pub(crate) fn typed_fixture_bills() -> Vec<Bill> {
    fixture_bills()
        .into_iter()
        .map(|raw| Bill::try_from(raw).expect("fixture bill"))
        .collect()
}

pub(crate) fn record(id: &str, email: &str, status: &str) -> RawBillRecord {
    let mut record = fixture_bills()[0].clone();
    record.id = Some(BillId::from(id));
    record.email = email.to_string();
    record.status = status.to_string();
    record
}

pub(crate) struct GuardFixture {
    pub guard: SessionGuard,
    pub storage: Arc<MemorySessionStorage>,
    pub navigator: Arc<RecordingNavigator>,
}

pub(crate) fn guard_with(descriptor: Option<&str>) -> GuardFixture {
    let storage = Arc::new(MemorySessionStorage::new());
    if let Some(descriptor) = descriptor {
        storage
            .set_item(SESSION_KEY, descriptor)
            .expect("seed session");
    }
    let navigator = Arc::new(RecordingNavigator::new());
    GuardFixture {
        guard: SessionGuard::new(storage.clone(), navigator.clone()),
        storage,
        navigator,
    }
}
