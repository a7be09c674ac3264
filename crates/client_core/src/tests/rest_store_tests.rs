use std::sync::Arc;

use super::*;
use crate::fixture_bills;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use shared::{
    domain::{Bill, BillId, BillStatus},
    error::ErrorCode,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct BillApiState {
    list_failure: Arc<Mutex<Option<StatusCode>>>,
    api_error: Arc<Mutex<Option<String>>>,
    patches: Arc<Mutex<Vec<(Option<String>, String)>>>,
    uploads: Arc<Mutex<Vec<(String, Option<String>, usize)>>>,
}

#[derive(Deserialize)]
struct UploadQuery {
    path: String,
}

async fn list_bills(State(state): State<BillApiState>) -> Response {
    if let Some(message) = state.api_error.lock().await.clone() {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiError::new(ErrorCode::Forbidden, message)),
        )
            .into_response();
    }
    if let Some(status) = *state.list_failure.lock().await {
        return status.into_response();
    }
    Json(fixture_bills()).into_response()
}

async fn create_bill(Json(_payload): Json<RawBillRecord>) -> Json<CreateResponse> {
    Json(CreateResponse {
        id: BillId::from("created-1"),
    })
}

fn echo_record(selector: Option<String>, body: &str) -> Json<RawBillRecord> {
    let mut record: RawBillRecord = serde_json::from_str(body).expect("bill payload");
    record.id = Some(BillId(selector.unwrap_or_else(|| "generated".to_string())));
    Json(record)
}

async fn update_keyed_bill(
    State(state): State<BillApiState>,
    Path(id): Path<String>,
    body: String,
) -> Json<RawBillRecord> {
    state.patches.lock().await.push((Some(id.clone()), body.clone()));
    echo_record(Some(id), &body)
}

async fn update_unkeyed_bill(State(state): State<BillApiState>, body: String) -> Json<RawBillRecord> {
    state.patches.lock().await.push((None, body.clone()));
    echo_record(None, &body)
}

async fn upload_file(
    State(state): State<BillApiState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Json<UploadedFile> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state
        .uploads
        .lock()
        .await
        .push((query.path.clone(), content_type, body.len()));
    let file_name = query.path.rsplit('/').next().unwrap_or_default().to_string();
    Json(UploadedFile {
        file_url: format!("https://test.storage.tld/{}", query.path),
        file_name,
    })
}

async fn spawn_bill_api() -> std::io::Result<(String, BillApiState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = BillApiState::default();
    let app = Router::new()
        .route("/bills", get(list_bills).post(create_bill).patch(update_unkeyed_bill))
        .route("/bills/upload", post(upload_file))
        .route("/bills/:id", patch(update_keyed_bill))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn store_for(server_url: &str) -> RestStore {
    RestStore::new(server_url, Duration::from_secs(5)).expect("rest store")
}

#[test]
fn base_url_always_ends_with_slash() {
    let store = store_for("http://localhost:5678/api");
    assert_eq!(store.base_url().as_str(), "http://localhost:5678/api/");
    assert_eq!(
        store.endpoint("bills").expect("endpoint").as_str(),
        "http://localhost:5678/api/bills"
    );
}

#[test]
fn keyed_endpoint_escapes_selector() {
    let store = store_for("http://localhost:5678");
    assert_eq!(
        store.bill_endpoint("a b").expect("endpoint").as_str(),
        "http://localhost:5678/bills/a%20b"
    );
}

#[test]
fn rejects_unparsable_api_url() {
    let err = RestStore::new("not a url", Duration::from_secs(1))
        .err()
        .expect("must fail");
    assert!(err.to_string().contains("invalid bill api url"));
}

#[tokio::test]
async fn list_returns_records_in_server_order() {
    let (server_url, _state) = spawn_bill_api().await.expect("spawn server");
    let records = store_for(&server_url).list().await.expect("list");
    let statuses: Vec<_> = records.iter().map(|r| r.status.as_str()).collect();
    assert_eq!(statuses, ["pending", "refused", "accepted", "refused"]);
}

#[tokio::test]
async fn failing_status_becomes_erreur_message() {
    let (server_url, state) = spawn_bill_api().await.expect("spawn server");
    *state.list_failure.lock().await = Some(StatusCode::NOT_FOUND);
    let err = store_for(&server_url).list().await.expect_err("must fail");
    assert_eq!(err.to_string(), "Erreur 404");

    *state.list_failure.lock().await = Some(StatusCode::INTERNAL_SERVER_ERROR);
    let err = store_for(&server_url).list().await.expect_err("must fail");
    assert_eq!(err.to_string(), "Erreur 500");
}

#[tokio::test]
async fn api_error_body_message_is_kept_verbatim() {
    let (server_url, state) = spawn_bill_api().await.expect("spawn server");
    *state.api_error.lock().await = Some("accès refusé".to_string());
    let err = store_for(&server_url).list().await.expect_err("must fail");
    assert_eq!(err.to_string(), "accès refusé");
}

#[tokio::test]
async fn create_returns_assigned_id() {
    let (server_url, _state) = spawn_bill_api().await.expect("spawn server");
    let created = store_for(&server_url)
        .create(&fixture_bills()[0])
        .await
        .expect("create");
    assert_eq!(created.id, BillId::from("created-1"));
}

#[tokio::test]
async fn keyed_update_patches_bill_resource() {
    let (server_url, state) = spawn_bill_api().await.expect("spawn server");
    let bill = Bill::try_from(fixture_bills()[0].clone()).expect("bill");
    let decided = bill.with_decision(BillStatus::Accepted, Some("validé".to_string()));
    let request =
        UpdateRequest::for_bill(&decided, decided.id.clone()).expect("update request");

    let record = store_for(&server_url).update(request).await.expect("update");
    assert_eq!(record.status, "accepted");
    assert_eq!(record.id, Some(BillId::from("47qAXb6fIm2zOKkLzMro")));

    let patches = state.patches.lock().await;
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].0.as_deref(), Some("47qAXb6fIm2zOKkLzMro"));
    let sent: Bill = serde_json::from_str(&patches[0].1).expect("sent bill");
    assert_eq!(sent.comment_admin.as_deref(), Some("validé"));
}

#[tokio::test]
async fn null_selector_update_patches_collection() {
    let (server_url, state) = spawn_bill_api().await.expect("spawn server");
    let mut bill = Bill::try_from(fixture_bills()[1].clone()).expect("bill");
    bill.id = None;
    let request = UpdateRequest::for_bill(&bill, None).expect("update request");

    store_for(&server_url).update(request).await.expect("update");
    let patches = state.patches.lock().await;
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].0, None);
}

#[tokio::test]
async fn upload_guesses_content_type_from_file_name() {
    let (server_url, state) = spawn_bill_api().await.expect("spawn server");
    let uploaded = store_for(&server_url)
        .upload(UploadRequest {
            path: "bills/a@a/facture.png".to_string(),
            file_name: "facture.png".to_string(),
            content_type: None,
            bytes: vec![0x89, b'P', b'N', b'G'],
        })
        .await
        .expect("upload");

    assert_eq!(uploaded.file_name, "facture.png");
    assert_eq!(
        uploaded.file_url,
        "https://test.storage.tld/bills/a@a/facture.png"
    );
    let uploads = state.uploads.lock().await;
    assert_eq!(
        uploads[0],
        (
            "bills/a@a/facture.png".to_string(),
            Some("image/png".to_string()),
            4
        )
    );
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = store_for(&format!("http://{addr}"))
        .list()
        .await
        .expect_err("must fail");
    assert!(matches!(err, StoreError::Transport(_)));
}
