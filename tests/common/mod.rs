//! Common test utilities

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware, Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

use student_payments::api::{self, middleware::hash_api_key};
use student_payments::domain::NewStudent;
use student_payments::events::MemoryEventSink;
use student_payments::storage::{
    ApiKeyRecord, MemoryApiKeyStore, MemoryPaymentStore, MemoryStudentDirectory, StudentDirectory,
};
use student_payments::AppState;

pub const ADMIN_KEY: &str = "test_admin_key";
pub const READ_ONLY_KEY: &str = "test_read_only_key";

pub struct TestApp {
    pub router: Router,
    pub payments: MemoryPaymentStore,
    pub events: MemoryEventSink,
}

/// In-memory application with two API keys and two students
/// (`S12345` active, `S99999` inactive)
pub async fn setup_test_app() -> TestApp {
    let students = MemoryStudentDirectory::new();
    students
        .insert(&NewStudent::new("S12345", "Ada Lovelace", "Mathematics").into_student())
        .await
        .expect("Failed to seed active student");
    let mut inactive = NewStudent::new("S99999", "Charles Babbage", "Engineering").into_student();
    inactive.is_active = false;
    students
        .insert(&inactive)
        .await
        .expect("Failed to seed inactive student");

    let api_keys = MemoryApiKeyStore::new();
    api_keys.insert(
        hash_api_key(ADMIN_KEY),
        ApiKeyRecord {
            id: Uuid::new_v4(),
            name: "Test Admin".to_string(),
            permissions: vec!["admin".to_string()],
            is_active: true,
        },
    );
    api_keys.insert(
        hash_api_key(READ_ONLY_KEY),
        ApiKeyRecord {
            id: Uuid::new_v4(),
            name: "Test Reader".to_string(),
            permissions: vec!["payments:read".to_string(), "students:read".to_string()],
            is_active: true,
        },
    );

    let payments = MemoryPaymentStore::new();
    let events = MemoryEventSink::new();
    let state = AppState::new(
        Arc::new(students),
        Arc::new(payments.clone()),
        Arc::new(api_keys),
        Arc::new(events.clone()),
    );

    let router = api::create_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::middleware::auth_middleware,
        ))
        .with_state(state);

    TestApp {
        router,
        payments,
        events,
    }
}

/// Send a request and decode the JSON body (Null for empty bodies)
pub async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    api_key: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    let body = body.map_or_else(Body::empty, |v| Body::from(v.to_string()));

    let response = app
        .router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
