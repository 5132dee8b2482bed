//! API Integration Tests

use axum::http::StatusCode;
use chrono::{Days, Utc};
use serde_json::json;

use common::{send, setup_test_app, ADMIN_KEY, READ_ONLY_KEY};

mod common;

fn yesterday() -> String {
    (Utc::now().date_naive() - Days::new(1)).to_string()
}

fn payment(reference: &str, student: &str, amount: &str) -> serde_json::Value {
    json!({
        "student_number": student,
        "payment_reference": reference,
        "amount_paid": amount,
        "payment_date": yesterday(),
    })
}

#[tokio::test]
async fn test_payment_lifecycle() {
    let app = setup_test_app().await;

    // 1. Accept a payment
    let (status, body) = send(&app, "POST", "/payments", Some(ADMIN_KEY), Some(payment("REF001", "S12345", "5000.00"))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["student_exists"], true);
    assert_eq!(body["student_is_active"], true);
    assert_eq!(body["processed_payment"]["payment_reference"], "REF001");

    // 2. Resubmit it
    let (status, body) = send(&app, "POST", "/payments", Some(ADMIN_KEY), Some(payment("REF001", "S12345", "5000.00"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("already exists"));
    assert_eq!(app.payments.len(), 1);

    // 3. Unknown student
    let (status, body) = send(&app, "POST", "/payments", Some(ADMIN_KEY), Some(payment("REF999", "UNKNOWN1", "100.00"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["student_exists"], false);

    // 4. Summary
    let (status, body) = send(&app, "GET", "/students/S12345/payments/summary", Some(READ_ONLY_KEY), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["total_amount"], "5000.00");
    assert_eq!(body["last_payment_date"], yesterday());

    // 5. Listing
    let (status, body) = send(&app, "GET", "/students/S12345/payments", Some(READ_ONLY_KEY), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    assert_eq!(app.events.events().len(), 3);
}

#[tokio::test]
async fn test_validate_endpoint() {
    let app = setup_test_app().await;

    let (status, body) = send(&app, "POST", "/payments/validate", Some(READ_ONLY_KEY), Some(payment("123", "S12345", "10.00"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_valid"], false);
    assert!(body["errors"][0].as_str().unwrap().contains("Payment reference"));
    assert!(app.payments.is_empty());
}

#[tokio::test]
async fn test_batch_endpoint() {
    let app = setup_test_app().await;

    let request = json!({
        "payments": [
            payment("REF001", "S12345", "10.00"),
            payment("REF002", "UNKNOWN1", "10.00"),
            payment("REF003", "S99999", "10.00"),
        ]
    });
    let (status, body) = send(&app, "POST", "/payments/batch", Some(ADMIN_KEY), Some(request)).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["total_processed"], 3);
    assert_eq!(body["successful"], 2);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["results"][2]["warnings"][0], "Student is inactive");
    assert_eq!(body["failures"][0]["payment"]["payment_reference"], "REF002");
}

#[tokio::test]
async fn test_reconciliation_endpoint() {
    let app = setup_test_app().await;
    let date = yesterday();

    send(&app, "POST", "/payments", Some(ADMIN_KEY), Some(payment("REF001", "S12345", "100.00"))).await;
    send(&app, "POST", "/payments", Some(ADMIN_KEY), Some(payment("REF002", "S12345", "200.00"))).await;

    let request = json!({
        "bank_records": [
            {
                "payment_reference": "REF001",
                "amount": "90.00",
                "payment_date": date,
                "student_number": "S12345",
                "bank_transaction_id": "TX-1",
                "status": "COMPLETED"
            },
            {
                "payment_reference": "REF404",
                "amount": "10.00",
                "payment_date": date,
                "student_number": "S12345",
                "bank_transaction_id": "TX-2",
                "status": "COMPLETED"
            }
        ]
    });
    let (status, body) = send(&app, "POST", "/reconciliation", Some(ADMIN_KEY), Some(request)).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["total_bank_records"], 2);
    assert_eq!(body["matched_count"], 1);
    assert_eq!(body["unmatched_bank_records"][0]["payment_reference"], "REF404");
    assert_eq!(body["missing_payments"][0]["payment_reference"], "REF002");
    assert!(body["discrepancies"][0].as_str().unwrap().starts_with("Amount mismatch for REF001"));
}

#[tokio::test]
async fn test_student_admin() {
    let app = setup_test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/students",
        Some(ADMIN_KEY),
        Some(json!({"student_number": "S55555", "full_name": "Grace Hopper", "program": "Computing"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["is_active"], true);

    let (status, _) = send(
        &app,
        "POST",
        "/students",
        Some(ADMIN_KEY),
        Some(json!({"student_number": "S55555", "full_name": "Grace Hopper", "program": "Computing"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "PATCH", "/students/S55555", Some(ADMIN_KEY), Some(json!({"is_active": false}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (status, body) = send(&app, "GET", "/students/NOBODY", Some(READ_ONLY_KEY), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "student_not_found");
}

#[tokio::test]
async fn test_authentication_and_permissions() {
    let app = setup_test_app().await;

    let (status, body) = send(&app, "POST", "/payments", None, Some(payment("REF001", "S12345", "1.00"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "missing_api_key");

    let (status, body) = send(&app, "POST", "/payments", Some("wrong"), Some(payment("REF001", "S12345", "1.00"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "invalid_api_key");

    let (status, body) = send(&app, "POST", "/payments", Some(READ_ONLY_KEY), Some(payment("REF001", "S12345", "1.00"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "forbidden");
    assert!(app.payments.is_empty());
}

#[tokio::test]
async fn test_date_range_listing() {
    let app = setup_test_app().await;
    send(&app, "POST", "/payments", Some(ADMIN_KEY), Some(payment("REF001", "S12345", "1.00"))).await;

    let uri = format!("/payments?from={}&to={}", yesterday(), yesterday());
    let (status, body) = send(&app, "GET", &uri, Some(READ_ONLY_KEY), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (status, _) = send(&app, "GET", "/payments?from=2026-02-01&to=2026-01-01", Some(READ_ONLY_KEY), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_with_malformed_item() {
    let app = setup_test_app().await;

    let request = json!({
        "payments": [
            payment("REF001", "S12345", "10.00"),
            payment("REF002", "S12345", "abc"),
            {"payment_reference": "REF003", "amount_paid": 5, "payment_date": yesterday()},
        ]
    });
    let (status, body) = send(&app, "POST", "/payments/batch", Some(ADMIN_KEY), Some(request)).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["total_processed"], 3);
    assert_eq!(body["successful"], 1);
    assert_eq!(body["failed"], 2);
    assert_eq!(body["results"][1]["errors"][0], "Amount paid is not a number: abc");
    assert_eq!(body["results"][2]["errors"][0], "Student number is required");
    assert_eq!(body["failures"][0]["payment"]["amount_paid"], "abc");
    assert_eq!(app.payments.len(), 1);
}

#[tokio::test]
async fn test_validate_reports_missing_fields() {
    let app = setup_test_app().await;

    let (status, body) = send(&app, "POST", "/payments/validate", Some(READ_ONLY_KEY), Some(json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_valid"], false);
    assert_eq!(
        body["errors"],
        json!([
            "Student number is required",
            "Payment reference is required",
            "Amount paid is required",
            "Payment date is required",
        ])
    );
}

#[tokio::test]
async fn test_malformed_body_uses_error_format() {
    let app = setup_test_app().await;

    let (status, body) = send(&app, "POST", "/payments/batch", Some(ADMIN_KEY), Some(json!({"payments": "none"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_request");
    assert!(body["details"].is_string());
}
