//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, FromRequest, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{BankPaymentData, NewStudent, OperationContext, PaymentNotification, PaymentRecord, Student};
use crate::error::{AppError, AppResult};
use crate::handlers::{BatchProcessingResult, PaymentSummary, ProcessingResult};
use crate::reconciliation::ReconciliationResult;
use crate::state::AppState;
use crate::validation::ValidationOutcome;

use super::middleware::AuthenticatedApiKey;

pub const PERM_PAYMENTS_READ: &str = "payments:read";
pub const PERM_PAYMENTS_WRITE: &str = "payments:write";
pub const PERM_RECONCILIATION: &str = "reconciliation";
pub const PERM_STUDENTS_READ: &str = "students:read";
pub const PERM_STUDENTS_WRITE: &str = "students:write";

// =========================================================================
// Request/Response types
// =========================================================================

/// JSON body whose rejections use the API error format
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchRequest {
    pub payments: Vec<PaymentRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReconciliationRequest {
    pub bank_records: Vec<BankPaymentData>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStudentRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentListResponse {
    pub payments: Vec<PaymentNotification>,
    pub total: usize,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Payments
        .route("/payments", post(process_payment).get(list_payments))
        .route("/payments/validate", post(validate_payment))
        .route("/payments/batch", post(process_batch))
        // Reconciliation
        .route("/reconciliation", post(reconcile))
        // Students
        .route("/students", post(create_student))
        .route("/students/:student_number", get(get_student).patch(update_student))
        .route("/students/:student_number/payments", get(get_student_payments))
        .route("/students/:student_number/payments/summary", get(get_payment_summary))
}

fn require(api_key: &AuthenticatedApiKey, permission: &str) -> AppResult<()> {
    if api_key.has_permission(permission) {
        Ok(())
    } else {
        tracing::warn!(api_key = %api_key.name, permission, "Permission denied");
        Err(AppError::Forbidden(format!("{} permission required", permission)))
    }
}

// =========================================================================
// POST /payments/validate
// =========================================================================

/// Run the validation rules without storing anything
async fn validate_payment(
    State(state): State<AppState>,
    Extension(api_key): Extension<AuthenticatedApiKey>,
    ApiJson(record): ApiJson<PaymentRecord>,
) -> AppResult<Json<ValidationOutcome>> {
    require(&api_key, PERM_PAYMENTS_READ)?;

    Ok(Json(state.payment_processor().validate_payment(&record)))
}

// =========================================================================
// POST /payments
// =========================================================================

/// Process one payment notification
async fn process_payment(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Extension(api_key): Extension<AuthenticatedApiKey>,
    ApiJson(record): ApiJson<PaymentRecord>,
) -> AppResult<(StatusCode, Json<ProcessingResult>)> {
    require(&api_key, PERM_PAYMENTS_WRITE)?;

    let result = state
        .payment_processor()
        .process_payment(&record, &context)
        .await?;

    let status = match (result.success, result.error_code.as_deref()) {
        (true, _) => StatusCode::CREATED,
        (false, Some("duplicate_reference")) => StatusCode::CONFLICT,
        (false, _) => StatusCode::UNPROCESSABLE_ENTITY,
    };

    Ok((status, Json(result)))
}

// =========================================================================
// POST /payments/batch
// =========================================================================

/// Process a list of payment notifications
async fn process_batch(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Extension(api_key): Extension<AuthenticatedApiKey>,
    ApiJson(request): ApiJson<BatchRequest>,
) -> AppResult<Json<BatchProcessingResult>> {
    require(&api_key, PERM_PAYMENTS_WRITE)?;

    if request.payments.len() > state.max_batch_size {
        return Err(AppError::BatchTooLarge {
            size: request.payments.len(),
            max: state.max_batch_size,
        });
    }

    let result = state
        .batch_processor()
        .process_batch(request.payments, &context)
        .await;

    Ok(Json(result))
}

// =========================================================================
// GET /payments?from=&to=
// =========================================================================

/// List payments by payment date range (inclusive)
async fn list_payments(
    State(state): State<AppState>,
    Extension(api_key): Extension<AuthenticatedApiKey>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<PaymentListResponse>> {
    require(&api_key, PERM_PAYMENTS_READ)?;

    if query.from > query.to {
        return Err(AppError::InvalidRequest(format!(
            "from ({}) is after to ({})",
            query.from, query.to
        )));
    }

    let payments = state.payments.find_by_date_range(query.from, query.to).await?;

    Ok(Json(PaymentListResponse {
        total: payments.len(),
        payments,
    }))
}

// =========================================================================
// POST /reconciliation
// =========================================================================

/// Reconcile a bank statement against stored payments
async fn reconcile(
    State(state): State<AppState>,
    Extension(api_key): Extension<AuthenticatedApiKey>,
    ApiJson(request): ApiJson<ReconciliationRequest>,
) -> AppResult<Json<ReconciliationResult>> {
    require(&api_key, PERM_RECONCILIATION)?;

    let result = state
        .reconciliation_engine()
        .reconcile(&request.bank_records)
        .await?;

    Ok(Json(result))
}

// =========================================================================
// Students
// =========================================================================

/// Register a student
async fn create_student(
    State(state): State<AppState>,
    Extension(api_key): Extension<AuthenticatedApiKey>,
    ApiJson(request): ApiJson<NewStudent>,
) -> AppResult<(StatusCode, Json<Student>)> {
    require(&api_key, PERM_STUDENTS_WRITE)?;

    if request.student_number.trim().is_empty() || request.full_name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "student_number and full_name are required".to_string(),
        ));
    }

    let student = request.into_student();
    state.students.insert(&student).await?;

    tracing::info!(student_number = %student.student_number, "Student registered");

    Ok((StatusCode::CREATED, Json(student)))
}

/// Get student by student number
async fn get_student(
    State(state): State<AppState>,
    Extension(api_key): Extension<AuthenticatedApiKey>,
    Path(student_number): Path<String>,
) -> AppResult<Json<Student>> {
    require(&api_key, PERM_STUDENTS_READ)?;

    let student = state
        .students
        .find_by_number(&student_number)
        .await?
        .ok_or_else(|| AppError::StudentNotFound(student_number.clone()))?;

    Ok(Json(student))
}

/// Activate or deactivate a student
async fn update_student(
    State(state): State<AppState>,
    Extension(api_key): Extension<AuthenticatedApiKey>,
    Path(student_number): Path<String>,
    ApiJson(request): ApiJson<UpdateStudentRequest>,
) -> AppResult<Json<Student>> {
    require(&api_key, PERM_STUDENTS_WRITE)?;

    let student = state
        .students
        .set_active(&student_number, request.is_active)
        .await?
        .ok_or_else(|| AppError::StudentNotFound(student_number.clone()))?;

    tracing::info!(
        student_number = %student.student_number,
        is_active = student.is_active,
        "Student status changed"
    );

    Ok(Json(student))
}

/// List a student's payments, most recent first
async fn get_student_payments(
    State(state): State<AppState>,
    Extension(api_key): Extension<AuthenticatedApiKey>,
    Path(student_number): Path<String>,
) -> AppResult<Json<PaymentListResponse>> {
    require(&api_key, PERM_PAYMENTS_READ)?;
    ensure_student_exists(&state, &student_number).await?;

    let payments = state.payments.find_by_student(&student_number).await?;

    Ok(Json(PaymentListResponse {
        total: payments.len(),
        payments,
    }))
}

/// Payment totals for a student
async fn get_payment_summary(
    State(state): State<AppState>,
    Extension(api_key): Extension<AuthenticatedApiKey>,
    Path(student_number): Path<String>,
) -> AppResult<Json<PaymentSummary>> {
    require(&api_key, PERM_PAYMENTS_READ)?;
    ensure_student_exists(&state, &student_number).await?;

    let summary = state
        .summary_service()
        .get_payment_summary(&student_number)
        .await?;

    Ok(Json(summary))
}

async fn ensure_student_exists(state: &AppState, student_number: &str) -> AppResult<()> {
    match state.students.find_by_number(student_number).await? {
        Some(_) => Ok(()),
        None => Err(AppError::StudentNotFound(student_number.to_string())),
    }
}
