// src/api/payments.rs

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::payments::{self, VerifyDecision};
use crate::{audit, db, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    pub booking_id: i32,
    /// Optional override in minor units; normally the amount is
    /// nights × nightly rate of the booked property.
    pub amount_minor: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    /// Opaque payer-supplied reference (bank UTR, screenshot id, ...).
    pub proof_reference: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    pub decision: VerifyDecision,
    pub note: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 200, body = crate::payments::CreatedPayment),
        (status = 404, description = "BOOKING_NOT_FOUND"),
        (status = 409, description = "PAYMENT_EXISTS"),
    ),
    tag = "payments"
)]
#[post("/payments")]
pub async fn create_payment(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    payload: web::Json<CreatePaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    let created = payments::create_payment(
        &state.pool,
        *user_id,
        payload.booking_id,
        payload.amount_minor,
    )
    .await?;
    Ok(HttpResponse::Ok().json(created))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/confirm",
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, body = crate::models::Payment),
        (status = 404, description = "PAYMENT_NOT_FOUND"),
    ),
    tag = "payments"
)]
#[post("/payments/{id}/confirm")]
pub async fn confirm_payment(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
    payload: web::Json<ConfirmPaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    let payment = payments::confirm_payment(
        &state.pool,
        *user_id,
        path.into_inner(),
        payload.proof_reference.clone(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(payment))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, body = crate::payments::VerificationOutcome),
        (status = 404, description = "PAYMENT_NOT_FOUND"),
        (status = 409, description = "INVALID_STATE"),
    ),
    tag = "payments"
)]
#[post("/payments/{id}/verify")]
pub async fn verify_payment(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
    payload: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let outcome = payments::verify_payment(
        &state.pool,
        *user_id,
        path.into_inner(),
        payload.decision,
        payload.note,
    )
    .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[utoipa::path(
    get,
    path = "/api/payments/pending",
    responses((status = 200, body = [crate::models::Payment])),
    tag = "payments"
)]
#[get("/payments/pending")]
pub async fn list_pending(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
) -> Result<HttpResponse, ApiError> {
    let payments = payments::list_pending_for_owner(&state.pool, *user_id).await?;
    Ok(HttpResponse::Ok().json(payments))
}

#[utoipa::path(
    get,
    path = "/api/payments/{id}/audit",
    responses(
        (status = 200, body = [crate::models::AuditLogEntry]),
        (status = 403, description = "FORBIDDEN"),
        (status = 404, description = "PAYMENT_NOT_FOUND"),
    ),
    tag = "audit"
)]
#[get("/payments/{id}/audit")]
pub async fn payment_audit(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let payment_id = path.into_inner();
    let payment = db::get_payment(&state.pool, payment_id)
        .await?
        .ok_or(ApiError::PaymentNotFound)?;

    if *user_id != payment.payer_id && *user_id != payment.payee_id {
        return Err(ApiError::Forbidden);
    }

    let entries = audit::by_payment(&state.pool, payment_id).await?;
    Ok(HttpResponse::Ok().json(entries))
}
