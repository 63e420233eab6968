// src/api/bookings.rs

use actix_web::{get, patch, post, web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::{audit, bookings, db, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub property_id: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingRequest {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, body = crate::models::Booking),
        (status = 400, description = "VALIDATION_ERROR"),
        (status = 404, description = "PROPERTY_NOT_FOUND"),
        (status = 409, description = "BOOKING_CONFLICT"),
    ),
    tag = "bookings"
)]
#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    payload: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, ApiError> {
    let booking = bookings::create_booking(
        &state.pool,
        *user_id,
        payload.property_id,
        payload.check_in,
        payload.check_out,
    )
    .await?;
    Ok(HttpResponse::Ok().json(booking))
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    responses((status = 200, body = [crate::models::Booking])),
    tag = "bookings"
)]
#[get("/bookings")]
pub async fn list_bookings(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
) -> Result<HttpResponse, ApiError> {
    let bookings = bookings::list_for_tenant(&state.pool, *user_id).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

#[utoipa::path(
    patch,
    path = "/api/bookings/{id}",
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, body = crate::models::Booking),
        (status = 404, description = "BOOKING_NOT_FOUND"),
        (status = 409, description = "BOOKING_CONFLICT or INVALID_STATE"),
    ),
    tag = "bookings"
)]
#[patch("/bookings/{id}")]
pub async fn update_booking(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
    payload: web::Json<UpdateBookingRequest>,
) -> Result<HttpResponse, ApiError> {
    let booking = bookings::update_booking(
        &state.pool,
        *user_id,
        path.into_inner(),
        payload.check_in,
        payload.check_out,
    )
    .await?;
    Ok(HttpResponse::Ok().json(booking))
}

#[utoipa::path(
    post,
    path = "/api/bookings/{id}/cancel",
    responses(
        (status = 204),
        (status = 404, description = "BOOKING_NOT_FOUND"),
        (status = 409, description = "INVALID_STATE"),
    ),
    tag = "bookings"
)]
#[post("/bookings/{id}/cancel")]
pub async fn cancel_booking(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    bookings::cancel_booking(&state.pool, *user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}/audit",
    responses(
        (status = 200, body = [crate::models::AuditLogEntry]),
        (status = 403, description = "FORBIDDEN"),
        (status = 404, description = "BOOKING_NOT_FOUND"),
    ),
    tag = "audit"
)]
#[get("/bookings/{id}/audit")]
pub async fn booking_audit(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let booking_id = path.into_inner();
    let booking = db::get_booking(&state.pool, booking_id)
        .await?
        .ok_or(ApiError::BookingNotFound)?;

    // Participants only: the tenant or the property owner.
    let owner_id = db::property_owner(&state.pool, booking.property_id).await?;
    if *user_id != booking.tenant_id && Some(*user_id) != owner_id {
        return Err(ApiError::Forbidden);
    }

    let entries = audit::by_booking(&state.pool, booking_id).await?;
    Ok(HttpResponse::Ok().json(entries))
}
