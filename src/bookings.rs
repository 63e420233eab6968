// src/bookings.rs
//
// Booking Manager: create/update/cancel plus the confirmation transition
// driven by payment verification. The no-overlap invariant is enforced by
// re-checking inside a transaction that holds the property row lock, with
// the `bookings_no_overlap` exclusion constraint as a store-level backstop.

use chrono::{NaiveDate, Utc};
use serde_json::json;
use sqlx::{PgConnection, PgPool};

use crate::error::ApiError;
use crate::models::{Booking, BookingStatus};
use crate::{audit, db};

/// Half-open interval overlap: `[a_in, a_out)` meets `[b_in, b_out)`.
/// Same-day turnover (one guest out, next one in) does not conflict.
pub fn ranges_overlap(
    a_in: NaiveDate,
    a_out: NaiveDate,
    b_in: NaiveDate,
    b_out: NaiveDate,
) -> bool {
    a_in < b_out && b_in < a_out
}

pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

fn validate_dates(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), ApiError> {
    if check_in >= check_out {
        return Err(ApiError::Validation(
            "check_in must be before check_out".to_string(),
        ));
    }
    if check_in < Utc::now().date_naive() {
        return Err(ApiError::Validation(
            "check_in must not be in the past".to_string(),
        ));
    }
    Ok(())
}

async fn has_conflict(
    conn: &mut PgConnection,
    property_id: i32,
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude_booking_id: Option<i32>,
) -> Result<bool, sqlx::Error> {
    let ranges = db::active_booking_ranges(&mut *conn, property_id, exclude_booking_id).await?;
    Ok(ranges
        .iter()
        .any(|&(b_in, b_out)| ranges_overlap(check_in, check_out, b_in, b_out)))
}

pub async fn create_booking(
    pool: &PgPool,
    tenant_id: i32,
    property_id: i32,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<Booking, ApiError> {
    validate_dates(check_in, check_out)?;

    let mut tx = pool.begin().await?;

    let property = db::lock_property(&mut *tx, property_id)
        .await?
        .ok_or(ApiError::PropertyNotFound)?;

    if has_conflict(&mut tx, property.id, check_in, check_out, None).await? {
        return Err(ApiError::BookingConflict);
    }

    let booking = sqlx::query_as::<_, Booking>(
        r#"INSERT INTO bookings (tenant_id, property_id, check_in, check_out, status)
           VALUES ($1, $2, $3, $4, 'PENDING')
           RETURNING id, tenant_id, property_id, check_in, check_out, status, created_at, updated_at"#,
    )
    .bind(tenant_id)
    .bind(property.id)
    .bind(check_in)
    .bind(check_out)
    .fetch_one(&mut *tx)
    .await?;

    audit::append(
        &mut *tx,
        tenant_id,
        "BOOKING_CREATED",
        json!({
            "property_id": property.id,
            "check_in": check_in,
            "check_out": check_out,
        }),
        Some(booking.id),
        None,
    )
    .await?;

    tx.commit().await?;
    Ok(booking)
}

pub async fn update_booking(
    pool: &PgPool,
    tenant_id: i32,
    booking_id: i32,
    new_check_in: Option<NaiveDate>,
    new_check_out: Option<NaiveDate>,
) -> Result<Booking, ApiError> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Booking>(
        r#"SELECT id, tenant_id, property_id, check_in, check_out, status, created_at, updated_at
           FROM bookings
           WHERE id = $1 AND tenant_id = $2
           FOR UPDATE"#,
    )
    .bind(booking_id)
    .bind(tenant_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::BookingNotFound)?;

    if BookingStatus::parse(&current.status) != Some(BookingStatus::Pending) {
        return Err(ApiError::InvalidState("only a pending booking can be rescheduled"));
    }

    let check_in = new_check_in.unwrap_or(current.check_in);
    let check_out = new_check_out.unwrap_or(current.check_out);
    validate_dates(check_in, check_out)?;

    if check_in != current.check_in || check_out != current.check_out {
        // Serialize against concurrent creates on the same property.
        db::lock_property(&mut *tx, current.property_id)
            .await?
            .ok_or(ApiError::PropertyNotFound)?;

        if has_conflict(&mut tx, current.property_id, check_in, check_out, Some(current.id)).await? {
            return Err(ApiError::BookingConflict);
        }
    }

    let booking = sqlx::query_as::<_, Booking>(
        r#"UPDATE bookings
           SET check_in = $1, check_out = $2, updated_at = NOW()
           WHERE id = $3
           RETURNING id, tenant_id, property_id, check_in, check_out, status, created_at, updated_at"#,
    )
    .bind(check_in)
    .bind(check_out)
    .bind(current.id)
    .fetch_one(&mut *tx)
    .await?;

    audit::append(
        &mut *tx,
        tenant_id,
        "BOOKING_UPDATED",
        json!({
            "old_check_in": current.check_in,
            "old_check_out": current.check_out,
            "check_in": check_in,
            "check_out": check_out,
        }),
        Some(booking.id),
        None,
    )
    .await?;

    tx.commit().await?;
    Ok(booking)
}

/// Cancels a booking. The actor must be the tenant who made it or the owner
/// of the property it reserves.
pub async fn cancel_booking(
    pool: &PgPool,
    actor_id: i32,
    booking_id: i32,
) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;

    let row: Option<(String, i32, i32)> = sqlx::query_as(
        r#"SELECT b.status, b.tenant_id, p.owner_id
           FROM bookings b
           JOIN properties p ON p.id = b.property_id
           WHERE b.id = $1
           FOR UPDATE OF b"#,
    )
    .bind(booking_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (old_status, tenant_id, owner_id) = row.ok_or(ApiError::BookingNotFound)?;
    if actor_id != tenant_id && actor_id != owner_id {
        return Err(ApiError::BookingNotFound);
    }

    let allowed = matches!(
        BookingStatus::parse(&old_status),
        Some(s) if s.is_active()
    );
    if !allowed {
        return Err(ApiError::InvalidState(
            "only a pending or confirmed booking can be cancelled",
        ));
    }

    sqlx::query(
        r#"UPDATE bookings SET status = 'CANCELLED', updated_at = NOW() WHERE id = $1"#,
    )
    .bind(booking_id)
    .execute(&mut *tx)
    .await?;

    audit::append(
        &mut *tx,
        actor_id,
        "BOOKING_STATUS_CHANGED",
        json!({
            "old_status": old_status,
            "new_status": BookingStatus::Cancelled.as_str(),
        }),
        Some(booking_id),
        None,
    )
    .await?;

    tx.commit().await?;
    Ok(())
}

/// PENDING → CONFIRMED, invoked only from the payment verification
/// transaction. The conditional update makes a stale transition fail loudly
/// and roll back the whole verification.
pub(crate) async fn transition_to_confirmed(
    conn: &mut PgConnection,
    booking_id: i32,
) -> Result<Booking, ApiError> {
    sqlx::query_as::<_, Booking>(
        r#"UPDATE bookings
           SET status = 'CONFIRMED', updated_at = NOW()
           WHERE id = $1 AND status = 'PENDING'
           RETURNING id, tenant_id, property_id, check_in, check_out, status, created_at, updated_at"#,
    )
    .bind(booking_id)
    .fetch_optional(conn)
    .await?
    .ok_or(ApiError::InvalidState("booking is no longer pending"))
}

pub async fn list_for_tenant(pool: &PgPool, tenant_id: i32) -> Result<Vec<Booking>, ApiError> {
    let bookings = sqlx::query_as::<_, Booking>(
        r#"SELECT id, tenant_id, property_id, check_in, check_out, status, created_at, updated_at
           FROM bookings
           WHERE tenant_id = $1
           ORDER BY created_at DESC"#,
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;
    Ok(bookings)
}
