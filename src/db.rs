// src/db.rs
//
// Shared data-access helpers. Everything takes an explicit executor so the
// same query runs against the pool or inside a transaction; nothing in the
// crate holds a global store handle.

use chrono::NaiveDate;
use sqlx::PgExecutor;

use crate::models::{Booking, Invoice, Payment, Property};

pub async fn get_property<'e>(
    exec: impl PgExecutor<'e>,
    property_id: i32,
) -> Result<Option<Property>, sqlx::Error> {
    sqlx::query_as::<_, Property>(
        r#"SELECT id, owner_id, name, nightly_rate_minor, currency, capacity, is_active
           FROM properties
           WHERE id = $1 AND is_active = true"#,
    )
    .bind(property_id)
    .fetch_optional(exec)
    .await
}

/// Locks the property row for the duration of the surrounding transaction.
/// All booking writes for one property serialize on this lock, which makes
/// the overlap check plus insert atomic with respect to concurrent callers.
pub async fn lock_property<'e>(
    exec: impl PgExecutor<'e>,
    property_id: i32,
) -> Result<Option<Property>, sqlx::Error> {
    sqlx::query_as::<_, Property>(
        r#"SELECT id, owner_id, name, nightly_rate_minor, currency, capacity, is_active
           FROM properties
           WHERE id = $1 AND is_active = true
           FOR UPDATE"#,
    )
    .bind(property_id)
    .fetch_optional(exec)
    .await
}

/// Owner lookup that ignores `is_active`: audit access outlives delisting.
pub async fn property_owner<'e>(
    exec: impl PgExecutor<'e>,
    property_id: i32,
) -> Result<Option<i32>, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as(
        r#"SELECT owner_id FROM properties WHERE id = $1"#,
    )
    .bind(property_id)
    .fetch_optional(exec)
    .await?;
    Ok(row.map(|(owner_id,)| owner_id))
}

pub async fn get_booking<'e>(
    exec: impl PgExecutor<'e>,
    booking_id: i32,
) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>(
        r#"SELECT id, tenant_id, property_id, check_in, check_out, status, created_at, updated_at
           FROM bookings
           WHERE id = $1"#,
    )
    .bind(booking_id)
    .fetch_optional(exec)
    .await
}

/// Date ranges of bookings that currently hold the property's calendar.
pub async fn active_booking_ranges<'e>(
    exec: impl PgExecutor<'e>,
    property_id: i32,
    exclude_booking_id: Option<i32>,
) -> Result<Vec<(NaiveDate, NaiveDate)>, sqlx::Error> {
    let rows: Vec<(NaiveDate, NaiveDate)> = sqlx::query_as(
        r#"SELECT check_in, check_out
           FROM bookings
           WHERE property_id = $1
             AND status IN ('PENDING', 'CONFIRMED')
             AND ($2::int IS NULL OR id <> $2)"#,
    )
    .bind(property_id)
    .bind(exclude_booking_id)
    .fetch_all(exec)
    .await?;
    Ok(rows)
}

pub async fn live_payment_exists<'e>(
    exec: impl PgExecutor<'e>,
    booking_id: i32,
) -> Result<bool, sqlx::Error> {
    let exists: (bool,) = sqlx::query_as(
        r#"SELECT EXISTS (
               SELECT 1 FROM payments
               WHERE booking_id = $1 AND status <> 'REJECTED'
           )"#,
    )
    .bind(booking_id)
    .fetch_one(exec)
    .await?;
    Ok(exists.0)
}

pub async fn get_payment<'e>(
    exec: impl PgExecutor<'e>,
    payment_id: i32,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        r#"SELECT id, booking_id, payer_id, payee_id, amount_minor, currency,
                  proof_reference, status, verified_by, verified_at, rejection_reason,
                  created_at, updated_at
           FROM payments
           WHERE id = $1"#,
    )
    .bind(payment_id)
    .fetch_optional(exec)
    .await
}

pub async fn get_payment_for_payee<'e>(
    exec: impl PgExecutor<'e>,
    payment_id: i32,
    payee_id: i32,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        r#"SELECT id, booking_id, payer_id, payee_id, amount_minor, currency,
                  proof_reference, status, verified_by, verified_at, rejection_reason,
                  created_at, updated_at
           FROM payments
           WHERE id = $1 AND payee_id = $2"#,
    )
    .bind(payment_id)
    .bind(payee_id)
    .fetch_optional(exec)
    .await
}

pub async fn get_invoice_by_payment<'e>(
    exec: impl PgExecutor<'e>,
    payment_id: i32,
) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as::<_, Invoice>(
        r#"SELECT id, invoice_number, payment_id, booking_id, payer_id, payee_id,
                  amount_minor, currency, line_items, status, created_at
           FROM invoices
           WHERE payment_id = $1"#,
    )
    .bind(payment_id)
    .fetch_optional(exec)
    .await
}
