// src/audit.rs
//
// Append-only ledger of state-changing actions. Entries are never updated
// or deleted; replay order is (created_at, id) so writes made inside one
// transaction keep their original order even on equal timestamps.

use sqlx::{PgExecutor, PgPool};

use crate::models::AuditLogEntry;

pub async fn append<'e>(
    exec: impl PgExecutor<'e>,
    actor_id: i32,
    action: &str,
    details: serde_json::Value,
    booking_id: Option<i32>,
    payment_id: Option<i32>,
) -> Result<AuditLogEntry, sqlx::Error> {
    sqlx::query_as::<_, AuditLogEntry>(
        r#"INSERT INTO audit_log (actor_id, action, details, booking_id, payment_id)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING id, actor_id, action, details, booking_id, payment_id, created_at"#,
    )
    .bind(actor_id)
    .bind(action)
    .bind(details)
    .bind(booking_id)
    .bind(payment_id)
    .fetch_one(exec)
    .await
}

pub async fn by_booking(pool: &PgPool, booking_id: i32) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
    sqlx::query_as::<_, AuditLogEntry>(
        r#"SELECT id, actor_id, action, details, booking_id, payment_id, created_at
           FROM audit_log
           WHERE booking_id = $1
           ORDER BY created_at ASC, id ASC"#,
    )
    .bind(booking_id)
    .fetch_all(pool)
    .await
}

pub async fn by_payment(pool: &PgPool, payment_id: i32) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
    sqlx::query_as::<_, AuditLogEntry>(
        r#"SELECT id, actor_id, action, details, booking_id, payment_id, created_at
           FROM audit_log
           WHERE payment_id = $1
           ORDER BY created_at ASC, id ASC"#,
    )
    .bind(payment_id)
    .fetch_all(pool)
    .await
}

/// Recent-activity view, newest first.
pub async fn by_actor(
    pool: &PgPool,
    actor_id: i32,
    limit: i64,
) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
    sqlx::query_as::<_, AuditLogEntry>(
        r#"SELECT id, actor_id, action, details, booking_id, payment_id, created_at
           FROM audit_log
           WHERE actor_id = $1
           ORDER BY created_at DESC, id DESC
           LIMIT $2"#,
    )
    .bind(actor_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
