// src/payments.rs
//
// Payment Lifecycle Manager. Drives AWAITING_PAYMENT →
// AWAITING_OWNER_VERIFICATION → {VERIFIED, REJECTED}. The transition out of
// AWAITING_OWNER_VERIFICATION is a conditional update: of two concurrent
// verifiers exactly one wins, the other observes the settled result.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::{Booking, Invoice, PayableDescriptor, Payment, PaymentStatus};
use crate::{audit, bookings, db, invoices};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerifyDecision {
    Verify,
    Reject,
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct VerificationOutcome {
    pub payment_id: i32,
    pub status: String,
    pub invoice: Option<Invoice>,
    pub booking: Option<Booking>,
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct CreatedPayment {
    pub payment: Payment,
    pub payable: PayableDescriptor,
}

pub async fn create_payment(
    pool: &PgPool,
    tenant_id: i32,
    booking_id: i32,
    amount_override: Option<i64>,
) -> Result<CreatedPayment, ApiError> {
    if let Some(amount) = amount_override {
        if amount <= 0 {
            return Err(ApiError::Validation(
                "amount must be a positive integer in minor units".to_string(),
            ));
        }
    }

    let mut tx = pool.begin().await?;

    // Booking must exist, belong to the caller and still be PENDING. The row
    // lock keeps the live-payment check and the insert atomic.
    let row: Option<(i32, NaiveDate, NaiveDate, i32, String, i64, String, Option<String>, Option<String>)> =
        sqlx::query_as(
            r#"SELECT b.id, b.check_in, b.check_out,
                      p.owner_id, p.name, p.nightly_rate_minor, p.currency,
                      o.username, o.payout_handle
               FROM bookings b
               JOIN properties p ON p.id = b.property_id
               JOIN users o ON o.id = p.owner_id
               WHERE b.id = $1 AND b.tenant_id = $2 AND b.status = 'PENDING'
               FOR UPDATE OF b"#,
        )
        .bind(booking_id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?;

    let (booking_id, check_in, check_out, owner_id, property_name, nightly_rate_minor, currency, owner_name, payout_handle) =
        row.ok_or(ApiError::BookingNotFound)?;

    if db::live_payment_exists(&mut *tx, booking_id).await? {
        return Err(ApiError::PaymentExists);
    }

    // Fixed at creation, never recomputed. Integer minor units throughout.
    let amount_minor = match amount_override {
        Some(amount) => amount,
        None => bookings::nights(check_in, check_out) * nightly_rate_minor,
    };

    let payment = sqlx::query_as::<_, Payment>(
        r#"INSERT INTO payments (booking_id, payer_id, payee_id, amount_minor, currency, status)
           VALUES ($1, $2, $3, $4, $5, 'AWAITING_PAYMENT')
           RETURNING id, booking_id, payer_id, payee_id, amount_minor, currency,
                     proof_reference, status, verified_by, verified_at, rejection_reason,
                     created_at, updated_at"#,
    )
    .bind(booking_id)
    .bind(tenant_id)
    .bind(owner_id)
    .bind(amount_minor)
    .bind(&currency)
    .fetch_one(&mut *tx)
    .await?;

    audit::append(
        &mut *tx,
        tenant_id,
        "PAYMENT_CREATED",
        json!({
            "amount_minor": amount_minor,
            "currency": currency,
            "override": amount_override.is_some(),
        }),
        Some(booking_id),
        Some(payment.id),
    )
    .await?;

    tx.commit().await?;

    let payable = PayableDescriptor {
        payee_id: owner_id,
        // Explicit payment-routing field; the owner's login email is never
        // reused for routing.
        payee_handle: payout_handle,
        payee_name: owner_name.unwrap_or(property_name),
        amount_minor,
        currency: payment.currency.clone(),
        reference: booking_id.to_string(),
    };

    Ok(CreatedPayment { payment, payable })
}

pub async fn confirm_payment(
    pool: &PgPool,
    tenant_id: i32,
    payment_id: i32,
    proof_reference: Option<String>,
) -> Result<Payment, ApiError> {
    let mut tx = pool.begin().await?;

    let payment = sqlx::query_as::<_, Payment>(
        r#"UPDATE payments
           SET status = 'AWAITING_OWNER_VERIFICATION', proof_reference = $1, updated_at = NOW()
           WHERE id = $2 AND payer_id = $3 AND status = 'AWAITING_PAYMENT'
           RETURNING id, booking_id, payer_id, payee_id, amount_minor, currency,
                     proof_reference, status, verified_by, verified_at, rejection_reason,
                     created_at, updated_at"#,
    )
    .bind(&proof_reference)
    .bind(payment_id)
    .bind(tenant_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::PaymentNotFound)?;

    audit::append(
        &mut *tx,
        tenant_id,
        "PAYMENT_CONFIRMED",
        json!({ "proof_reference": proof_reference }),
        Some(payment.booking_id),
        Some(payment.id),
    )
    .await?;

    tx.commit().await?;
    Ok(payment)
}

pub async fn verify_payment(
    pool: &PgPool,
    owner_id: i32,
    payment_id: i32,
    decision: VerifyDecision,
    note: Option<String>,
) -> Result<VerificationOutcome, ApiError> {
    // Read-only precheck. An already-settled payment returns its existing
    // result with no side effects, so repeating the call is always safe.
    let payment = db::get_payment_for_payee(pool, payment_id, owner_id)
        .await?
        .ok_or(ApiError::PaymentNotFound)?;

    match PaymentStatus::parse(&payment.status) {
        Some(PaymentStatus::Verified) | Some(PaymentStatus::Rejected) => {
            return settled_outcome(pool, &payment).await;
        }
        Some(PaymentStatus::AwaitingOwnerVerification) => {}
        _ => {
            return Err(ApiError::InvalidState(
                "payment is not awaiting owner verification",
            ));
        }
    }

    let mut tx = pool.begin().await?;

    let target = match decision {
        VerifyDecision::Verify => PaymentStatus::Verified,
        VerifyDecision::Reject => PaymentStatus::Rejected,
    };

    // Compare-and-swap: only one caller can move the payment out of
    // AWAITING_OWNER_VERIFICATION.
    let updated = sqlx::query_as::<_, Payment>(
        r#"UPDATE payments
           SET status = $1, verified_by = $2, verified_at = NOW(),
               rejection_reason = $3, updated_at = NOW()
           WHERE id = $4 AND status = 'AWAITING_OWNER_VERIFICATION'
           RETURNING id, booking_id, payer_id, payee_id, amount_minor, currency,
                     proof_reference, status, verified_by, verified_at, rejection_reason,
                     created_at, updated_at"#,
    )
    .bind(target.as_str())
    .bind(owner_id)
    .bind(if target == PaymentStatus::Rejected { note.as_deref() } else { None })
    .bind(payment_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(updated) = updated else {
        // A concurrent verifier won the race. Drop the transaction and hand
        // back whatever that verifier settled on.
        drop(tx);
        let settled = db::get_payment_for_payee(pool, payment_id, owner_id)
            .await?
            .ok_or(ApiError::PaymentNotFound)?;
        return settled_outcome(pool, &settled).await;
    };

    let outcome = match target {
        PaymentStatus::Verified => {
            let booking = bookings::transition_to_confirmed(&mut tx, updated.booking_id).await?;

            let (property_name,): (String,) = sqlx::query_as(
                r#"SELECT name FROM properties WHERE id = $1"#,
            )
            .bind(booking.property_id)
            .fetch_one(&mut *tx)
            .await?;

            let invoice = invoices::issue(&mut tx, &updated, &booking, &property_name).await?;

            audit::append(
                &mut *tx,
                owner_id,
                "PAYMENT_VERIFIED",
                json!({ "amount_minor": updated.amount_minor }),
                Some(booking.id),
                Some(updated.id),
            )
            .await?;
            audit::append(
                &mut *tx,
                owner_id,
                "INVOICE_GENERATED",
                json!({ "invoice_number": invoice.invoice_number }),
                Some(booking.id),
                Some(updated.id),
            )
            .await?;
            audit::append(
                &mut *tx,
                owner_id,
                "BOOKING_STATUS_CHANGED",
                json!({ "old_status": "PENDING", "new_status": "CONFIRMED" }),
                Some(booking.id),
                Some(updated.id),
            )
            .await?;

            VerificationOutcome {
                payment_id: updated.id,
                status: updated.status.clone(),
                invoice: Some(invoice),
                booking: Some(booking),
            }
        }
        _ => {
            audit::append(
                &mut *tx,
                owner_id,
                "PAYMENT_REJECTED",
                json!({ "reason": note }),
                Some(updated.booking_id),
                Some(updated.id),
            )
            .await?;

            VerificationOutcome {
                payment_id: updated.id,
                status: updated.status.clone(),
                invoice: None,
                booking: None,
            }
        }
    };

    // Any failure above (including the invoice insert) has already bailed out
    // with `?`, rolling back the status change together with everything else.
    tx.commit().await?;
    Ok(outcome)
}

async fn settled_outcome(pool: &PgPool, payment: &Payment) -> Result<VerificationOutcome, ApiError> {
    let invoice = if PaymentStatus::parse(&payment.status) == Some(PaymentStatus::Verified) {
        db::get_invoice_by_payment(pool, payment.id).await?
    } else {
        None
    };
    let booking = match &invoice {
        Some(_) => db::get_booking(pool, payment.booking_id).await?,
        None => None,
    };
    Ok(VerificationOutcome {
        payment_id: payment.id,
        status: payment.status.clone(),
        invoice,
        booking,
    })
}

/// FIFO review queue for an owner: oldest declared payment first.
pub async fn list_pending_for_owner(
    pool: &PgPool,
    owner_id: i32,
) -> Result<Vec<Payment>, ApiError> {
    let payments = sqlx::query_as::<_, Payment>(
        r#"SELECT id, booking_id, payer_id, payee_id, amount_minor, currency,
                  proof_reference, status, verified_by, verified_at, rejection_reason,
                  created_at, updated_at
           FROM payments
           WHERE payee_id = $1 AND status = 'AWAITING_OWNER_VERIFICATION'
           ORDER BY created_at ASC, id ASC"#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    Ok(payments)
}
