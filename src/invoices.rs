// src/invoices.rs
//
// Invoice Issuer. An invoice row is created only inside the transaction that
// flips its payment to VERIFIED, so invoice existence and the VERIFIED state
// commit or roll back together. Rendering (PDF/HTML) happens elsewhere and
// never affects that transaction.

use chrono::Utc;
use serde_json::json;
use sqlx::PgConnection;

use crate::bookings::nights;
use crate::error::ApiError;
use crate::models::{Booking, Invoice, Payment};

/// `INV-<UTC second stamp>-<payment id>`. The payment id suffix makes the
/// number unique in practice; the store's UNIQUE constraint enforces it.
pub fn invoice_number(payment_id: i32) -> String {
    format!("INV-{}-{:06}", Utc::now().format("%Y%m%d%H%M%S"), payment_id)
}

pub(crate) async fn issue(
    conn: &mut PgConnection,
    payment: &Payment,
    booking: &Booking,
    property_name: &str,
) -> Result<Invoice, ApiError> {
    let stay_nights = nights(booking.check_in, booking.check_out);
    let line_items = json!([{
        "description": format!(
            "{} — {} to {} ({} night{})",
            property_name,
            booking.check_in,
            booking.check_out,
            stay_nights,
            if stay_nights == 1 { "" } else { "s" },
        ),
        "amount_minor": payment.amount_minor,
    }]);

    let invoice = sqlx::query_as::<_, Invoice>(
        r#"INSERT INTO invoices
               (invoice_number, payment_id, booking_id, payer_id, payee_id,
                amount_minor, currency, line_items, status)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'PAID')
           RETURNING id, invoice_number, payment_id, booking_id, payer_id, payee_id,
                     amount_minor, currency, line_items, status, created_at"#,
    )
    .bind(invoice_number(payment.id))
    .bind(payment.id)
    .bind(booking.id)
    .bind(payment.payer_id)
    .bind(payment.payee_id)
    .bind(payment.amount_minor)
    .bind(&payment.currency)
    .bind(line_items)
    .fetch_one(conn)
    .await?;

    Ok(invoice)
}
