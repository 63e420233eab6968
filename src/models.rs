// src/models.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(BookingStatus::Pending),
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            "COMPLETED" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    /// Statuses that hold the date range against other bookings.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    AwaitingPayment,
    AwaitingOwnerVerification,
    Verified,
    Rejected,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::AwaitingPayment => "AWAITING_PAYMENT",
            PaymentStatus::AwaitingOwnerVerification => "AWAITING_OWNER_VERIFICATION",
            PaymentStatus::Verified => "VERIFIED",
            PaymentStatus::Rejected => "REJECTED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AWAITING_PAYMENT" => Some(PaymentStatus::AwaitingPayment),
            "AWAITING_OWNER_VERIFICATION" => Some(PaymentStatus::AwaitingOwnerVerification),
            "VERIFIED" => Some(PaymentStatus::Verified),
            "REJECTED" => Some(PaymentStatus::Rejected),
            "REFUNDED" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    /// A live payment blocks creation of another one for the same booking.
    pub fn is_live(&self) -> bool {
        !matches!(self, PaymentStatus::Rejected)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: i32,
    pub tenant_id: i32,
    pub property_id: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Payment {
    pub id: i32,
    pub booking_id: i32,
    pub payer_id: i32,
    pub payee_id: i32,
    pub amount_minor: i64,
    pub currency: String,
    pub proof_reference: Option<String>,
    pub status: String,
    pub verified_by: Option<i32>,
    pub verified_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Invoice {
    pub id: i32,
    pub invoice_number: String,
    pub payment_id: i32,
    pub booking_id: i32,
    pub payer_id: i32,
    pub payee_id: i32,
    pub amount_minor: i64,
    pub currency: String,
    #[schema(value_type = Object)]
    pub line_items: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AuditLogEntry {
    pub id: i64,
    pub actor_id: i32,
    pub action: String,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub booking_id: Option<i32>,
    pub payment_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Read-only view of the external property catalog.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Property {
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub nightly_rate_minor: i64,
    pub currency: String,
    pub capacity: i32,
    pub is_active: bool,
}

/// Payment instruction handed back to the tenant for out-of-band transfer.
/// Rendering (QR code etc.) is an external concern.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayableDescriptor {
    pub payee_id: i32,
    pub payee_handle: Option<String>,
    pub payee_name: String,
    pub amount_minor: i64,
    pub currency: String,
    pub reference: String,
}
