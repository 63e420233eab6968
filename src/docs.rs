use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::bookings::create_booking,
        crate::api::bookings::list_bookings,
        crate::api::bookings::update_booking,
        crate::api::bookings::cancel_booking,
        crate::api::bookings::booking_audit,
        crate::api::payments::create_payment,
        crate::api::payments::confirm_payment,
        crate::api::payments::verify_payment,
        crate::api::payments::list_pending,
        crate::api::payments::payment_audit
    ),
    components(
        schemas(
            crate::api::auth::RegisterRequest,
            crate::api::auth::LoginRequest,
            crate::api::auth::AuthResponse,
            crate::api::bookings::CreateBookingRequest,
            crate::api::bookings::UpdateBookingRequest,
            crate::api::payments::CreatePaymentRequest,
            crate::api::payments::ConfirmPaymentRequest,
            crate::api::payments::VerifyPaymentRequest,
            crate::models::Booking,
            crate::models::Payment,
            crate::models::Invoice,
            crate::models::AuditLogEntry,
            crate::models::PayableDescriptor,
            crate::payments::CreatedPayment,
            crate::payments::VerificationOutcome,
            crate::payments::VerifyDecision
        )
    ),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "bookings", description = "Booking lifecycle"),
        (name = "payments", description = "Payment lifecycle and owner verification"),
        (name = "audit", description = "Audit trail, participants only")
    )
)]
pub struct ApiDoc;
