use chrono::NaiveDate;

use stayhub_backend::bookings::{nights, ranges_overlap};
use stayhub_backend::invoices::invoice_number;
use stayhub_backend::models::{BookingStatus, PaymentStatus};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date literal")
}

#[test]
fn overlap_detects_partial_and_contained_ranges() {
    // Partial overlap in the middle.
    assert!(ranges_overlap(
        d("2024-02-01"),
        d("2024-02-03"),
        d("2024-02-02"),
        d("2024-02-04"),
    ));
    // Contained range.
    assert!(ranges_overlap(
        d("2024-02-01"),
        d("2024-02-10"),
        d("2024-02-03"),
        d("2024-02-04"),
    ));
    // Identical range.
    assert!(ranges_overlap(
        d("2024-02-01"),
        d("2024-02-03"),
        d("2024-02-01"),
        d("2024-02-03"),
    ));
}

#[test]
fn overlap_is_half_open_at_the_boundary() {
    // Checkout day equals the next guest's check-in: same-day turnover.
    assert!(!ranges_overlap(
        d("2024-02-01"),
        d("2024-02-03"),
        d("2024-02-03"),
        d("2024-02-05"),
    ));
    assert!(!ranges_overlap(
        d("2024-02-03"),
        d("2024-02-05"),
        d("2024-02-01"),
        d("2024-02-03"),
    ));
    // Fully disjoint.
    assert!(!ranges_overlap(
        d("2024-02-01"),
        d("2024-02-02"),
        d("2024-02-10"),
        d("2024-02-12"),
    ));
}

#[test]
fn nights_counts_whole_nights() {
    assert_eq!(nights(d("2024-02-01"), d("2024-02-03")), 2);
    assert_eq!(nights(d("2024-02-01"), d("2024-02-02")), 1);
    assert_eq!(nights(d("2024-02-01"), d("2025-02-01")), 366); // 2024 is a leap year
}

#[test]
fn amount_is_exact_for_a_year_of_nights() {
    // 2-decimal nightly rate expressed in minor units never drifts.
    let rate_minor: i64 = 10_000; // 100.00
    let start = d("2024-01-01");
    for n in 1..=365i64 {
        let end = start + chrono::Duration::days(n);
        assert_eq!(nights(start, end) * rate_minor, n * 10_000);
    }
}

#[test]
fn invoice_number_embeds_the_payment_id() {
    let number = invoice_number(42);
    assert!(number.starts_with("INV-"));
    assert!(number.ends_with("-000042"));
}

#[test]
fn booking_status_round_trips() {
    for s in ["PENDING", "CONFIRMED", "CANCELLED", "COMPLETED"] {
        assert_eq!(BookingStatus::parse(s).expect("known status").as_str(), s);
    }
    assert!(BookingStatus::parse("pending").is_none());
    assert!(BookingStatus::parse("PENDING").unwrap().is_active());
    assert!(BookingStatus::parse("CONFIRMED").unwrap().is_active());
    assert!(!BookingStatus::parse("CANCELLED").unwrap().is_active());
}

#[test]
fn only_rejected_payments_are_not_live() {
    for s in [
        "AWAITING_PAYMENT",
        "AWAITING_OWNER_VERIFICATION",
        "VERIFIED",
        "REFUNDED",
    ] {
        assert!(PaymentStatus::parse(s).expect("known status").is_live());
    }
    assert!(!PaymentStatus::parse("REJECTED").unwrap().is_live());
}
