pub mod api;
pub mod audit;
pub mod bookings;
pub mod db;
pub mod docs;
pub mod error;
pub mod invoices;
pub mod models;
pub mod payments;

use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}
