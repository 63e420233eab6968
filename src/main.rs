// src/main.rs
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use dotenvy::dotenv;
use sqlx::PgPool;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use stayhub_backend::{api, docs, AppState};

async fn index() -> impl Responder {
    HttpResponse::Ok().body("Service ready!")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let state = web::Data::new(AppState { pool });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(index))
            .service(
                SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
            )
            // Публичные роуты авторизации
            .service(api::auth::register)
            .service(api::auth::login)
            // Защищённые роуты
            .service(
                web::scope("/api")
                    .wrap(api::auth::JwtMiddleware)
                    .service(api::bookings::create_booking)
                    .service(api::bookings::list_bookings)
                    .service(api::bookings::update_booking)
                    .service(api::bookings::cancel_booking)
                    .service(api::bookings::booking_audit)
                    .service(api::payments::create_payment)
                    .service(api::payments::list_pending)
                    .service(api::payments::confirm_payment)
                    .service(api::payments::verify_payment)
                    .service(api::payments::payment_audit),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
