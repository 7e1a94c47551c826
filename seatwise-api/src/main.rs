use axum::Router;
use chrono::TimeDelta;
use diesel_migrations::MigrationHarness;
use dotenvy::dotenv;
use jsonwebtoken::{DecodingKey, EncodingKey};
use seatwise_service::lookup::VenueLookup;
use seatwise_service::{establish_pool, MIGRATIONS};
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod error;
mod handlers;
mod models;

use handlers::{
    admin_router, auth_router, booking_router, restaurant_router, review_router, stats_router,
    ApiDoc, AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let secret_key = std::env::var("SECRET_KEY").expect("SECRET_KEY must be set");

    let pool = establish_pool();
    {
        let mut conn = pool.get()?;
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Failed to run migrations");
    }

    let state = AppState {
        pool,
        lookup: VenueLookup::new(),
        encoding_key: EncodingKey::from_secret(secret_key.as_ref()),
        decoding_key: DecodingKey::from_secret(secret_key.as_ref()),
        access_token_expires: TimeDelta::hours(8),
    };

    let app = Router::new()
        .merge(auth_router())
        .merge(restaurant_router())
        .merge(booking_router())
        .merge(review_router())
        .merge(stats_router())
        .merge(admin_router())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8100".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("seatwise API listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
