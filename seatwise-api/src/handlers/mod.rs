pub mod admin;
pub mod auth;
pub mod booking;
pub mod restaurant;
pub mod review;
pub mod stats;

// Re-export routers for easier importing
pub use admin::router as admin_router;
pub use auth::router as auth_router;
pub use booking::router as booking_router;
pub use restaurant::router as restaurant_router;
pub use review::router as review_router;
pub use stats::router as stats_router;

use axum::http::HeaderMap;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use seatwise_service::lookup::VenueLookup;
use seatwise_service::models::User;
use seatwise_service::{users, DbConnection, DbPool};
use serde::{Deserialize, Serialize};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub lookup: VenueLookup,
    pub encoding_key: EncodingKey,
    pub decoding_key: DecodingKey,
    pub access_token_expires: TimeDelta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    exp: usize,
    iat: usize,
    sub: String,
}

// Shared utility functions
pub(crate) fn checkout(pool: &DbPool) -> Result<DbConnection, ApiError> {
    pool.get()
        .map_err(|err| ApiError::ServiceUnavailable(format!("database connection error: {err}")))
}

pub(crate) fn issue_access_token(
    state: &AppState,
    user_id: Uuid,
) -> Result<(String, i64), ApiError> {
    let now = Utc::now();
    let claims = Claims {
        exp: (now + state.access_token_expires).timestamp() as usize,
        iat: now.timestamp() as usize,
        sub: user_id.to_string(),
    };
    let token = jsonwebtoken::encode(&Header::default(), &claims, &state.encoding_key)
        .map_err(|_| ApiError::InternalError("failed to encode token".to_string()))?;
    Ok((token, state.access_token_expires.num_seconds()))
}

pub(crate) fn user_id_from_token(
    headers: &HeaderMap,
    decoding_key: &DecodingKey,
) -> Result<Uuid, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(ApiError::AuthenticationFailed)?
        .to_str()
        .map_err(|_| ApiError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::InvalidToken)?;

    let data = jsonwebtoken::decode::<Claims>(token, decoding_key, &Validation::default())
        .map_err(|_| ApiError::InvalidToken)?;
    data.claims.sub.parse().map_err(|_| ApiError::InvalidToken)
}

pub(crate) fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    conn: &mut DbConnection,
) -> Result<User, ApiError> {
    let user_id = user_id_from_token(headers, &state.decoding_key)?;
    users::find_by_id(conn, user_id)?.ok_or(ApiError::AuthenticationFailed)
}

pub(crate) fn require_admin(
    state: &AppState,
    headers: &HeaderMap,
    conn: &mut DbConnection,
) -> Result<User, ApiError> {
    let user = authenticate(state, headers, conn)?;
    if !user.is_admin {
        return Err(ApiError::Forbidden);
    }
    Ok(user)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::issue_token,
        restaurant::list_restaurants,
        restaurant::get_restaurant,
        booking::create_booking,
        booking::available_slots,
        review::create_review,
        stats::suggested_restaurants,
        stats::stats,
        stats::advanced_stats,
        admin::db_maintenance,
        admin::activity_logs,
        admin::query_performance,
    ),
    components(
        schemas(
            crate::models::RegisterRequest,
            crate::models::RegisterResponse,
            crate::models::IssueTokenRequest,
            crate::models::IssueTokenResponse,
            crate::models::RestaurantSummary,
            crate::models::ListRestaurantsResponse,
            crate::models::CategoryResponse,
            crate::models::MenuItemResponse,
            crate::models::ReviewResponse,
            crate::models::RestaurantDetailResponse,
            crate::models::CreateBookingRequest,
            crate::models::BookingResponse,
            crate::models::AvailableSlotResponse,
            crate::models::CreateReviewRequest,
            crate::models::CreateReviewResponse,
            crate::models::SuggestedRestaurantResponse,
            crate::models::TopRestaurantResponse,
            crate::models::OccupancyStatsResponse,
            crate::models::WeekdayCountResponse,
            crate::models::ProvenanceStatsResponse,
            crate::models::StatsResponse,
            crate::models::PeakHourResponse,
            crate::models::EfficiencyScoreResponse,
            crate::models::UserPatternResponse,
            crate::models::AdvancedStatsResponse,
            crate::models::MaintenanceRequest,
            crate::models::MaintenanceItemResponse,
            crate::models::MaintenanceResponse,
            crate::models::ActivityLogEntryResponse,
            crate::models::ActivityLogsResponse,
            crate::models::TableCountResponse,
            crate::models::QueryPerformanceResponse,
            crate::models::ApiErrorResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and authentication endpoints"),
        (name = "restaurants", description = "Restaurant discovery endpoints"),
        (name = "bookings", description = "Table booking and availability endpoints"),
        (name = "reviews", description = "Review endpoints"),
        (name = "stats", description = "Suggestion and reporting endpoints"),
        (name = "admin", description = "Administrative maintenance endpoints")
    ),
    info(
        title = "Seatwise API",
        description = "Restaurant discovery, table booking and analytics backend",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            use utoipa::openapi::security::*;
            let password_flow = Password::new("/auth/token", Scopes::default());
            components.add_security_scheme(
                "bearer",
                SecurityScheme::OAuth2(OAuth2::new([Flow::Password(password_flow)])),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn keys() -> (EncodingKey, DecodingKey) {
        (
            EncodingKey::from_secret(b"test-secret"),
            DecodingKey::from_secret(b"test-secret"),
        )
    }

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn token_round_trips_the_user_id() {
        let (encoding_key, decoding_key) = keys();
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let claims = Claims {
            exp: (now + TimeDelta::hours(8)).timestamp() as usize,
            iat: now.timestamp() as usize,
            sub: user_id.to_string(),
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &encoding_key).unwrap();

        let decoded = user_id_from_token(&bearer_headers(&token), &decoding_key).unwrap();
        assert_eq!(decoded, user_id);
    }

    #[test]
    fn missing_header_fails_authentication() {
        let (_, decoding_key) = keys();
        assert!(matches!(
            user_id_from_token(&HeaderMap::new(), &decoding_key),
            Err(ApiError::AuthenticationFailed)
        ));
    }

    #[test]
    fn non_bearer_and_garbage_tokens_are_invalid() {
        let (_, decoding_key) = keys();

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(matches!(
            user_id_from_token(&headers, &decoding_key),
            Err(ApiError::InvalidToken)
        ));

        assert!(matches!(
            user_id_from_token(&bearer_headers("not-a-jwt"), &decoding_key),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let (encoding_key, decoding_key) = keys();
        let past = Utc::now() - TimeDelta::hours(9);
        let claims = Claims {
            exp: (past + TimeDelta::hours(8)).timestamp() as usize,
            iat: past.timestamp() as usize,
            sub: Uuid::new_v4().to_string(),
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &encoding_key).unwrap();

        assert!(matches!(
            user_id_from_token(&bearer_headers(&token), &decoding_key),
            Err(ApiError::InvalidToken)
        ));
    }
}
