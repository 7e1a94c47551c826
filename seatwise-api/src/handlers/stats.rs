use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Json,
    routing::get,
    Router,
};
use seatwise_service::{reports, suggest};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::*;

use super::{authenticate, checkout, AppState};

const DEFAULT_SUGGESTIONS: usize = 5;
const TOP_LIMIT: usize = 5;
const PEAK_LIMIT: usize = 5;
const PATTERN_LIMIT: usize = 10;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/suggested-restaurants", get(suggested_restaurants))
        .route("/stats", get(stats))
        .route("/advanced-stats", get(advanced_stats))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    pub city: Option<String>,
    pub category: Option<Uuid>,
    pub limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/suggested-restaurants",
    params(
        ("city" = Option<String>, Query, description = "Substring filter on the location field"),
        ("category" = Option<Uuid>, Query, description = "Category filter"),
        ("limit" = Option<usize>, Query, description = "Result bound, defaults to 5"),
    ),
    responses(
        (status = 200, description = "Restaurants, least loaded first", body = [SuggestedRestaurantResponse]),
        (status = 503, description = "Store unavailable", body = ApiErrorResponse),
    ),
    tag = "stats"
)]
#[instrument(skip(state))]
pub async fn suggested_restaurants(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<Vec<SuggestedRestaurantResponse>>, ApiError> {
    let mut conn = checkout(&state.pool)?;
    let ranked = suggest::suggest_restaurants(
        &mut conn,
        params.city.as_deref(),
        params.category,
        params.limit.unwrap_or(DEFAULT_SUGGESTIONS),
    )?;

    Ok(Json(
        ranked
            .into_iter()
            .map(|r| SuggestedRestaurantResponse {
                id: r.id,
                name: r.name,
                location: r.location,
                seating_capacity: r.seating_capacity,
                current_occupancy: r.current_occupancy,
                occupancy_rate: r.occupancy_rate,
                avg_rating: r.avg_rating,
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Operational statistics", body = StatsResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 503, description = "Store unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = []),
    ),
    tag = "stats"
)]
#[instrument(skip(state, headers))]
pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, ApiError> {
    let mut conn = checkout(&state.pool)?;
    authenticate(&state, &headers, &mut conn)?;

    let top_restaurants = reports::top_restaurants(&mut conn, TOP_LIMIT)?
        .into_iter()
        .map(|t| TopRestaurantResponse {
            name: t.name,
            booking_count: t.booking_count,
        })
        .collect();
    let occupancy = reports::occupancy_stats(&mut conn)?;
    let bookings_by_weekday = reports::bookings_by_weekday(&mut conn)?
        .into_iter()
        .map(|w| WeekdayCountResponse {
            day_of_week: w.day_of_week,
            booking_count: w.booking_count,
        })
        .collect();
    let provenance = reports::provenance_stats(&mut conn)?
        .into_iter()
        .map(|p| ProvenanceStatsResponse {
            source: p.source,
            restaurant_count: p.restaurant_count,
            total_customers: p.total_customers,
        })
        .collect();

    Ok(Json(StatsResponse {
        top_restaurants,
        occupancy: OccupancyStatsResponse {
            avg_occupancy: occupancy.avg_occupancy,
            max_occupancy: occupancy.max_occupancy,
            total_customers: occupancy.total_customers,
            avg_occupancy_percent: occupancy.avg_occupancy_percent,
        },
        bookings_by_weekday,
        provenance,
    }))
}

#[utoipa::path(
    get,
    path = "/advanced-stats",
    responses(
        (status = 200, description = "Peak hours, cancellation rate, efficiency and user patterns", body = AdvancedStatsResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 503, description = "Store unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = []),
    ),
    tag = "stats"
)]
#[instrument(skip(state, headers))]
pub async fn advanced_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdvancedStatsResponse>, ApiError> {
    let mut conn = checkout(&state.pool)?;
    authenticate(&state, &headers, &mut conn)?;

    let peak_hours = reports::peak_hours(&mut conn, PEAK_LIMIT)?
        .into_iter()
        .map(|p| PeakHourResponse {
            hour_of_day: p.hour_of_day,
            booking_count: p.booking_count,
        })
        .collect();
    let cancellation_rate = reports::cancellation_rate(&mut conn)?;
    let efficiency = reports::efficiency_scores(&mut conn)?
        .into_iter()
        .map(|e| EfficiencyScoreResponse {
            restaurant_id: e.restaurant_id,
            name: e.name,
            score: e.score,
        })
        .collect();
    let user_patterns = reports::user_patterns(&mut conn, PATTERN_LIMIT)?
        .into_iter()
        .map(|u| UserPatternResponse {
            user_id: u.user_id,
            name: u.name,
            booking_count: u.booking_count,
            avg_party_size: u.avg_party_size,
            distinct_restaurants: u.distinct_restaurants,
        })
        .collect();

    Ok(Json(AdvancedStatsResponse {
        peak_hours,
        cancellation_rate,
        efficiency,
        user_patterns,
    }))
}
