use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use seatwise_service::models::Restaurant;
use seatwise_service::{ingest, restaurants};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::*;

use super::{checkout, AppState};

const DEFAULT_CITY: &str = "Pune";
const STORED_LIMIT: i64 = 20;
const EXTERNAL_LIMIT: usize = 10;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_restaurants))
        .route("/restaurants/{id}", get(get_restaurant))
}

#[derive(Debug, Deserialize)]
pub struct ListRestaurantsParams {
    pub city: Option<String>,
}

fn summary(restaurant: Restaurant) -> RestaurantSummary {
    RestaurantSummary {
        id: restaurant.id,
        name: restaurant.name,
        location: restaurant.location,
        latitude: restaurant.latitude,
        longitude: restaurant.longitude,
        seating_capacity: restaurant.seating_capacity,
        current_occupancy: restaurant.current_occupancy,
        source: restaurant.source,
    }
}

#[utoipa::path(
    get,
    path = "/restaurants",
    params(
        ("city" = Option<String>, Query, description = "City to look up external venues for, defaults to Pune")
    ),
    responses(
        (status = 200, description = "Stored restaurants plus freshly ingested external venues", body = ListRestaurantsResponse),
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn list_restaurants(
    State(state): State<AppState>,
    Query(params): Query<ListRestaurantsParams>,
) -> Json<ListRestaurantsResponse> {
    let city = params.city.unwrap_or_else(|| DEFAULT_CITY.to_string());

    // A store outage degrades this page to whatever can still be shown.
    let stored = match state.pool.get() {
        Ok(mut conn) => restaurants::list_stored(&mut conn, STORED_LIMIT).unwrap_or_default(),
        Err(_) => Vec::new(),
    };

    let mut external = Vec::new();
    let venues = state.lookup.search(&city).await;
    if !venues.is_empty() {
        if let Ok(mut conn) = state.pool.get() {
            for venue in venues.into_iter().take(EXTERNAL_LIMIT) {
                match ingest::upsert_external_venue(&mut conn, &venue, &city) {
                    Ok(id) => external.push(RestaurantSummary {
                        id,
                        name: venue.name,
                        location: city.clone(),
                        latitude: Some(venue.lat),
                        longitude: Some(venue.lon),
                        seating_capacity: seatwise_service::busy_hours::DEFAULT_CAPACITY,
                        current_occupancy: 0,
                        source: seatwise_service::models::SOURCE_EXTERNAL.to_string(),
                    }),
                    Err(err) => {
                        tracing::warn!(city = %city, error = %err, "failed to ingest external venue")
                    }
                }
            }
        }
    }

    Json(ListRestaurantsResponse {
        stored: stored.into_iter().map(summary).collect(),
        external,
    })
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}",
    params(
        ("id" = Uuid, Path, description = "Restaurant ID")
    ),
    responses(
        (status = 200, description = "Restaurant details", body = RestaurantDetailResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 503, description = "Store unavailable", body = ApiErrorResponse),
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<RestaurantDetailResponse>, ApiError> {
    let mut conn = checkout(&state.pool)?;
    let details = restaurants::get_details(&mut conn, restaurant_id)?
        .ok_or_else(|| ApiError::NotFound("restaurant not found".to_string()))?;

    Ok(Json(RestaurantDetailResponse {
        summary: summary(details.restaurant),
        category: details.category.map(|c| CategoryResponse {
            id: c.id,
            name: c.name,
            description: c.description,
        }),
        avg_rating: details.avg_rating,
        menu: details
            .menu
            .into_iter()
            .map(|item| MenuItemResponse {
                id: item.id,
                name: item.name,
                description: item.description,
                price: item.price.to_string(),
            })
            .collect(),
        reviews: details
            .reviews
            .into_iter()
            .map(|entry| ReviewResponse {
                rating: entry.review.rating,
                review_text: entry.review.review_text,
                author: entry.author,
                created_at: entry.review.created_at.to_rfc3339(),
            })
            .collect(),
    }))
}
