use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::post,
    Router,
};
use seatwise_service::activity::ActivityRecorder;
use seatwise_service::restaurants;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::*;

use super::{authenticate, checkout, AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/restaurants/{id}/reviews", post(create_review))
}

#[utoipa::path(
    post,
    path = "/restaurants/{id}/reviews",
    request_body = CreateReviewRequest,
    params(
        ("id" = Uuid, Path, description = "Restaurant ID")
    ),
    responses(
        (status = 201, description = "Review recorded", body = CreateReviewResponse),
        (status = 400, description = "Rating outside 1..5", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 503, description = "Store unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = []),
    ),
    tag = "reviews"
)]
#[instrument(skip(state, headers, payload))]
pub async fn create_review(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<CreateReviewResponse>), ApiError> {
    let mut conn = checkout(&state.pool)?;
    let user = authenticate(&state, &headers, &mut conn)?;

    let review = restaurants::add_review(
        &mut conn,
        user.id,
        restaurant_id,
        payload.rating,
        payload.review_text,
    )?;
    ActivityRecorder::new(&mut conn).record(
        Some(user.id),
        "review.created",
        Some(format!("restaurant={restaurant_id} rating={}", review.rating)),
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateReviewResponse { id: review.id }),
    ))
}
