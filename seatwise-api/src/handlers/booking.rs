use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use seatwise_service::activity::ActivityRecorder;
use seatwise_service::availability;
use seatwise_service::booking::{self, BookingRequest};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::*;

use super::{authenticate, checkout, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants/{id}/bookings", post(create_booking))
        .route("/api/available-slots", get(available_slots))
}

#[utoipa::path(
    post,
    path = "/restaurants/{id}/bookings",
    request_body = CreateBookingRequest,
    params(
        ("id" = Uuid, Path, description = "Restaurant ID")
    ),
    responses(
        (status = 201, description = "Reservation confirmed", body = BookingResponse),
        (status = 400, description = "Invalid guests count or date", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Unknown restaurant or slot", body = ApiErrorResponse),
        (status = 409, description = "Slot or restaurant no longer has capacity", body = ApiErrorResponse),
        (status = 503, description = "Store unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = []),
    ),
    tag = "bookings"
)]
#[instrument(skip(state, headers, payload))]
pub async fn create_booking(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let mut conn = checkout(&state.pool)?;
    let user = authenticate(&state, &headers, &mut conn)?;

    let reservation = booking::book_table(
        &mut conn,
        BookingRequest {
            user_id: user.id,
            restaurant_id,
            slot_id: payload.slot_id,
            date: payload.date,
            num_people: payload.num_people,
            notes: payload.notes,
        },
    )?;
    ActivityRecorder::new(&mut conn).record(
        Some(user.id),
        "booking.created",
        Some(format!(
            "restaurant={} slot={} date={} guests={}",
            reservation.restaurant_id,
            reservation.slot_id,
            reservation.reservation_date,
            reservation.num_people
        )),
    );

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            id: reservation.id,
            restaurant_id: reservation.restaurant_id,
            slot_id: reservation.slot_id,
            date: reservation.reservation_date.to_string(),
            num_people: reservation.num_people,
            status: "Confirmed".to_string(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsParams {
    pub restaurant_id: Uuid,
    pub date: String,
    pub party_size: i32,
}

#[utoipa::path(
    get,
    path = "/api/available-slots",
    params(
        ("restaurant_id" = Uuid, Query, description = "Restaurant ID"),
        ("date" = String, Query, description = "Reservation date, YYYY-MM-DD"),
        ("party_size" = i32, Query, description = "Number of guests"),
    ),
    responses(
        (status = 200, description = "Slots that can still seat the party on that date", body = [AvailableSlotResponse]),
        (status = 400, description = "Missing or malformed parameter", body = ApiErrorResponse),
        (status = 503, description = "Store unavailable", body = ApiErrorResponse),
    ),
    tag = "bookings"
)]
#[instrument(skip(state))]
pub async fn available_slots(
    State(state): State<AppState>,
    Query(params): Query<AvailableSlotsParams>,
) -> Result<Json<Vec<AvailableSlotResponse>>, ApiError> {
    let mut conn = checkout(&state.pool)?;
    let slots = availability::find_available_slots(
        &mut conn,
        params.restaurant_id,
        &params.date,
        params.party_size,
    )?;

    Ok(Json(
        slots
            .into_iter()
            .map(|slot| AvailableSlotResponse {
                slot_id: slot.slot_id,
                start_time: slot.start_time.format("%H:%M").to_string(),
                end_time: slot.end_time.format("%H:%M").to_string(),
                max_capacity: slot.max_capacity,
                remaining: slot.remaining,
            })
            .collect(),
    ))
}
