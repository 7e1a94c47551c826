use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Router,
};
use seatwise_service::activity::{self, ActivityRecorder};
use seatwise_service::maintenance::{self, MaintenanceAction};
use serde::Deserialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::models::*;

use super::{checkout, require_admin, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/db-maintenance", post(db_maintenance))
        .route("/admin/activity-logs", get(activity_logs))
        .route("/admin/query-performance", get(query_performance))
}

#[utoipa::path(
    post,
    path = "/admin/db-maintenance",
    request_body = MaintenanceRequest,
    responses(
        (status = 200, description = "Maintenance completed", body = MaintenanceResponse),
        (status = 400, description = "Unknown action", body = ApiErrorResponse),
        (status = 403, description = "Not an administrator", body = ApiErrorResponse),
        (status = 503, description = "Store unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = []),
    ),
    tag = "admin"
)]
#[instrument(skip(state, headers))]
pub async fn db_maintenance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<MaintenanceRequest>,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    let mut conn = checkout(&state.pool)?;
    let admin = require_admin(&state, &headers, &mut conn)?;

    let action = MaintenanceAction::parse(&payload.action)
        .ok_or_else(|| ApiError::Validation(format!("unknown action {:?}", payload.action)))?;
    let items = maintenance::run_maintenance(&mut conn, action)?;
    ActivityRecorder::new(&mut conn).record(
        Some(admin.id),
        "admin.maintenance",
        Some(action.as_str().to_string()),
    );

    Ok(Json(MaintenanceResponse {
        action: action.as_str().to_string(),
        items: items
            .into_iter()
            .map(|item| MaintenanceItemResponse {
                name: item.name,
                affected: item.affected,
            })
            .collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ActivityLogsParams {
    pub page: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/admin/activity-logs",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number, 50 entries per page")
    ),
    responses(
        (status = 200, description = "Audit trail, newest first", body = ActivityLogsResponse),
        (status = 403, description = "Not an administrator", body = ApiErrorResponse),
        (status = 503, description = "Store unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = []),
    ),
    tag = "admin"
)]
#[instrument(skip(state, headers))]
pub async fn activity_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ActivityLogsParams>,
) -> Result<Json<ActivityLogsResponse>, ApiError> {
    let mut conn = checkout(&state.pool)?;
    require_admin(&state, &headers, &mut conn)?;

    let page = params.page.unwrap_or(1).max(1);
    let entries = activity::recent_activity(&mut conn, page)?
        .into_iter()
        .map(|entry| ActivityLogEntryResponse {
            id: entry.id,
            user_id: entry.user_id,
            action: entry.action,
            detail: entry.detail,
            created_at: entry.created_at.to_rfc3339(),
        })
        .collect();

    Ok(Json(ActivityLogsResponse { page, entries }))
}

#[utoipa::path(
    get,
    path = "/admin/query-performance",
    responses(
        (status = 200, description = "Row counts per table", body = QueryPerformanceResponse),
        (status = 403, description = "Not an administrator", body = ApiErrorResponse),
        (status = 503, description = "Store unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = []),
    ),
    tag = "admin"
)]
#[instrument(skip(state, headers))]
pub async fn query_performance(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<QueryPerformanceResponse>, ApiError> {
    let mut conn = checkout(&state.pool)?;
    require_admin(&state, &headers, &mut conn)?;

    let tables = maintenance::table_stats(&mut conn)?
        .into_iter()
        .map(|count| TableCountResponse {
            table: count.table,
            rows: count.rows,
        })
        .collect();

    Ok(Json(QueryPerformanceResponse { tables }))
}
