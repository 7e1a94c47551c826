use axum::{http::StatusCode, response::Json};
use seatwise_service::error::StoreError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Forbidden")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    CapacityExceeded(String),
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connection(msg) => ApiError::ServiceUnavailable(msg),
            StoreError::Validation(msg) => ApiError::Validation(msg),
            StoreError::CapacityExceeded(msg) => ApiError::CapacityExceeded(msg),
            StoreError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            StoreError::Database(err) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ApiError::AuthenticationFailed | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::CapacityExceeded(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn store_errors_map_to_the_expected_statuses() {
        let cases = [
            (
                StoreError::Connection("pool exhausted".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                StoreError::Validation("bad date".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                StoreError::CapacityExceeded("slot no longer available".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                StoreError::NotFound("time slot".to_string()),
                StatusCode::NOT_FOUND,
            ),
        ];
        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn auth_failures_are_unauthorized() {
        assert_eq!(
            ApiError::AuthenticationFailed.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
