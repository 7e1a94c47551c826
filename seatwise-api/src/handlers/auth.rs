use argon2::password_hash::{rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, PasswordHash};
use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use seatwise_service::activity::ActivityRecorder;
use seatwise_service::users::{self, NewUser};
use tracing::instrument;

use crate::error::ApiError;
use crate::models::*;

use super::{checkout, issue_access_token, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/token", post(issue_token))
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = RegisterResponse),
        (status = 400, description = "Invalid input or email already registered", body = ApiErrorResponse),
        (status = 503, description = "Store unavailable", body = ApiErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if payload.password.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = argon2
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|_| ApiError::InternalError("failed to hash password".to_string()))?
        .to_string();

    let mut conn = checkout(&state.pool)?;
    let user = users::create_user(
        &mut conn,
        NewUser {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            password_hash,
        },
    )?;
    ActivityRecorder::new(&mut conn).record(Some(user.id), "user.registered", None);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at.to_rfc3339(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/token",
    request_body = IssueTokenRequest,
    responses(
        (status = 200, description = "Token issued successfully", body = IssueTokenResponse),
        (status = 401, description = "Unknown email or wrong password", body = ApiErrorResponse),
        (status = 503, description = "Store unavailable", body = ApiErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn issue_token(
    State(state): State<AppState>,
    Json(payload): Json<IssueTokenRequest>,
) -> Result<Json<IssueTokenResponse>, ApiError> {
    if payload.grant_type != "password" {
        return Err(ApiError::Validation("unsupported grant type".to_string()));
    }

    let mut conn = checkout(&state.pool)?;
    let user =
        users::find_by_email(&mut conn, &payload.email)?.ok_or(ApiError::AuthenticationFailed)?;

    let parsed = PasswordHash::new(&user.password_hash)
        .map_err(|_| ApiError::InternalError("stored password hash is invalid".to_string()))?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed)
        .map_err(|_| ApiError::AuthenticationFailed)?;

    let (access_token, expires_in) = issue_access_token(&state, user.id)?;
    Ok(Json(IssueTokenResponse {
        token_type: "Bearer".to_string(),
        access_token,
        expires_in,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_and_rejects() {
        let argon2 = Argon2::default();
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2
            .hash_password(b"correct horse battery staple", &salt)
            .unwrap()
            .to_string();

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(argon2
            .verify_password(b"correct horse battery staple", &parsed)
            .is_ok());
        assert!(argon2.verify_password(b"wrong password", &parsed).is_err());
    }
}
