use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::{
    dto::{LoginRequest, RegisterRequest, TokenResponse, UserResponse},
    jwt::JwtKeys,
    password::{hash_password, is_valid_email, verify_password},
    repo::User,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

fn validate_registration(payload: &RegisterRequest) -> Result<(), ApiError> {
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("invalid email".into()));
    }
    if payload.password.len() < 8 || payload.password.len() > 35 {
        return Err(ApiError::Validation(
            "password must be 8 to 35 characters".into(),
        ));
    }
    if payload.password != payload.repeat_password {
        return Err(ApiError::Validation("passwords do not match".into()));
    }
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(ApiError::Validation("first and last name are required".into()));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    payload.email = payload.email.trim().to_lowercase();
    validate_registration(&payload)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict(format!(
            "email {} is already registered",
            payload.email
        )));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &payload.email,
        &hash,
        payload.first_name.trim(),
        payload.last_name.trim(),
    )
    .await?;
    let roles = User::roles_of(&state.db, user.id).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from_parts(user, roles)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    // Same error for unknown email and wrong password.
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Unauthorized("invalid email or password".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("invalid email or password".into()));
    }

    let token = JwtKeys::new(&state.config.jwt).sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(password: &str, repeat: &str) -> RegisterRequest {
        RegisterRequest {
            email: "guest@example.com".into(),
            password: password.into(),
            repeat_password: repeat.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        }
    }

    #[test]
    fn accepts_a_well_formed_registration() {
        assert!(validate_registration(&request("password123", "password123")).is_ok());
    }

    #[test]
    fn rejects_short_password() {
        let err = validate_registration(&request("short", "short")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn rejects_mismatched_repeat_password() {
        let err = validate_registration(&request("password123", "password124")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn rejects_bad_email() {
        let mut req = request("password123", "password123");
        req.email = "nope".into();
        assert!(validate_registration(&req).is_err());
    }
}
