use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::{
    dto::UserResponse,
    extractors::CurrentUser,
    password::is_valid_email,
    repo::User,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::users::dto::{RolesResponse, UpdateProfileRequest, UpdateRolesRequest};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me).put(update_me).patch(update_me))
        .route("/users/:id/role", put(update_roles))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, principal.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {}", principal.id)))?;
    Ok(Json(UserResponse::from_parts(user, principal.roles)))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(mut payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    payload.email = payload.email.trim().to_lowercase();
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("invalid email".into()));
    }
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(ApiError::Validation("first and last name are required".into()));
    }

    // The new email may not belong to a different user.
    if let Some(other) = User::find_by_email(&state.db, &payload.email).await? {
        if other.id != principal.id {
            warn!(email = %payload.email, "email taken by another user");
            return Err(ApiError::Conflict(format!(
                "email {} already exists",
                payload.email
            )));
        }
    }

    let user = User::update_profile(
        &state.db,
        principal.id,
        &payload.email,
        payload.first_name.trim(),
        payload.last_name.trim(),
    )
    .await?;
    info!(user_id = %user.id, "profile updated");
    Ok(Json(UserResponse::from_parts(user, principal.roles)))
}

#[instrument(skip(state, payload))]
pub async fn update_roles(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRolesRequest>,
) -> ApiResult<Json<RolesResponse>> {
    principal.require_admin()?;
    if payload.roles.is_empty() {
        return Err(ApiError::Validation("at least one role is required".into()));
    }

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {id}")))?;

    User::set_roles(&state.db, user.id, &payload.roles).await?;
    let roles = User::roles_of(&state.db, user.id).await?;
    info!(user_id = %user.id, ?roles, "roles updated");
    Ok(Json(RolesResponse { id: user.id, roles }))
}
