use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::accommodations::dto::AccommodationRequest;
use crate::accommodations::repo::Accommodation;
use crate::auth::extractors::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::notifications::Notification;
use crate::pagination::Pagination;
use crate::state::AppState;

pub fn accommodation_routes() -> Router<AppState> {
    Router::new()
        .route("/accommodations", get(list).post(create))
        .route(
            "/accommodations/:id",
            get(get_by_id).put(update).patch(update).delete(delete),
        )
}

fn validate(req: &AccommodationRequest) -> Result<(), ApiError> {
    if req.daily_rate <= Decimal::ZERO {
        return Err(ApiError::Validation("daily_rate must be positive".into()));
    }
    if req.availability < 0 {
        return Err(ApiError::Validation("availability must not be negative".into()));
    }
    if req.location.trim().is_empty() || req.size.trim().is_empty() {
        return Err(ApiError::Validation("location and size are required".into()));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<AccommodationRequest>,
) -> ApiResult<(StatusCode, Json<Accommodation>)> {
    principal.require_admin()?;
    validate(&payload)?;

    let accommodation = Accommodation::insert(
        &state.db,
        payload.kind,
        payload.location.trim(),
        payload.size.trim(),
        &payload.amenities,
        payload.daily_rate,
        payload.availability,
    )
    .await?;

    state.notifier.send(Notification::AccommodationCreated {
        id: accommodation.id,
        location: accommodation.location.clone(),
    });
    info!(accommodation_id = %accommodation.id, "accommodation created");
    Ok((StatusCode::CREATED, Json(accommodation)))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<Accommodation>>> {
    let (limit, offset) = p.clamped();
    let rows = Accommodation::list(&state.db, limit, offset).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Accommodation>> {
    let accommodation = Accommodation::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("accommodation not found: {id}")))?;
    Ok(Json(accommodation))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccommodationRequest>,
) -> ApiResult<Json<Accommodation>> {
    principal.require_admin()?;
    validate(&payload)?;

    let accommodation = Accommodation::update(
        &state.db,
        id,
        payload.kind,
        payload.location.trim(),
        payload.size.trim(),
        &payload.amenities,
        payload.daily_rate,
        payload.availability,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("accommodation not found: {id}")))?;
    info!(accommodation_id = %accommodation.id, "accommodation updated");
    Ok(Json(accommodation))
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    principal.require_admin()?;
    if !Accommodation::delete(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("accommodation not found: {id}")));
    }
    info!(accommodation_id = %id, "accommodation deleted");
    Ok(StatusCode::NO_CONTENT)
}
