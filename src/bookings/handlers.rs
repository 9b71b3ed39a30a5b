use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::extractors::CurrentUser;
use crate::bookings::dto::{BookingRequest, BookingSearchParams, BookingUpdateRequest};
use crate::bookings::repo::Booking;
use crate::bookings::service;
use crate::error::ApiResult;
use crate::pagination::Pagination;
use crate::state::AppState;

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/my", get(my_bookings))
        .route(
            "/bookings/:id",
            get(get_booking)
                .put(update_booking)
                .patch(update_booking)
                .delete(cancel_booking),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_booking(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<BookingRequest>,
) -> ApiResult<(StatusCode, Json<Booking>)> {
    let booking = service::create_booking(&state, principal.id, payload).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

#[instrument(skip(state))]
pub async fn list_bookings(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Query(filter): Query<BookingSearchParams>,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<Booking>>> {
    let (limit, offset) = p.clamped();
    let rows = service::list_bookings(&state, &principal, filter, limit, offset).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn my_bookings(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<Booking>>> {
    let (limit, offset) = p.clamped();
    let rows = service::my_bookings(&state, principal.id, limit, offset).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_booking(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    let booking = service::get_booking(&state, &principal, id).await?;
    Ok(Json(booking))
}

#[instrument(skip(state, payload))]
pub async fn update_booking(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<BookingUpdateRequest>,
) -> ApiResult<Json<Booking>> {
    let booking = service::update_booking(&state, &principal, id, payload).await?;
    Ok(Json(booking))
}

#[instrument(skip(state))]
pub async fn cancel_booking(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    service::cancel_booking(&state, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
