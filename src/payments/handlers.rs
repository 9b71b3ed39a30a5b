use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::extractors::CurrentUser;
use crate::error::ApiResult;
use crate::pagination::Pagination;
use crate::payments::dto::{CanceledPaymentResponse, PaymentListParams, PaymentRequest, SessionQuery};
use crate::payments::repo::Payment;
use crate::payments::service;
use crate::state::AppState;

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments).post(create_payment))
        // Provider redirect targets; unauthenticated by design.
        .route("/payments/success", get(payment_success))
        .route("/payments/cancel", get(payment_cancel))
        .route("/payments/renew/:id", put(renew_payment))
}

#[instrument(skip(state))]
pub async fn list_payments(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Query(filter): Query<PaymentListParams>,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<Payment>>> {
    let (limit, offset) = p.clamped();
    let rows = service::get_payments(&state, &principal, filter.user_id, limit, offset).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, payload))]
pub async fn create_payment(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<PaymentRequest>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let payment = service::create_payment(&state, principal.id, payload.booking_id).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[instrument(skip(state))]
pub async fn payment_success(
    State(state): State<AppState>,
    Query(q): Query<SessionQuery>,
) -> ApiResult<Json<Payment>> {
    let payment = service::process_successful_payment(&state, &q.session_id).await?;
    Ok(Json(payment))
}

#[instrument(skip(state))]
pub async fn payment_cancel(
    State(state): State<AppState>,
    Query(q): Query<SessionQuery>,
) -> ApiResult<Json<CanceledPaymentResponse>> {
    let response = service::process_canceled_payment(&state, &q.session_id).await?;
    Ok(Json(response))
}

#[instrument(skip(state))]
pub async fn renew_payment(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Payment>> {
    let payment = service::renew_payment_session(&state, &principal, id).await?;
    Ok(Json(payment))
}
