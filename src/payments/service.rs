use rust_decimal::Decimal;
use sqlx::PgPool;
use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use crate::accommodations::repo::Accommodation;
use crate::auth::policy::Principal;
use crate::bookings::repo::{Booking, BookingStatus};
use crate::error::{ApiError, ApiResult};
use crate::notifications::Notification;
use crate::payments::dto::CanceledPaymentResponse;
use crate::payments::repo::{Payment, PaymentStatus};
use crate::payments::stripe::CheckoutProvider;
use crate::state::AppState;

pub fn nights_between(check_in: Date, check_out: Date) -> i64 {
    (check_out - check_in).whole_days()
}

/// Amount owed for a stay: daily rate × nights.
pub fn amount_due(daily_rate: Decimal, check_in: Date, check_out: Date) -> Result<Decimal, ApiError> {
    let nights = nights_between(check_in, check_out);
    if nights <= 0 {
        return Err(ApiError::BookingData(
            "check-out date must be after the check-in date".into(),
        ));
    }
    if daily_rate <= Decimal::ZERO {
        return Err(ApiError::BookingData(
            "accommodation daily rate is not set".into(),
        ));
    }
    Ok(daily_rate * Decimal::from(nights))
}

pub fn cancellation_message(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => {
            "The payment session is still available. You can complete the payment within 24 hours."
        }
        PaymentStatus::Expired => "The payment session has expired. Please renew your session.",
        PaymentStatus::Paid => "Payment already processed.",
    }
}

/// Whether a session is gone for good. PAID payments never lapse.
pub fn session_lapsed(status: PaymentStatus, expires_at: Option<i64>, now: i64) -> bool {
    status != PaymentStatus::Paid && expires_at.is_some_and(|t| t < now)
}

pub async fn create_payment(
    state: &AppState,
    user_id: Uuid,
    booking_id: Uuid,
) -> ApiResult<Payment> {
    let booking = Booking::find_by_id(&state.db, booking_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("booking not found: {booking_id}")))?;
    if booking.user_id != user_id {
        return Err(ApiError::Forbidden(format!(
            "you are not the owner of booking {booking_id}"
        )));
    }

    if let Some(existing) = Payment::find_by_booking(&state.db, booking_id).await? {
        return match existing.status {
            PaymentStatus::Paid => Err(ApiError::Conflict(
                "payment has already been completed for this booking".into(),
            )),
            PaymentStatus::Expired => renew_session(state, existing).await,
            // Re-requesting a live session hands back the same one.
            PaymentStatus::Pending => Ok(existing),
        };
    }

    if booking.status != BookingStatus::Pending {
        return Err(ApiError::Conflict(format!(
            "booking is not in PENDING status: {:?}",
            booking.status
        )));
    }

    let amount = booking_amount(state, &booking).await?;
    let session = state.checkout.create_session(booking.id, amount).await?;
    let url = session_url(&session)?;
    let payment = Payment::insert(&state.db, booking.id, &session.id, &url, amount).await?;
    info!(payment_id = %payment.id, booking_id = %booking.id, "payment session created");
    Ok(payment)
}

/// Admins may filter by any user or none; everyone else sees only their own.
pub async fn get_payments(
    state: &AppState,
    principal: &Principal,
    requested_user: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> ApiResult<Vec<Payment>> {
    let filter = if principal.is_admin() {
        requested_user
    } else {
        Some(principal.id)
    };
    let rows = match filter {
        Some(user_id) => Payment::list_by_user(&state.db, user_id, limit, offset).await?,
        None => Payment::list_all(&state.db, limit, offset).await?,
    };
    Ok(rows)
}

pub async fn process_successful_payment(state: &AppState, session_id: &str) -> ApiResult<Payment> {
    let session = state.checkout.retrieve_session(session_id).await?;
    if session.payment_status.as_deref() != Some("paid") {
        return Err(ApiError::Conflict(format!(
            "payment session is not paid: {session_id}"
        )));
    }

    let payment = Payment::find_by_session(&state.db, session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no payment found for session: {session_id}")))?;
    if payment.status == PaymentStatus::Paid {
        return Err(ApiError::Conflict(format!(
            "payment has already been processed and marked as PAID for session: {session_id}"
        )));
    }

    Payment::set_status(&state.db, payment.id, PaymentStatus::Paid).await?;
    state.notifier.send(Notification::PaymentCompleted {
        booking_id: payment.booking_id,
        amount: payment.amount,
    });
    info!(payment_id = %payment.id, "payment completed");
    Ok(Payment {
        status: PaymentStatus::Paid,
        ..payment
    })
}

pub async fn process_canceled_payment(
    state: &AppState,
    session_id: &str,
) -> ApiResult<CanceledPaymentResponse> {
    let payment = Payment::find_by_session(&state.db, session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("invalid session id: {session_id}")))?;
    Ok(CanceledPaymentResponse {
        session_id: payment.session_id,
        status: payment.status,
        message: cancellation_message(payment.status).to_string(),
    })
}

pub async fn renew_payment_session(
    state: &AppState,
    principal: &Principal,
    payment_id: Uuid,
) -> ApiResult<Payment> {
    let payment = Payment::find_by_id(&state.db, payment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("invalid payment id: {payment_id}")))?;
    if payment.status == PaymentStatus::Paid {
        return Err(ApiError::Conflict(
            "a completed payment cannot be renewed".into(),
        ));
    }

    let booking = Booking::find_by_id(&state.db, payment.booking_id)
        .await?
        .ok_or_else(|| {
            ApiError::BookingData(format!("booking details are incomplete for payment {payment_id}"))
        })?;
    principal.require_owner_or_admin(booking.user_id)?;

    renew_session(state, payment).await
}

/// Swap in a fresh checkout session and reopen the payment.
async fn renew_session(state: &AppState, payment: Payment) -> ApiResult<Payment> {
    let booking = Booking::find_by_id(&state.db, payment.booking_id)
        .await?
        .ok_or_else(|| {
            ApiError::BookingData(format!(
                "booking details are incomplete for payment {}",
                payment.id
            ))
        })?;
    let amount = booking_amount(state, &booking).await?;
    let session = state.checkout.create_session(booking.id, amount).await?;
    let url = session_url(&session)?;
    let renewed = Payment::update_session(&state.db, payment.id, &session.id, &url, amount).await?;
    info!(payment_id = %renewed.id, "payment session renewed");
    Ok(renewed)
}

/// Per-minute sweep. A failed remote lookup skips that payment instead of
/// aborting the batch. Returns how many payments lapsed.
pub async fn check_expired_payments(
    db: &PgPool,
    checkout: &dyn CheckoutProvider,
    now: i64,
) -> ApiResult<usize> {
    let pending = Payment::list_pending(db).await?;
    let mut expired = 0usize;
    for payment in pending {
        let session = match checkout.retrieve_session(&payment.session_id).await {
            Ok(session) => session,
            Err(e) => {
                warn!(payment_id = %payment.id, error = %e, "session lookup failed, skipping");
                continue;
            }
        };
        if session_lapsed(payment.status, session.expires_at, now) {
            Payment::set_status(db, payment.id, PaymentStatus::Expired).await?;
            expired += 1;
        }
    }
    if expired > 0 {
        info!(count = expired, "payment sessions marked as expired");
    }
    Ok(expired)
}

async fn booking_amount(state: &AppState, booking: &Booking) -> ApiResult<Decimal> {
    let accommodation = Accommodation::find_by_id(&state.db, booking.accommodation_id)
        .await?
        .ok_or_else(|| {
            ApiError::BookingData(format!(
                "booking details are incomplete: {}",
                booking.id
            ))
        })?;
    amount_due(
        accommodation.daily_rate,
        booking.check_in_date,
        booking.check_out_date,
    )
}

fn session_url(session: &crate::payments::stripe::CheckoutSession) -> ApiResult<String> {
    session
        .url
        .clone()
        .ok_or_else(|| ApiError::Session(format!("checkout session {} has no hosted url", session.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn seven_nights_at_150_costs_1050() {
        let rate: Decimal = "150.00".parse().unwrap();
        let amount = amount_due(rate, date!(2025 - 06 - 01), date!(2025 - 06 - 08)).unwrap();
        assert_eq!(amount, "1050.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn zero_or_negative_nights_are_rejected() {
        let rate: Decimal = "150.00".parse().unwrap();
        let same_day = amount_due(rate, date!(2025 - 06 - 01), date!(2025 - 06 - 01));
        assert!(matches!(same_day, Err(ApiError::BookingData(_))));
        let backwards = amount_due(rate, date!(2025 - 06 - 08), date!(2025 - 06 - 01));
        assert!(matches!(backwards, Err(ApiError::BookingData(_))));
    }

    #[test]
    fn missing_rate_is_rejected() {
        let result = amount_due(Decimal::ZERO, date!(2025 - 06 - 01), date!(2025 - 06 - 08));
        assert!(matches!(result, Err(ApiError::BookingData(_))));
    }

    #[test]
    fn cancellation_messages_match_status() {
        assert!(cancellation_message(PaymentStatus::Pending).contains("within 24 hours"));
        assert!(cancellation_message(PaymentStatus::Expired).contains("renew"));
        assert_eq!(
            cancellation_message(PaymentStatus::Paid),
            "Payment already processed."
        );
    }

    #[test]
    fn pending_sessions_lapse_once_past_expiry() {
        assert!(session_lapsed(PaymentStatus::Pending, Some(999), 1_000));
        assert!(!session_lapsed(PaymentStatus::Pending, Some(1_001), 1_000));
        assert!(!session_lapsed(PaymentStatus::Pending, None, 1_000));
    }

    #[test]
    fn paid_payments_never_lapse() {
        assert!(!session_lapsed(PaymentStatus::Paid, Some(0), 1_000));
    }
}
