use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::interval;
use tracing::error;

use crate::bookings;
use crate::notifications::Notification;
use crate::payments;
use crate::state::AppState;

const BOOKING_SWEEP_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);
const PAYMENT_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Spawn the daily booking-expiry sweep and the per-minute payment-session sweep.
pub fn spawn(state: &AppState) {
    let s = state.clone();
    tokio::spawn(async move {
        booking_expiry_loop(s).await;
    });
    let s = state.clone();
    tokio::spawn(async move {
        payment_expiry_loop(s).await;
    });
}

async fn booking_expiry_loop(state: AppState) {
    let mut tick = interval(BOOKING_SWEEP_PERIOD);
    loop {
        tick.tick().await;
        let today = OffsetDateTime::now_utc().date();
        match bookings::service::mark_bookings_as_expired(&state.db, today).await {
            Ok(expired) if expired.is_empty() => {
                state.notifier.send(Notification::NoExpiredBookings);
            }
            Ok(expired) => {
                for booking in expired {
                    state.notifier.send(Notification::BookingExpired {
                        id: booking.id,
                        check_out: booking.check_out_date,
                    });
                }
            }
            Err(e) => error!(error = %e, "booking expiry sweep failed"),
        }
    }
}

async fn payment_expiry_loop(state: AppState) {
    let mut tick = interval(PAYMENT_SWEEP_PERIOD);
    loop {
        tick.tick().await;
        let now = OffsetDateTime::now_utc().unix_timestamp();
        if let Err(e) =
            payments::service::check_expired_payments(&state.db, state.checkout.as_ref(), now).await
        {
            error!(error = %e, "payment expiry sweep failed");
        }
    }
}
