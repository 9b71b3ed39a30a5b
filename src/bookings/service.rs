use sqlx::PgPool;
use time::{Date, Duration, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::accommodations::repo::Accommodation;
use crate::auth::policy::Principal;
use crate::bookings::dto::{BookingRequest, BookingSearchParams, BookingUpdateRequest};
use crate::bookings::repo::{Booking, BookingStatus};
use crate::error::{ApiError, ApiResult};
use crate::notifications::Notification;
use crate::payments::repo::Payment;
use crate::state::AppState;

/// Inclusive-boundary overlap: two stays conflict when they share any day,
/// including a single shared boundary day.
pub fn ranges_overlap(a_in: Date, a_out: Date, b_in: Date, b_out: Date) -> bool {
    a_in <= b_out && b_in <= a_out
}

fn validate_dates(today: Date, check_in: Date, check_out: Date) -> Result<(), ApiError> {
    if check_in <= today {
        return Err(ApiError::Validation("check-in date must be in the future".into()));
    }
    if check_out <= check_in {
        return Err(ApiError::Validation(
            "check-out date must be after the check-in date".into(),
        ));
    }
    Ok(())
}

/// A booking expires once its check-out date is more than a day in the past.
pub fn expiry_threshold(today: Date) -> Date {
    today - Duration::days(1)
}

/// Conflict check against every non-canceled booking of the accommodation.
/// The database exclusion constraint closes the remaining insert race.
async fn ensure_no_overlap(
    db: &PgPool,
    accommodation_id: Uuid,
    check_in: Date,
    check_out: Date,
    exclude: Option<Uuid>,
) -> ApiResult<()> {
    let existing = Booking::find_active_for_accommodation(db, accommodation_id).await?;
    let conflict = existing
        .iter()
        .filter(|b| Some(b.id) != exclude)
        .any(|b| ranges_overlap(b.check_in_date, b.check_out_date, check_in, check_out));
    if conflict {
        return Err(ApiError::Conflict(format!(
            "accommodation {accommodation_id} is already booked from {check_in} to {check_out}"
        )));
    }
    Ok(())
}

pub async fn create_booking(
    state: &AppState,
    user_id: Uuid,
    req: BookingRequest,
) -> ApiResult<Booking> {
    let today = OffsetDateTime::now_utc().date();
    validate_dates(today, req.check_in_date, req.check_out_date)?;

    Accommodation::find_by_id(&state.db, req.accommodation_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("accommodation not found: {}", req.accommodation_id))
        })?;

    // A user with an unfinished checkout session may not book again.
    if Payment::user_has_pending(&state.db, user_id).await? {
        return Err(ApiError::Conflict(
            "complete your pending payment before creating a new booking".into(),
        ));
    }

    ensure_no_overlap(
        &state.db,
        req.accommodation_id,
        req.check_in_date,
        req.check_out_date,
        None,
    )
    .await?;

    let booking = Booking::insert(
        &state.db,
        user_id,
        req.accommodation_id,
        req.check_in_date,
        req.check_out_date,
    )
    .await?;

    state.notifier.send(Notification::BookingCreated { id: booking.id });
    info!(booking_id = %booking.id, user_id = %user_id, "booking created");
    Ok(booking)
}

pub async fn get_booking(state: &AppState, principal: &Principal, id: Uuid) -> ApiResult<Booking> {
    let booking = find_booking(&state.db, id).await?;
    principal.require_owner_or_admin(booking.user_id)?;
    Ok(booking)
}

/// Admin-only listing across users.
pub async fn list_bookings(
    state: &AppState,
    principal: &Principal,
    filter: BookingSearchParams,
    limit: i64,
    offset: i64,
) -> ApiResult<Vec<Booking>> {
    principal.require_admin()?;
    let rows =
        Booking::list_filtered(&state.db, filter.user_id, filter.status, limit, offset).await?;
    Ok(rows)
}

pub async fn my_bookings(
    state: &AppState,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> ApiResult<Vec<Booking>> {
    let rows = Booking::list_by_user(&state.db, user_id, limit, offset).await?;
    Ok(rows)
}

pub async fn update_booking(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    req: BookingUpdateRequest,
) -> ApiResult<Booking> {
    let booking = find_booking(&state.db, id).await?;
    principal.require_owner_or_admin(booking.user_id)?;

    if booking.status == BookingStatus::Canceled {
        return Err(ApiError::Conflict(format!(
            "cannot update a canceled booking: {id}"
        )));
    }

    let today = OffsetDateTime::now_utc().date();
    validate_dates(today, req.check_in_date, req.check_out_date)?;
    ensure_no_overlap(
        &state.db,
        booking.accommodation_id,
        req.check_in_date,
        req.check_out_date,
        Some(booking.id),
    )
    .await?;

    let updated = Booking::update_dates(&state.db, id, req.check_in_date, req.check_out_date).await?;
    info!(booking_id = %id, "booking rescheduled");
    Ok(updated)
}

pub async fn cancel_booking(state: &AppState, principal: &Principal, id: Uuid) -> ApiResult<()> {
    let booking = find_booking(&state.db, id).await?;
    principal.require_owner_or_admin(booking.user_id)?;

    if booking.status == BookingStatus::Canceled {
        return Err(ApiError::Conflict(format!(
            "booking {id} has already been canceled"
        )));
    }

    Booking::set_status(&state.db, id, BookingStatus::Canceled).await?;
    state.notifier.send(Notification::BookingCanceled { id });
    info!(booking_id = %id, "booking canceled");
    Ok(())
}

/// Daily sweep. Returns the rows it flipped so the caller can notify about them.
pub async fn mark_bookings_as_expired(db: &PgPool, today: Date) -> ApiResult<Vec<Booking>> {
    let expired = Booking::mark_expired_before(db, expiry_threshold(today)).await?;
    if !expired.is_empty() {
        info!(count = expired.len(), "bookings marked as expired");
    }
    Ok(expired)
}

async fn find_booking(db: &PgPool, id: Uuid) -> ApiResult<Booking> {
    Booking::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("booking not found: {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn overlapping_ranges_conflict() {
        // second stay starts inside the first
        assert!(ranges_overlap(
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 07),
            date!(2025 - 06 - 05),
            date!(2025 - 06 - 10),
        ));
        // new range fully contains the existing one
        assert!(ranges_overlap(
            date!(2025 - 06 - 03),
            date!(2025 - 06 - 04),
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 10),
        ));
    }

    #[test]
    fn shared_boundary_day_conflicts() {
        assert!(ranges_overlap(
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 07),
            date!(2025 - 06 - 07),
            date!(2025 - 06 - 09),
        ));
    }

    #[test]
    fn disjoint_ranges_do_not_conflict() {
        assert!(!ranges_overlap(
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 07),
            date!(2025 - 07 - 01),
            date!(2025 - 07 - 07),
        ));
    }

    #[test]
    fn dates_must_be_future_and_ordered() {
        let today = date!(2025 - 06 - 10);
        assert!(validate_dates(today, date!(2025 - 06 - 11), date!(2025 - 06 - 12)).is_ok());
        // check-in today is not "future"
        assert!(validate_dates(today, today, date!(2025 - 06 - 12)).is_err());
        assert!(validate_dates(today, date!(2025 - 06 - 09), date!(2025 - 06 - 12)).is_err());
        assert!(validate_dates(today, date!(2025 - 06 - 12), date!(2025 - 06 - 12)).is_err());
        assert!(validate_dates(today, date!(2025 - 06 - 12), date!(2025 - 06 - 11)).is_err());
    }

    #[test]
    fn expiry_threshold_is_yesterday() {
        let today = date!(2025 - 06 - 10);
        let threshold = expiry_threshold(today);
        assert_eq!(threshold, date!(2025 - 06 - 09));
        // a stay that checked out on 2025-06-01 qualifies for the sweep
        assert!(date!(2025 - 06 - 01) < threshold);
        // yesterday's check-out does not qualify yet
        assert!(!(date!(2025 - 06 - 09) < threshold));
    }
}
