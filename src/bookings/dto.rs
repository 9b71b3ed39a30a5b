use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::bookings::repo::BookingStatus;

/// Request body for creating a booking.
#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub check_in_date: Date,
    pub check_out_date: Date,
    pub accommodation_id: Uuid,
}

/// Request body for rescheduling a booking. The accommodation stays fixed.
#[derive(Debug, Deserialize)]
pub struct BookingUpdateRequest {
    pub check_in_date: Date,
    pub check_out_date: Date,
}

/// Admin filter: optional user × optional status, ANDed together.
#[derive(Debug, Default, Deserialize)]
pub struct BookingSearchParams {
    pub user_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn booking_request_parses_iso_dates() {
        let body = r#"{
            "check_in_date": "2025-06-01",
            "check_out_date": "2025-06-07",
            "accommodation_id": "7f0e01c0-9f1e-4a6e-bb1a-111111111111"
        }"#;
        let req: BookingRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.check_in_date, date!(2025 - 06 - 01));
        assert_eq!(req.check_out_date, date!(2025 - 06 - 07));
    }

    #[test]
    fn search_params_accept_status_names() {
        let params: BookingSearchParams =
            serde_json::from_str(r#"{"status": "PENDING"}"#).unwrap();
        assert_eq!(params.status, Some(BookingStatus::Pending));
        assert_eq!(params.user_id, None);
    }
}
