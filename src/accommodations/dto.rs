use rust_decimal::Decimal;
use serde::Deserialize;

use crate::accommodations::repo::AccommodationKind;

/// Request body for creating or replacing an accommodation.
#[derive(Debug, Deserialize)]
pub struct AccommodationRequest {
    #[serde(rename = "type")]
    pub kind: AccommodationKind,
    pub location: String,
    pub size: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub daily_rate: Decimal,
    pub availability: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_type_field_and_defaults_amenities() {
        let body = r#"{
            "type": "APARTMENT",
            "location": "Kyiv, Khreshchatyk 1",
            "size": "2 bedroom",
            "daily_rate": "85.50",
            "availability": 3
        }"#;
        let req: AccommodationRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.kind, AccommodationKind::Apartment);
        assert!(req.amenities.is_empty());
        assert_eq!(req.daily_rate, "85.50".parse::<Decimal>().unwrap());
    }
}
