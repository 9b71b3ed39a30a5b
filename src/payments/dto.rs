use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payments::repo::PaymentStatus;

/// Request body for initiating a payment.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub booking_id: Uuid,
}

/// The provider redirects back with `?sessionId=`.
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentListParams {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CanceledPaymentResponse {
    pub session_id: String,
    pub status: PaymentStatus,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_query_uses_the_provider_param_name() {
        let q: SessionQuery = serde_json::from_str(r#"{"sessionId": "cs_test_123"}"#).unwrap();
        assert_eq!(q.session_id, "cs_test_123");
    }
}
