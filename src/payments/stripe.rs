use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::StripeConfig;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("checkout provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("checkout provider returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("amount {0} cannot be represented in cents")]
    InvalidAmount(Decimal),
}

/// The slice of a hosted checkout session this app cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    /// Unix timestamp after which the hosted session is gone.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// Seam for the external payment-session provider.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_session(
        &self,
        booking_id: Uuid,
        amount: Decimal,
    ) -> Result<CheckoutSession, CheckoutError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, CheckoutError>;
}

/// Stripe Checkout over its form-encoded REST API.
pub struct StripeCheckout {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
    success_url: String,
    cancel_url: String,
}

impl StripeCheckout {
    pub fn new(cfg: &StripeConfig, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: cfg.secret_key.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            success_url: callback_url(base_url, "success"),
            cancel_url: callback_url(base_url, "cancel"),
        }
    }

    async fn parse(resp: reqwest::Response) -> Result<CheckoutSession, CheckoutError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CheckoutError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<CheckoutSession>().await?)
    }
}

/// Redirect target carrying the provider's session-id placeholder.
fn callback_url(base_url: &str, outcome: &str) -> String {
    format!(
        "{}/payments/{outcome}?sessionId={{CHECKOUT_SESSION_ID}}",
        base_url.trim_end_matches('/')
    )
}

pub(crate) fn amount_in_cents(amount: Decimal) -> Result<i64, CheckoutError> {
    (amount * Decimal::from(100))
        .to_i64()
        .ok_or(CheckoutError::InvalidAmount(amount))
}

#[async_trait]
impl CheckoutProvider for StripeCheckout {
    async fn create_session(
        &self,
        booking_id: Uuid,
        amount: Decimal,
    ) -> Result<CheckoutSession, CheckoutError> {
        let cents = amount_in_cents(amount)?;
        let params = [
            ("mode", "payment".to_string()),
            ("success_url", self.success_url.clone()),
            ("cancel_url", self.cancel_url.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            ("line_items[0][price_data][unit_amount]", cents.to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                format!("Booking payment for {booking_id}"),
            ),
        ];
        let resp = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;
        let session = Self::parse(resp).await?;
        debug!(booking_id = %booking_id, session_id = %session.id, "checkout session created");
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, CheckoutError> {
        let resp = self
            .http
            .get(format!("{}/v1/checkout/sessions/{session_id}", self.api_base))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        Self::parse(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_convert_to_whole_cents() {
        let amount: Decimal = "1050.00".parse().unwrap();
        assert_eq!(amount_in_cents(amount).unwrap(), 105_000);
        let amount: Decimal = "85.50".parse().unwrap();
        assert_eq!(amount_in_cents(amount).unwrap(), 8_550);
    }

    #[test]
    fn callback_urls_keep_the_session_placeholder() {
        let url = callback_url("http://localhost:8080/", "success");
        assert_eq!(
            url,
            "http://localhost:8080/payments/success?sessionId={CHECKOUT_SESSION_ID}"
        );
    }
}
