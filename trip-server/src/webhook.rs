/// Stripe webhook processing
///
/// Once the signature checks out the event is always acknowledged; vendor
/// failures are logged and left for reconciliation so Stripe does not retry.

use booking_core::BookingTransition;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::ApiError;
use crate::stripe::{self, EventError};
use crate::vendor::VendorClient;

pub const SESSION_COMPLETED: &str = "checkout.session.completed";
pub const SESSION_EXPIRED: &str = "checkout.session.expired";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

#[derive(Clone)]
pub struct WebhookHandler {
    vendor: VendorClient,
    secret: Option<String>,
    tolerance: Duration,
}

/// `payment_intent` arrives either as an id or as an expanded object
fn payment_intent_id(session: &Value) -> Option<String> {
    match session.get("payment_intent") {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Object(intent)) => intent.get("id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

impl WebhookHandler {
    pub fn new(vendor: VendorClient, secret: Option<String>, tolerance: Duration) -> Self {
        Self {
            vendor,
            secret,
            tolerance,
        }
    }

    pub async fn handle(&self, payload: &[u8], signature: Option<&str>) -> Result<WebhookAck, ApiError> {
        self.handle_at(payload, signature, chrono::Utc::now().timestamp()).await
    }

    pub async fn handle_at(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: i64,
    ) -> Result<WebhookAck, ApiError> {
        let signature = signature
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::InvalidRequest("No signature provided".to_string()))?;
        let secret = self.secret.as_deref().unwrap_or_default();

        let event = stripe::construct_event(
            payload,
            signature,
            secret,
            self.tolerance.as_secs() as i64,
            now,
        )
        .map_err(|e| match e {
            EventError::Signature(e) => {
                tracing::warn!("Webhook signature verification failed: {}", e);
                ApiError::SignatureInvalid(e.to_string())
            }
            EventError::Payload(e) => ApiError::InvalidRequest(format!("Webhook Error: {}", e)),
        })?;

        let session = &event.data.object;
        let session_id = session
            .get("id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty());

        let session_id = match (event.event_type.as_str(), session_id) {
            (SESSION_COMPLETED | SESSION_EXPIRED, None) => {
                tracing::warn!(
                    "Webhook event {} ({}) carries no session id; skipping vendor update",
                    event.id,
                    event.event_type
                );
                return Ok(WebhookAck { received: true });
            }
            (_, id) => id.unwrap_or_default(),
        };

        match event.event_type.as_str() {
            SESSION_COMPLETED => {
                tracing::info!("Checkout session completed: {}", session_id);
                let transition = BookingTransition::confirmed(session_id, payment_intent_id(session));
                if let Err(e) = self.vendor.confirm_booking(&transition).await {
                    tracing::error!("Failed to confirm booking for session {}: {}", session_id, e);
                }
            }
            SESSION_EXPIRED => {
                tracing::info!("Checkout session expired: {}", session_id);
                let transition = BookingTransition::cancelled(session_id);
                if let Err(e) = self.vendor.cancel_booking(&transition).await {
                    tracing::error!("Failed to cancel booking for session {}: {}", session_id, e);
                }
            }
            other => {
                tracing::debug!("Ignoring webhook event {} ({})", event.id, other);
            }
        }

        Ok(WebhookAck { received: true })
    }
}
