/// Turns a validated booking request into a Stripe Checkout session and
/// registers the pending booking with the vendor in the background.

use booking_core::{pricing, Booking, CheckoutRequest};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::stripe::{CheckoutSessionParams, LineItem, StripeClient};
use crate::vendor::VendorClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: Option<String>,
}

#[derive(Clone)]
pub struct CheckoutService {
    stripe: Option<StripeClient>,
    vendor: VendorClient,
    public_url: String,
}

impl CheckoutService {
    /// `stripe` is `None` when no secret key is configured; every
    /// checkout then fails with a configuration error.
    pub fn new(stripe: Option<StripeClient>, vendor: VendorClient, public_url: String) -> Self {
        Self {
            stripe,
            vendor,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn session_params(&self, request: &CheckoutRequest) -> Result<CheckoutSessionParams, ApiError> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(ApiError::InvalidRequest(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let unit_amount = pricing::to_minor_units(request.amount)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid amount: {}", e)))?;
        if unit_amount <= 0 {
            return Err(ApiError::InvalidRequest(
                "Invalid amount: rounds to zero in minor units".to_string(),
            ));
        }
        let details = &request.booking_details;

        let success_url = request.success_url.clone().unwrap_or_else(|| {
            format!("{}/booking/success?session_id={{CHECKOUT_SESSION_ID}}", self.public_url)
        });
        let cancel_url = request
            .cancel_url
            .clone()
            .unwrap_or_else(|| format!("{}/book/{}", self.public_url, request.service_id));

        Ok(CheckoutSessionParams {
            line_item: LineItem {
                name: request.service_name.clone(),
                description: format!("Booking from {} to {}", details.start_date, details.end_date),
                image: details.image.clone(),
                currency: request.currency_or_default().to_lowercase(),
                unit_amount,
                quantity: 1,
            },
            customer_email: request.customer_email.trim().to_string(),
            success_url,
            cancel_url,
            metadata: vec![
                ("serviceId".to_string(), request.service_id.to_string()),
                (
                    "customerName".to_string(),
                    request.customer_name.clone().unwrap_or_default(),
                ),
                ("startDate".to_string(), details.start_date.to_string()),
                ("endDate".to_string(), details.end_date.to_string()),
                ("guests".to_string(), details.guests.to_string()),
                (
                    "specialRequests".to_string(),
                    details.special_requests.clone().unwrap_or_default(),
                ),
            ],
        })
    }

    pub async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutResponse, ApiError> {
        let params = self.session_params(request)?;
        let stripe = self
            .stripe
            .as_ref()
            .ok_or_else(|| ApiError::Config("STRIPE_SECRET_KEY is not set".to_string()))?;

        let session = stripe
            .create_checkout_session(&params)
            .await
            .map_err(|e| ApiError::UpstreamUnavailable(e.to_string()))?;

        tracing::info!(
            "Created checkout session {} for service {} ({} {})",
            session.id,
            request.service_id,
            params.line_item.unit_amount,
            params.line_item.currency
        );

        // The webhook confirms by session id, so the pending record is best effort
        let vendor = self.vendor.clone();
        let pending = Booking::pending(request, &session.id);
        tokio::spawn(async move {
            if let Err(e) = vendor.create_booking(&pending).await {
                tracing::warn!(
                    "Failed to register pending booking for session {:?}: {}",
                    pending.stripe_session_id,
                    e
                );
            }
        });

        Ok(CheckoutResponse {
            session_id: session.id,
            url: session.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VendorConfig;
    use booking_core::BookingDetails;
    use chrono::NaiveDate;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::time::Duration;

    fn vendor_at(url: &str) -> VendorClient {
        VendorClient::new(
            reqwest::Client::new(),
            VendorConfig {
                base_url: url.to_string(),
                api_key: None,
                use_mock_data: false,
            },
        )
    }

    fn villa_request(amount: f64) -> CheckoutRequest {
        CheckoutRequest {
            service_id: 1,
            service_name: "Galle Fort Heritage Villa".to_string(),
            amount,
            currency: Some("USD".to_string()),
            customer_email: "ana@example.com".to_string(),
            customer_name: Some("Ana Perera".to_string()),
            booking_details: BookingDetails {
                start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
                guests: 2,
                special_requests: None,
                image: None,
            },
            success_url: None,
            cancel_url: None,
        }
    }

    fn offline_service(stripe: Option<StripeClient>) -> CheckoutService {
        CheckoutService::new(stripe, vendor_at("http://127.0.0.1:9"), "http://localhost:3000/".to_string())
    }

    #[test]
    fn test_params_for_two_night_stay() {
        let params = offline_service(None).session_params(&villa_request(900.0)).unwrap();
        assert_eq!(params.line_item.unit_amount, 90000);
        assert_eq!(params.line_item.currency, "usd");
        assert_eq!(params.line_item.description, "Booking from 2025-03-01 to 2025-03-03");
        assert_eq!(
            params.success_url,
            "http://localhost:3000/booking/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(params.cancel_url, "http://localhost:3000/book/1");
        assert!(params
            .metadata
            .contains(&("specialRequests".to_string(), String::new())));
        assert!(params.metadata.contains(&("guests".to_string(), "2".to_string())));
    }

    #[test]
    fn test_half_cent_rounds_away_from_zero() {
        let params = offline_service(None).session_params(&villa_request(129.995)).unwrap();
        assert_eq!(params.line_item.unit_amount, 13000);
    }

    #[test]
    fn test_sub_cent_amount_rejected() {
        match offline_service(None).session_params(&villa_request(0.004)) {
            Err(ApiError::InvalidRequest(hint)) => assert!(hint.contains("Invalid amount")),
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
        let params = offline_service(None).session_params(&villa_request(0.005)).unwrap();
        assert_eq!(params.line_item.unit_amount, 1);
    }

    #[test]
    fn test_missing_fields_named() {
        let mut request = villa_request(0.0);
        request.customer_email = "  ".to_string();
        match offline_service(None).session_params(&request) {
            Err(ApiError::InvalidRequest(hint)) => {
                assert!(hint.contains("amount"));
                assert!(hint.contains("customerEmail"));
            }
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_stripe_key_is_config_error() {
        let result = offline_service(None).create_session(&villa_request(900.0)).await;
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[tokio::test]
    async fn test_create_session_registers_pending_booking() {
        let mut stripe_server = Server::new_async().await;
        let stripe_mock = stripe_server
            .mock("POST", "/v1/checkout/sessions")
            .match_body(Matcher::UrlEncoded(
                "line_items[0][price_data][unit_amount]".into(),
                "90000".into(),
            ))
            .with_status(200)
            .with_body(r#"{"id":"cs_test_900","url":"https://checkout.stripe.com/c/pay/cs_test_900"}"#)
            .create_async()
            .await;

        let mut vendor_server = Server::new_async().await;
        let pending_mock = vendor_server
            .mock("POST", "/api/public/bookings")
            .match_body(Matcher::PartialJson(json!({
                "serviceId": 1,
                "stripeSessionId": "cs_test_900",
                "status": "pending",
                "paymentStatus": "pending",
                "guestsCount": 2
            })))
            .with_status(201)
            .create_async()
            .await;

        let stripe = StripeClient::new(reqwest::Client::new(), "sk_test".to_string(), stripe_server.url());
        let service = CheckoutService::new(
            Some(stripe),
            vendor_at(&vendor_server.url()),
            "http://localhost:3000".to_string(),
        );

        let response = service.create_session(&villa_request(900.0)).await.unwrap();
        stripe_mock.assert_async().await;
        assert_eq!(response.session_id, "cs_test_900");
        assert_eq!(
            response.url.as_deref(),
            Some("https://checkout.stripe.com/c/pay/cs_test_900")
        );

        // Registration runs on a spawned task
        for _ in 0..50 {
            if pending_mock.matched_async().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        pending_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_stripe_failure_is_upstream_error() {
        let mut stripe_server = Server::new_async().await;
        let _mock = stripe_server
            .mock("POST", "/v1/checkout/sessions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid API Key provided"}}"#)
            .create_async()
            .await;

        let stripe = StripeClient::new(reqwest::Client::new(), "sk_bad".to_string(), stripe_server.url());
        let result = offline_service(Some(stripe)).create_session(&villa_request(900.0)).await;
        assert!(matches!(result, Err(ApiError::UpstreamUnavailable(_))));
    }
}
