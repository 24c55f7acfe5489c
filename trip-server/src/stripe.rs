/// Stripe Checkout client and webhook signature verification

use anyhow::{anyhow, Result};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// One priced line on the hosted payment page
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    /// Lowercase ISO currency code
    pub currency: String,
    pub unit_amount: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionParams {
    pub line_item: LineItem,
    pub customer_email: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: Vec<(String, String)>,
}

impl CheckoutSessionParams {
    /// Form fields in Stripe's bracketed-key encoding
    pub fn to_form(&self) -> Vec<(String, String)> {
        let item = &self.line_item;
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            ("customer_email".to_string(), self.customer_email.clone()),
            ("line_items[0][quantity]".to_string(), item.quantity.to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                item.currency.to_lowercase(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                item.unit_amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                item.name.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]".to_string(),
                item.description.clone(),
            ),
        ];
        if let Some(image) = &item.image {
            form.push((
                "line_items[0][price_data][product_data][images][0]".to_string(),
                image.clone(),
            ));
        }
        for (key, value) in &self.metadata {
            form.push((format!("metadata[{}]", key), value.clone()));
        }
        form
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(client: reqwest::Client, secret_key: String, api_base: String) -> Self {
        Self {
            client,
            secret_key,
            api_base,
        }
    }

    pub async fn create_checkout_session(&self, params: &CheckoutSessionParams) -> Result<CheckoutSession> {
        let url = format!("{}/v1/checkout/sessions", self.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&params.to_form())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(anyhow!("Stripe API error ({}): {}", status, message));
        }

        Ok(response.json::<CheckoutSession>().await?)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("malformed signature header")]
    MalformedHeader,
    #[error("timestamp outside the tolerance zone")]
    TimestampOutOfTolerance,
    #[error("no signatures found matching the expected signature for payload")]
    NoMatch,
    #[error("webhook secret is not configured")]
    MissingSecret,
    #[error("invalid webhook secret")]
    InvalidSecret,
}

/// Splits `t=...,v1=...,v1=...` into the timestamp and every v1 signature.
/// Other schemes (v0) are ignored.
pub fn parse_signature_header(header: &str) -> Result<(i64, Vec<String>), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" if !value.is_empty() => signatures.push(value.to_string()),
            _ => {}
        }
    }

    match timestamp {
        Some(t) if !signatures.is_empty() => Ok((t, signatures)),
        _ => Err(SignatureError::MalformedHeader),
    }
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::MissingSecret);
    }
    let (timestamp, signatures) = parse_signature_header(header)?;
    let expected = compute_signature(secret, timestamp, payload)?;

    let matched = signatures
        .iter()
        .any(|candidate| bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())));
    if !matched {
        return Err(SignatureError::NoMatch);
    }

    if tolerance_secs > 0 && now - timestamp > tolerance_secs {
        return Err(SignatureError::TimestampOutOfTolerance);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error("invalid event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Verifies the signature, then parses the event
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<WebhookEvent, EventError> {
    verify_signature(payload, header, secret, tolerance_secs, now)?;
    Ok(serde_json::from_slice(payload)?)
}
