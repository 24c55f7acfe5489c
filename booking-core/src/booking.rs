use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Booking lifecycle as tracked by the vendor backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

/// Stay/usage details collected by the booking wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Body of `POST /api/checkout`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub service_id: u64,
    pub service_name: String,
    /// Already-computed total in major currency units
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub customer_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub booking_details: BookingDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
}

impl CheckoutRequest {
    /// Required fields that are present on the wire but empty.
    /// A zero id, a non-positive amount and blank strings all count as missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.service_id == 0 {
            missing.push("serviceId");
        }
        if self.service_name.trim().is_empty() {
            missing.push("serviceName");
        }
        if !(self.amount.is_finite() && self.amount > 0.0) {
            missing.push("amount");
        }
        if self.customer_email.trim().is_empty() {
            missing.push("customerEmail");
        }
        missing
    }

    pub fn currency_or_default(&self) -> String {
        self.currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("USD")
            .to_string()
    }
}

/// A booking record as exchanged with the vendor backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub service_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default)]
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests_count: u32,
    pub total_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_session_id: Option<String>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
}

impl Booking {
    /// The pending record registered right after a payment session opens
    pub fn pending(request: &CheckoutRequest, stripe_session_id: &str) -> Self {
        Self {
            id: None,
            reference: None,
            service_id: request.service_id,
            service_name: Some(request.service_name.clone()),
            customer_name: request.customer_name.clone().unwrap_or_default(),
            customer_email: request.customer_email.clone(),
            customer_phone: None,
            start_date: request.booking_details.start_date,
            end_date: request.booking_details.end_date,
            guests_count: request.booking_details.guests,
            total_price: request.amount,
            special_requests: request.booking_details.special_requests.clone(),
            stripe_session_id: Some(stripe_session_id.to_string()),
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
        }
    }
}

/// Status change requested from the vendor backend, keyed by Stripe session.
/// Re-sending the same transition is a no-op on the vendor side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingTransition {
    pub stripe_session_id: String,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_payment_intent_id: Option<String>,
}

impl BookingTransition {
    pub fn confirmed(stripe_session_id: &str, payment_intent_id: Option<String>) -> Self {
        Self {
            stripe_session_id: stripe_session_id.to_string(),
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Paid,
            stripe_payment_intent_id: payment_intent_id,
        }
    }

    pub fn cancelled(stripe_session_id: &str) -> Self {
        Self {
            stripe_session_id: stripe_session_id.to_string(),
            status: BookingStatus::Cancelled,
            payment_status: PaymentStatus::Failed,
            stripe_payment_intent_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> CheckoutRequest {
        serde_json::from_value(json!({
            "serviceId": 1,
            "serviceName": "Luxury Beach Villa - Galle",
            "amount": 900,
            "currency": "USD",
            "customerEmail": "ana@example.com",
            "customerName": "Ana Perera",
            "bookingDetails": {
                "startDate": "2025-03-01",
                "endDate": "2025-03-03",
                "guests": 2
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_checkout_request_requires_booking_details() {
        let parsed = serde_json::from_value::<CheckoutRequest>(json!({
            "serviceId": 1,
            "serviceName": "Villa",
            "amount": 900,
            "customerEmail": "ana@example.com"
        }));
        let err = parsed.unwrap_err().to_string();
        assert!(err.contains("bookingDetails"), "{}", err);
    }

    #[test]
    fn test_missing_fields_flags_empty_values() {
        let mut req = request();
        assert!(req.missing_fields().is_empty());

        req.service_id = 0;
        req.service_name = "  ".to_string();
        req.amount = 0.0;
        req.customer_email = String::new();
        assert_eq!(
            req.missing_fields(),
            vec!["serviceId", "serviceName", "amount", "customerEmail"]
        );
    }

    #[test]
    fn test_currency_defaults_to_usd() {
        let mut req = request();
        req.currency = None;
        assert_eq!(req.currency_or_default(), "USD");
        req.currency = Some("lkr".to_string());
        assert_eq!(req.currency_or_default(), "lkr");
    }

    #[test]
    fn test_pending_booking_wire_shape() {
        let booking = Booking::pending(&request(), "cs_test_1");
        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["stripeSessionId"], "cs_test_1");
        assert_eq!(value["guestsCount"], 2);
        assert_eq!(value["totalPrice"], 900.0);
        assert_eq!(value["startDate"], "2025-03-01");
        assert_eq!(value["status"], "pending");
        assert_eq!(value["paymentStatus"], "pending");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_transition_bodies() {
        let cancel = serde_json::to_value(BookingTransition::cancelled("cs_test_123")).unwrap();
        assert_eq!(
            cancel,
            json!({"stripeSessionId": "cs_test_123", "status": "cancelled", "paymentStatus": "failed"})
        );

        let confirm = serde_json::to_value(BookingTransition::confirmed(
            "cs_test_123",
            Some("pi_1".to_string()),
        ))
        .unwrap();
        assert_eq!(confirm["status"], "confirmed");
        assert_eq!(confirm["paymentStatus"], "paid");
        assert_eq!(confirm["stripePaymentIntentId"], "pi_1");
    }
}
