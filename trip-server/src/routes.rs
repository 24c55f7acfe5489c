/// HTTP surface of the trip server

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use booking_core::{
    package::{self, PackageQuote},
    Booking, CartItem, ChatMessage, CheckoutRequest, SearchFilters, Service,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::chat::{ChatOrchestrator, TurnStatus};
use crate::checkout::{CheckoutResponse, CheckoutService};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::stripe::{StripeClient, SIGNATURE_HEADER};
use crate::vendor::VendorClient;
use crate::webhook::{WebhookAck, WebhookHandler};

pub const LOOKUP_NOT_FOUND: &str = "Booking not found. Please check your details.";

/// Shared, immutable per-process state
#[derive(Clone)]
pub struct AppState {
    pub vendor: VendorClient,
    pub chat: ChatOrchestrator,
    pub checkout: CheckoutService,
    pub webhooks: WebhookHandler,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let vendor = VendorClient::new(client.clone(), config.vendor.clone());
        let stripe = config.stripe.secret_key.clone().map(|key| {
            StripeClient::new(client.clone(), key, config.stripe.api_base.clone())
        });

        Ok(Self {
            chat: ChatOrchestrator::new(client, config.llm.clone(), vendor.clone()),
            checkout: CheckoutService::new(stripe, vendor.clone(), config.public_url.clone()),
            webhooks: WebhookHandler::new(
                vendor.clone(),
                config.stripe.webhook_secret.clone(),
                config.stripe.signature_tolerance,
            ),
            vendor,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/checkout", post(checkout))
        .route("/api/webhooks/stripe", post(stripe_webhook))
        .route("/api/services", get(list_services))
        .route("/api/services/:id", get(get_service))
        .route("/api/search", get(search))
        .route("/api/availability", get(availability))
        .route("/api/bookings/lookup", get(lookup_booking))
        .route("/api/packages/quote", post(package_quote))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    #[serde(default)]
    cart: Option<Vec<CartItem>>,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid request format" })),
        )
            .into_response();
    };

    let cart = request.cart.unwrap_or_default();
    let turn = state.chat.respond(&request.messages, &cart).await;
    let status = match turn.status {
        TurnStatus::Answered => StatusCode::OK,
        TurnStatus::Degraded => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(turn.reply)).into_response()
}

async fn checkout(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;
    Ok(Json(state.checkout.create_session(&request).await?))
}

async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    Ok(Json(state.webhooks.handle(&body, signature).await?))
}

async fn list_services(State(state): State<Arc<AppState>>) -> Json<Vec<Service>> {
    Json(state.vendor.list_services().await)
}

async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Service>, ApiError> {
    state
        .vendor
        .get_service(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Service {} not found", id)))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<SearchFilters>,
) -> Json<Vec<Service>> {
    Json(state.vendor.search_services(&filters).await)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityParams {
    service_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

async fn availability(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if params.end_date <= params.start_date {
        return Err(ApiError::InvalidRequest(
            "Check-out date must be after check-in date".to_string(),
        ));
    }
    let available = state
        .vendor
        .check_availability(
            params.service_id,
            &params.start_date.to_string(),
            &params.end_date.to_string(),
        )
        .await;
    Ok(Json(json!({ "available": available })))
}

#[derive(Debug, Deserialize)]
struct LookupParams {
    #[serde(default)]
    email: String,
    #[serde(default)]
    reference: String,
}

async fn lookup_booking(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Booking>, ApiError> {
    let email = params.email.trim();
    let reference = params.reference.trim();
    if email.is_empty() || reference.is_empty() {
        return Err(ApiError::InvalidRequest(
            "Please enter both email and booking reference".to_string(),
        ));
    }

    match state.vendor.lookup_booking(email, reference).await {
        Ok(Some(booking)) => Ok(Json(booking)),
        Ok(None) => Err(ApiError::NotFound(LOOKUP_NOT_FOUND.to_string())),
        Err(e) => {
            tracing::warn!("Booking lookup for {} failed: {}", reference, e);
            Err(ApiError::NotFound(LOOKUP_NOT_FOUND.to_string()))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteRequest {
    service_ids: Vec<u64>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
}

async fn package_quote(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<PackageQuote>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;

    let catalog = state.vendor.list_services().await;
    let mut selected = Vec::with_capacity(request.service_ids.len());
    for id in &request.service_ids {
        let service = booking_core::catalog::find(&catalog, *id)
            .ok_or_else(|| ApiError::NotFound(format!("Service {} not found", id)))?;
        selected.push(service);
    }

    Ok(Json(package::quote(&selected, request.start_date, request.end_date)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let config = AppConfig::from_lookup(|key| match key {
            "USE_MOCK_DATA" => Some("true".to_string()),
            "VENDOR_API_URL" => Some("http://127.0.0.1:9".to_string()),
            "STRIPE_WEBHOOK_SECRET" => Some("whsec_test".to_string()),
            _ => None,
        })
        .unwrap();
        router(Arc::new(AppState::from_config(&config).unwrap()))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(test_app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_services_from_fallback_catalog() {
        let (status, body) = send(test_app(), get("/api/services")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(8));

        let (status, body) = send(test_app(), get("/api/services/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["basePrice"], 450.0);

        let (status, _) = send(test_app(), get("/api/services/999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_filters_by_type() {
        let (status, body) = send(test_app(), get("/api/search?type=stays&location=galle")).await;
        assert_eq!(status, StatusCode::OK);
        let results = body.as_array().unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|s| s["type"] == "stays"));
    }

    #[tokio::test]
    async fn test_availability_requires_ordered_dates() {
        let (status, _) = send(
            test_app(),
            get("/api/availability?serviceId=1&startDate=2025-03-03&endDate=2025-03-01"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            test_app(),
            get("/api/availability?serviceId=1&startDate=2025-03-01&endDate=2025-03-03"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["available"], true);
    }

    #[tokio::test]
    async fn test_chat_rejects_malformed_body() {
        let (status, body) = send(test_app(), post_json("/api/chat", r#"{"messages":"hi"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request format");
    }

    #[tokio::test]
    async fn test_chat_without_llm_key_degrades() {
        let (status, body) = send(
            test_app(),
            post_json("/api/chat", r#"{"messages":[{"role":"user","content":"hi"}]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], crate::chat::FALLBACK_REPLY);
        assert_eq!(body["services"], json!([]));
    }

    #[tokio::test]
    async fn test_checkout_validation_and_config() {
        let (status, body) = send(test_app(), post_json("/api/checkout", r#"{"serviceId":1}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("serviceName"));

        let request = json!({
            "serviceId": 1,
            "serviceName": "Galle Fort Heritage Villa",
            "amount": 900,
            "customerEmail": "ana@example.com",
            "bookingDetails": { "startDate": "2025-03-01", "endDate": "2025-03-03", "guests": 2 }
        });
        let (status, _) = send(test_app(), post_json("/api/checkout", &request.to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_webhook_requires_signature_header() {
        let (status, body) = send(test_app(), post_json("/api/webhooks/stripe", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No signature provided");

        let request = Request::builder()
            .method("POST")
            .uri("/api/webhooks/stripe")
            .header(SIGNATURE_HEADER, "t=1,v1=deadbeef")
            .body(Body::from("{}"))
            .unwrap();
        let (status, _) = send(test_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_lookup_requires_both_fields() {
        let (status, body) = send(test_app(), get("/api/bookings/lookup?email=ana@example.com")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please enter both email and booking reference");
    }

    #[tokio::test]
    async fn test_lookup_failure_reads_as_not_found() {
        let (status, body) = send(
            test_app(),
            get("/api/bookings/lookup?email=ana%40example.com&reference=IL-1"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], LOOKUP_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_package_quote_discount() {
        let (status, body) = send(
            test_app(),
            post_json(
                "/api/packages/quote",
                r#"{"serviceIds":[1,2,3],"startDate":"2025-03-01","endDate":"2025-03-03"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nights"], 2);
        assert_eq!(body["discountRate"], 0.10);

        let (status, body) = send(test_app(), post_json("/api/packages/quote", r#"{"serviceIds":[2,2,2]}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["discountRate"], 0.0);
        assert_eq!(body["total"], 85.0);

        let (status, _) = send(test_app(), post_json("/api/packages/quote", r#"{"serviceIds":[404]}"#)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
