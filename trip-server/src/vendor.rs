/// Client for the IslandLoaf vendor backend
///
/// Catalog reads never fail from the caller's point of view: any upstream
/// problem (or mock mode) falls back to the built-in catalog. Booking writes
/// report failure to the caller, who decides whether it matters.

use anyhow::{anyhow, Result};
use booking_core::{catalog, Booking, BookingTransition, SearchFilters, Service};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::VendorConfig;

#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    available: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityQuery<'a> {
    service_id: u64,
    start_date: &'a str,
    end_date: &'a str,
}

#[derive(Debug, Serialize)]
struct LookupQuery<'a> {
    email: &'a str,
    reference: &'a str,
}

#[derive(Clone)]
pub struct VendorClient {
    client: reqwest::Client,
    config: VendorConfig,
}

impl VendorClient {
    pub fn new(client: reqwest::Client, config: VendorConfig) -> Self {
        Self { client, config }
    }

    pub fn uses_mock_data(&self) -> bool {
        self.config.use_mock_data
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key.as_deref() {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = self.authorized(request).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("vendor API returned {}", response.status()));
        }
        Ok(response.json::<T>().await?)
    }

    pub async fn list_services(&self) -> Vec<Service> {
        if self.config.use_mock_data {
            tracing::debug!("Using mock data for services");
            return catalog::fallback_services();
        }
        let request = self.client.get(self.url("/api/public/services"));
        match self.fetch_json::<Vec<Service>>(request).await {
            Ok(services) => services,
            Err(e) => {
                tracing::warn!("Vendor service list unavailable, using fallback catalog: {}", e);
                catalog::fallback_services()
            }
        }
    }

    pub async fn get_service(&self, id: u64) -> Option<Service> {
        if self.config.use_mock_data {
            tracing::debug!("Using mock data for service {}", id);
            return catalog::find(&catalog::fallback_services(), id);
        }
        let request = self
            .client
            .get(self.url(&format!("/api/public/services/{}", id)));
        match self.fetch_json::<Service>(request).await {
            Ok(service) => Some(service),
            Err(e) => {
                tracing::warn!("Vendor lookup for service {} failed, using fallback catalog: {}", id, e);
                catalog::find(&catalog::fallback_services(), id)
            }
        }
    }

    pub async fn search_services(&self, filters: &SearchFilters) -> Vec<Service> {
        if self.config.use_mock_data {
            tracing::debug!("Using mock data for service search");
            return catalog::search(&catalog::fallback_services(), filters);
        }
        let request = self
            .client
            .get(self.url("/api/public/search"))
            .query(filters);
        match self.fetch_json::<Vec<Service>>(request).await {
            Ok(services) => services,
            Err(e) => {
                tracing::warn!("Vendor search unavailable, filtering fallback catalog: {}", e);
                catalog::search(&catalog::fallback_services(), filters)
            }
        }
    }

    /// Unknown availability is reported as unavailable
    pub async fn check_availability(&self, service_id: u64, start_date: &str, end_date: &str) -> bool {
        if self.config.use_mock_data {
            tracing::debug!("Using mock data for availability of service {}", service_id);
            return catalog::find(&catalog::fallback_services(), service_id)
                .map(|s| s.available)
                .unwrap_or(false);
        }
        let request = self
            .client
            .get(self.url("/api/public/availability"))
            .query(&AvailabilityQuery {
                service_id,
                start_date,
                end_date,
            });
        match self.fetch_json::<AvailabilityResponse>(request).await {
            Ok(body) => body.available,
            Err(e) => {
                tracing::warn!("Availability check for service {} failed: {}", service_id, e);
                false
            }
        }
    }

    async fn post_status<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let response = self
            .authorized(self.client.post(self.url(path)).json(body))
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("vendor API returned {} for {}: {}", status, path, text));
        }
        Ok(())
    }

    pub async fn create_booking(&self, booking: &Booking) -> Result<()> {
        self.post_status("/api/public/bookings", booking).await
    }

    pub async fn confirm_booking(&self, transition: &BookingTransition) -> Result<()> {
        self.post_status("/api/public/bookings/confirm", transition).await
    }

    pub async fn cancel_booking(&self, transition: &BookingTransition) -> Result<()> {
        self.post_status("/api/public/bookings/cancel", transition).await
    }

    /// `Ok(None)` when no booking matches the email/reference pair
    pub async fn lookup_booking(&self, email: &str, reference: &str) -> Result<Option<Booking>> {
        let response = self
            .authorized(
                self.client
                    .get(self.url("/api/public/bookings/lookup"))
                    .query(&LookupQuery { email, reference }),
            )
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow!("vendor API returned {} for booking lookup", response.status()));
        }
        Ok(Some(response.json::<Booking>().await?))
    }
}
