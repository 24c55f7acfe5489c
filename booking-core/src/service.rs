use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category a bookable service belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Stays,
    Tours,
    Vehicles,
    Wellness,
    Tickets,
    Products,
}

impl ServiceType {
    pub const ALL: [ServiceType; 6] = [
        ServiceType::Stays,
        ServiceType::Tours,
        ServiceType::Vehicles,
        ServiceType::Wellness,
        ServiceType::Tickets,
        ServiceType::Products,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Stays => "stays",
            ServiceType::Tours => "tours",
            ServiceType::Vehicles => "vehicles",
            ServiceType::Wellness => "wellness",
            ServiceType::Tickets => "tickets",
            ServiceType::Products => "products",
        }
    }

    /// Stays are charged per night when bundled into a package
    pub fn is_nightly(&self) -> bool {
        matches!(self, ServiceType::Stays)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown service type: {}", s))
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_available() -> bool {
    true
}

/// Snapshot of a bookable service as published by the vendor backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub base_price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<u32>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews_count: u32,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<u64>,
    #[serde(default)]
    pub business_name: String,
}

impl Service {
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// The card shape the assistant emits for a recommended service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCard {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub base_price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl From<&Service> for ServiceCard {
    fn from(service: &Service) -> Self {
        Self {
            id: service.id,
            name: service.name.clone(),
            service_type: service.service_type,
            location: service.location.clone(),
            description: service.description.clone(),
            base_price: service.base_price,
            currency: service.currency.clone(),
            images: service.images.clone(),
        }
    }
}

/// Catalog search criteria. Every field is optional; absent fields match all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<u32>,
}

impl SearchFilters {
    /// Local evaluation used when the vendor search is unavailable
    pub fn matches(&self, service: &Service) -> bool {
        if let Some(service_type) = self.service_type {
            if service.service_type != service_type {
                return false;
            }
        }

        if let Some(location) = self.location.as_deref().map(str::trim) {
            if !location.is_empty()
                && !service
                    .location
                    .to_lowercase()
                    .contains(&location.to_lowercase())
            {
                return false;
            }
        }

        if self.min_price.map_or(false, |min| service.base_price < min) {
            return false;
        }
        if self.max_price.map_or(false, |max| service.base_price > max) {
            return false;
        }

        if let (Some(guests), Some(capacity)) = (self.guests, service.max_capacity) {
            if guests > capacity {
                return false;
            }
        }

        // No calendar data offline: a dated search only returns bookable services
        if (self.start_date.is_some() || self.end_date.is_some()) && !service.available {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn villa() -> Service {
        serde_json::from_value(json!({
            "id": 1,
            "name": "Luxury Beach Villa - Galle",
            "type": "stays",
            "basePrice": 450,
            "location": "Galle, Southern Province",
            "maxCapacity": 8
        }))
        .unwrap()
    }

    #[test]
    fn test_service_defaults_when_fields_missing() {
        let service = villa();
        assert_eq!(service.currency, "USD");
        assert!(service.available);
        assert!(service.images.is_empty());
        assert_eq!(service.cover_image(), None);
    }

    #[test]
    fn test_service_rejects_unknown_type() {
        let parsed = serde_json::from_value::<Service>(json!({
            "id": 9, "name": "Boat", "type": "boats", "basePrice": 10
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_service_type_parsing() {
        assert_eq!("Wellness".parse::<ServiceType>().unwrap(), ServiceType::Wellness);
        assert!("spa".parse::<ServiceType>().is_err());
        assert_eq!(ServiceType::Tickets.to_string(), "tickets");
    }

    #[test]
    fn test_filters_location_is_case_insensitive() {
        let filters = SearchFilters {
            location: Some("galle".to_string()),
            ..Default::default()
        };
        assert!(filters.matches(&villa()));

        let filters = SearchFilters {
            location: Some("Kandy".to_string()),
            ..Default::default()
        };
        assert!(!filters.matches(&villa()));
    }

    #[test]
    fn test_filters_price_bounds_are_inclusive() {
        let filters = SearchFilters {
            min_price: Some(450.0),
            max_price: Some(450.0),
            ..Default::default()
        };
        assert!(filters.matches(&villa()));

        let filters = SearchFilters {
            max_price: Some(449.99),
            ..Default::default()
        };
        assert!(!filters.matches(&villa()));
    }

    #[test]
    fn test_filters_guest_capacity() {
        let mut filters = SearchFilters {
            guests: Some(8),
            ..Default::default()
        };
        assert!(filters.matches(&villa()));
        filters.guests = Some(9);
        assert!(!filters.matches(&villa()));
    }

    #[test]
    fn test_filters_dated_search_skips_unavailable() {
        let mut service = villa();
        service.available = false;
        let filters = SearchFilters {
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            ..Default::default()
        };
        assert!(!filters.matches(&service));
        assert!(SearchFilters::default().matches(&service));
    }

    #[test]
    fn test_card_from_service() {
        let card = ServiceCard::from(&villa());
        assert_eq!(card.id, 1);
        assert_eq!(card.base_price, 450.0);
        assert_eq!(card.service_type, ServiceType::Stays);
    }
}
