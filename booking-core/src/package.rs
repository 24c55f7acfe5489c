use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::pricing;
use crate::service::Service;

/// Bundle pricing for the package builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageQuote {
    pub nights: i64,
    pub subtotal: f64,
    pub discount_rate: f64,
    pub discount: f64,
    pub total: f64,
}

/// 15% off four or more items, 10% off three
pub fn discount_rate(item_count: usize) -> f64 {
    match item_count {
        n if n >= 4 => 0.15,
        3 => 0.10,
        _ => 0.0,
    }
}

/// Stays are charged per night (one night when no dates are picked),
/// everything else once. A service counts once however often it is listed.
pub fn quote(services: &[Service], start: Option<NaiveDate>, end: Option<NaiveDate>) -> PackageQuote {
    let mut seen = HashSet::new();
    let services: Vec<&Service> = services.iter().filter(|s| seen.insert(s.id)).collect();

    let nights = match (start, end) {
        (Some(start), Some(end)) => pricing::nights(start, end).max(0),
        _ => 1,
    };

    let subtotal: f64 = services
        .iter()
        .map(|s| {
            if s.service_type.is_nightly() {
                s.base_price * nights as f64
            } else {
                s.base_price
            }
        })
        .sum();

    let rate = discount_rate(services.len());
    let discount = subtotal * rate;

    PackageQuote {
        nights,
        subtotal,
        discount_rate: rate,
        discount,
        total: subtotal - discount,
    }
}
