/// Shopping cart kept on the visitor's device
///
/// `Cart` is the plain value; `PersistentCart` pairs it with a
/// `KeyValueStore` and rewrites the stored copy after every mutation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::service::{Service, ServiceCard, ServiceType};

/// Storage key holding the serialized cart array
pub const CART_STORAGE_KEY: &str = "islandloaf_cart";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: u64,
    pub name: String,
    pub base_price: f64,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    #[serde(default)]
    pub images: Vec<String>,
}

impl From<&Service> for CartItem {
    fn from(service: &Service) -> Self {
        Self {
            id: service.id,
            name: service.name.clone(),
            base_price: service.base_price,
            service_type: service.service_type,
            images: service.images.clone(),
        }
    }
}

impl From<&ServiceCard> for CartItem {
    fn from(card: &ServiceCard) -> Self {
        Self {
            id: card.id,
            name: card.name.clone(),
            base_price: card.base_price,
            service_type: card.service_type,
            images: card.images.clone(),
        }
    }
}

/// Device-local string storage (browser local storage in production)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Set of services the visitor intends to book, unique by service id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when an item with the same id is already present
    pub fn add(&mut self, item: CartItem) -> bool {
        if self.contains(item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn contains(&self, id: u64) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of base prices; no date-aware proration at cart level
    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.base_price).sum()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

pub struct PersistentCart<S: KeyValueStore> {
    cart: Cart,
    store: S,
}

impl<S: KeyValueStore> PersistentCart<S> {
    /// Loads the stored cart; unreadable data starts an empty cart
    pub fn open(store: S) -> Self {
        let cart = match store.get(CART_STORAGE_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable stored cart: {}", e);
                Cart::new()
            }),
            None => Cart::new(),
        };
        Self { cart, store }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn add(&mut self, item: CartItem) -> bool {
        let added = self.cart.add(item);
        if added {
            self.save();
        }
        added
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let removed = self.cart.remove(id);
        if removed {
            self.save();
        }
        removed
    }

    /// Called once a checkout has been submitted
    pub fn clear(&mut self) {
        self.cart.clear();
        self.store.remove(CART_STORAGE_KEY);
    }

    fn save(&mut self) {
        match serde_json::to_string(&self.cart) {
            Ok(raw) => self.store.set(CART_STORAGE_KEY, raw),
            Err(e) => tracing::error!("Failed to serialize cart: {}", e),
        }
    }
}
