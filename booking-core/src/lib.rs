/// Booking domain shared by the web API and client-side state
///
/// Everything here is pure: catalog snapshots, pricing arithmetic, the cart,
/// the chat transcript and the multi-step booking wizard. No I/O beyond the
/// injected key-value store the cart persists through.

pub mod booking;
pub mod cart;
pub mod catalog;
pub mod conversation;
pub mod package;
pub mod pricing;
pub mod service;
pub mod wizard;

pub use booking::{
    Booking, BookingDetails, BookingStatus, BookingTransition, CheckoutRequest, PaymentStatus,
};
pub use cart::{Cart, CartItem, KeyValueStore, MemoryStore, PersistentCart, CART_STORAGE_KEY};
pub use conversation::{ChatMessage, Role, Transcript};
pub use package::PackageQuote;
pub use pricing::PricingError;
pub use service::{SearchFilters, Service, ServiceCard, ServiceType};
pub use wizard::{BookingWizard, WizardError, WizardStep};
