/// IslandLoaf trip server library
/// Chat orchestration, catalog access, Stripe checkout and webhook handling,
/// exposed as an axum router for the HTTP binary and for tests.

pub mod chat;
pub mod checkout;
pub mod config;
pub mod error;
pub mod routes;
pub mod stripe;
pub mod vendor;
pub mod webhook;

pub use chat::{ChatOrchestrator, ChatReply, ChatTurn, TurnStatus};
pub use checkout::{CheckoutResponse, CheckoutService};
pub use config::AppConfig;
pub use error::ApiError;
pub use routes::{router, AppState};
pub use vendor::VendorClient;
pub use webhook::{WebhookAck, WebhookHandler};
