/// HTTP server for the IslandLoaf trip planner
/// Serves the chat assistant, catalog, checkout and Stripe webhook endpoints

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use trip_server::{router, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("\n╔════════════════════════════════════════════════════════════╗");
    println!("║          IslandLoaf Trip Server (AI travel planner)        ║");
    println!("║      Chat · Catalog · Stripe Checkout · Vendor Bookings    ║");
    println!("╚════════════════════════════════════════════════════════════╝\n");

    let config = AppConfig::from_env()?;

    println!("[INIT] Server configuration:");
    println!("  Port: {}", config.port);
    println!("  Public URL: {}", config.public_url);
    println!("  Vendor API: {}", config.vendor.base_url);
    if config.vendor.use_mock_data {
        println!("  [MOCK] Serving the built-in catalog");
    }
    if config.llm.api_key.is_none() {
        println!("  [WARN] No OpenAI API key; chat replies will degrade");
    }
    if config.stripe.secret_key.is_none() {
        println!("  [WARN] STRIPE_SECRET_KEY not set; checkout is disabled");
    }
    if config.stripe.webhook_secret.is_none() {
        println!("  [WARN] STRIPE_WEBHOOK_SECRET not set; webhooks will be rejected");
    }

    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    println!("[STARTUP] ✓ Trip server running on http://0.0.0.0:{}", config.port);
    println!("  POST /api/chat              — Chat with the travel assistant");
    println!("  POST /api/checkout          — Create a Stripe Checkout session");
    println!("  POST /api/webhooks/stripe   — Stripe event receiver");
    println!("  GET  /api/services          — List services");
    println!("  GET  /api/services/:id      — Service details");
    println!("  GET  /api/search            — Search services");
    println!("  GET  /api/availability      — Check availability");
    println!("  GET  /api/bookings/lookup   — Find a booking by email and reference");
    println!("  POST /api/packages/quote    — Price a package of services");
    println!("  GET  /health                — Check server health\n");

    axum::serve(listener, app).await?;
    Ok(())
}
