/// Server configuration, read once at startup from the environment

use anyhow::{anyhow, Result};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_VENDOR_API_URL: &str = "https://www.islandloafvendor.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";

/// Chat-completion provider settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_completion_tokens: u32,
}

/// Vendor backend settings
#[derive(Debug, Clone)]
pub struct VendorConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Serve the built-in catalog instead of calling the backend
    pub use_mock_data: bool,
}

/// Stripe settings
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub api_base: String,
    pub signature_tolerance: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Origin used to build default checkout redirect URLs
    pub public_url: String,
    pub request_timeout: Duration,
    pub llm: LlmConfig,
    pub vendor: VendorConfig,
    pub stripe: StripeConfig,
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow!("PORT must be a valid port number, got {}", raw))?,
            None => DEFAULT_PORT,
        };

        let request_timeout = match var("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .map_err(|_| anyhow!("REQUEST_TIMEOUT_SECS must be a number of seconds, got {}", raw))?,
            ),
            None => Duration::from_secs(30),
        };

        let public_url = var("PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let llm = LlmConfig {
            api_key: var("OPENAI_API_KEY").or_else(|| var("AI_INTEGRATIONS_OPENAI_API_KEY")),
            base_url: var("AI_INTEGRATIONS_OPENAI_BASE_URL")
                .or_else(|| var("OPENAI_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            temperature: 0.7,
            max_completion_tokens: 1000,
        };

        let vendor = VendorConfig {
            base_url: var("VENDOR_API_URL")
                .or_else(|| var("NEXT_PUBLIC_VENDOR_API_URL"))
                .unwrap_or_else(|| DEFAULT_VENDOR_API_URL.to_string()),
            api_key: var("VENDOR_API_KEY"),
            use_mock_data: var("USE_MOCK_DATA")
                .or_else(|| var("NEXT_PUBLIC_USE_MOCK_DATA"))
                .map(|raw| parse_flag(&raw))
                .unwrap_or(false),
        };

        let stripe = StripeConfig {
            secret_key: var("STRIPE_SECRET_KEY"),
            webhook_secret: var("STRIPE_WEBHOOK_SECRET"),
            api_base: var("STRIPE_API_URL").unwrap_or_else(|| DEFAULT_STRIPE_API_URL.to_string()),
            signature_tolerance: Duration::from_secs(300),
        };

        Ok(Self {
            port,
            public_url,
            request_timeout,
            llm,
            vendor,
            stripe,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.public_url, "http://localhost:3000");
        assert_eq!(config.vendor.base_url, DEFAULT_VENDOR_API_URL);
        assert!(!config.vendor.use_mock_data);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!(config.stripe.secret_key.is_none());
    }

    #[test]
    fn test_alternate_variable_names() {
        let config = config_from(&[
            ("AI_INTEGRATIONS_OPENAI_API_KEY", "sk-alt"),
            ("AI_INTEGRATIONS_OPENAI_BASE_URL", "http://llm.local/v1"),
            ("NEXT_PUBLIC_USE_MOCK_DATA", "TRUE"),
            ("PUBLIC_URL", "https://islandloaf.example/"),
        ])
        .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-alt"));
        assert_eq!(config.llm.base_url, "http://llm.local/v1");
        assert!(config.vendor.use_mock_data);
        assert_eq!(config.public_url, "https://islandloaf.example");
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config_from(&[("VENDOR_API_KEY", "  "), ("OPENAI_API_KEY", "")]).unwrap();
        assert!(config.vendor.api_key.is_none());
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("REQUEST_TIMEOUT_SECS", "-1")]).is_err());
    }
}
