/// Chat orchestration for the trip planner
/// Builds the system prompt from the live catalog and the visitor's cart,
/// makes one chat-completion call and splits recommended service cards out
/// of the reply.

use anyhow::{anyhow, Result};
use booking_core::{CartItem, ChatMessage, Role, Service, ServiceCard, ServiceType};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::vendor::VendorClient;

pub const SERVICES_OPEN: &str = "[SERVICES_DATA]";
pub const SERVICES_CLOSE: &str = "[/SERVICES_DATA]";
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

lazy_static! {
    static ref SERVICES_BLOCK: Regex =
        Regex::new(r"(?s)\[SERVICES_DATA\](.*?)\[/SERVICES_DATA\]").expect("services block pattern is valid");
}

/// Body of a successful `/api/chat` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    pub services: Vec<ServiceCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Answered,
    /// The model could not be reached; `reply` holds the canned apology
    Degraded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub reply: ChatReply,
    pub status: TurnStatus,
}

impl ChatTurn {
    fn degraded() -> Self {
        Self {
            reply: ChatReply {
                message: FALLBACK_REPLY.to_string(),
                services: Vec::new(),
            },
            status: TurnStatus::Degraded,
        }
    }
}

/// Catalog entry as shown to the model
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptService<'a> {
    id: u64,
    name: &'a str,
    #[serde(rename = "type")]
    service_type: ServiceType,
    location: &'a str,
    description: &'a str,
    base_price: f64,
    currency: &'a str,
    images: &'a [String],
    rating: f64,
}

impl<'a> From<&'a Service> for PromptService<'a> {
    fn from(s: &'a Service) -> Self {
        Self {
            id: s.id,
            name: &s.name,
            service_type: s.service_type,
            location: &s.location,
            description: &s.description,
            base_price: s.base_price,
            currency: &s.currency,
            images: &s.images,
            rating: s.rating,
        }
    }
}

pub fn build_system_prompt(catalog: &[Service], cart: &[CartItem]) -> String {
    let services_context = if catalog.is_empty() {
        "\n\nNote: Could not fetch services from backend. Provide general travel advice and ask the user to try again.".to_string()
    } else {
        let subset: Vec<PromptService> = catalog.iter().map(PromptService::from).collect();
        format!(
            "\n\nAvailable services from the backend (use these for recommendations):\n{}",
            serde_json::to_string_pretty(&subset).unwrap_or_default()
        )
    };

    let cart_context = if cart.is_empty() {
        String::new()
    } else {
        format!(
            "\n\nUser's current cart: {}",
            serde_json::to_string(cart).unwrap_or_default()
        )
    };

    format!(
        r#"You are a friendly AI travel assistant for IslandLoaf, helping users plan their perfect Sri Lanka trip.

Your role is to:
1. Ask about their travel preferences (beaches, mountains, wildlife, temples, adventure, wellness)
2. Understand travel dates, group size and budget
3. Recommend specific services from the available list
4. Create customized travel packages
5. Guide them through booking

IMPORTANT: When you want to show service cards to the user, include the service data in this exact format at the END of your message:
{open}
[{{"id": 1, "name": "...", "type": "...", "location": "...", "description": "...", "basePrice": 100, "currency": "USD", "images": ["url"]}}]
{close}

Only include this block when recommending actual services. Include all fields: id, name, type, location, description, basePrice, currency, images.

Be conversational and enthusiastic about Sri Lanka. Keep responses concise but helpful. After showing services, ask if they'd like to add any to their trip.

Available service types: {types}
Popular destinations: Colombo, Galle, Ella, Kandy, Sigiriya, Negombo, Mirissa, Arugam Bay{services}{cart}"#,
        open = SERVICES_OPEN,
        close = SERVICES_CLOSE,
        types = ServiceType::ALL
            .iter()
            .map(ServiceType::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        services = services_context,
        cart = cart_context,
    )
}

/// Splits the first services block out of a model reply.
/// A block that does not parse leaves the reply untouched.
pub fn extract_recommendations(raw: &str) -> ChatReply {
    let Some(captures) = SERVICES_BLOCK.captures(raw) else {
        return ChatReply {
            message: raw.to_string(),
            services: Vec::new(),
        };
    };
    let body = captures.get(1).map(|m| m.as_str().trim()).unwrap_or_default();

    match serde_json::from_str::<Vec<ServiceCard>>(body) {
        Ok(services) => ChatReply {
            message: SERVICES_BLOCK.replace(raw, "").trim().to_string(),
            services,
        },
        Err(e) => {
            tracing::warn!("Failed to parse services data in assistant reply: {}", e);
            ChatReply {
                message: raw.to_string(),
                services: Vec::new(),
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    temperature: f32,
    max_completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionContent,
}

#[derive(Debug, Deserialize)]
struct CompletionContent {
    #[serde(default)]
    content: Option<String>,
}

/// Our system prompt first, then the visitor's turns. System messages sent
/// by the client are dropped and attached cards are not forwarded.
fn completion_messages<'a>(system: &'a str, history: &'a [ChatMessage]) -> Vec<CompletionMessage<'a>> {
    let mut messages = vec![CompletionMessage {
        role: "system",
        content: system,
    }];
    messages.extend(history.iter().filter_map(|m| {
        let role = match m.role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => return None,
        };
        Some(CompletionMessage {
            role,
            content: &m.content,
        })
    }));
    messages
}

#[derive(Clone)]
pub struct ChatOrchestrator {
    client: reqwest::Client,
    config: LlmConfig,
    vendor: VendorClient,
}

impl ChatOrchestrator {
    pub fn new(client: reqwest::Client, config: LlmConfig, vendor: VendorClient) -> Self {
        Self {
            client,
            config,
            vendor,
        }
    }

    /// One assistant turn. Never fails; upstream trouble yields a degraded turn.
    pub async fn respond(&self, history: &[ChatMessage], cart: &[CartItem]) -> ChatTurn {
        let catalog = self.vendor.list_services().await;
        let system = build_system_prompt(&catalog, cart);

        match self.complete(&system, history).await {
            Ok(raw) => ChatTurn {
                reply: extract_recommendations(&raw),
                status: TurnStatus::Answered,
            },
            Err(e) => {
                tracing::error!("Chat completion failed: {}", e);
                ChatTurn::degraded()
            }
        }
    }

    async fn complete(&self, system: &str, history: &[ChatMessage]) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("no OpenAI API key configured"))?;

        let request = CompletionRequest {
            model: &self.config.model,
            messages: completion_messages(system, history),
            temperature: self.config.temperature,
            max_completion_tokens: self.config.max_completion_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| anyhow!("No response content from OpenAI"))
    }
}
