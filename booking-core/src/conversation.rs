use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::service::ServiceCard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Cards attached to an assistant reply
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceCard>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            services: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>, services: Vec<ServiceCard>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            services,
        }
    }
}

pub const GREETING: &str = "Hi! I'm your IslandLoaf travel assistant. Tell me what kind of Sri Lanka trip you're dreaming of: beaches, mountains, wildlife, temples or wellness?";

/// Append-only chat history for one browser tab
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_greeting() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING, Vec::new())],
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Role and content only, the shape sent with each chat turn
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .map(|m| ChatMessage {
                role: m.role,
                content: m.content.clone(),
                services: Vec::new(),
            })
            .collect()
    }

    /// Confirmation shown after a recommended card lands in the cart
    pub fn note_added_to_cart(&mut self, item: &CartItem) {
        self.push(ChatMessage::assistant(
            format!(
                "Added \"{}\" to your trip! Would you like to add more experiences or are you ready to checkout?",
                item.name
            ),
            Vec::new(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceType;

    #[test]
    fn test_history_strips_cards() {
        let card = ServiceCard {
            id: 1,
            name: "Villa".to_string(),
            service_type: ServiceType::Stays,
            location: "Galle".to_string(),
            description: String::new(),
            base_price: 450.0,
            currency: "USD".to_string(),
            images: vec![],
        };
        let mut transcript = Transcript::with_greeting();
        transcript.push(ChatMessage::user("beach stay"));
        transcript.push(ChatMessage::assistant("Try this", vec![card]));

        let history = transcript.history();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|m| m.services.is_empty()));
        assert_eq!(transcript.messages()[2].services.len(), 1);
    }

    #[test]
    fn test_message_wire_shape() {
        let raw = serde_json::to_value(ChatMessage::user("hello")).unwrap();
        assert_eq!(raw, serde_json::json!({"role": "user", "content": "hello"}));
    }

    #[test]
    fn test_note_added_to_cart() {
        let mut transcript = Transcript::new();
        transcript.note_added_to_cart(&CartItem {
            id: 2,
            name: "Sigiriya Rock Fortress Day Tour".to_string(),
            base_price: 85.0,
            service_type: ServiceType::Tours,
            images: vec![],
        });
        assert!(transcript.messages()[0]
            .content
            .starts_with("Added \"Sigiriya Rock Fortress Day Tour\""));
    }
}
