use serde::Deserialize;
use serde::Serialize;

use odoonav_core::intent::OracleGuess;
use odoonav_core::model::IntentKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// The JSON object an oracle is instructed to reply with. Every field is optional
/// on the wire; models routinely drop some of them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OracleReply {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub all_entities: Vec<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl From<OracleReply> for OracleGuess {
    fn from(reply: OracleReply) -> Self {
        let kind = match reply.kind.as_deref().map(str::trim) {
            Some(kind) if kind.eq_ignore_ascii_case("navigation") => IntentKind::Navigation,
            _ => IntentKind::Unknown,
        };
        OracleGuess {
            kind,
            entity: reply.entity.unwrap_or_default(),
            all_entities: reply.all_entities,
            reasoning: reply.reasoning,
            confidence: reply.confidence,
        }
    }
}
