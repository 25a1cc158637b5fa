use serde::{ Serialize, Deserialize };
use serde_json::Value;
use super::chat::ConversationTurn;

/// Body of `POST /chat`. Fields are kept as raw JSON so that anything the
/// caller sends is forwarded untouched; only `message` is checked.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub model: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub system_prompt: Option<Value>,
    #[serde(default)]
    pub max_tokens: Option<Value>,
    #[serde(default)]
    pub temperature: Option<Value>,
    #[serde(default)]
    pub top_p: Option<Value>,
    #[serde(default)]
    pub min_p: Option<Value>,
}

impl ChatRequest {
    /// The message as turn content, or `None` when it is absent or empty
    /// (null, `""`, `false`, `0`, `[]`, `{}`).
    pub fn message_text(&self) -> Option<String> {
        let value = self.message.as_ref()?;
        let empty = match value {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
        };
        if empty { None } else { Some(value_text(value)) }
    }
}

/// Strings as-is, anything else as its JSON text.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub turns: Vec<ConversationTurn>,
}
