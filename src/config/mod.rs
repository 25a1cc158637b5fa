use crate::cli::Args;
use crate::models::api::{ value_text, ChatRequest };
use crate::models::chat::GenerationParams;
use serde_json::{ json, Value };
use std::time::Duration;

pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:5500";
pub const DEFAULT_TEMPERATURE: f64 = 0.71;
pub const DEFAULT_MAX_TOKENS: u32 = 511;
pub const DEFAULT_TOP_P: f64 = 0.89;
pub const DEFAULT_MIN_P: f64 = 0.055;
pub const DEFAULT_MODEL: &str = "meta-llama/Meta-Llama-3-70B-Instruct";
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(29);

/// Values substituted for fields a request leaves out.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationDefaults {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub min_p: f64,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            min_p: DEFAULT_MIN_P,
        }
    }
}

impl GenerationDefaults {
    /// Merges a request over these defaults. This is the only place defaults
    /// are applied. Supplied values pass through unchecked; only absent or
    /// null fields are replaced.
    pub fn resolve(&self, request: &ChatRequest) -> GenerationParams {
        let model = match &request.model {
            None | Some(Value::Null) => self.model.clone(),
            Some(Value::String(m)) if m.is_empty() => self.model.clone(),
            Some(other) => value_text(other),
        };
        GenerationParams {
            model,
            temperature: or_default(&request.temperature, json!(self.temperature)),
            max_tokens: or_default(&request.max_tokens, json!(self.max_tokens)),
            top_p: or_default(&request.top_p, json!(self.top_p)),
            min_p: or_default(&request.min_p, json!(self.min_p)),
        }
    }
}

fn or_default(supplied: &Option<Value>, default: Value) -> Value {
    match supplied {
        Some(v) if !v.is_null() => v.clone(),
        _ => default,
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub defaults: GenerationDefaults,
    /// Always at least 1, so the window includes the newest turn.
    pub context_window: usize,
    /// 0 means the log is never trimmed.
    pub history_limit: usize,
    pub upstream_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            defaults: GenerationDefaults::default(),
            context_window: DEFAULT_CONTEXT_WINDOW,
            history_limit: 0,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

impl RelayConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            defaults: GenerationDefaults {
                model: args.chat_model.clone(),
                temperature: args.default_temperature,
                max_tokens: args.default_max_tokens,
                top_p: args.default_top_p,
                min_p: args.default_min_p,
            },
            context_window: (args.context_window as usize).max(1),
            history_limit: args.history_limit,
            upstream_timeout: Duration::from_secs(args.upstream_timeout_secs),
        }
    }
}
