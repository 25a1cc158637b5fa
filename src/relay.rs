use crate::config::RelayConfig;
use crate::history::HistoryStore;
use crate::llm::LlmError;
use crate::llm::chat::{ ChatClient, ChatMessage, CompletionRequest };
use crate::models::api::{ value_text, ChatRequest };
use crate::models::chat::{ ConversationTurn, Role };

use log::{ info, error };
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Empty message")]
    EmptyMessage,

    #[error(transparent)]
    Upstream(#[from] LlmError),
}

/// Relays one user turn at a time to the completion provider and records
/// both sides of the exchange in the shared log.
#[derive(Clone)]
pub struct ChatRelay {
    chat_client: Arc<dyn ChatClient>,
    history_store: Arc<dyn HistoryStore>,
    config: RelayConfig,
}

/// System message first, then the window in stored order.
pub fn build_context(system_prompt: &str, window: &[ConversationTurn]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(window.len() + 1);
    messages.push(ChatMessage::new(Role::System, system_prompt));
    messages.extend(window.iter().map(|turn| ChatMessage::new(turn.role, turn.content.clone())));
    messages
}

impl ChatRelay {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        history_store: Arc<dyn HistoryStore>,
        config: RelayConfig
    ) -> Self {
        Self { chat_client, history_store, config }
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history_store
    }

    pub async fn chat(&self, request: ChatRequest) -> Result<String, RelayError> {
        let Some(message) = request.message_text() else {
            return Err(RelayError::EmptyMessage);
        };
        let params = self.config.defaults.resolve(&request);
        let system_prompt = match &request.system_prompt {
            None | Some(Value::Null) => String::new(),
            Some(sp) => value_text(sp),
        };

        let window = self.history_store
            .append_and_recent(ConversationTurn::user(message), self.config.context_window).await;
        let completion = CompletionRequest {
            messages: build_context(&system_prompt, &window),
            params,
        };
        info!(
            "Relaying chat turn to model '{}' with {} context turns",
            completion.params.model,
            window.len()
        );

        let reply = match self.chat_client.complete(&completion).await {
            Ok(r) => r.response,
            Err(e) => {
                error!("API Error: {} (retryable: {})", e, e.is_retryable());
                return Err(RelayError::Upstream(e));
            }
        };

        self.history_store.append(ConversationTurn::assistant(reply.clone(), completion.params)).await;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistoryStore;
    use crate::llm::chat::CompletionResponse;
    use crate::models::chat::GenerationParams;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    enum Reply {
        Text(&'static str),
        Timeout,
    }

    struct FakeClient {
        reply: Reply,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl FakeClient {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self { reply, seen: Mutex::new(Vec::new()) })
        }

        fn last(&self) -> CompletionRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ChatClient for FakeClient {
        async fn complete(
            &self,
            request: &CompletionRequest
        ) -> Result<CompletionResponse, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            match self.reply {
                Reply::Text(t) => Ok(CompletionResponse { response: t.to_string() }),
                Reply::Timeout => Err(LlmError::Timeout(Duration::from_secs(29))),
            }
        }
    }

    fn relay(client: Arc<FakeClient>) -> (ChatRelay, Arc<MemoryHistoryStore>) {
        let store = Arc::new(MemoryHistoryStore::unbounded());
        let relay = ChatRelay::new(client, store.clone(), RelayConfig::default());
        (relay, store)
    }

    fn message(text: &str) -> ChatRequest {
        ChatRequest { message: Some(json!(text)), ..Default::default() }
    }

    #[tokio::test]
    async fn empty_or_missing_message_leaves_log_untouched() {
        let client = FakeClient::new(Reply::Text("unused"));
        let (relay, store) = relay(client.clone());

        assert!(matches!(relay.chat(message("")).await, Err(RelayError::EmptyMessage)));
        assert!(matches!(relay.chat(ChatRequest::default()).await, Err(RelayError::EmptyMessage)));
        assert_eq!(store.len().await, 0);
        assert!(client.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn success_appends_user_then_assistant() {
        let client = FakeClient::new(Reply::Text("hi there"));
        let (relay, store) = relay(client.clone());

        let request = ChatRequest {
            message: Some(json!("hello")),
            model: Some(json!("m1")),
            system_prompt: Some(json!("sp")),
            ..Default::default()
        };
        assert_eq!(relay.chat(request).await.unwrap(), "hi there");

        let turns = store.all().await;
        assert_eq!(turns.len(), 2);
        assert_eq!((turns[0].role, turns[0].content.as_str()), (Role::User, "hello"));
        assert_eq!((turns[1].role, turns[1].content.as_str()), (Role::Assistant, "hi there"));
        assert!(turns[0].params.is_none());
        assert!(turns[0].timestamp <= turns[1].timestamp);

        assert_eq!(turns[1].params, Some(GenerationParams {
            model: "m1".into(),
            temperature: json!(0.71),
            max_tokens: json!(511),
            top_p: json!(0.89),
            min_p: json!(0.055),
        }));

        let sent = client.last();
        assert_eq!(sent.messages, vec![
            ChatMessage::new(Role::System, "sp"),
            ChatMessage::new(Role::User, "hello")
        ]);
    }

    #[tokio::test]
    async fn omitted_sampling_params_use_defaults() {
        let client = FakeClient::new(Reply::Text("ok"));
        let (relay, _) = relay(client.clone());
        relay.chat(message("hi")).await.unwrap();

        let params = client.last().params;
        assert_eq!(params.temperature, json!(0.71));
        assert_eq!(params.max_tokens, json!(511));
        assert_eq!(params.top_p, json!(0.89));
        assert_eq!(params.min_p, json!(0.055));
    }

    #[tokio::test]
    async fn supplied_params_are_forwarded_and_echoed_unchanged() {
        let client = FakeClient::new(Reply::Text("ok"));
        let (relay, store) = relay(client.clone());
        let request = ChatRequest {
            message: Some(json!("hi")),
            max_tokens: Some(json!(-1)),
            temperature: Some(json!(256.5)),
            ..Default::default()
        };
        relay.chat(request).await.unwrap();

        let sent = client.last().params;
        assert_eq!(sent.max_tokens, json!(-1));
        assert_eq!(sent.temperature, json!(256.5));
        assert_eq!(store.all().await[1].params.as_ref(), Some(&sent));
    }

    #[tokio::test]
    async fn missing_system_prompt_sends_empty_system_message() {
        let client = FakeClient::new(Reply::Text("ok"));
        let (relay, _) = relay(client.clone());
        relay.chat(message("hi")).await.unwrap();

        assert_eq!(client.last().messages[0], ChatMessage::new(Role::System, ""));
    }

    #[tokio::test]
    async fn context_is_capped_at_ten_turns_plus_system() {
        let client = FakeClient::new(Reply::Text("r"));
        let (relay, store) = relay(client.clone());
        for i in 0..8 {
            relay.chat(message(&format!("m{}", i))).await.unwrap();
        }

        let sent = client.last().messages;
        assert_eq!(sent.len(), 11);
        assert_eq!(sent[0].role, Role::System);

        // Log holds 16 turns; the last request saw turns 5..15, before its reply landed.
        let log = store.all().await;
        assert_eq!(log.len(), 16);
        let expected: Vec<ChatMessage> = log[5..15]
            .iter()
            .map(|t| ChatMessage::new(t.role, t.content.clone()))
            .collect();
        assert_eq!(&sent[1..], expected.as_slice());
        assert_eq!(sent.last().unwrap(), &ChatMessage::new(Role::User, "m7"));
    }

    #[tokio::test]
    async fn upstream_failure_keeps_orphaned_user_turn() {
        let client = FakeClient::new(Reply::Timeout);
        let (relay, store) = relay(client);

        let err = relay.chat(message("hello")).await.unwrap_err();
        assert!(matches!(err, RelayError::Upstream(LlmError::Timeout(_))));

        let turns = store.all().await;
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::User);
    }

    #[tokio::test]
    async fn replayed_request_appends_two_pairs() {
        let client = FakeClient::new(Reply::Text("same"));
        let (relay, store) = relay(client);

        relay.chat(message("again")).await.unwrap();
        relay.chat(message("again")).await.unwrap();

        let roles: Vec<Role> = store
            .all().await
            .iter()
            .map(|t| t.role)
            .collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
    }

    #[test]
    fn build_context_preserves_order() {
        let window = vec![ConversationTurn::user("a"), ConversationTurn::user("b")];
        let messages = build_context("sys", &window);
        let contents: Vec<&str> = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["sys", "a", "b"]);
    }
}
