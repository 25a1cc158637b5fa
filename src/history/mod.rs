mod memory;

pub use memory::MemoryHistoryStore;

use async_trait::async_trait;
use crate::config::RelayConfig;
use crate::models::chat::ConversationTurn;
use log::info;
use std::sync::Arc;

/// The process-wide conversation log. Implementations serialize their own
/// mutations; callers never lock around them.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, turn: ConversationTurn);

    /// Appends `turn` and returns the last `limit` turns, oldest first, as one
    /// atomic step. The returned window always ends with `turn`, even when
    /// `limit` is 0.
    async fn append_and_recent(&self, turn: ConversationTurn, limit: usize) -> Vec<ConversationTurn>;

    async fn all(&self) -> Vec<ConversationTurn>;
}

pub fn initialize_history_store(config: &RelayConfig) -> Arc<dyn HistoryStore> {
    if config.history_limit == 0 {
        info!("Chat history kept in memory without a retention limit");
    } else {
        info!("Chat history kept in memory, retaining the last {} turns", config.history_limit);
    }
    Arc::new(MemoryHistoryStore::new(config.history_limit))
}
