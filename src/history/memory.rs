use async_trait::async_trait;
use crate::history::HistoryStore;
use crate::models::chat::ConversationTurn;
use log::debug;
use std::collections::VecDeque;
use tokio::sync::Mutex;

pub struct MemoryHistoryStore {
    turns: Mutex<VecDeque<ConversationTurn>>,
    capacity: Option<usize>,
}

impl MemoryHistoryStore {
    /// `capacity == 0` keeps every turn for the life of the process.
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            capacity: Some(capacity).filter(|c| *c > 0),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    pub async fn recent(&self, limit: usize) -> Vec<ConversationTurn> {
        tail(&*self.turns.lock().await, limit)
    }

    pub async fn len(&self) -> usize {
        self.turns.lock().await.len()
    }

    fn push(&self, turns: &mut VecDeque<ConversationTurn>, turn: ConversationTurn) {
        turns.push_back(turn);
        if let Some(cap) = self.capacity {
            while turns.len() > cap {
                turns.pop_front();
                debug!("History over capacity ({}), dropped oldest turn", cap);
            }
        }
    }
}

fn tail(turns: &VecDeque<ConversationTurn>, limit: usize) -> Vec<ConversationTurn> {
    let skip = turns.len().saturating_sub(limit);
    turns.iter().skip(skip).cloned().collect()
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, turn: ConversationTurn) {
        let mut turns = self.turns.lock().await;
        self.push(&mut turns, turn);
    }

    async fn append_and_recent(&self, turn: ConversationTurn, limit: usize) -> Vec<ConversationTurn> {
        let mut turns = self.turns.lock().await;
        self.push(&mut turns, turn);
        tail(&turns, limit.max(1))
    }

    async fn all(&self) -> Vec<ConversationTurn> {
        self.turns.lock().await.iter().cloned().collect()
    }
}
