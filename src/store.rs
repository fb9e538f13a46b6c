use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

// -----------------------------------------------
// SUBSCRIBER PREFERENCES
//
// In-memory only; lost on restart by design.
// -----------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Subscriber {
    pub symbols: BTreeSet<String>,
    pub daily: bool,
}

#[derive(Debug)]
pub struct StoreCounts {
    pub subscribers: usize,
    pub daily_subscribers: usize,
    pub watched_symbols: usize,
}

#[derive(Default)]
pub struct SubscriberStore {
    inner: RwLock<HashMap<i64, Subscriber>>,
}

impl SubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol to a chat's watch list. Returns false if it was
    /// already watched.
    pub async fn watch(&self, chat_id: i64, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        let mut inner = self.inner.write().await;
        inner.entry(chat_id).or_default().symbols.insert(symbol)
    }

    /// Remove a symbol from a chat's watch list. Returns false if it was
    /// not watched.
    pub async fn unwatch(&self, chat_id: i64, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        let mut inner = self.inner.write().await;
        match inner.get_mut(&chat_id) {
            Some(sub) => sub.symbols.remove(&symbol),
            None => false,
        }
    }

    pub async fn set_daily(&self, chat_id: i64, enabled: bool) {
        let mut inner = self.inner.write().await;
        inner.entry(chat_id).or_default().daily = enabled;
    }

    pub async fn get(&self, chat_id: i64) -> Subscriber {
        self.inner
            .read()
            .await
            .get(&chat_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Chats due a daily report: daily enabled and at least one symbol.
    pub async fn daily_snapshot(&self) -> Vec<(i64, Vec<String>)> {
        self.inner
            .read()
            .await
            .iter()
            .filter(|(_, sub)| sub.daily && !sub.symbols.is_empty())
            .map(|(chat_id, sub)| (*chat_id, sub.symbols.iter().cloned().collect()))
            .collect()
    }

    pub async fn counts(&self) -> StoreCounts {
        let inner = self.inner.read().await;
        StoreCounts {
            subscribers: inner.len(),
            daily_subscribers: inner.values().filter(|s| s.daily).count(),
            watched_symbols: inner.values().map(|s| s.symbols.len()).sum(),
        }
    }
}
