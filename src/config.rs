//! Injected key/value configuration service and per-user prompt storage.
//!
//! Callers own where settings actually live (script properties, a database,
//! a file); this subsystem only sees the `ConfigStore` seam. The in-memory
//! implementation is the default backend and the one tests use.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Process-wide mutable key/value settings storage.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn delete(&self, key: &str);
}

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct MemoryConfigStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.write().insert(key.to_string(), value.to_string());
    }

    fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

/// Personal reply rules, stored per user under `PROMPT_<email>` keys.
///
/// Personal rules take priority over the shared knowledge base when the
/// system prompt is assembled (see [`crate::prompt::combined_knowledge`]).
pub struct UserPrompts {
    store: Arc<dyn ConfigStore>,
}

impl UserPrompts {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// The stored personal prompt, if one is set.
    pub fn get(&self, email: &str) -> Option<String> {
        self.store.get(&Self::key(email))
    }

    /// Store a personal prompt. Empty or whitespace-only text clears it.
    pub fn set(&self, email: &str, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.store.delete(&Self::key(email));
            log::info!("config: cleared personal prompt for {}", email);
        } else {
            self.store.set(&Self::key(email), trimmed);
            log::info!(
                "config: set personal prompt for {} ({} chars)",
                email,
                trimmed.chars().count()
            );
        }
    }

    pub fn clear(&self, email: &str) {
        self.store.delete(&Self::key(email));
    }

    fn key(email: &str) -> String {
        format!("PROMPT_{}", email)
    }
}
