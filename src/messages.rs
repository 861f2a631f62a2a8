//! In-app message log.
//!
//! A shared, append-only list of human-readable lines. The hero service
//! writes to it after every request and the messages panel renders it.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Arc<RwLock<Vec<String>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "messages", "{message}");
        self.entries.write().push(message);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Snapshot of the current entries, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_clear() {
        let log = MessageLog::new();
        assert!(log.is_empty());

        log.add("HeroService: fetched heroes");
        log.add("HeroService: fetched hero id=12");
        assert_eq!(log.len(), 2);
        assert_eq!(
            log.messages(),
            vec![
                "HeroService: fetched heroes".to_string(),
                "HeroService: fetched hero id=12".to_string(),
            ]
        );

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let writer = MessageLog::new();
        let reader = writer.clone();

        writer.add("hello");
        assert_eq!(reader.messages(), vec!["hello".to_string()]);

        reader.clear();
        assert!(writer.is_empty());
    }
}
