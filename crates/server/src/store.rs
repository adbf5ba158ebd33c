//! An in-memory key-value store shared by connection tasks.
//!
//! The store synchronises internally, so handlers receive it as an
//! `Arc<KvStore>` and never lock anything themselves.

use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct KvStore {
    entries: DashMap<String, String>,
}

impl KvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Stores `value` under `key` and returns the value it replaced.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn delete(&self, key: &str) -> Option<String> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        keys.sort_unstable();
        keys
    }

    /// All values, ordered by their keys.
    pub fn values(&self) -> Vec<String> {
        self.entries().into_iter().map(|(_, value)| value).collect()
    }

    /// A sorted snapshot of every entry.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self.entries.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect();
        entries.sort_unstable();
        entries
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry and returns how many there were.
    pub fn clear(&self) -> usize {
        let size = self.entries.len();
        self.entries.clear();
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn basic_operations() {
        let store = KvStore::new();
        assert!(store.is_empty());

        assert_eq!(store.set("b", "2"), None);
        assert_eq!(store.set("a", "1"), None);
        assert_eq!(store.set("b", "3"), Some("2".to_string()));

        assert_eq!(store.get("b"), Some("3".to_string()));
        assert!(store.exists("a"));
        assert_eq!(store.keys(), vec!["a", "b"]);
        assert_eq!(store.values(), vec!["1", "3"]);
        assert_eq!(store.size(), 2);

        assert_eq!(store.delete("a"), Some("1".to_string()));
        assert_eq!(store.delete("a"), None);
        assert!(!store.exists("a"));

        assert_eq!(store.clear(), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn shared_between_tasks() {
        let store = Arc::new(KvStore::new());

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.set(format!("key-{i:02}"), i.to_string());
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.size(), 16);
        assert_eq!(store.keys().first().map(String::as_str), Some("key-00"));
    }
}
