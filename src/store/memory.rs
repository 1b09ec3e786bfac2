//! In-memory step store.
//!
//! The default backend: contents live exactly as long as the value, which
//! matches session storage in the browser clients. Also what the tests use.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::traits::{StepPayload, StepStore};
use crate::error::StoreError;

/// Step store backed by an in-process map.
#[derive(Default)]
pub struct MemoryStore {
    steps: RwLock<BTreeMap<String, StepPayload>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StepStore for MemoryStore {
    async fn save(&self, key: &str, payload: &StepPayload) -> Result<(), StoreError> {
        let mut steps = self.steps.write().await;
        let replaced = steps.insert(key.to_string(), payload.clone()).is_some();
        debug!(key, replaced, "Step payload saved");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StepPayload>, StoreError> {
        Ok(self.steps.read().await.get(key).cloned())
    }

    async fn get_all(&self) -> Result<BTreeMap<String, StepPayload>, StoreError> {
        Ok(self.steps.read().await.clone())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut steps = self.steps.write().await;
        let count = steps.len();
        steps.clear();
        debug!(count, "Step store cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(pairs: &[(&str, &str)]) -> StepPayload {
        StepPayload::from_fields(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let store = MemoryStore::new();
        let p = payload(&[("fullName", "Dr. A")]);

        store.save("doctorSignupStep1", &p).await.unwrap();
        let got = store.get("doctorSignupStep1").await.unwrap();
        assert_eq!(got, Some(p));
    }

    #[tokio::test]
    async fn get_of_absent_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("doctorSignupStep1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_overwrites_the_whole_payload() {
        let store = MemoryStore::new();
        store
            .save("step", &payload(&[("a", "1"), ("b", "2")]))
            .await
            .unwrap();
        store.save("step", &payload(&[("a", "9")])).await.unwrap();

        let got = store.get("step").await.unwrap().unwrap();
        assert_eq!(got.get("a"), Some("9"));
        // "b" came from the earlier save and must not leak through.
        assert_eq!(got.get("b"), None);
        assert_eq!(got.len(), 1);
    }

    #[tokio::test]
    async fn get_all_returns_every_key() {
        let store = MemoryStore::new();
        store.save("flowStep1", &payload(&[("a", "1")])).await.unwrap();
        store.save("flowStep2", &payload(&[("b", "2")])).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.contains_key("flowStep1"));
        assert!(all.contains_key("flowStep2"));
    }

    #[tokio::test]
    async fn clear_empties_the_store() {
        let store = MemoryStore::new();
        store.save("flowStep1", &payload(&[("a", "1")])).await.unwrap();
        store.clear().await.unwrap();

        assert!(store.get_all().await.unwrap().is_empty());
        assert_eq!(store.get("flowStep1").await.unwrap(), None);
    }
}
