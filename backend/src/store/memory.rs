use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::models::Greenhouse;
use crate::store::{ChangeEvent, EntityStore, StoreError, CHANGE_CHANNEL_CAPACITY};

/// In-memory entity store. Serves tests and local development when no
/// `STORE_URL` is configured; the versioning and notification semantics match
/// the remote backend.
pub struct MemoryStore {
    records: RwLock<HashMap<String, Greenhouse>>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            records: RwLock::new(HashMap::new()),
            changes,
        }
    }

    fn snapshot(records: &HashMap<String, Greenhouse>) -> Vec<Greenhouse> {
        let mut greenhouses: Vec<Greenhouse> = records.values().cloned().collect();
        greenhouses.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        greenhouses
    }

    fn notify(&self, records: &HashMap<String, Greenhouse>) {
        // Nobody listening is fine; the send result only reports that.
        let _ = self.changes.send(ChangeEvent {
            greenhouses: Self::snapshot(records),
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get_all(&self) -> Result<Vec<Greenhouse>, StoreError> {
        let records = self.records.read().await;
        Ok(Self::snapshot(&records))
    }

    async fn get(&self, id: &str) -> Result<Greenhouse, StoreError> {
        let records = self.records.read().await;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn create(&self, mut greenhouse: Greenhouse) -> Result<Greenhouse, StoreError> {
        let mut records = self.records.write().await;
        greenhouse.id = Uuid::new_v4().to_string();
        greenhouse.version = 0;
        records.insert(greenhouse.id.clone(), greenhouse.clone());
        self.notify(&records);
        Ok(greenhouse)
    }

    async fn update(
        &self,
        id: &str,
        mut greenhouse: Greenhouse,
        base_version: i64,
    ) -> Result<Greenhouse, StoreError> {
        let mut records = self.records.write().await;
        let current = records
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if current.version != base_version {
            return Err(StoreError::StaleVersion {
                expected: base_version,
                actual: current.version,
            });
        }

        greenhouse.id = id.to_string();
        greenhouse.version = base_version + 1;
        records.insert(id.to_string(), greenhouse.clone());
        self.notify(&records);
        Ok(greenhouse)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.notify(&records);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
