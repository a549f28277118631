use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::models::Greenhouse;

pub mod memory;
pub mod remote;

pub use memory::MemoryStore;
pub use remote::RemoteStore;

/// Capacity of the change-event channel. Subscribers that fall further behind
/// observe a lag and pick up again from the next full snapshot.
pub const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Emitted after every successful create/update/delete. Carries the full
/// canonical snapshot list; subscribers replace their local state wholesale,
/// there is no field-level reconciliation.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub greenhouses: Vec<Greenhouse>,
}

/// Error types for entity store operations. Store failures leave local state
/// untouched; callers report them and keep their prior snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No greenhouse with the given id exists.
    NotFound(String),
    /// The update was based on an outdated version of the record.
    StaleVersion { expected: i64, actual: i64 },
    /// The store could not be reached or answered with a failure status.
    Connection(String),
    /// The store answered with a record this service cannot decode.
    Serialization(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "Greenhouse not found: {}", id),
            StoreError::StaleVersion { expected, actual } => write!(
                f,
                "Stale base version {} (store has {})",
                expected, actual
            ),
            StoreError::Connection(msg) => write!(f, "Store unreachable: {}", msg),
            StoreError::Serialization(msg) => write!(f, "Undecodable store record: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// One record per greenhouse, full snapshot in, full snapshot out. The store
/// assigns ids on creation and increments the version token on every update;
/// an update carrying a stale base version is rejected instead of silently
/// overwriting a concurrent edit.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Greenhouse>, StoreError>;

    async fn get(&self, id: &str) -> Result<Greenhouse, StoreError>;

    /// Persist a new greenhouse. The caller-supplied id and version are
    /// ignored; the stored record comes back with both assigned.
    async fn create(&self, greenhouse: Greenhouse) -> Result<Greenhouse, StoreError>;

    /// Replace the whole record. `base_version` must match the stored
    /// version; the result carries the incremented version.
    async fn update(
        &self,
        id: &str,
        greenhouse: Greenhouse,
        base_version: i64,
    ) -> Result<Greenhouse, StoreError>;

    /// Remove the aggregate and all nested data permanently.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Subscribe to the live notification channel.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
