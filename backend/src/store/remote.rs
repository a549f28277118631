use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::models::Greenhouse;
use crate::store::{ChangeEvent, EntityStore, StoreError, CHANGE_CHANNEL_CAPACITY};

/// Entity store backed by a remote JSON document-collection API. One document
/// per greenhouse under `{base_url}/greenhouses`; updates send the base
/// version in an `If-Match-Version` header and a conflict comes back as 409.
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
    changes: broadcast::Sender<ChangeEvent>,
}

/// Body of a 409 response, reporting the version the store currently holds.
#[derive(Deserialize)]
struct ConflictBody {
    actual: i64,
}

impl RemoteStore {
    pub fn new(base_url: String, token: String) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            changes,
        }
    }

    /// The remote store has no push channel of its own here (the realtime
    /// transport is an external collaborator), so change notification is
    /// bridged by polling: the full collection is fetched on an interval and
    /// broadcast whenever it differs from the previous snapshot.
    pub fn spawn_poller(self: Arc<Self>, interval: Duration) {
        let store = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last: Option<Vec<Greenhouse>> = None;
            loop {
                ticker.tick().await;
                match store.get_all().await {
                    Ok(snapshot) => {
                        if last.as_ref() != Some(&snapshot) {
                            let _ = store.changes.send(ChangeEvent {
                                greenhouses: snapshot.clone(),
                            });
                            last = Some(snapshot);
                        }
                    }
                    Err(e) => log::warn!("Entity store poll failed: {}", e),
                }
            }
        });
    }

    fn collection_url(&self) -> String {
        format!("{}/greenhouses", self.base_url)
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/greenhouses/{}", self.base_url, id)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.token.is_empty() {
            request
        } else {
            request.header("Authorization", format!("Bearer {}", self.token))
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    async fn check(
        response: Result<reqwest::Response, reqwest::Error>,
        id: Option<&str>,
        base_version: Option<i64>,
    ) -> Result<reqwest::Response, StoreError> {
        let response = response.map_err(|e| StoreError::Connection(e.to_string()))?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                Err(StoreError::NotFound(id.unwrap_or_default().to_string()))
            }
            StatusCode::CONFLICT => {
                let expected = base_version.unwrap_or_default();
                // Best effort: if the conflict body is unreadable, all we
                // know is that the store is at least one version ahead.
                let actual = response
                    .json::<ConflictBody>()
                    .await
                    .map(|body| body.actual)
                    .unwrap_or(expected + 1);
                Err(StoreError::StaleVersion { expected, actual })
            }
            status if status.is_success() => Ok(response),
            status => Err(StoreError::Connection(format!(
                "store answered with status {}",
                status
            ))),
        }
    }
}

#[async_trait]
impl EntityStore for RemoteStore {
    async fn get_all(&self) -> Result<Vec<Greenhouse>, StoreError> {
        let response = self.authorize(self.client.get(self.collection_url())).send().await;
        Self::decode(Self::check(response, None, None).await?).await
    }

    async fn get(&self, id: &str) -> Result<Greenhouse, StoreError> {
        let response = self.authorize(self.client.get(self.document_url(id))).send().await;
        Self::decode(Self::check(response, Some(id), None).await?).await
    }

    async fn create(&self, greenhouse: Greenhouse) -> Result<Greenhouse, StoreError> {
        let response = self
            .authorize(self.client.post(self.collection_url()))
            .json(&greenhouse)
            .send()
            .await;
        Self::decode(Self::check(response, None, None).await?).await
    }

    async fn update(
        &self,
        id: &str,
        greenhouse: Greenhouse,
        base_version: i64,
    ) -> Result<Greenhouse, StoreError> {
        let response = self
            .authorize(self.client.put(self.document_url(id)))
            .header("If-Match-Version", base_version)
            .json(&greenhouse)
            .send()
            .await;
        Self::decode(Self::check(response, Some(id), Some(base_version)).await?).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let response = self.authorize(self.client.delete(self.document_url(id))).send().await;
        Self::check(response, Some(id), None).await?;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
