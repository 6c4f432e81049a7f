//! Synchronisation of relations with the registries that own the related objects.
//!
//! When an ObjectInformatieObject is created, the zaak or besluit registry should learn about
//! the document too. Services publish a [`RelationEvent`] after their transaction commits; a
//! background worker ([`run_sync_worker`]) hands each event to a [`RelationSync`]
//! implementation. Failures are logged and never reach the client that caused the event.

use crate::model::ObjectType;
use crate::{DrcError, DrcResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Something that happened to a relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationEvent {
    Created {
        informatieobject_url: String,
        object: String,
        object_type: ObjectType,
    },
    Deleted {
        informatieobject_url: String,
        object: String,
        object_type: ObjectType,
    },
}

impl RelationEvent {
    pub fn object(&self) -> &str {
        match self {
            RelationEvent::Created { object, .. } | RelationEvent::Deleted { object, .. } => {
                object
            }
        }
    }
}

/// Sending half of the event channel, held by the relation service.
#[derive(Clone, Debug)]
pub struct EventPublisher {
    tx: mpsc::Sender<RelationEvent>,
}

impl EventPublisher {
    /// Queues an event without waiting. A full queue or a closed channel drops the event with a
    /// warning.
    pub fn publish(&self, event: RelationEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => tracing::warn!(
                object = event.object(),
                "relation sync queue is full, event dropped"
            ),
            Err(TrySendError::Closed(event)) => tracing::warn!(
                object = event.object(),
                "relation sync worker is gone, event dropped"
            ),
        }
    }
}

/// Creates a publisher and the receiver to pass to [`run_sync_worker`].
///
/// At most `capacity` events wait for the worker; a capacity of zero is treated as one.
pub fn channel(capacity: usize) -> (EventPublisher, mpsc::Receiver<RelationEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventPublisher { tx }, rx)
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} answered with HTTP status {status}")]
    Status { url: String, status: u16 },
}

/// Propagates relation events to a remote registry.
#[async_trait]
pub trait RelationSync: Send + Sync {
    async fn sync(&self, event: &RelationEvent) -> Result<(), SyncError>;
}

/// [`RelationSync`] over HTTP.
///
/// A created relation is announced by POSTing `{"informatieobject": <url>}` to
/// `<object>/informatieobjecten`. Deletions are not propagated; the owning registry removes its
/// side when its own relation is deleted.
#[derive(Clone, Debug)]
pub struct RemoteRegistrySync {
    http: reqwest::Client,
}

impl RemoteRegistrySync {
    pub fn new(timeout: Duration) -> DrcResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DrcError::HttpClient(e.to_string()))?;
        Ok(Self { http })
    }

    fn endpoint(object: &str) -> String {
        format!("{}/informatieobjecten", object.trim_end_matches('/'))
    }
}

#[async_trait]
impl RelationSync for RemoteRegistrySync {
    async fn sync(&self, event: &RelationEvent) -> Result<(), SyncError> {
        let RelationEvent::Created {
            informatieobject_url,
            object,
            ..
        } = event
        else {
            tracing::info!(object = event.object(), "relation deleted, remote side left as is");
            return Ok(());
        };

        let url = Self::endpoint(object);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "informatieobject": informatieobject_url }))
            .send()
            .await
            .map_err(|e| SyncError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SyncError::Status {
                url,
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

/// Consumes events until every publisher is dropped.
pub async fn run_sync_worker(
    mut rx: mpsc::Receiver<RelationEvent>,
    sync: Arc<dyn RelationSync>,
) {
    tracing::info!("relation sync worker started");
    while let Some(event) = rx.recv().await {
        match sync.sync(&event).await {
            Ok(()) => tracing::debug!(object = event.object(), "relation synchronised"),
            Err(e) => tracing::warn!("relation sync failed: {e}"),
        }
    }
    tracing::info!("relation sync worker stopped");
}
