//! Shared helpers for unit tests

use crate::config::NotifierConfig;
use crate::core_content::{Post, PostId};
use crate::persistence::{PersistenceError, PostSink};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;

/// Notifier settings with a short delivery delay
pub fn fast_notifier_config() -> NotifierConfig {
    NotifierConfig {
        workers: 2,
        delivery_delay: Duration::from_millis(10),
        shutdown_timeout: Duration::from_secs(5),
    }
}

/// Next broadcast event, or `None` on timeout or closed channel
pub async fn recv_event_timeout<T: Clone>(
    rx: &mut broadcast::Receiver<T>,
    duration: Duration,
) -> Option<T> {
    tokio::time::timeout(duration, rx.recv()).await.ok()?.ok()
}

/// Sink that remembers which posts it was asked to save
#[derive(Debug, Default)]
pub struct RecordingSink {
    saved: Mutex<Vec<PostId>>,
}

impl RecordingSink {
    pub fn saved(&self) -> Vec<PostId> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostSink for RecordingSink {
    async fn save(&self, post: &Post) -> Result<(), PersistenceError> {
        self.saved.lock().unwrap().push(post.id());
        Ok(())
    }
}

/// Sink whose storage is always down
#[derive(Debug, Default)]
pub struct FailingSink;

#[async_trait]
impl PostSink for FailingSink {
    async fn save(&self, _post: &Post) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("disk on fire".to_string()))
    }
}
