//! Best-effort post persistence
//!
//! The content store never waits on storage. New posts are pushed onto an
//! unbounded queue and a background task hands them to a [`PostSink`];
//! failures are logged and dropped.

use crate::core_content::Post;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Destination for newly created posts
#[async_trait]
pub trait PostSink: Send + Sync {
    async fn save(&self, post: &Post) -> Result<(), PersistenceError>;
}

/// Stand-in database that only logs what it would store
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingPostSink;

#[async_trait]
impl PostSink for LoggingPostSink {
    async fn save(&self, post: &Post) -> Result<(), PersistenceError> {
        info!(post_id = %post.id(), "Pretend saving post '{}' to DB", post.title());
        Ok(())
    }
}

/// Sending half of the persistence queue
#[derive(Clone)]
pub struct PersistenceQueue {
    tx: mpsc::UnboundedSender<Arc<Post>>,
}

impl PersistenceQueue {
    /// Start the background task feeding `sink`. The task ends once every
    /// queue handle has been dropped and the backlog is written.
    pub fn spawn(sink: Arc<dyn PostSink>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Arc<Post>>();

        let task = tokio::spawn(async move {
            while let Some(post) = rx.recv().await {
                match sink.save(&post).await {
                    Ok(()) => debug!(post_id = %post.id(), "Post persisted"),
                    Err(e) => warn!(post_id = %post.id(), error = %e, "Failed to persist post"),
                }
            }
            debug!("Persistence task stopped");
        });

        (Self { tx }, task)
    }

    /// Hand a post to the background task; never blocks
    pub fn submit(&self, post: Arc<Post>) {
        if self.tx.send(post).is_err() {
            warn!("Persistence task is gone, post not saved");
        }
    }
}
