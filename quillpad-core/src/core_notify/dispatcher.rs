//! Worker pool delivering comment notifications

use super::events::{Notification, NotificationEvent};
use crate::config::NotifierConfig;
use metrics::counter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification dispatcher is shut down")]
    Closed,
}

struct Inner {
    tx: Mutex<Option<mpsc::UnboundedSender<Notification>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    events: broadcast::Sender<NotificationEvent>,
    submitted: AtomicU64,
    delivered: AtomicU64,
    rejected: AtomicU64,
    shutdown_timeout: Duration,
}

/// Fire-and-forget notification pool
///
/// Cloning is cheap and every clone feeds the same queue. Must be created
/// from within a tokio runtime.
#[derive(Clone)]
pub struct NotificationDispatcher {
    inner: Arc<Inner>,
}

impl NotificationDispatcher {
    /// Start `config.workers` workers
    pub fn spawn(config: &NotifierConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let inner = Arc::new(Inner {
            tx: Mutex::new(Some(tx)),
            workers: Mutex::new(Vec::with_capacity(config.workers)),
            events,
            submitted: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            shutdown_timeout: config.shutdown_timeout,
        });

        let queue = Arc::new(AsyncMutex::new(rx));
        let handles: Vec<_> = (0..config.workers.max(1))
            .map(|worker| {
                tokio::spawn(run_worker(
                    worker,
                    queue.clone(),
                    inner.clone(),
                    config.delivery_delay,
                ))
            })
            .collect();

        if let Ok(mut workers) = inner.workers.lock() {
            workers.extend(handles);
        }

        debug!(workers = config.workers, "Notification dispatcher started");
        Self { inner }
    }

    /// Enqueue a notification without waiting for it
    pub fn submit(&self, notification: Notification) -> Result<(), NotifyError> {
        let sent = match self.inner.tx.lock() {
            Ok(tx) => match tx.as_ref() {
                Some(tx) => tx.send(notification.clone()).is_ok(),
                None => false,
            },
            Err(_) => false,
        };

        if !sent {
            self.inner.rejected.fetch_add(1, Ordering::Relaxed);
            counter!("quillpad_notifications_total", "result" => "rejected").increment(1);
            return Err(NotifyError::Closed);
        }

        self.inner.submitted.fetch_add(1, Ordering::Relaxed);
        counter!("quillpad_notifications_total", "result" => "queued").increment(1);
        debug!(recipient = %notification.recipient, post_id = %notification.post_id, "Notification queued");
        let _ = self.inner.events.send(NotificationEvent::Queued(notification));
        Ok(())
    }

    /// Stop accepting work, give queued deliveries `shutdown_timeout` to
    /// finish, then abort whatever is left. Safe to call more than once.
    pub async fn shutdown(&self) {
        let closed = match self.inner.tx.lock() {
            Ok(mut tx) => tx.take().is_some(),
            Err(_) => false,
        };
        let mut handles = match self.inner.workers.lock() {
            Ok(mut workers) => std::mem::take(&mut *workers),
            Err(_) => Vec::new(),
        };

        if !closed && handles.is_empty() {
            return;
        }

        info!(workers = handles.len(), "Shutting down notification dispatcher");

        let drained = tokio::time::timeout(self.inner.shutdown_timeout, async {
            for handle in handles.iter_mut() {
                let _ = handle.await;
            }
        })
        .await;

        if drained.is_err() {
            let pending = self.pending();
            warn!(pending, "Abandoning in-flight notifications");
            for handle in &handles {
                handle.abort();
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.tx.lock().map(|tx| tx.is_none()).unwrap_or(true)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    pub fn submitted(&self) -> u64 {
        self.inner.submitted.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> u64 {
        self.inner.delivered.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.inner.rejected.load(Ordering::Relaxed)
    }

    /// Accepted but not yet delivered
    pub fn pending(&self) -> u64 {
        self.submitted().saturating_sub(self.delivered())
    }
}

async fn run_worker(
    worker: usize,
    queue: Arc<AsyncMutex<mpsc::UnboundedReceiver<Notification>>>,
    inner: Arc<Inner>,
    delay: Duration,
) {
    loop {
        let next = { queue.lock().await.recv().await };
        let Some(notification) = next else {
            break;
        };

        info!(worker, recipient = %notification.recipient, "Preparing to send notification");
        // Stands in for network latency
        tokio::time::sleep(delay).await;
        info!(
            worker,
            recipient = %notification.recipient,
            post_id = %notification.post_id,
            commenter = %notification.commenter,
            "New comment notification sent"
        );

        inner.delivered.fetch_add(1, Ordering::Relaxed);
        counter!("quillpad_notifications_total", "result" => "delivered").increment(1);
        let _ = inner.events.send(NotificationEvent::Delivered(notification));
    }
    debug!(worker, "Notification worker stopped");
}
