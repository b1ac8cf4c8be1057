//! Helpers shared by the integration tests

#![allow(dead_code)]

use quillpad_core::config::{Config, NotifierConfig};
use quillpad_core::{NotificationEvent, SessionController};
use std::time::Duration;
use tokio::sync::broadcast;

pub fn test_config(delivery_delay: Duration) -> Config {
    Config {
        notifier: NotifierConfig {
            workers: 2,
            delivery_delay,
            shutdown_timeout: Duration::from_secs(5),
        },
        ..Default::default()
    }
}

pub fn seeded_session() -> SessionController {
    SessionController::bootstrap(&test_config(Duration::from_millis(10))).unwrap()
}

/// Wait for the first `Delivered` event, skipping `Queued` ones
pub async fn next_delivery(
    rx: &mut broadcast::Receiver<NotificationEvent>,
    within: Duration,
) -> Option<NotificationEvent> {
    tokio::time::timeout(within, async {
        loop {
            match rx.recv().await {
                Ok(event) if event.is_delivered() => return Some(event),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}
