//! Graceful shutdown coordinator
//!
//! Long-running background components (the stub listener) subscribe to a
//! broadcast signal and stop when it fires. The content core is not wired
//! to it; session shutdown is driven by the presentation layer.

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info, warn};

/// Shutdown signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Graceful,
}

/// Shutdown state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    ShuttingDown,
    Shutdown,
}

pub struct ShutdownCoordinator {
    state: RwLock<ShutdownState>,
    shutdown_tx: broadcast::Sender<ShutdownSignal>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);

        Self {
            state: RwLock::new(ShutdownState::Running),
            shutdown_tx,
        }
    }

    /// Subscribe to shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownSignal> {
        self.shutdown_tx.subscribe()
    }

    /// Ask every subscriber to wind down. Only the first call broadcasts.
    pub async fn shutdown(&self) {
        let mut state = self.state.write().await;
        if *state != ShutdownState::Running {
            warn!("Shutdown already in progress");
            return;
        }

        info!("Initiating graceful shutdown");
        *state = ShutdownState::ShuttingDown;
        drop(state);

        // No receivers is fine: nothing left to stop
        let _ = self.shutdown_tx.send(ShutdownSignal::Graceful);
    }

    /// Record that every component has stopped
    pub async fn mark_complete(&self) {
        *self.state.write().await = ShutdownState::Shutdown;
        info!("Shutdown complete");
    }

    pub async fn is_shutting_down(&self) -> bool {
        *self.state.read().await != ShutdownState::Running
    }

    pub async fn state(&self) -> ShutdownState {
        *self.state.read().await
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one component until it finishes or shutdown is signalled
pub struct ShutdownHandler {
    coordinator: Arc<ShutdownCoordinator>,
    component_name: String,
}

impl ShutdownHandler {
    pub fn new(coordinator: Arc<ShutdownCoordinator>, component_name: impl Into<String>) -> Self {
        Self {
            coordinator,
            component_name: component_name.into(),
        }
    }

    pub async fn run<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        info!("Starting component: {}", self.component_name);

        let mut shutdown_rx = self.coordinator.subscribe();
        if self.coordinator.is_shutting_down().await {
            info!("Component {} not started: shutdown in progress", self.component_name);
            return;
        }

        tokio::select! {
            _ = f() => {
                info!("Component {} completed normally", self.component_name);
            }
            signal = shutdown_rx.recv() => {
                match signal {
                    Ok(ShutdownSignal::Graceful) => {
                        info!("Component {} received graceful shutdown signal", self.component_name);
                    }
                    Err(e) => {
                        error!("Component {} shutdown channel error: {}", self.component_name, e);
                    }
                }
            }
        }

        info!("Component {} shutdown complete", self.component_name);
    }
}

/// Trigger `coordinator` on Ctrl-C
pub fn install_ctrl_c_handler(coordinator: Arc<ShutdownCoordinator>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C");
                coordinator.shutdown().await;
            }
            Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
        }
    });
}
