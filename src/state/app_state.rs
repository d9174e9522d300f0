//! Shared state of the HTTP control surface

use std::{sync::Mutex, time::Instant};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex as OperationLock, MutexGuard};
use tracing::info;

use crate::zookeeper::ZooKeeperService;

/// State shared by all request handlers
#[derive(Debug)]
pub struct AppState {
    /// The local ZooKeeper server
    pub zookeeper: ZooKeeperService,
    /// Serializes configure/start/stop so their commands never interleave
    operation_lock: OperationLock<()>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(zookeeper: ZooKeeperService, port: u16, host: String) -> Self {
        Self {
            zookeeper,
            operation_lock: OperationLock::new(()),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Wait for any in-flight operation and hold the lock until the guard drops
    pub async fn begin_operation(&self, action: &str) -> MutexGuard<'_, ()> {
        let guard = self.operation_lock.lock().await;
        info!("Running {} operation", action);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
        guard
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
