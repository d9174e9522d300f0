//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::zookeeper::Node;

/// Body of POST /zookeeper/configure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigureRequest {
    pub nodes: Vec<Node>,
    pub my_index: usize,
}

/// Body of POST /zookeeper/start
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub clear_datastore: bool,
}

/// API response structure for operation endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Set by configure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<u32>,
}

impl ApiResponse {
    pub fn new(status: &str, message: String) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            member_id: None,
        }
    }

    pub fn ok(message: String) -> Self {
        Self::new("ok", message)
    }

    pub fn error(message: String) -> Self {
        Self::new("error", message)
    }

    pub fn with_member_id(mut self, member_id: Option<u32>) -> Self {
        self.member_id = member_id;
        self
    }
}

/// Response of GET /zookeeper/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
