//! zk-node - ZooKeeper configuration and supervision for a cluster node
//!
//! This library renders the ZooKeeper server configuration for a node,
//! assigns the node its ensemble member id and starts, stops and queries the
//! packaged ZooKeeper service through monit.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod supervisor;
pub mod utils;
pub mod zookeeper;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{Result, ZkError};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
pub use zookeeper::{Node, ZooKeeperService};
