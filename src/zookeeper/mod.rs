//! ZooKeeper node management module
//!
//! Renders the server configuration, assigns this node its member id and
//! drives the packaged ZooKeeper service.

pub mod files;
pub mod node;
pub mod render;
pub mod service;

// Re-export main types
pub use node::{load_nodes, Node};
pub use render::{member_id, render, RenderedConfig, ZooCfg};
pub use service::{InitScript, ServiceSettings, ZooKeeperService};
