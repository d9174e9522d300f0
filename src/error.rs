//! Error types shared by the library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command `{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Failed to initialize ZooKeeper: {0}")]
    InitFailed(String),

    #[error("Invalid node `{0}`: expected IP[:ROLE,ROLE...]")]
    InvalidNode(String),

    #[error("Failed to read node list: {0}")]
    NodeList(#[from] serde_json::Error),

    #[error("Supervisor error: {0}")]
    Supervisor(String),
}

pub type Result<T> = std::result::Result<T, ZkError>;
