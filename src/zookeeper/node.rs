//! Cluster node descriptions

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};

use crate::error::{Result, ZkError};

/// Role name that marks a node as a ZooKeeper ensemble member
pub const ZOOKEEPER_ROLE: &str = "zookeeper";

/// A cluster member as seen from this node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub private_ip: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Node {
    pub fn new(private_ip: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            private_ip: private_ip.into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn is_zookeeper(&self) -> bool {
        self.roles.iter().any(|r| r == ZOOKEEPER_ROLE)
    }
}

/// Parses `IP[:ROLE,ROLE...]`
impl FromStr for Node {
    type Err = ZkError;

    fn from_str(s: &str) -> Result<Self> {
        let (ip, roles) = match s.split_once(':') {
            Some((ip, roles)) => (ip.trim(), roles),
            None => (s.trim(), ""),
        };
        if ip.is_empty() {
            return Err(ZkError::InvalidNode(s.to_string()));
        }

        let roles = roles
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            private_ip: ip.to_string(),
            roles,
        })
    }
}

/// Load a JSON array of nodes from disk
pub fn load_nodes(path: &Path) -> Result<Vec<Node>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ip_and_roles() {
        let node: Node = "10.0.0.2:db_master, zookeeper".parse().unwrap();
        assert_eq!(node.private_ip, "10.0.0.2");
        assert_eq!(node.roles, vec!["db_master", "zookeeper"]);
        assert!(node.is_zookeeper());
    }

    #[test]
    fn bare_ip_has_no_roles() {
        let node: Node = "10.0.0.3".parse().unwrap();
        assert!(node.roles.is_empty());
        assert!(!node.is_zookeeper());
    }

    #[test]
    fn rejects_missing_ip() {
        assert!(matches!(":zookeeper".parse::<Node>(), Err(ZkError::InvalidNode(_))));
    }

    #[test]
    fn loads_node_list_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.json");
        fs::write(
            &path,
            r#"[{"private_ip": "10.0.0.1", "roles": ["zookeeper"]}, {"private_ip": "10.0.0.2"}]"#,
        )
        .unwrap();

        let nodes = load_nodes(&path).unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].is_zookeeper());
        assert!(!nodes[1].is_zookeeper());
    }

    #[test]
    fn malformed_node_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(load_nodes(&path), Err(ZkError::NodeList(_))));
    }
}
