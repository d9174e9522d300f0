//! zoo.cfg rendering and member id assignment

use std::{fmt::Write, path::PathBuf};

use super::node::Node;

/// Default ZooKeeper data location
pub const DATA_LOCATION: &str = "/opt/appscale/zookeeper";
/// Default client port
pub const CLIENT_PORT: u16 = 2181;

/// Tunables written to zoo.cfg
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZooCfg {
    pub tick_time: u32,
    pub init_limit: u32,
    pub sync_limit: u32,
    pub data_dir: PathBuf,
    pub client_port: u16,
    pub leader_serves: bool,
    pub max_client_cnxns: u32,
    pub force_sync: bool,
    pub skip_acl: bool,
    pub snap_retain_count: u32,
    /// Hours between autopurge runs
    pub purge_interval: u32,
    pub peer_port: u16,
    pub election_port: u16,
}

impl Default for ZooCfg {
    fn default() -> Self {
        Self {
            tick_time: 2000,
            init_limit: 10,
            sync_limit: 5,
            data_dir: PathBuf::from(DATA_LOCATION),
            client_port: CLIENT_PORT,
            leader_serves: true,
            max_client_cnxns: 0,
            force_sync: false,
            skip_acl: true,
            snap_retain_count: 5,
            purge_interval: 1,
            peer_port: 2888,
            election_port: 3888,
        }
    }
}

/// Output of [`render`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedConfig {
    pub zoo_cfg: String,
    pub member_id: Option<u32>,
}

impl RenderedConfig {
    /// Contents of the myid file; empty when this node has no server number
    pub fn myid(&self) -> String {
        self.member_id.map(|id| id.to_string()).unwrap_or_default()
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Number of ZooKeeper members in the node list
pub fn ensemble_size(nodes: &[Node]) -> usize {
    nodes.iter().filter(|n| n.is_zookeeper()).count()
}

/// Server number of the node at `my_index`.
///
/// Server numbers are only assigned to ensembles of two or more members,
/// counting ZooKeeper nodes from 1 in list order.
pub fn member_id(nodes: &[Node], my_index: usize) -> Option<u32> {
    if ensemble_size(nodes) < 2 {
        return None;
    }
    let me = nodes.get(my_index)?;
    if !me.is_zookeeper() {
        return None;
    }
    let before = nodes[..my_index].iter().filter(|n| n.is_zookeeper()).count();
    Some(before as u32 + 1)
}

/// Render zoo.cfg for the node at `my_index`
pub fn render(cfg: &ZooCfg, nodes: &[Node], my_index: usize) -> RenderedConfig {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "tickTime={}", cfg.tick_time);
    let _ = writeln!(out, "initLimit={}", cfg.init_limit);
    let _ = writeln!(out, "syncLimit={}", cfg.sync_limit);
    let _ = writeln!(out, "dataDir={}", cfg.data_dir.display());
    let _ = writeln!(out, "clientPort={}", cfg.client_port);
    let _ = writeln!(out, "leaderServes={}", yes_no(cfg.leader_serves));
    let _ = writeln!(out, "maxClientsCnxns={}", cfg.max_client_cnxns);
    let _ = writeln!(out, "forceSync={}", yes_no(cfg.force_sync));
    let _ = writeln!(out, "skipACL={}", yes_no(cfg.skip_acl));
    let _ = writeln!(out, "autopurge.snapRetainCount={}", cfg.snap_retain_count);
    out.push_str("# Increased zookeeper activity can produce a vast amount of logs/snapshots.\n");
    out.push_str("# With this we ensure that logs/snapshots are cleaned up hourly.\n");
    let _ = writeln!(out, "autopurge.purgeInterval={}", cfg.purge_interval);

    // server.N lines are only valid for ensembles (ZooKeeper >= 3.4)
    if ensemble_size(nodes) > 1 {
        for (id, node) in nodes.iter().filter(|n| n.is_zookeeper()).enumerate() {
            let _ = writeln!(
                out,
                "server.{}={}:{}:{}",
                id + 1,
                node.private_ip,
                cfg.peer_port,
                cfg.election_port
            );
        }
    }

    RenderedConfig {
        zoo_cfg: out,
        member_id: member_id(nodes, my_index),
    }
}
