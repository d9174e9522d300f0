//! Configuration and CLI argument handling

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::{
    error::Result,
    supervisor::{Monit, MONIT_CONF_DIR},
    utils::command::CommandLine,
    zookeeper::{load_nodes, Node, ServiceSettings, ZooCfg, ZooKeeperService},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "zk-node")]
#[command(about = "Configure and supervise the ZooKeeper server of a cluster node")]
#[command(version)]
pub struct Config {
    /// ZooKeeper configuration directory (zoo.cfg, myid)
    #[arg(long, default_value = "/etc/zookeeper/conf")]
    pub conf_dir: PathBuf,

    /// ZooKeeper data directory
    #[arg(long, default_value = "/opt/appscale/zookeeper")]
    pub data_dir: PathBuf,

    /// Data directory of older packages, removed when clearing the datastore
    #[arg(long, default_value = "/var/lib/zookeeper")]
    pub legacy_data_dir: PathBuf,

    /// Service environment file holding JAVA_OPTS
    #[arg(long, default_value = "/etc/zookeeper/conf/environment")]
    pub environment_file: PathBuf,

    /// Maximum JVM heap
    #[arg(long, default_value = "1024m")]
    pub java_heap: String,

    /// ZooKeeper client port
    #[arg(long, default_value = "2181")]
    pub client_port: u16,

    /// Command used to drive init scripts
    #[arg(long, default_value = "/usr/sbin/service")]
    pub service_cmd: CommandLine,

    /// Owner of the data directory
    #[arg(long, default_value = "zookeeper")]
    pub service_user: String,

    /// Command used to talk to monit
    #[arg(long, default_value = "monit")]
    pub monit_cmd: CommandLine,

    /// Directory monit loads check files from
    #[arg(long, default_value = MONIT_CONF_DIR)]
    pub monit_conf_dir: PathBuf,

    /// Restart ZooKeeper when its memory use stays above this many MB
    #[arg(long)]
    pub max_memory_mb: Option<u64>,

    /// Environment variable for the supervised start command, as KEY=VALUE
    #[arg(long = "watch-env", value_parser = parse_env_var)]
    pub watch_env: Vec<(String, String)>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write zoo.cfg and myid for this node
    Configure {
        /// Position of this node in the node list
        #[arg(short, long)]
        index: usize,

        /// Cluster node as IP[:ROLE,ROLE...], repeat in cluster order
        #[arg(long = "node", conflicts_with = "nodes", required_unless_present = "nodes")]
        node: Vec<Node>,

        /// JSON file with the cluster node list
        #[arg(long)]
        nodes: Option<PathBuf>,
    },
    /// Initialize the data directory if needed and start ZooKeeper under monit
    Start {
        /// Delete all ZooKeeper data first
        #[arg(long)]
        clear_datastore: bool,
    },
    /// Stop ZooKeeper through monit
    Stop,
    /// Exit 0 when ZooKeeper is running, 3 otherwise
    Status,
    /// Serve the operations over HTTP
    Serve {
        /// Host address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind the server to
        #[arg(short, long, default_value = "20554")]
        port: u16,
    },
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            conf_dir: self.conf_dir.clone(),
            legacy_data_dir: self.legacy_data_dir.clone(),
            environment_file: self.environment_file.clone(),
            java_heap: self.java_heap.clone(),
            service_cmd: self.service_cmd.clone(),
            service_user: self.service_user.clone(),
            max_memory_mb: self.max_memory_mb,
            watch_env: self.watch_env.iter().cloned().collect(),
            zoo_cfg: ZooCfg {
                data_dir: self.data_dir.clone(),
                client_port: self.client_port,
                ..ZooCfg::default()
            },
        }
    }

    /// Build the service handle from the parsed options
    pub fn zookeeper(&self) -> ZooKeeperService {
        let monit = Monit::new(self.monit_cmd.clone(), self.monit_conf_dir.clone());
        ZooKeeperService::new(self.service_settings(), monit)
    }
}

fn parse_env_var(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", s)),
    }
}

/// Resolve the node list of a `configure` invocation
pub fn resolve_nodes(node: &[Node], nodes: Option<&PathBuf>) -> Result<Vec<Node>> {
    match nodes {
        Some(path) => load_nodes(path),
        None => Ok(node.to_vec()),
    }
}
