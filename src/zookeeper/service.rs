//! ZooKeeper service lifecycle: configure, start, stop and status

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, error, info, warn};

use super::{
    files::{self, MYID},
    node::Node,
    render::{render, RenderedConfig, ZooCfg},
};
use crate::{
    error::{Result, ZkError},
    supervisor::{Monit, Watch},
    utils::command::{run_logged, CommandLine},
};

/// Supervisor watch name
pub const WATCH_NAME: &str = "zookeeper";
/// Main class of a running ZooKeeper server
pub const QUORUM_PEER_MAIN: &str = "org.apache.zookeeper.server.quorum.QuorumPeerMain";

/// Flavour of the packaged init script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitScript {
    /// Debian/Ubuntu `zookeeper` package
    ZooKeeper,
    /// CDH style `zookeeper-server` package, which needs an explicit `init`
    ZooKeeperServer,
}

impl InitScript {
    pub fn name(&self) -> &'static str {
        match self {
            InitScript::ZooKeeper => "zookeeper",
            InitScript::ZooKeeperServer => "zookeeper-server",
        }
    }

    pub fn needs_init(&self) -> bool {
        matches!(self, InitScript::ZooKeeperServer)
    }

    /// Pick the script from `service --status-all` output
    pub fn detect(status_all: &str) -> Self {
        if status_all
            .lines()
            .any(|line| line.trim_end().ends_with("zookeeper"))
        {
            InitScript::ZooKeeper
        } else {
            InitScript::ZooKeeperServer
        }
    }
}

/// Paths and commands the service operates on
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub conf_dir: PathBuf,
    /// Data location used by older packages, removed on datastore clears
    pub legacy_data_dir: PathBuf,
    pub environment_file: PathBuf,
    pub java_heap: String,
    pub service_cmd: CommandLine,
    pub service_user: String,
    /// Memory ceiling enforced by the supervisor
    pub max_memory_mb: Option<u64>,
    /// Extra environment for the supervised start command
    pub watch_env: BTreeMap<String, String>,
    pub zoo_cfg: ZooCfg,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            conf_dir: PathBuf::from("/etc/zookeeper/conf"),
            legacy_data_dir: PathBuf::from("/var/lib/zookeeper"),
            environment_file: PathBuf::from("/etc/zookeeper/conf/environment"),
            java_heap: "1024m".to_string(),
            service_cmd: CommandLine::new("/usr/sbin/service"),
            service_user: "zookeeper".to_string(),
            max_memory_mb: None,
            watch_env: BTreeMap::new(),
            zoo_cfg: ZooCfg::default(),
        }
    }
}

/// The local ZooKeeper server
#[derive(Debug, Clone)]
pub struct ZooKeeperService {
    settings: ServiceSettings,
    monit: Monit,
}

impl ZooKeeperService {
    pub fn new(settings: ServiceSettings, monit: Monit) -> Self {
        Self { settings, monit }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn data_dir(&self) -> &Path {
        &self.settings.zoo_cfg.data_dir
    }

    /// Write zoo.cfg and myid for the node at `my_index` and set the JVM heap
    pub fn configure(&self, nodes: &[Node], my_index: usize) -> Result<RenderedConfig> {
        let rendered = render(&self.settings.zoo_cfg, nodes, my_index);

        debug!("zookeeper configuration={}", rendered.zoo_cfg);
        debug!("zookeeper myid={}", rendered.myid());
        files::write_config(&self.settings.conf_dir, &rendered)?;

        files::apply_java_heap(&self.settings.environment_file, &self.settings.java_heap);

        info!(
            "ZooKeeper configured ({} nodes, member id {})",
            nodes.len(),
            rendered
                .member_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        Ok(rendered)
    }

    async fn detect_init_script(&self) -> InitScript {
        let cmd = self.settings.service_cmd.clone().arg("--status-all");
        let script = match run_logged(&cmd).await {
            Some(output) => InitScript::detect(&format!("{}\n{}", output.stdout, output.stderr)),
            None => InitScript::ZooKeeperServer,
        };
        debug!("Using init script {}", script.name());
        script
    }

    fn service(&self, script: InitScript, action: &str) -> CommandLine {
        self.settings
            .service_cmd
            .clone()
            .args([script.name(), action])
    }

    /// Supervisor definition for the given init script
    pub fn watch(&self, script: InitScript) -> Watch {
        Watch {
            name: WATCH_NAME.to_string(),
            start_cmd: self.service(script, "start"),
            stop_cmd: self.service(script, "stop"),
            ports: vec![self.settings.zoo_cfg.client_port],
            env: self.settings.watch_env.clone(),
            match_pattern: QUORUM_PEER_MAIN.to_string(),
            max_memory_mb: self.settings.max_memory_mb,
        }
    }

    /// Prepare the data directory on first run and hand the server to monit.
    ///
    /// Only a failed `init` of a `zookeeper-server` script is reported as an
    /// error; every other step logs and continues.
    pub async fn start(&self, clear_datastore: bool) -> Result<()> {
        let data_dir = self.data_dir().to_path_buf();

        if clear_datastore {
            info!("Clearing ZooKeeper data");
            files::remove_dir_logged(&self.settings.legacy_data_dir);
            files::remove_dir_logged(&data_dir);
        }

        let script = self.detect_init_script().await;

        if !data_dir.is_dir() {
            info!("Initializing ZooKeeper.");
            // It may still be running from a previous deployment.
            run_logged(&self.service(script, "stop")).await;

            if let Err(e) = fs::create_dir_all(&data_dir) {
                warn!("Failed to create {}: {}", data_dir.display(), e);
            }
            let owner = format!("{0}:{0}", self.settings.service_user);
            let chown = CommandLine::new("chown").args([
                "-R".to_string(),
                owner,
                data_dir.display().to_string(),
            ]);
            run_logged(&chown).await;

            if script.needs_init() {
                let init = self.service(script, "init");
                let succeeded = run_logged(&init).await.map(|o| o.success).unwrap_or(false);
                if !succeeded {
                    error!("Failed to start zookeeper!");
                    return Err(ZkError::InitFailed(format!("`{}` failed", init)));
                }
            }
        }

        // myid is needed for multi node configuration.
        let myid = self.settings.conf_dir.join(MYID);
        if let Err(e) = files::force_symlink(&myid, &data_dir.join(MYID)) {
            warn!("Failed to link {} into {}: {}", myid.display(), data_dir.display(), e);
        }

        if let Err(e) = self.monit.start(&self.watch(script)).await {
            warn!("Failed to hand ZooKeeper to monit: {}", e);
        }
        Ok(())
    }

    /// Whether monit reports the ZooKeeper watch as alive
    pub async fn is_running(&self) -> bool {
        let running = self.monit.is_running(WATCH_NAME).await;
        debug!("Checking if zookeeper is already monitored: {}", running);
        running
    }

    pub async fn stop(&self) {
        info!("Stopping ZooKeeper");
        if let Err(e) = self.monit.stop(WATCH_NAME).await {
            warn!("Failed to stop ZooKeeper: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_debian_script() {
        let out = " [ + ]  cron\n [ - ]  zookeeper\n [ + ]  ssh\n";
        assert_eq!(InitScript::detect(out), InitScript::ZooKeeper);
    }

    #[test]
    fn falls_back_to_zookeeper_server() {
        let out = " [ + ]  cron\n [ - ]  zookeeper-server\n";
        assert_eq!(InitScript::detect(out), InitScript::ZooKeeperServer);
        assert!(InitScript::ZooKeeperServer.needs_init());
        assert!(!InitScript::ZooKeeper.needs_init());
    }

    #[test]
    fn watch_uses_client_port_and_script() {
        let service = ZooKeeperService::new(
            ServiceSettings::default(),
            Monit::new(CommandLine::new("monit"), "/etc/monit/conf.d"),
        );
        let watch = service.watch(InitScript::ZooKeeper);

        assert_eq!(watch.name, "zookeeper");
        assert_eq!(watch.ports, vec![2181]);
        assert_eq!(watch.start_cmd.to_string(), "/usr/sbin/service zookeeper start");
        assert_eq!(watch.stop_cmd.to_string(), "/usr/sbin/service zookeeper stop");
        assert_eq!(watch.match_pattern, QUORUM_PEER_MAIN);
        assert!(watch.env.is_empty());
        assert_eq!(watch.max_memory_mb, None);
    }

    #[test]
    fn watch_carries_memory_limit_and_env() {
        let mut settings = ServiceSettings::default();
        settings.max_memory_mb = Some(2048);
        settings
            .watch_env
            .insert("ZOO_LOG_DIR".to_string(), "/var/log/zookeeper".to_string());
        let service = ZooKeeperService::new(
            settings,
            Monit::new(CommandLine::new("monit"), "/etc/monit/conf.d"),
        );

        let watch = service.watch(InitScript::ZooKeeperServer);

        assert_eq!(watch.max_memory_mb, Some(2048));
        assert_eq!(
            watch.env.get("ZOO_LOG_DIR").map(String::as_str),
            Some("/var/log/zookeeper")
        );
    }
}
