//! monit process supervisor integration

use std::{
    collections::BTreeMap,
    fmt::Write,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::{
    error::{Result, ZkError},
    utils::command::{run, run_checked, run_logged, CommandLine},
};

/// Default directory monit includes check files from
pub const MONIT_CONF_DIR: &str = "/etc/monit/conf.d";

/// Summary states that count as alive
const RUNNING_STATES: [&str; 3] = ["Running", "OK", "Initializing"];

/// A supervised process definition
#[derive(Debug, Clone)]
pub struct Watch {
    /// Watch group name, also the prefix of every check entry
    pub name: String,
    pub start_cmd: CommandLine,
    pub stop_cmd: CommandLine,
    /// One check entry is emitted per port
    pub ports: Vec<u16>,
    pub env: BTreeMap<String, String>,
    /// Pattern matched against the process command line
    pub match_pattern: String,
    pub max_memory_mb: Option<u64>,
}

impl Watch {
    fn entry_names(&self) -> Vec<String> {
        if self.ports.is_empty() {
            vec![self.name.clone()]
        } else {
            self.ports
                .iter()
                .map(|port| format!("{}-{}", self.name, port))
                .collect()
        }
    }

    fn start_program(&self) -> String {
        if self.env.is_empty() {
            return self.start_cmd.to_string();
        }
        let vars: Vec<String> = self
            .env
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("/usr/bin/env {} {}", vars.join(" "), self.start_cmd)
    }
}

/// Render the monit check entries for `watch`
pub fn render_watch(watch: &Watch) -> String {
    let mut out = String::new();
    let start_program = watch.start_program();

    for (i, entry) in watch.entry_names().iter().enumerate() {
        let _ = writeln!(
            out,
            "check process {} matching \"{}\"",
            entry, watch.match_pattern
        );
        let _ = writeln!(out, "  group {}", watch.name);
        let _ = writeln!(out, "  start program = \"{}\"", start_program);
        let _ = writeln!(out, "  stop program = \"{}\"", watch.stop_cmd);
        if let Some(port) = watch.ports.get(i) {
            let _ = writeln!(out, "  if failed port {} then restart", port);
        }
        if let Some(mb) = watch.max_memory_mb {
            let _ = writeln!(out, "  if totalmem > {} MB for 10 cycles then restart", mb);
        }
        out.push('\n');
    }

    out
}

/// Entry name of a `monit summary` line, quoted (legacy) or tabular
fn summary_entry(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let line = line.strip_prefix("Process ").unwrap_or(line).trim_start();
    match line.strip_prefix('\'') {
        Some(quoted) => quoted.split('\'').next(),
        None => line.split_whitespace().next(),
    }
}

/// Whether `monit summary` output shows any entry of `name` alive
pub fn summary_reports_running(summary: &str, name: &str) -> bool {
    let prefix = format!("{}-", name);

    summary
        .lines()
        .filter(|line| {
            summary_entry(line)
                .map(|entry| entry == name || entry.starts_with(&prefix))
                .unwrap_or(false)
        })
        .any(|line| RUNNING_STATES.iter().any(|state| line.contains(state)))
}

/// Client for the local monit daemon
#[derive(Debug, Clone)]
pub struct Monit {
    monit_cmd: CommandLine,
    conf_dir: PathBuf,
}

impl Monit {
    pub fn new(monit_cmd: CommandLine, conf_dir: impl Into<PathBuf>) -> Self {
        Self {
            monit_cmd,
            conf_dir: conf_dir.into(),
        }
    }

    pub fn conf_dir(&self) -> &Path {
        &self.conf_dir
    }

    /// Location of the check file for `watch`
    pub fn watch_file(&self, watch: &Watch) -> PathBuf {
        let file = match watch.ports.first() {
            Some(port) => format!("appscale-{}-{}.cfg", watch.name, port),
            None => format!("appscale-{}.cfg", watch.name),
        };
        self.conf_dir.join(file)
    }

    /// Install the check file, reload monit and start the watch group
    pub async fn start(&self, watch: &Watch) -> Result<()> {
        let path = self.watch_file(watch);
        fs::write(&path, render_watch(watch))?;
        debug!("Wrote monit check file {}", path.display());

        run_logged(&self.monit_cmd.clone().arg("reload")).await;

        let cmd = self.monit_cmd.clone().args(["start", "-g", watch.name.as_str()]);
        run_checked(&cmd)
            .await
            .map_err(|e| ZkError::Supervisor(e.to_string()))?;

        info!("Monit is now watching {}", watch.name);
        Ok(())
    }

    /// Stop every entry of the watch group
    pub async fn stop(&self, name: &str) -> Result<()> {
        let cmd = self.monit_cmd.clone().args(["stop", "-g", name]);
        run_checked(&cmd)
            .await
            .map_err(|e| ZkError::Supervisor(e.to_string()))?;
        Ok(())
    }

    /// Ask monit whether the watch group has a live entry
    pub async fn is_running(&self, name: &str) -> bool {
        match run(&self.monit_cmd.clone().arg("summary")).await {
            Ok(output) if output.success => summary_reports_running(&output.stdout, name),
            Ok(output) => {
                warn!("monit summary failed: {}", output.stderr.trim_end());
                false
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watch() -> Watch {
        Watch {
            name: "zookeeper".to_string(),
            start_cmd: "/usr/sbin/service zookeeper start".parse().unwrap(),
            stop_cmd: "/usr/sbin/service zookeeper stop".parse().unwrap(),
            ports: vec![2181],
            env: BTreeMap::new(),
            match_pattern: "org.apache.zookeeper.server.quorum.QuorumPeerMain".to_string(),
            max_memory_mb: None,
        }
    }

    #[test]
    fn renders_one_entry_per_port() {
        let rendered = render_watch(&watch());
        assert_eq!(
            rendered,
            "check process zookeeper-2181 matching \"org.apache.zookeeper.server.quorum.QuorumPeerMain\"
  group zookeeper
  start program = \"/usr/sbin/service zookeeper start\"
  stop program = \"/usr/sbin/service zookeeper stop\"
  if failed port 2181 then restart

"
        );
    }

    #[test]
    fn renders_separate_entries_for_each_port() {
        let mut w = watch();
        w.ports = vec![2181, 2182];

        let rendered = render_watch(&w);
        let entries: Vec<&str> = rendered.split("\n\n").filter(|e| !e.is_empty()).collect();

        assert_eq!(entries.len(), 2);
        assert!(entries[0].starts_with("check process zookeeper-2181 matching"));
        assert!(entries[0].contains("if failed port 2181 then restart"));
        assert!(!entries[0].contains("port 2182"));
        assert!(entries[1].starts_with("check process zookeeper-2182 matching"));
        assert!(entries[1].contains("if failed port 2182 then restart"));
        assert!(entries.iter().all(|e| e.contains("  group zookeeper")));
    }

    #[tokio::test]
    async fn failing_summary_is_not_running() {
        let monit = Monit::new(
            CommandLine::new("sh").args([
                "-c",
                "echo \"Process 'zookeeper-2181' Running\"; echo boom >&2; exit 1",
            ]),
            "/etc/monit/conf.d",
        );
        assert!(!monit.is_running("zookeeper").await);
    }

    #[test]
    fn renders_env_and_memory_limit() {
        let mut w = watch();
        w.ports = vec![];
        w.env.insert("JVMFLAGS".to_string(), "-Dx=1".to_string());
        w.max_memory_mb = Some(1500);

        let rendered = render_watch(&w);
        assert!(rendered.starts_with("check process zookeeper matching"));
        assert!(rendered.contains("start program = \"/usr/bin/env JVMFLAGS=-Dx=1 /usr/sbin/service zookeeper start\""));
        assert!(rendered.contains("if totalmem > 1500 MB for 10 cycles then restart"));
        assert!(!rendered.contains("if failed port"));
    }

    #[test]
    fn watch_file_uses_first_port() {
        let monit = Monit::new(CommandLine::new("monit"), "/etc/monit/conf.d");
        assert_eq!(
            monit.watch_file(&watch()),
            PathBuf::from("/etc/monit/conf.d/appscale-zookeeper-2181.cfg")
        );
    }

    #[test]
    fn parses_table_summary() {
        let summary = "Monit 5.26.0 uptime: 3d 1h
 Service Name                     Status                      Type
 appscale                         OK                          System
 zookeeper-2181                   OK                          Process
";
        assert!(summary_reports_running(summary, "zookeeper"));
        assert!(!summary_reports_running(summary, "cassandra"));
    }

    #[test]
    fn parses_legacy_summary() {
        let legacy = "The Monit daemon 5.6 uptime: 1m

Process 'zookeeper-2181'            Running
Process 'cassandra-9999'            Running
";
        assert!(summary_reports_running(legacy, "zookeeper"));
        assert!(!summary_reports_running(legacy, "zk"));

        let stopped = "Process 'zookeeper-2181'            Not monitored\n";
        assert!(!summary_reports_running(stopped, "zookeeper"));
    }
}
