//! Shared fixture: a temporary node layout with shell stand-ins for
//! `service` and `monit` that record every invocation.

#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;
use zk_node::{
    supervisor::Monit,
    utils::CommandLine,
    zookeeper::{ServiceSettings, ZooCfg, ZooKeeperService},
};

const SERVICE_SCRIPT: &str = r#"echo "service $*" >> "@LOG@"
if [ "$1" = "--status-all" ]; then
  printf ' [ + ]  cron\n [ - ]  %s\n' "@SCRIPT@"
fi
if [ "$2" = "init" ]; then
  exit @INIT_EXIT@
fi
exit 0
"#;

const MONIT_SCRIPT: &str = r#"echo "monit $*" >> "@LOG@"
if [ "$1" = "summary" ] && [ -f "@SUMMARY@" ]; then
  cat "@SUMMARY@"
fi
if [ -f "@EXIT@" ]; then
  echo "monit: simulated failure" >&2
  exit "$(cat "@EXIT@")"
fi
exit 0
"#;

/// Write the stand-in monit script into `root`, returning its command line
pub fn install_monit(root: &Path) -> CommandLine {
    let script = MONIT_SCRIPT
        .replace("@LOG@", &root.join("calls.log").display().to_string())
        .replace("@SUMMARY@", &root.join("summary.txt").display().to_string())
        .replace("@EXIT@", &root.join("monit_exit").display().to_string());
    fs::write(root.join("monit.sh"), script).unwrap();
    CommandLine::new("sh").arg(root.join("monit.sh").display().to_string())
}

pub struct Fixture {
    pub dir: TempDir,
    pub service: ZooKeeperService,
}

impl Fixture {
    /// `script` is the init script name `service --status-all` reports
    pub fn new(script: &str, init_exit: i32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("conf")).unwrap();
        fs::create_dir_all(root.join("monit")).unwrap();
        fs::write(
            root.join("conf/environment"),
            "NAME=zookeeper\nJAVA_OPTS=\"\"\n",
        )
        .unwrap();

        let log = root.join("calls.log");
        let service_script = SERVICE_SCRIPT
            .replace("@LOG@", &log.display().to_string())
            .replace("@SCRIPT@", script)
            .replace("@INIT_EXIT@", &init_exit.to_string());
        fs::write(root.join("service.sh"), service_script).unwrap();

        let monit_cmd = install_monit(root);

        let settings = ServiceSettings {
            conf_dir: root.join("conf"),
            legacy_data_dir: root.join("legacy"),
            environment_file: root.join("conf/environment"),
            java_heap: "1024m".to_string(),
            service_cmd: CommandLine::new("sh").arg(root.join("service.sh").display().to_string()),
            service_user: "zookeeper".to_string(),
            max_memory_mb: None,
            watch_env: Default::default(),
            zoo_cfg: ZooCfg {
                data_dir: root.join("data"),
                ..ZooCfg::default()
            },
        };
        let monit = Monit::new(monit_cmd, root.join("monit"));

        Self {
            service: ZooKeeperService::new(settings, monit),
            dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn conf_dir(&self) -> PathBuf {
        self.root().join("conf")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root().join("data")
    }

    pub fn legacy_dir(&self) -> PathBuf {
        self.root().join("legacy")
    }

    pub fn monit_file(&self) -> PathBuf {
        self.root().join("monit/appscale-zookeeper-2181.cfg")
    }

    pub fn set_summary(&self, summary: &str) {
        set_summary(self.root(), summary);
    }

    /// Make every following monit invocation exit with `code`
    pub fn fail_monit(&self, code: i32) {
        fs::write(self.root().join("monit_exit"), code.to_string()).unwrap();
    }

    /// Recorded invocations, oldest first
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.root().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }

    pub fn called(&self, call: &str) -> bool {
        self.calls().iter().any(|c| c == call)
    }
}

pub fn set_summary(root: &Path, summary: &str) {
    fs::write(root.join("summary.txt"), summary).unwrap();
}
