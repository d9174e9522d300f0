//! Process supervisor module
//!
//! ZooKeeper is kept alive by monit; this module installs its check entries
//! and asks it to start, stop and report on them.

pub mod monit;

pub use monit::{Monit, Watch, MONIT_CONF_DIR};
