//! On-disk artifacts: zoo.cfg, myid, the JVM environment file and the myid link

use std::{
    fs,
    io::{self, Write},
    path::Path,
};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::render::RenderedConfig;
use crate::error::Result;

pub const ZOO_CFG: &str = "zoo.cfg";
pub const MYID: &str = "myid";

/// Write zoo.cfg and myid into `conf_dir`, replacing previous contents
pub fn write_config(conf_dir: &Path, rendered: &RenderedConfig) -> Result<()> {
    let cfg_path = conf_dir.join(ZOO_CFG);
    fs::write(&cfg_path, &rendered.zoo_cfg)?;
    debug!("Wrote {}", cfg_path.display());

    let myid_path = conf_dir.join(MYID);
    fs::write(&myid_path, rendered.myid())?;
    debug!("Wrote {}", myid_path.display());

    Ok(())
}

/// Replace `JAVA_OPTS=` lines in the service environment file.
///
/// Returns how many lines were replaced.
pub fn set_java_heap(env_file: &Path, heap: &str) -> io::Result<usize> {
    let contents = fs::read_to_string(env_file)?;
    let replacement = format!("JAVA_OPTS=\"-Xmx{}\"", heap);

    let mut replaced = 0;
    let mut out = String::with_capacity(contents.len());
    for line in contents.split_inclusive('\n') {
        if line.starts_with("JAVA_OPTS=") {
            out.push_str(&replacement);
            if line.ends_with('\n') {
                out.push('\n');
            }
            replaced += 1;
        } else {
            out.push_str(line);
        }
    }

    if replaced > 0 {
        replace_file(env_file, out.as_bytes())?;
    }
    Ok(replaced)
}

/// Swap `path` for new contents through a sibling temporary file, keeping
/// its permissions
fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(path)?.permissions();

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path)?;
    Ok(())
}

/// Same as [`set_java_heap`] but only logs failures
pub fn apply_java_heap(env_file: &Path, heap: &str) {
    match set_java_heap(env_file, heap) {
        Ok(0) => debug!("No JAVA_OPTS line in {}", env_file.display()),
        Ok(_) => info!("Set ZooKeeper heap to {}", heap),
        Err(e) => warn!("Failed to set heap in {}: {}", env_file.display(), e),
    }
}

/// Point `link` at `target`, replacing a file or link at `link`.
///
/// A real directory at `link` is left alone and reported as an error.
pub fn force_symlink(target: &Path, link: &Path) -> io::Result<()> {
    match fs::symlink_metadata(link) {
        Ok(meta) if meta.is_dir() => {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a directory", link.display()),
            ))
        }
        Ok(_) => fs::remove_file(link)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    std::os::unix::fs::symlink(target, link)
}

/// Recursively delete `dir`, logging the outcome
pub fn remove_dir_logged(dir: &Path) {
    match fs::remove_dir_all(dir) {
        Ok(()) => info!("Removed {}", dir.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} does not exist, nothing to remove", dir.display())
        }
        Err(e) => warn!("Failed to remove {}: {}", dir.display(), e),
    }
}
