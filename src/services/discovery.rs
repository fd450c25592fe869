//! Enumerates service directories under the services root

use crate::fs::FileSystem;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One immediate subdirectory of the services root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDirectory {
    pub name: String,
    pub path: PathBuf,
}

impl ServiceDirectory {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Path of a file directly inside this service
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

/// Lists the services under `services_dir`, sorted by name
///
/// Only immediate subdirectories count; plain files are ignored. A missing
/// root, or a root that is not a directory, yields no services.
pub fn discover_services<F: FileSystem + ?Sized>(
    fs: &F,
    services_dir: &Path,
) -> Result<Vec<ServiceDirectory>> {
    if !fs.is_dir(services_dir) {
        debug!(root = %services_dir.display(), "services root missing, nothing to scan");
        return Ok(Vec::new());
    }

    let mut services: Vec<ServiceDirectory> = fs
        .read_dir(services_dir)?
        .into_iter()
        .filter(|entry| entry.is_dir())
        .map(|entry| ServiceDirectory::new(entry.name, entry.path))
        .collect();

    services.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(count = services.len(), "discovered services");
    Ok(services)
}
