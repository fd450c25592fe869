//! Minimal well-formedness check for an existing Dockerfile
//!
//! Both checks are plain substring tests over the whole file, so any
//! formatting of the instructions is accepted as long as the keyword appears.

use crate::fs::FileSystem;
use crate::services::ServiceDirectory;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, warn};

pub const DOCKERFILE_NAME: &str = "Dockerfile";

const BASE_IMAGE_TOKEN: &str = "FROM";
const COPY_TOKEN: &str = "COPY";

pub const NO_BASE_IMAGE: &str = "no base-image line";
pub const NO_COPY: &str = "no COPY instruction";

/// Findings for a Dockerfile that exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFileHealth {
    pub size_bytes: u64,
    pub well_formed: bool,
    /// Hard failures and non-fatal observations, in check order
    pub problems: Vec<String>,
}

/// Result of inspecting a service's Dockerfile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildFileReport {
    Missing,
    Present(BuildFileHealth),
}

impl BuildFileReport {
    pub fn exists(&self) -> bool {
        matches!(self, BuildFileReport::Present(_))
    }

    pub fn size_bytes(&self) -> Option<u64> {
        match self {
            BuildFileReport::Present(health) => Some(health.size_bytes),
            BuildFileReport::Missing => None,
        }
    }

    /// `false` for a missing file: there is nothing well-formed to speak of
    pub fn well_formed(&self) -> bool {
        match self {
            BuildFileReport::Present(health) => health.well_formed,
            BuildFileReport::Missing => false,
        }
    }

    pub fn problems(&self) -> &[String] {
        match self {
            BuildFileReport::Present(health) => &health.problems,
            BuildFileReport::Missing => &[],
        }
    }
}

// Keys follow the established dockerfile-report.json layout.
impl Serialize for BuildFileReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BuildFileReport::Missing => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("exists", &false)?;
                map.end()
            }
            BuildFileReport::Present(health) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("exists", &true)?;
                map.serialize_entry("size", &health.size_bytes)?;
                map.serialize_entry("ok", &health.well_formed)?;
                map.serialize_entry("reasons", &health.problems)?;
                map.end()
            }
        }
    }
}

/// Inspects `<service>/Dockerfile`
///
/// Read failures are recorded as a problem on the report instead of being
/// returned, so one unreadable file never stops a run.
pub fn check_build_file<F: FileSystem + ?Sized>(
    fs: &F,
    service: &ServiceDirectory,
) -> BuildFileReport {
    let path = service.file(DOCKERFILE_NAME);
    if !fs.is_file(&path) {
        debug!(service = %service.name, "no Dockerfile");
        return BuildFileReport::Missing;
    }

    let size_from_metadata = fs.metadata(&path).map(|m| m.len()).ok();

    let bytes = match fs.read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(service = %service.name, error = %e, "Dockerfile unreadable");
            return BuildFileReport::Present(BuildFileHealth {
                size_bytes: size_from_metadata.unwrap_or(0),
                well_formed: false,
                problems: vec![format!("unreadable: {:#}", e)],
            });
        }
    };

    let size_bytes = size_from_metadata.unwrap_or(bytes.len() as u64);
    let health = inspect_text(&String::from_utf8_lossy(&bytes), size_bytes);
    debug!(
        service = %service.name,
        size = health.size_bytes,
        ok = health.well_formed,
        "checked Dockerfile"
    );
    BuildFileReport::Present(health)
}

fn inspect_text(text: &str, size_bytes: u64) -> BuildFileHealth {
    let mut well_formed = true;
    let mut problems = Vec::new();

    if !text.contains(BASE_IMAGE_TOKEN) {
        well_formed = false;
        problems.push(NO_BASE_IMAGE.to_string());
    }
    if !text.contains(COPY_TOKEN) {
        problems.push(NO_COPY.to_string());
    }

    BuildFileHealth {
        size_bytes,
        well_formed,
        problems,
    }
}
