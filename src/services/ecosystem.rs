//! Ecosystem classification by marker files
//!
//! A service is classified by which well-known manifest files exist in its
//! directory. File contents are never read here.

use super::ServiceDirectory;
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ecosystem a service is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcosystemKind {
    Node,
    Python,
    Unknown,
}

impl EcosystemKind {
    pub fn name(&self) -> &'static str {
        match self {
            EcosystemKind::Node => "node",
            EcosystemKind::Python => "python",
            EcosystemKind::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, EcosystemKind::Unknown)
    }
}

impl fmt::Display for EcosystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A file whose presence signals an ecosystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerFile {
    pub filename: &'static str,
    pub kind: EcosystemKind,
}

/// Markers in priority order; the first present one decides
pub const MARKERS: &[MarkerFile] = &[
    MarkerFile {
        filename: "package.json",
        kind: EcosystemKind::Node,
    },
    MarkerFile {
        filename: "pyproject.toml",
        kind: EcosystemKind::Python,
    },
    MarkerFile {
        filename: "requirements.txt",
        kind: EcosystemKind::Python,
    },
];

/// Classifies a service by the first marker file present in its directory
pub fn classify<F: FileSystem + ?Sized>(fs: &F, service: &ServiceDirectory) -> EcosystemKind {
    MARKERS
        .iter()
        .find(|marker| fs.is_file(&service.file(marker.filename)))
        .map(|marker| marker.kind)
        .unwrap_or(EcosystemKind::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use yare::parameterized;

    fn service_with(markers: &[&str]) -> (MockFileSystem, ServiceDirectory) {
        let fs = MockFileSystem::new();
        fs.add_dir("services/svc");
        for marker in markers {
            fs.add_file(format!("services/svc/{}", marker), "");
        }
        (fs, ServiceDirectory::new("svc", "/mock/services/svc"))
    }

    #[parameterized(
        npm_manifest = { &["package.json"], EcosystemKind::Node },
        pyproject = { &["pyproject.toml"], EcosystemKind::Python },
        requirements = { &["requirements.txt"], EcosystemKind::Python },
        both_python_markers = { &["pyproject.toml", "requirements.txt"], EcosystemKind::Python },
        node_wins_over_python = { &["requirements.txt", "package.json"], EcosystemKind::Node },
        no_markers = { &[], EcosystemKind::Unknown },
        unrelated_files = { &["Cargo.toml", "go.mod", "Dockerfile"], EcosystemKind::Unknown },
    )]
    fn test_classify(markers: &[&str], expected: EcosystemKind) {
        let (fs, service) = service_with(markers);
        assert_eq!(classify(&fs, &service), expected);
    }

    #[test]
    fn test_marker_directory_does_not_count() {
        let fs = MockFileSystem::new();
        fs.add_dir("services/svc/package.json");
        let service = ServiceDirectory::new("svc", "/mock/services/svc");

        assert_eq!(classify(&fs, &service), EcosystemKind::Unknown);
    }

    #[test]
    fn test_classification_ignores_contents() {
        let fs = MockFileSystem::new();
        fs.add_file("services/svc/package.json", "not even json");
        fs.fail_reads("services/svc/package.json");
        let service = ServiceDirectory::new("svc", "/mock/services/svc");

        assert_eq!(classify(&fs, &service), EcosystemKind::Node);
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&EcosystemKind::Node).unwrap(), "\"node\"");
        assert_eq!(
            serde_json::to_string(&EcosystemKind::Unknown).unwrap(),
            "\"unknown\""
        );
        assert_eq!(EcosystemKind::Python.to_string(), "python");
        assert!(!EcosystemKind::Unknown.is_known());
    }
}
