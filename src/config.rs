//! Configuration management for dockrecon
//!
//! A run is driven entirely by a [`ReconcilerConfig`] value: the repository
//! root plus the paths derived from it. Nothing reads a process-wide root, so
//! tests can point a run at a synthetic tree.
//!
//! # Environment Variables
//!
//! - `DOCKRECON_ROOT`: Repository root - default: current directory
//! - `DOCKRECON_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Layout
//!
//! Given a root, the reconciler uses:
//! - `<root>/services/` - one directory per service
//! - `<root>/_dockerfile_backups/<service>/Dockerfile.bak` - backups (apply mode)
//! - `<root>/reports/dockerfile-report.json` - run report
//!
//! # Example
//!
//! ```
//! use dockrecon::ReconcilerConfig;
//!
//! let config = ReconcilerConfig::from_root("/srv/monorepo");
//! assert!(config.services_dir.ends_with("services"));
//! ```

use crate::fs::FileSystem;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

pub const SERVICES_DIR_NAME: &str = "services";
pub const BACKUP_DIR_NAME: &str = "_dockerfile_backups";
pub const REPORTS_DIR_NAME: &str = "reports";
pub const REPORT_FILE_NAME: &str = "dockerfile-report.json";

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_PREVIEW_LINES: usize = 10;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Repository root does not exist or is not a directory
    #[error("Repository root not found or not a directory: {}", .0.display())]
    RootNotFound(PathBuf),

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Paths and knobs for a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Repository root
    pub root: PathBuf,

    /// Directory whose immediate subdirectories are services
    pub services_dir: PathBuf,

    /// Where previous Dockerfiles are copied before being overwritten
    pub backup_dir: PathBuf,

    /// Where the JSON run report is written
    pub report_path: PathBuf,

    /// Number of template lines shown in the preview
    pub preview_lines: usize,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ReconcilerConfig {
    /// Loads from `DOCKRECON_*` environment variables, falling back to the
    /// current directory as root.
    fn default() -> Self {
        let root = env::var("DOCKRECON_ROOT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        let log_level = env::var("DOCKRECON_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            log_level,
            ..Self::from_root(root)
        }
    }
}

impl ReconcilerConfig {
    /// Derives the standard layout from an explicit repository root
    ///
    /// A relative root is resolved against the current directory, so service
    /// paths and report keys are always absolute.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self {
            services_dir: root.join(SERVICES_DIR_NAME),
            backup_dir: root.join(BACKUP_DIR_NAME),
            report_path: root.join(REPORTS_DIR_NAME).join(REPORT_FILE_NAME),
            preview_lines: DEFAULT_PREVIEW_LINES,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            root,
        }
    }

    /// Replaces the environment-provided log level with one resolved from
    /// command-line flags
    pub fn with_log_level(self, level: Level) -> Self {
        Self {
            log_level: level.to_string().to_lowercase(),
            ..self
        }
    }

    /// Backup location for one service's Dockerfile
    pub fn backup_path(&self, service_name: &str) -> PathBuf {
        self.backup_dir.join(service_name).join("Dockerfile.bak")
    }

    /// Renders `path` relative to the root when possible
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.display().to_string())
    }

    /// Validates the configuration against the given filesystem
    ///
    /// The services directory itself may be missing (that is a run with zero
    /// services), but the root must exist.
    pub fn validate<F: FileSystem + ?Sized>(&self, fs: &F) -> Result<(), ConfigError> {
        if !fs.is_dir(&self.root) {
            return Err(ConfigError::RootNotFound(self.root.clone()));
        }

        if self.preview_lines == 0 {
            return Err(ConfigError::ValidationFailed(
                "Preview must show at least one line".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }
}

impl fmt::Display for ReconcilerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dockrecon configuration:")?;
        writeln!(f, "  Root: {}", self.root.display())?;
        writeln!(f, "  Services: {}", self.services_dir.display())?;
        writeln!(f, "  Backups: {}", self.backup_dir.display())?;
        writeln!(f, "  Report: {}", self.report_path.display())?;
        writeln!(f, "  Preview lines: {}", self.preview_lines)?;
        write!(f, "  Log level: {}", self.log_level)
    }
}
