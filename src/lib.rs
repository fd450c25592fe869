//! dockrecon - Dockerfile reconciler for service monorepos
//!
//! Scans `services/` under a repository root, classifies each service by its
//! marker files (`package.json` for Node, `pyproject.toml` or
//! `requirements.txt` for Python), checks any existing `Dockerfile`, and
//! proposes the canonical Dockerfile for the service's ecosystem. Files are
//! only rewritten in [`ExecutionMode::Apply`], and every overwritten
//! Dockerfile is backed up first.
//!
//! # Example
//!
//! ```no_run
//! use dockrecon::{ExecutionMode, Reconciler, ReconcilerConfig, RealFileSystem};
//!
//! let config = ReconcilerConfig::from_root("/srv/monorepo");
//! let reconciler = Reconciler::new(RealFileSystem::new(), config);
//! let summary = reconciler.run(ExecutionMode::ReportOnly)?;
//! for outcome in &summary.outcomes {
//!     println!("{} -> {}", outcome.service.name, outcome.kind);
//! }
//! # Ok::<(), dockrecon::ReconcileError>(())
//! ```
//!
//! # Project Structure
//!
//! - [`services`]: discovery and ecosystem classification
//! - [`dockerfile`]: health check and canonical templates
//! - [`reconcile`]: the run itself and its JSON report
//! - [`structure`]: required-folder check and tree listing
//! - [`imports`]: read-only scan for imports of the old `Shared` package
//! - [`fs`]: filesystem abstraction with an in-memory implementation for tests

pub mod cli;
pub mod config;
pub mod dockerfile;
pub mod fs;
pub mod imports;
pub mod reconcile;
pub mod services;
pub mod structure;
pub mod util;

pub use config::{ConfigError, ReconcilerConfig};
pub use dockerfile::{BuildFileReport, CanonicalTemplate};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use imports::{ImportHit, ImportKind};
pub use reconcile::{
    ExecutionMode, ReconcileError, ReconciliationReport, Reconciler, RunSummary, ServiceOutcome,
    ServiceStage, WriteOutcome,
};
pub use services::{EcosystemKind, ServiceDirectory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
