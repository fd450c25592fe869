//! Reconciliation run: discover, classify, check, preview and (optionally) write
//!
//! Each service moves through [`ServiceStage`]s:
//!
//! ```text
//! Discovered -> Classified -> Checked -> Previewed -> Written
//!                                    \-> Skipped
//! ```
//!
//! `Written` needs a [`WritePermit`], and only [`ExecutionMode::Apply`] can
//! hand one out. A report-only run therefore has no code path that touches a
//! service's Dockerfile or the backup directory.

pub mod report;

pub use report::{ReconciliationReport, ReportEntry};

use crate::config::ReconcilerConfig;
use crate::dockerfile::{
    check_build_file, template_for, BuildFileReport, CanonicalTemplate, DOCKERFILE_NAME,
};
use crate::fs::FileSystem;
use crate::services::{classify, discover_services, EcosystemKind, ServiceDirectory};
use anyhow::Context;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that stop a whole run
///
/// Per-service problems never surface here; they are recorded on the
/// service's [`ServiceOutcome`].
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Failed to list services in {}: {message}", path.display())]
    Discovery { path: PathBuf, message: String },

    #[error("Failed to write report to {}: {message}", path.display())]
    ReportWrite { path: PathBuf, message: String },
}

/// Whether a run may change files on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Inspect and report only
    #[default]
    ReportOnly,
    /// Back up and overwrite Dockerfiles with the canonical template
    Apply,
}

impl ExecutionMode {
    pub fn from_apply_flag(apply: bool) -> Self {
        if apply {
            ExecutionMode::Apply
        } else {
            ExecutionMode::ReportOnly
        }
    }

    pub fn is_apply(self) -> bool {
        self == ExecutionMode::Apply
    }

    fn write_permit(self) -> Option<WritePermit> {
        match self {
            ExecutionMode::Apply => Some(WritePermit { _private: () }),
            ExecutionMode::ReportOnly => None,
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::ReportOnly => f.write_str("report-only"),
            ExecutionMode::Apply => f.write_str("apply"),
        }
    }
}

/// Proof that the run is allowed to write; only [`ExecutionMode::Apply`] mints one
#[derive(Debug)]
pub struct WritePermit {
    _private: (),
}

/// Where a service got to in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStage {
    Discovered,
    Classified,
    Checked,
    Previewed,
    Skipped,
    Written,
}

impl ServiceStage {
    pub fn can_transition_to(self, next: ServiceStage) -> bool {
        use ServiceStage::*;
        matches!(
            (self, next),
            (Discovered, Classified)
                | (Classified, Checked)
                | (Checked, Previewed)
                | (Checked, Skipped)
                | (Previewed, Written)
        )
    }

    fn advance(&mut self, next: ServiceStage) {
        debug_assert!(
            self.can_transition_to(next),
            "invalid stage transition {:?} -> {:?}",
            self,
            next
        );
        *self = next;
    }
}

/// What happened to a service's Dockerfile in apply mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Report-only run, or no template for this kind
    NotAttempted,
    /// Canonical template written; `backup` is set when a prior file was saved
    Written {
        path: PathBuf,
        backup: Option<PathBuf>,
    },
    /// Backup or write failed; the original Dockerfile was left alone if the backup failed
    Failed { error: String },
}

/// Result of processing one service
#[derive(Debug, Clone)]
pub struct ServiceOutcome {
    pub service: ServiceDirectory,
    pub kind: EcosystemKind,
    pub build_file: BuildFileReport,
    /// Leading lines of the canonical template, empty when skipped
    pub preview: Vec<&'static str>,
    pub stage: ServiceStage,
    pub write: WriteOutcome,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub mode: ExecutionMode,
    pub outcomes: Vec<ServiceOutcome>,
    pub report: ReconciliationReport,
    pub report_path: PathBuf,
}

impl RunSummary {
    pub fn written(&self) -> impl Iterator<Item = &ServiceOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.stage == ServiceStage::Written)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ServiceOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.write, WriteOutcome::Failed { .. }))
    }
}

/// Drives a reconciliation run over one repository root
pub struct Reconciler<F: FileSystem> {
    fs: F,
    config: ReconcilerConfig,
}

impl<F: FileSystem> Reconciler<F> {
    pub fn new(fs: F, config: ReconcilerConfig) -> Self {
        Self { fs, config }
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Processes every service in name order, then writes the report
    pub fn run(&self, mode: ExecutionMode) -> Result<RunSummary, ReconcileError> {
        info!(
            mode = %mode,
            services_dir = %self.config.services_dir.display(),
            "Starting Dockerfile reconciliation"
        );

        let services = discover_services(&self.fs, &self.config.services_dir).map_err(|e| {
            ReconcileError::Discovery {
                path: self.config.services_dir.clone(),
                message: format!("{:#}", e),
            }
        })?;
        info!(count = services.len(), "Discovered services");

        let permit = mode.write_permit();
        let mut report = ReconciliationReport::new();
        let mut outcomes = Vec::with_capacity(services.len());

        for service in services {
            let mut outcome = self.inspect(service);
            report.record(&outcome.service, outcome.kind, outcome.build_file.clone());

            if let (Some(permit), Some(template)) = (permit.as_ref(), template_for(outcome.kind)) {
                outcome.write = self.write_canonical(
                    permit,
                    &outcome.service,
                    template,
                    outcome.build_file.exists(),
                );
                if matches!(outcome.write, WriteOutcome::Written { .. }) {
                    outcome.stage.advance(ServiceStage::Written);
                }
            }

            outcomes.push(outcome);
        }

        report
            .write_to(&self.fs, &self.config.report_path)
            .map_err(|e| ReconcileError::ReportWrite {
                path: self.config.report_path.clone(),
                message: format!("{:#}", e),
            })?;
        info!(path = %self.config.report_path.display(), "Report written");

        Ok(RunSummary {
            mode,
            outcomes,
            report,
            report_path: self.config.report_path.clone(),
        })
    }

    fn inspect(&self, service: ServiceDirectory) -> ServiceOutcome {
        let mut stage = ServiceStage::Discovered;

        let kind = classify(&self.fs, &service);
        stage.advance(ServiceStage::Classified);

        let build_file = check_build_file(&self.fs, &service);
        stage.advance(ServiceStage::Checked);

        let preview = match template_for(kind) {
            Some(template) => {
                stage.advance(ServiceStage::Previewed);
                template.preview(self.config.preview_lines)
            }
            None => {
                stage.advance(ServiceStage::Skipped);
                Vec::new()
            }
        };

        debug!(
            service = %service.name,
            kind = %kind,
            exists = build_file.exists(),
            stage = ?stage,
            "Inspected service"
        );

        ServiceOutcome {
            service,
            kind,
            build_file,
            preview,
            stage,
            write: WriteOutcome::NotAttempted,
        }
    }

    /// Backs up any existing Dockerfile, then writes the template over it
    ///
    /// A failed backup skips the write so nothing is lost.
    fn write_canonical(
        &self,
        _permit: &WritePermit,
        service: &ServiceDirectory,
        template: &CanonicalTemplate,
        prior_exists: bool,
    ) -> WriteOutcome {
        let target = service.file(DOCKERFILE_NAME);

        let backup = if prior_exists {
            match self.backup(service) {
                Ok(path) => Some(path),
                Err(e) => {
                    error!(
                        service = %service.name,
                        error = %format!("{:#}", e),
                        "Backup failed, Dockerfile left untouched"
                    );
                    return WriteOutcome::Failed {
                        error: format!("backup failed: {:#}", e),
                    };
                }
            }
        } else {
            None
        };

        match self.fs.write(&target, template.body.as_bytes()) {
            Ok(()) => {
                info!(service = %service.name, path = %target.display(), "Wrote canonical Dockerfile");
                WriteOutcome::Written {
                    path: target,
                    backup,
                }
            }
            Err(e) => {
                warn!(
                    service = %service.name,
                    error = %format!("{:#}", e),
                    "Failed to write Dockerfile"
                );
                WriteOutcome::Failed {
                    error: format!("{:#}", e),
                }
            }
        }
    }

    fn backup(&self, service: &ServiceDirectory) -> anyhow::Result<PathBuf> {
        let destination = self.config.backup_path(&service.name);
        if let Some(parent) = destination.parent() {
            self.fs.create_dir_all(parent)?;
        }
        self.fs
            .copy(&service.file(DOCKERFILE_NAME), &destination)
            .context("Failed to back up existing Dockerfile")?;
        debug!(service = %service.name, backup = %destination.display(), "Backed up Dockerfile");
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dockerfile::health::{NO_BASE_IMAGE, NO_COPY};
    use crate::dockerfile::template::{NODE_TEMPLATE, PYTHON_TEMPLATE};
    use crate::fs::MockFileSystem;
    use std::path::Path;

    const WORKER_DOCKERFILE: &str = "RUN pip install -r requirements.txt\nCOPY . /app\n";

    fn fixture() -> Reconciler<MockFileSystem> {
        let fs = MockFileSystem::with_root(PathBuf::from("/repo"));
        fs.add_file("services/auth/package.json", "{}");
        fs.add_file("services/worker/requirements.txt", "celery\n");
        fs.add_file("services/worker/Dockerfile", WORKER_DOCKERFILE);
        fs.add_file("services/docs/README.md", "# docs\n");
        Reconciler::new(fs, ReconcilerConfig::from_root("/repo"))
    }

    fn outcome<'a>(summary: &'a RunSummary, name: &str) -> &'a ServiceOutcome {
        summary
            .outcomes
            .iter()
            .find(|o| o.service.name == name)
            .unwrap()
    }

    #[test]
    fn test_report_only_run() {
        let reconciler = fixture();
        let summary = reconciler.run(ExecutionMode::ReportOnly).unwrap();

        let names: Vec<&str> = summary.outcomes.iter().map(|o| o.service.name.as_str()).collect();
        assert_eq!(names, vec!["auth", "docs", "worker"]);

        let auth = outcome(&summary, "auth");
        assert_eq!(auth.kind, EcosystemKind::Node);
        assert_eq!(auth.build_file, BuildFileReport::Missing);
        assert_eq!(auth.stage, ServiceStage::Previewed);
        assert_eq!(auth.preview.len(), 10);

        let worker = outcome(&summary, "worker");
        assert_eq!(worker.kind, EcosystemKind::Python);
        assert!(worker.build_file.exists());
        assert!(!worker.build_file.well_formed());
        assert_eq!(worker.build_file.problems(), &[NO_BASE_IMAGE.to_string()]);

        let docs = outcome(&summary, "docs");
        assert_eq!(docs.kind, EcosystemKind::Unknown);
        assert_eq!(docs.stage, ServiceStage::Skipped);
        assert!(docs.preview.is_empty());

        assert!(summary.outcomes.iter().all(|o| o.write == WriteOutcome::NotAttempted));
        assert_eq!(summary.written().count(), 0);
    }

    #[test]
    fn test_report_only_leaves_services_untouched() {
        let reconciler = fixture();
        reconciler.run(ExecutionMode::ReportOnly).unwrap();

        let fs = reconciler.fs();
        assert!(!fs.exists(Path::new("/repo/services/auth/Dockerfile")));
        assert_eq!(
            fs.contents("services/worker/Dockerfile").as_deref(),
            Some(WORKER_DOCKERFILE)
        );
        assert!(!fs.exists(Path::new("/repo/_dockerfile_backups")));
        assert!(fs.is_file(Path::new("/repo/reports/dockerfile-report.json")));
    }

    #[test]
    fn test_report_only_is_deterministic() {
        let reconciler = fixture();
        reconciler.run(ExecutionMode::ReportOnly).unwrap();
        let first = reconciler.fs().contents("reports/dockerfile-report.json").unwrap();
        reconciler.run(ExecutionMode::ReportOnly).unwrap();
        let second = reconciler.fs().contents("reports/dockerfile-report.json").unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_report_contents() {
        let reconciler = fixture();
        reconciler.run(ExecutionMode::ReportOnly).unwrap();
        let json = reconciler.fs().contents("reports/dockerfile-report.json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value["/repo/services/auth"],
            serde_json::json!({ "type": "node", "dockerfile": { "exists": false } })
        );
        assert_eq!(value["/repo/services/worker"]["type"], "python");
        assert_eq!(value["/repo/services/worker"]["dockerfile"]["ok"], false);
        assert_eq!(
            value["/repo/services/worker"]["dockerfile"]["reasons"],
            serde_json::json!(["no base-image line"])
        );
        assert_eq!(value["/repo/services/docs"]["type"], "unknown");
    }

    #[test]
    fn test_apply_writes_templates_and_backups() {
        let reconciler = fixture();
        let summary = reconciler.run(ExecutionMode::Apply).unwrap();
        let fs = reconciler.fs();

        assert_eq!(
            fs.contents("services/auth/Dockerfile").as_deref(),
            Some(NODE_TEMPLATE.body)
        );
        assert_eq!(
            fs.contents("services/worker/Dockerfile").as_deref(),
            Some(PYTHON_TEMPLATE.body)
        );
        assert_eq!(
            fs.contents("_dockerfile_backups/worker/Dockerfile.bak").as_deref(),
            Some(WORKER_DOCKERFILE)
        );
        assert!(!fs.exists(Path::new("/repo/_dockerfile_backups/auth")));
        assert!(!fs.exists(Path::new("/repo/services/docs/Dockerfile")));

        assert_eq!(
            outcome(&summary, "auth").write,
            WriteOutcome::Written {
                path: PathBuf::from("/repo/services/auth/Dockerfile"),
                backup: None,
            }
        );
        assert_eq!(
            outcome(&summary, "worker").write,
            WriteOutcome::Written {
                path: PathBuf::from("/repo/services/worker/Dockerfile"),
                backup: Some(PathBuf::from("/repo/_dockerfile_backups/worker/Dockerfile.bak")),
            }
        );
        assert_eq!(outcome(&summary, "docs").write, WriteOutcome::NotAttempted);
        assert_eq!(summary.written().count(), 2);
    }

    #[test]
    fn test_apply_report_describes_pre_write_state() {
        let reconciler = fixture();
        let summary = reconciler.run(ExecutionMode::Apply).unwrap();

        let worker = ServiceDirectory::new("worker", "/repo/services/worker");
        let entry = summary.report.get(&worker).unwrap();
        assert!(!entry.dockerfile.well_formed());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let reconciler = fixture();
        reconciler.run(ExecutionMode::Apply).unwrap();
        let summary = reconciler.run(ExecutionMode::Apply).unwrap();
        let fs = reconciler.fs();

        assert_eq!(
            fs.contents("services/worker/Dockerfile").as_deref(),
            Some(PYTHON_TEMPLATE.body)
        );
        // The second run backs up the canonical file written by the first.
        assert_eq!(
            fs.contents("_dockerfile_backups/worker/Dockerfile.bak").as_deref(),
            Some(PYTHON_TEMPLATE.body)
        );
        let worker = outcome(&summary, "worker");
        assert!(worker.build_file.well_formed());
        assert!(worker.build_file.problems().is_empty());
        assert_eq!(
            outcome(&summary, "auth").build_file.problems(),
            &[] as &[String]
        );
    }

    #[test]
    fn test_write_failure_is_isolated() {
        let reconciler = fixture();
        reconciler.fs().fail_writes("services/auth/Dockerfile");

        let summary = reconciler.run(ExecutionMode::Apply).unwrap();

        let auth = outcome(&summary, "auth");
        assert!(matches!(auth.write, WriteOutcome::Failed { .. }));
        assert_eq!(auth.stage, ServiceStage::Previewed);

        let worker = outcome(&summary, "worker");
        assert_eq!(worker.stage, ServiceStage::Written);
        assert_eq!(summary.failures().count(), 1);
        assert_eq!(summary.report.len(), 3);
    }

    #[test]
    fn test_backup_failure_keeps_original() {
        let reconciler = fixture();
        reconciler
            .fs()
            .fail_writes("_dockerfile_backups/worker/Dockerfile.bak");

        let summary = reconciler.run(ExecutionMode::Apply).unwrap();

        match &outcome(&summary, "worker").write {
            WriteOutcome::Failed { error } => assert!(error.starts_with("backup failed")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(
            reconciler.fs().contents("services/worker/Dockerfile").as_deref(),
            Some(WORKER_DOCKERFILE)
        );
    }

    #[test]
    fn test_unreadable_dockerfile_does_not_stop_run() {
        let reconciler = fixture();
        reconciler.fs().fail_reads("services/worker/Dockerfile");

        let summary = reconciler.run(ExecutionMode::Apply).unwrap();

        let worker = outcome(&summary, "worker");
        assert!(worker.build_file.problems()[0].starts_with("unreadable"));
        assert!(matches!(worker.write, WriteOutcome::Failed { .. }));
        assert_eq!(outcome(&summary, "auth").stage, ServiceStage::Written);
    }

    #[test]
    fn test_missing_services_root() {
        let fs = MockFileSystem::with_root(PathBuf::from("/repo"));
        fs.add_dir("/repo");
        let reconciler = Reconciler::new(fs, ReconcilerConfig::from_root("/repo"));

        let summary = reconciler.run(ExecutionMode::Apply).unwrap();

        assert!(summary.outcomes.is_empty());
        assert_eq!(
            reconciler.fs().contents("reports/dockerfile-report.json").as_deref(),
            Some("{}\n")
        );
    }

    #[test]
    fn test_report_write_failure_is_fatal() {
        let reconciler = fixture();
        reconciler.fs().fail_writes("reports/dockerfile-report.json");

        assert!(matches!(
            reconciler.run(ExecutionMode::ReportOnly),
            Err(ReconcileError::ReportWrite { .. })
        ));
    }

    #[test]
    fn test_non_fatal_copy_observation() {
        let fs = MockFileSystem::with_root(PathBuf::from("/repo"));
        fs.add_file("services/api/pyproject.toml", "[project]\n");
        fs.add_file("services/api/Dockerfile", "FROM python:3.11\nRUN true\n");
        let reconciler = Reconciler::new(fs, ReconcilerConfig::from_root("/repo"));

        let summary = reconciler.run(ExecutionMode::ReportOnly).unwrap();
        let api = outcome(&summary, "api");

        assert!(api.build_file.well_formed());
        assert_eq!(api.build_file.problems(), &[NO_COPY.to_string()]);
    }

    #[test]
    fn test_execution_mode() {
        assert_eq!(ExecutionMode::from_apply_flag(false), ExecutionMode::ReportOnly);
        assert_eq!(ExecutionMode::from_apply_flag(true), ExecutionMode::Apply);
        assert_eq!(ExecutionMode::default(), ExecutionMode::ReportOnly);
        assert!(ExecutionMode::ReportOnly.write_permit().is_none());
        assert!(ExecutionMode::Apply.write_permit().is_some());
        assert_eq!(ExecutionMode::Apply.to_string(), "apply");
    }

    #[test]
    fn test_stage_transitions() {
        use ServiceStage::*;
        assert!(Discovered.can_transition_to(Classified));
        assert!(Checked.can_transition_to(Previewed));
        assert!(Checked.can_transition_to(Skipped));
        assert!(Previewed.can_transition_to(Written));
        assert!(!Skipped.can_transition_to(Written));
        assert!(!Checked.can_transition_to(Written));
        assert!(!Discovered.can_transition_to(Checked));
    }
}
