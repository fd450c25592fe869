//! Human-readable rendering of run results
//!
//! Rendering is kept apart from the run itself so the exact text can be
//! tested without capturing stdout.

use crate::config::ReconcilerConfig;
use crate::dockerfile::BuildFileReport;
use crate::imports::ImportHit;
use crate::reconcile::{RunSummary, ServiceOutcome, WriteOutcome};
use crate::structure::StructureReport;

/// Formats results for a terminal
pub struct HumanFormatter<'a> {
    config: &'a ReconcilerConfig,
}

impl<'a> HumanFormatter<'a> {
    pub fn new(config: &'a ReconcilerConfig) -> Self {
        Self { config }
    }

    pub fn format_run(&self, summary: &RunSummary) -> String {
        let mut output = format!("Found {} services.\n", summary.outcomes.len());

        for outcome in &summary.outcomes {
            output.push_str(&self.format_service(outcome));
        }

        output.push('\n');
        output.push_str(&format!(
            "Report written to {}\n",
            summary.report_path.display()
        ));
        if summary.mode.is_apply() {
            output.push_str(&format!(
                "Apply mode: {} Dockerfile(s) written, {} failed.\n",
                summary.written().count(),
                summary.failures().count()
            ));
        } else {
            output.push_str("Dry-run mode (no changes). Re-run with --apply to write Dockerfiles.\n");
        }
        output
    }

    fn format_service(&self, outcome: &ServiceOutcome) -> String {
        let mut output = format!(
            "\nService: {}  type={}\n",
            outcome.service.name, outcome.kind
        );

        match &outcome.build_file {
            BuildFileReport::Missing => output.push_str("  No Dockerfile found.\n"),
            BuildFileReport::Present(health) => {
                output.push_str(&format!(
                    "  Dockerfile exists (size={})\n",
                    health.size_bytes
                ));
                if !health.problems.is_empty() {
                    output.push_str(&format!("  Problems: {:?}\n", health.problems));
                }
                if health.well_formed {
                    output.push_str("  Dockerfile passes basic checks.\n");
                }
            }
        }

        if !outcome.kind.is_known() {
            output.push_str("  Unknown service type; skipping template generation.\n");
            return output;
        }

        output.push_str("  --- canonical Dockerfile preview ---\n");
        for line in &outcome.preview {
            output.push_str(line);
            output.push('\n');
        }
        output.push_str("  ...\n");

        match &outcome.write {
            WriteOutcome::NotAttempted => {}
            WriteOutcome::Written { path, backup } => {
                let backup_note = match backup {
                    Some(backup) => format!("backup in {}", self.config.display_path(backup)),
                    None => "no previous Dockerfile to back up".to_string(),
                };
                output.push_str(&format!(
                    "  Wrote canonical Dockerfile to {} ({})\n",
                    self.config.display_path(path),
                    backup_note
                ));
            }
            WriteOutcome::Failed { error } => {
                output.push_str(&format!(
                    "  Failed to write canonical Dockerfile: {}\n",
                    error
                ));
            }
        }
        output
    }

    pub fn format_structure(&self, report: &StructureReport) -> String {
        let mut output = String::from("\n=== Folder Structure Validation ===\n");
        if report.is_complete() {
            output.push_str("All required folders present.\n");
        } else {
            output.push_str("Missing folders:\n");
            for missing in &report.missing {
                output.push_str(&format!("  - {}\n", missing));
            }
        }
        output
    }

    pub fn format_imports(&self, hits: &[ImportHit]) -> String {
        let mut output = format!(
            "Found {} potential Shared imports (dry-run).\n",
            hits.len()
        );
        for hit in hits {
            output.push_str(&format!(
                "{} -> {}  (suggested: {})\n",
                self.config.display_path(&hit.file),
                hit.matched,
                hit.suggested
            ));
        }
        output.push_str(IMPORT_MIGRATION_HINT);
        output
    }
}

const IMPORT_MIGRATION_HINT: &str = r#"
Suggested replacements (review each file before running):

# Python: 'from Shared.' -> 'from shared_python.'
grep -RIl "from Shared\." | xargs -n1 sed -i 's/from Shared\./from shared_python\./g'

# TypeScript: '/Shared/' -> '/shared-ts/'
grep -RIl "Shared/" | xargs -n1 sed -i 's#/Shared/#/shared-ts/#g'
"#;
