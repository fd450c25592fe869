//! Run-level report written to `reports/dockerfile-report.json`

use crate::dockerfile::BuildFileReport;
use crate::fs::FileSystem;
use crate::services::{EcosystemKind, ServiceDirectory};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Per-service entry of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    #[serde(rename = "type")]
    pub kind: EcosystemKind,
    pub dockerfile: BuildFileReport,
}

/// Service path → classification and Dockerfile findings
///
/// Keys are ordered, so two runs over the same tree serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReconciliationReport {
    entries: BTreeMap<String, ReportEntry>,
}

impl ReconciliationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one service, replacing any earlier entry for the same path
    pub fn record(
        &mut self,
        service: &ServiceDirectory,
        kind: EcosystemKind,
        dockerfile: BuildFileReport,
    ) {
        self.entries.insert(
            Self::key(service),
            ReportEntry { kind, dockerfile },
        );
    }

    pub fn get(&self, service: &ServiceDirectory) -> Option<&ReportEntry> {
        self.entries.get(&Self::key(service))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReportEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        let mut json =
            serde_json::to_string_pretty(self).context("Failed to serialize report to JSON")?;
        json.push('\n');
        Ok(json)
    }

    /// Overwrites `path` with the serialized report, creating its directory
    pub fn write_to<F: FileSystem + ?Sized>(&self, fs: &F, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            fs.create_dir_all(parent)?;
        }
        fs.write(path, json.as_bytes())
    }

    fn key(service: &ServiceDirectory) -> String {
        service.path.display().to_string()
    }
}
