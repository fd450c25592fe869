//! Read-only scan for imports that still reference the old `Shared` package
//!
//! Python and TypeScript sources that import from `Shared.` or `.../Shared/`
//! should move to the per-language shared packages. The scan only reports
//! the hits and which package each one belongs to; nothing is rewritten.

use crate::fs::FileSystem;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Source file extensions that are scanned
const SOURCE_EXTENSIONS: &[&str] = &["py", "ts", "tsx", "js", "jsx"];

/// Which shared package a hit should be migrated to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Python,
    #[serde(rename = "ts")]
    TypeScript,
}

impl ImportKind {
    pub fn name(&self) -> &'static str {
        match self {
            ImportKind::Python => "python",
            ImportKind::TypeScript => "ts",
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One matched import statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportHit {
    pub file: PathBuf,
    #[serde(rename = "match")]
    pub matched: String,
    #[serde(rename = "suggested_kind")]
    pub suggested: ImportKind,
}

fn patterns() -> &'static [(Regex, ImportKind)] {
    static PATTERNS: OnceLock<Vec<(Regex, ImportKind)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"from\s+Shared\.(\S+)\s+import", ImportKind::Python),
            (r"import\s+Shared\.(\S+)", ImportKind::Python),
            (
                r#"from\s+['"](.*/)?Shared(/|\.)([^'"]+)['"]"#,
                ImportKind::TypeScript,
            ),
            (
                r#"require\(['"](.*/)?Shared(/|\.)([^'"]+)['"]\)"#,
                ImportKind::TypeScript,
            ),
        ]
        .into_iter()
        .map(|(pattern, kind)| (Regex::new(pattern).expect("valid regex"), kind))
        .collect()
    })
}

/// Matches in one file's text, grouped by pattern in pattern order
pub fn find_shared_imports(file: &Path, text: &str) -> Vec<ImportHit> {
    let mut hits = Vec::new();
    for (re, kind) in patterns() {
        for m in re.find_iter(text) {
            hits.push(ImportHit {
                file: file.to_path_buf(),
                matched: m.as_str().to_string(),
                suggested: *kind,
            });
        }
    }
    hits
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Walks `root` (sorted, at most `max_depth` levels deep) and collects
/// `Shared` imports from every source file
///
/// Directories that cannot be listed and files that cannot be read as UTF-8
/// are skipped.
pub fn scan_shared_imports<F: FileSystem + ?Sized>(
    fs: &F,
    root: &Path,
    max_depth: usize,
) -> Vec<ImportHit> {
    let mut hits = Vec::new();
    scan_dir(fs, root, 0, max_depth, &mut hits);
    debug!(hits = hits.len(), root = %root.display(), "Scanned for Shared imports");
    hits
}

fn scan_dir<F: FileSystem + ?Sized>(
    fs: &F,
    dir: &Path,
    depth: usize,
    max_depth: usize,
    hits: &mut Vec<ImportHit>,
) {
    if depth > max_depth {
        return;
    }

    let mut entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Cannot list directory");
            return;
        }
    };
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    for entry in entries {
        if entry.is_dir() {
            scan_dir(fs, entry.path(), depth + 1, max_depth, hits);
            continue;
        }
        if !is_source_file(entry.path()) {
            continue;
        }

        let text = match fs.read(entry.path()).map(String::from_utf8) {
            Ok(Ok(text)) => text,
            Ok(Err(_)) => {
                debug!(path = %entry.path().display(), "Skipping non-UTF-8 file");
                continue;
            }
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "Skipping unreadable file");
                continue;
            }
        };
        hits.extend(find_shared_imports(entry.path(), &text));
    }
}
