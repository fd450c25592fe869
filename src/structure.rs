//! Repository layout helpers: required-folder check and tree listing

use crate::fs::FileSystem;
use std::path::Path;
use tracing::{debug, warn};

/// Folders a monorepo checkout is expected to have
pub const DEFAULT_REQUIRED: &[&str] = &[
    "services/auth-service",
    "services/api-gateway",
    "services/assessment-service",
    "frontend",
    "shared/enums",
    "shared/utils",
    "infrastructure",
    ".github/workflows",
];

pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Names that mark a manifest file; a directory with one of these names is suspect
const MANIFEST_NAMES: &[&str] = &["package.json", "pyproject.toml", "requirements.txt"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureReport {
    /// Required paths that are absent, in the order they were requested
    pub missing: Vec<String>,
}

impl StructureReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Checks that every `required` path (relative to `root`) is a directory
pub fn check_structure<F, S>(fs: &F, root: &Path, required: &[S]) -> StructureReport
where
    F: FileSystem + ?Sized,
    S: AsRef<str>,
{
    let mut missing = Vec::new();
    for path in required {
        let path: &str = path.as_ref();
        if !fs.is_dir(&root.join(path)) {
            missing.push(path.to_string());
        }
    }

    debug!(
        required = required.len(),
        missing = missing.len(),
        "Checked repository structure"
    );
    StructureReport { missing }
}

/// Sorted, indented listing of everything under `root`
///
/// Directories get a trailing `/`. A directory named like a manifest file is
/// flagged as `[SUSPICIOUS DIR]`, and directories that cannot be listed as
/// `[UNREADABLE]`. Nothing deeper than `max_depth` levels is printed.
pub fn render_tree<F: FileSystem + ?Sized>(fs: &F, root: &Path, max_depth: usize) -> String {
    let mut out = format!("Monorepo root: {}\n", root.display());
    walk(fs, root, "", 0, max_depth, &mut out);
    out
}

fn walk<F: FileSystem + ?Sized>(
    fs: &F,
    dir: &Path,
    prefix: &str,
    depth: usize,
    max_depth: usize,
    out: &mut String,
) {
    if depth > max_depth {
        return;
    }

    let mut entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Cannot list directory");
            out.push_str(&format!("{}[UNREADABLE] {}\n", prefix, dir.display()));
            return;
        }
    };
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    for entry in entries {
        if entry.is_dir() {
            if MANIFEST_NAMES.contains(&entry.file_name()) {
                out.push_str(&format!(
                    "{}[SUSPICIOUS DIR] {}\n",
                    prefix,
                    entry.path().display()
                ));
            } else {
                out.push_str(&format!("{}{}/\n", prefix, entry.file_name()));
            }
            walk(fs, &entry.path, &format!("{}    ", prefix), depth + 1, max_depth, out);
        } else {
            out.push_str(&format!("{}{}\n", prefix, entry.name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use std::path::PathBuf;

    fn repo() -> MockFileSystem {
        let fs = MockFileSystem::with_root(PathBuf::from("/repo"));
        fs.add_file("services/auth/package.json", "{}");
        fs.add_file("services/auth/Dockerfile", "FROM node");
        fs.add_dir("services/web/package.json");
        fs.add_file("README.md", "# repo");
        fs.add_dir("scripts");
        fs
    }

    #[test]
    fn test_check_structure_reports_missing_in_order() {
        let fs = repo();
        fs.add_dir("services/api-gateway");
        fs.add_dir("shared/enums");
        fs.add_dir("infrastructure");
        let report = check_structure(&fs, Path::new("/repo"), DEFAULT_REQUIRED);

        assert!(!report.is_complete());
        assert_eq!(
            report.missing,
            vec![
                "services/auth-service",
                "services/assessment-service",
                "frontend",
                "shared/utils",
                ".github/workflows",
            ]
        );
    }

    #[test]
    fn test_check_structure_complete() {
        let fs = repo();
        let report = check_structure(&fs, Path::new("/repo"), &["services/auth", "scripts"]);
        assert!(report.is_complete());
    }

    #[test]
    fn test_file_does_not_satisfy_required_folder() {
        let fs = repo();
        let report = check_structure(&fs, Path::new("/repo"), &["README.md"]);
        assert_eq!(report.missing, vec!["README.md"]);
    }

    #[test]
    fn test_render_tree() {
        let fs = repo();
        let tree = render_tree(&fs, Path::new("/repo"), DEFAULT_MAX_DEPTH);

        let expected = "\
Monorepo root: /repo
README.md
scripts/
services/
    auth/
        Dockerfile
        package.json
    web/
        [SUSPICIOUS DIR] /repo/services/web/package.json
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_render_tree_respects_max_depth() {
        let fs = repo();
        let tree = render_tree(&fs, Path::new("/repo"), 0);

        assert!(tree.contains("services/\n"));
        assert!(!tree.contains("auth/"));
    }

    #[test]
    fn test_render_tree_marks_unreadable_directories() {
        let fs = repo();
        fs.fail_reads("services/auth");
        let tree = render_tree(&fs, Path::new("/repo"), DEFAULT_MAX_DEPTH);

        assert!(tree.contains("    auth/\n        [UNREADABLE] /repo/services/auth\n"));
        assert!(!tree.contains("Dockerfile"));
    }
}
