//! Subcommand handlers; each returns the process exit code

use super::commands::{ImportsArgs, ReconcileArgs, StructureArgs, TreeArgs};
use super::output::HumanFormatter;
use crate::config::ReconcilerConfig;
use crate::fs::RealFileSystem;
use crate::imports::scan_shared_imports;
use crate::reconcile::{ExecutionMode, Reconciler};
use crate::structure::{check_structure, render_tree, DEFAULT_REQUIRED};
use tracing::{debug, error, info, warn};

pub fn handle_reconcile(args: &ReconcileArgs, config: ReconcilerConfig) -> i32 {
    let fs = RealFileSystem::new();
    if let Err(e) = config.validate(&fs) {
        error!("{}", e);
        return 1;
    }
    debug!("{}", config);

    let mode = ExecutionMode::from_apply_flag(args.apply);
    let reconciler = Reconciler::new(fs, config);

    let summary = match reconciler.run(mode) {
        Ok(summary) => summary,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    print!("{}", HumanFormatter::new(reconciler.config()).format_run(&summary));

    let failures = summary.failures().count();
    if failures > 0 {
        warn!(failures, "Some Dockerfiles could not be written");
    }
    info!(
        services = summary.outcomes.len(),
        written = summary.written().count(),
        "Reconciliation finished"
    );
    0
}

pub fn handle_structure(args: &StructureArgs, config: ReconcilerConfig) -> i32 {
    let fs = RealFileSystem::new();
    if let Err(e) = config.validate(&fs) {
        error!("{}", e);
        return 1;
    }

    let report = if args.required.is_empty() {
        check_structure(&fs, &config.root, DEFAULT_REQUIRED)
    } else {
        check_structure(&fs, &config.root, &args.required)
    };

    print!("{}", HumanFormatter::new(&config).format_structure(&report));

    if report.is_complete() {
        0
    } else {
        1
    }
}

pub fn handle_tree(args: &TreeArgs, config: ReconcilerConfig) -> i32 {
    let fs = RealFileSystem::new();
    if let Err(e) = config.validate(&fs) {
        error!("{}", e);
        return 1;
    }

    print!("{}", render_tree(&fs, &config.root, args.max_depth));
    0
}

pub fn handle_imports(args: &ImportsArgs, config: ReconcilerConfig) -> i32 {
    let fs = RealFileSystem::new();
    if let Err(e) = config.validate(&fs) {
        error!("{}", e);
        return 1;
    }

    let hits = scan_shared_imports(&fs, &config.root, args.max_depth);
    print!("{}", HumanFormatter::new(&config).format_imports(&hits));
    info!(hits = hits.len(), "Import scan finished");
    0
}
