use crate::structure::DEFAULT_MAX_DEPTH;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Dockerfile reconciler and layout checks for service monorepos
#[derive(Parser, Debug)]
#[command(
    name = "dockrecon",
    about = "Dockerfile reconciler and layout checks for service monorepos",
    version,
    long_about = "dockrecon scans the services/ directory of a monorepo, classifies each \
                  service as Node or Python, checks existing Dockerfiles and proposes the \
                  canonical Dockerfile for each ecosystem. Nothing is written to services \
                  unless --apply is given."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        global = true,
        value_name = "DIR",
        help = "Repository root (defaults to DOCKRECON_ROOT or the current directory)"
    )]
    pub root: Option<PathBuf>,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Check service Dockerfiles and propose canonical ones",
        long_about = "Classifies every directory under services/ by its marker files, checks any \
                      existing Dockerfile and previews the canonical Dockerfile for its \
                      ecosystem. A JSON report is written to reports/dockerfile-report.json.\n\n\
                      With --apply, existing Dockerfiles are copied to \
                      _dockerfile_backups/<service>/Dockerfile.bak and replaced.\n\n\
                      Examples:\n  \
                      dockrecon reconcile\n  \
                      dockrecon reconcile --apply\n  \
                      dockrecon --root /path/to/repo reconcile"
    )]
    Reconcile(ReconcileArgs),

    #[command(
        about = "Verify that required folders exist",
        long_about = "Checks that each required folder exists under the repository root.\n\n\
                      Examples:\n  \
                      dockrecon structure\n  \
                      dockrecon structure --require services --require infrastructure"
    )]
    Structure(StructureArgs),

    #[command(about = "Print the repository tree, flagging suspicious directories")]
    Tree(TreeArgs),

    #[command(
        about = "List imports that still reference the old Shared package",
        long_about = "Scans .py, .ts, .tsx, .js and .jsx files under the repository root for \
                      imports of Shared.* or .../Shared/... and prints each hit with the shared \
                      package it should move to (python or ts). Nothing is modified."
    )]
    Imports(ImportsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ReconcileArgs {
    #[arg(long, help = "Write canonical Dockerfiles (backs up existing ones first)")]
    pub apply: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct StructureArgs {
    #[arg(
        long = "require",
        value_name = "PATH",
        help = "Required folder, relative to the root (repeatable; replaces the default list)"
    )]
    pub required: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct TreeArgs {
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_MAX_DEPTH,
        help = "Maximum depth to descend"
    )]
    pub max_depth: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct ImportsArgs {
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_MAX_DEPTH,
        help = "Maximum depth to descend"
    )]
    pub max_depth: usize,
}
