use dockrecon::cli::commands::{CliArgs, Commands};
use dockrecon::cli::handlers::{handle_imports, handle_reconcile, handle_structure, handle_tree};
use dockrecon::util::{init_logging, resolve_level, LoggingConfig};
use dockrecon::{ReconcilerConfig, VERSION};

use clap::Parser;
use std::process;
use tracing::debug;

fn main() {
    let args = CliArgs::parse();

    let mut config = ReconcilerConfig::default();
    if let Some(root) = &args.root {
        config = ReconcilerConfig {
            log_level: config.log_level,
            ..ReconcilerConfig::from_root(root)
        };
    }

    let level = resolve_level(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
        &config.log_level,
    );
    if args.log_level.is_some() || args.verbose || args.quiet {
        config = config.with_log_level(level);
    }
    init_logging(LoggingConfig {
        level,
        use_json: args.log_json,
        ..LoggingConfig::default()
    });

    debug!("dockrecon v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Reconcile(reconcile_args) => handle_reconcile(reconcile_args, config),
        Commands::Structure(structure_args) => handle_structure(structure_args, config),
        Commands::Tree(tree_args) => handle_tree(tree_args, config),
        Commands::Imports(imports_args) => handle_imports(imports_args, config),
    };

    process::exit(exit_code);
}
