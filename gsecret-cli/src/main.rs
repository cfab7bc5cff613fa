//! `gsecret` CLI - store and fetch secrets in Google Secret Manager
//!
//! Every command degrades to the local keyring and the local index cache
//! when the remote store cannot be reached.

mod cli;
mod commands;
mod error;
mod format;
mod util;

use clap::Parser;
use cli::Cli;
use gsecret_core::tracing::{TracingConfig, TracingLevel, init_tracing};

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let ctx = util::Context {
        config_path: cli.config.as_deref(),
        quiet: cli.quiet,
        offline: cli.offline,
    };

    if let Err(e) = commands::dispatch(&ctx, cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

/// `-v` flags win over the `logging.level` setting; `--quiet` keeps errors only
///
/// Destination and filter come from `[logging]`; unreadable settings fall
/// back to stderr at `warn`.
fn init_logging(cli: &Cli) {
    let configured = util::create_config_manager(cli.config.as_deref())
        .ok()
        .and_then(|manager| {
            let settings = manager.load_settings().ok()?;
            let log_file = manager.log_file_path(&settings);
            Some(TracingConfig::from_settings(&settings.logging, log_file))
        })
        .unwrap_or_default();

    let level = if cli.quiet {
        TracingLevel::Error
    } else {
        TracingLevel::from_verbosity(cli.verbose, configured.level)
    };

    if let Err(e) = init_tracing(&configured.with_level(level)) {
        eprintln!("Warning: {e}");
    }
}
