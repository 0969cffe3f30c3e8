// Entrypoint for the terminal front end.
// - Keeps `main` small: parse arguments, set up logging, build the
//   controller's collaborators and hand the controller to the UI loop.
// - Returns `anyhow::Result` so setup failures print with context.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use unicodefix_client::{
    api::ApiClient, clipboard::SystemClipboard, config::Args, download::DirectorySink,
    prefs::JsonPreferenceStore, ui::main_menu, view::MemoryView, Controller,
};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let api = ApiClient::new(&args.server_url).context("Failed to build HTTP client")?;
    let prefs_path = args.resolved_prefs_file();
    let prefs = JsonPreferenceStore::open(&prefs_path)
        .with_context(|| format!("Failed to load preferences from {}", prefs_path.display()))?;
    let downloads = DirectorySink::new(args.resolved_download_dir());
    tracing::info!(server = api.base_url(), downloads = %downloads.dir().display(), "starting");

    let controller = Controller::new(
        MemoryView::new(),
        Arc::new(api),
        Box::new(SystemClipboard),
        Box::new(downloads),
        Box::new(prefs),
    )
    .with_stale_policy(args.stale_results);

    // Blocks until the user exits.
    main_menu(controller)?;
    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `--log-level`.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
