// Command line and environment configuration.

use crate::api::DEFAULT_SERVER_URL;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// What to do with a successful result whose request was started before
/// the last mode switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StaleResultPolicy {
    /// Show it anyway.
    #[default]
    Show,
    /// Drop it; the previous result (if any) stays available for export.
    Suppress,
}

/// unicodefix - clean problematic Unicode through a UnicodeFix server
#[derive(Parser, Debug, Clone)]
#[command(name = "unicodefix")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the cleaning service
    #[arg(long, env = "UNICODEFIX_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Handling of results that arrive after the mode was switched
    #[arg(long, value_enum, default_value_t = StaleResultPolicy::Show)]
    pub stale_results: StaleResultPolicy,

    /// Directory that downloads are written to
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Preferences file (dark mode)
    #[arg(long, value_name = "FILE")]
    pub prefs_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// Download directory: the flag, else the user's download dir, else `.`.
    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Preferences file: the flag, else `<config dir>/unicodefix/preferences.json`.
    pub fn resolved_prefs_file(&self) -> PathBuf {
        self.prefs_file.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("unicodefix")
                .join("preferences.json")
        })
    }
}
