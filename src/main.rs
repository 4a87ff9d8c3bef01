mod app;
mod config;
mod error;
mod form;
mod net;
mod notify;
mod record;
mod render;
mod tui;
mod validate;

use std::process::ExitCode;

use clap::Parser;

use config::Config;

/// Default config file name.
const DEFAULT_CONFIG: &str = "ipform.toml";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load config file as env-var defaults (before clap)
    let config_file_path =
        std::env::var("IPFORM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let config_file_path = std::path::Path::new(&config_file_path);
    if config_file_path.exists() {
        config::ConfigFile::load(config_file_path)?.inject_env();
    }

    let config = Config::parse();
    app::run(config).await
}
