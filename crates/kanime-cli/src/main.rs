mod cli;
mod format;
mod logging;

use std::process::ExitCode;

use clap::Parser;

use kanime_core::AppConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("warning: {e}; using default settings");
            AppConfig::default()
        }
    };

    let _guard = logging::init(&config.logging, cli.verbose);
    tracing::debug!(config = %AppConfig::config_path().display(), "starting");

    match cli::run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
