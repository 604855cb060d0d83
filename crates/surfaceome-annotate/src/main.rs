//! Surfaceome Annotate - command-line entry point

use clap::Parser;
use std::process;
use surfaceome_annotate::{pipeline, Cli};
use surfaceome_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use tracing::error;

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let log_config = LogConfig::builder()
        .level(log_level)
        .output(LogOutput::Console)
        .log_file_prefix("surfaceome-annotate")
        .filter_directives("reqwest=warn,hyper=warn,hyper_util=warn")
        .build();

    // Environment variables take precedence
    let log_config = match log_config.clone().merge_env() {
        Ok(merged) => merged,
        Err(e) => {
            eprintln!("Warning: ignoring invalid logging environment: {e}");
            log_config
        },
    };

    if let Err(e) = init_logging(&log_config) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let config = cli.into_config();
    if let Err(e) = pipeline::run(&config).await {
        error!(error = %e, "Annotation failed");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
