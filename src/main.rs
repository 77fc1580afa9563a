use std::io::{self, Read, Write};
use std::process::ExitCode;

use mara_schema::batch::validate_batch;
use mara_schema::constants::config::DEFAULT_LOG_FILTER;
use mara_schema::AppConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    // Load Configuration
    let config_path = AppConfig::path();
    let loaded = AppConfig::load_from(&config_path)?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    // Setup Logging (RUST_LOG wins over the config file)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if found {
        info!("Loaded configuration from {}", config_path);
    } else {
        info!("No config at {}, using defaults", config_path);
    }
    info!("Validation rules: {:?}", config.validation);

    let Some(path) = std::env::args().nth(1) else {
        error!("Usage: mara-validate <records.json | records.jsonl | ->");
        return Ok(ExitCode::from(2));
    };

    let content = if path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&path)?
    };

    let report = validate_batch(&content, &config.validation);

    let mut out = io::stdout().lock();
    for record in &report.records {
        writeln!(out, "{}", serde_json::to_string(&record.to_json()?)?)?;
    }

    let summary = report.summary();
    info!(
        "📊 {} accepted, {} rejected ({:?})",
        summary.accepted, summary.rejected, summary.per_kind
    );

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
