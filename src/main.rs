use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use k6_workbench::config::{CliArgs, Command, ServerConfig, DEFAULT_LOG_FILTER};
use k6_workbench::model::TestConfig;
use k6_workbench::state::WorkbenchState;
use k6_workbench::{k6, report, results, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so compiled scripts and JSON on stdout stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    match args.command {
        Command::Serve(serve_args) => serve(ServerConfig::from_args(serve_args)).await,
        Command::Compile { config } => {
            let config = TestConfig::from_json(&read(&config)?)?;
            print!("{}", k6::compile(&config)?);
            Ok(())
        }
        Command::Parse { file } => {
            let metrics = report::extract_summary(&read(&file)?);
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            Ok(())
        }
        Command::Timeseries { file } => {
            let series = report::aggregate(&read(&file)?);
            println!("{}", serde_json::to_string_pretty(&series)?);
            Ok(())
        }
        Command::Import { file } => {
            let result = results::import_path(&file, chrono::Utc::now())?;
            println!("{}", results::export_json(&result)?);
            Ok(())
        }
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    info!("Starting k6-workbench v{}", env!("CARGO_PKG_VERSION"));
    let addr = config.socket_addr()?;

    let state = Arc::new(WorkbenchState::new(config));
    let router = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
