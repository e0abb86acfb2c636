use std::process::ExitCode;
use std::sync::Arc;

use server::config::print_usage;
use server::{AppState, ArgsError, ServerConfig, serve};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        supply = %config.supply,
        rounds = config.engine.total_rounds,
        require_level = config.engine.require_level,
        "starting swipe drill"
    );
    let state = Arc::new(AppState::from_config(&config)?);
    serve(state, config.bind).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swipe_drill=info,server=info,services=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ServerConfig::from_env(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(ArgsError::HelpRequested) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}
