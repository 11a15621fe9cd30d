use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shelternav_api::AssistantClient;
use shelternav_cli::{
    BackendMode, ConsolePresenter, FixedPosition, LogSurface, SearchOrchestrator,
};
use shelternav_map::OverlayManager;

#[derive(Debug, Parser)]
#[command(name = "shelternav")]
#[command(about = "Shelter search and route presentation client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for shelters near a named place.
    Search {
        /// Free-text query, e.g. "shelters near Gangnam station".
        query: Vec<String>,
    },
    /// Search for shelters near the configured device position.
    Locate,
    /// Print backend availability.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = shelternav_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let client = AssistantClient::with_timeout(&config.api_base_url, config.request_timeout_secs)?;
    let mode = BackendMode::probe(&client).await;

    match cli.command {
        Commands::Status => {
            if mode.available {
                println!(
                    "backend reachable at {} (llm: {})",
                    config.api_base_url,
                    if mode.use_llm { "available" } else { "unavailable" }
                );
            } else {
                println!("backend unreachable at {}", config.api_base_url);
            }
            return Ok(());
        }
        Commands::Search { query } => {
            let orchestrator = build_orchestrator(client, &config, mode);
            orchestrator.search_text(&query.join(" ")).await;
        }
        Commands::Locate => {
            let orchestrator = build_orchestrator(client, &config, mode);
            orchestrator.search_current_location().await;
        }
    }

    // Let the indicator run a short demonstration before the process exits;
    // a long-lived host would keep it running until the next search.
    tokio::time::sleep(Duration::from_secs(2)).await;
    Ok(())
}

fn build_orchestrator(
    client: AssistantClient,
    config: &shelternav_core::AppConfig,
    mode: BackendMode,
) -> SearchOrchestrator<ConsolePresenter, FixedPosition> {
    let overlays = OverlayManager::new(
        Arc::new(LogSurface::default()),
        Duration::from_millis(config.animation_tick_ms),
    );
    SearchOrchestrator::new(
        client,
        overlays,
        ConsolePresenter,
        FixedPosition::new(config.device_position),
        config.nearest_k,
        mode,
    )
}
