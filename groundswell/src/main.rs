mod api;
mod config;
mod error;
mod llm;
mod search;
mod synthesis;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{create_router, AppState};
use crate::config::{Config, SynthesisStrategy};

#[derive(Parser)]
#[command(name = "groundswell")]
#[command(about = "Newsletter service for grassroots social movement wins")]
struct Args {
    /// Override the listen port from the environment/config.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "groundswell=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if config.server.access_tokens.is_empty() {
        tracing::warn!(
            "GROUNDSWELL_ACCESS_TOKENS is not set. The intake endpoint is locked until it is."
        );
    }
    if config.llm.api_key.is_none() {
        tracing::warn!("LLM_API_KEY is not set. Synthesis calls will be rejected upstream.");
    }

    match config.llm.strategy {
        SynthesisStrategy::ToolCalling => {
            tracing::info!(model = %config.llm.model, "Using tool-calling synthesis strategy")
        }
        SynthesisStrategy::Grounding => {
            tracing::info!(model = %config.llm.model, "Using grounding synthesis strategy")
        }
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::new(config)?;
    if !state.search.is_available() {
        tracing::warn!("SEARCH_API_KEY is not set. Search calls will be rejected upstream.");
    }
    let app = create_router(state);

    tracing::info!("Groundswell starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
