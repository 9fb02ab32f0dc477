//! memorb CLI and REST API entry point.
//!
//! Binary name: `memorb`
//!
//! Parses CLI arguments, loads configuration (failing fast on missing
//! credentials), wires services, then dispatches to the command handler or
//! starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;

use memorb_infra::config::load_app_config;
use memorb_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_format, cli.log_directive(), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_app_config(cli.config.as_deref()).await?;
    let state = AppState::init(&config)?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or(config.settings.server.host);
            let port = port.unwrap_or(config.settings.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            tracing::info!(%addr, "memorb API listening");
            if !cli.json {
                println!(
                    "  {} memorb API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("server stopped");
        }

        Commands::Provision { user_id } => {
            cli::memory::provision(&state, &user_id, cli.json).await?;
        }

        Commands::Scrape { url, strategy } => {
            cli::scrape::scrape(&state, &url, strategy.as_deref()).await?;
        }

        Commands::Reflect { file } => {
            cli::reflect::reflect(&state, &file).await?;
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
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
}
