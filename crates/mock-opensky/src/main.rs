//! Mock OpenSky API server for local development.
//!
//! Serves the bundled fixtures on `/api/states/all` and `/api/states/own`.
//! Point a client at it with `--api-url http://localhost:4100/api/`.

use clap::Parser;
use mock_opensky::{MockResponse, MockState, STATES_ALL, fixtures, router};
use tracing::info;

/// Mock OpenSky REST API.
#[derive(Parser, Debug)]
#[command(name = "mock-opensky", about = "Mock OpenSky REST API")]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 4100)]
    port: u16,

    /// Answer `/api/states/all` with `states: null`.
    #[arg(long)]
    empty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging (controlled via RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let state = MockState::with_fixtures();
    if args.empty {
        state.respond(STATES_ALL, MockResponse::json(fixtures::UNAVAILABLE_STATES));
    }

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "mock OpenSky API listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
