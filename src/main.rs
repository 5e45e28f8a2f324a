//! pointsmart — loyalty-points account service
//!
//! Long-running HTTP service that:
//! - Registers and authenticates users (JWT)
//! - Accepts purchase order numbers for points accrual
//! - Tracks per-user point balances and processes withdrawals

use pointsmart::api;
use pointsmart::config::Config;
use pointsmart::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pointsmart=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("starting pointsmart (env: {})", config.environment);

    let state = AppState::new(&config).await?;
    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("pointsmart listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
