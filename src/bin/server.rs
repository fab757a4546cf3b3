//! Temple oracle HTTP server binary.
//!
//! # Environment Variables
//!
//! - `PORT` — HTTP port (default: 8000)
//! - `TEMPLE_DATA_DIR` — data directory (default: ./data)
//! - `OPENAI_API_KEY` / `XAI_API_KEY` — provider secrets (checked at first use)
//! - `LLAMA_ENABLED` — enable shadow observation records (default: false)
//! - `RUST_LOG` — tracing filter (default: "info")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use temple_oracle::server::{app_router, AppState};
use temple_oracle::Settings;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,temple_oracle=debug".into()),
        )
        .init();

    let settings = Settings::from_env();
    tracing::info!(
        "OpenAI key loaded: {}, xAI key loaded: {}",
        settings.openai_api_key.is_some(),
        settings.xai_api_key.is_some()
    );

    let bind_addr = format!("0.0.0.0:{}", settings.port);
    let state = AppState::from_settings(settings).expect("Failed to initialize data directory");
    let app = app_router(state);

    tracing::info!("temple-oracle server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health        — liveness probe");
    tracing::info!("  POST /ask           — oracle question");
    tracing::info!("  POST /whisper       — voice question");
    tracing::info!("  POST /upload_scroll — scroll ingestion");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}
