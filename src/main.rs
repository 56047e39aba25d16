use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocr_agent::{AppState, Config, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocr_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Agent model {} (max {} steps) at {}",
        config.agent.model_id,
        config.agent.max_steps,
        config.agent.base_url
    );

    let state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize services: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run(state).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
