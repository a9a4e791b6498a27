use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use rsa_endpoint::{AppState, Config, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // Keys are read once; a missing or corrupt key file stops startup here
    let state = Arc::new(AppState::from_config(&config)?);
    tracing::info!(
        public_key = %config.public_key_path.display(),
        private_key = %config.private_key_path.display(),
        max_plaintext = state.rsa.max_plaintext_len(),
        "key pair loaded"
    );

    let app = router(state, config.body_limit);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("RSA encryption service listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
