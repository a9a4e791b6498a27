use axum::http::HeaderValue;
use std::sync::Arc;
use std::time::Instant;

use crate::audit::{ErrorLog, FileLog, TracingLog};
use crate::config::Config;
use crate::rsa_service::{KeyMaterial, RsaService};

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub rsa: Arc<RsaService>,
    pub log: Arc<dyn ErrorLog>,
    pub server_name: HeaderValue,
    pub started: Instant,
}

impl AppState {
    pub fn new(rsa: RsaService, log: Arc<dyn ErrorLog>, server_name: HeaderValue) -> Self {
        AppState {
            rsa: Arc::new(rsa),
            log,
            server_name,
            started: Instant::now(),
        }
    }

    /// Loads both keys and opens the error log; any failure here is fatal.
    pub fn from_config(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let public_key = KeyMaterial::from_file(&config.public_key_path)?;
        let private_key = KeyMaterial::from_file(&config.private_key_path)?;
        let rsa = RsaService::new(&public_key, &private_key)?;

        let log: Arc<dyn ErrorLog> = match &config.log_file {
            Some(path) => Arc::new(FileLog::open(path)?),
            None => Arc::new(TracingLog),
        };

        Ok(Self::new(rsa, log, config.server_name.clone()))
    }
}
