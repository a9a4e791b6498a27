use axum::http::HeaderValue;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub public_key_path: PathBuf,
    pub private_key_path: PathBuf,
    pub log_file: Option<PathBuf>,
    pub server_name: HeaderValue,
    pub body_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = match lookup("RSA_BIND_ADDR") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                var: "RSA_BIND_ADDR",
                reason: e.to_string(),
            })?,
            None => SocketAddr::from(([127, 0, 0, 1], 3000)),
        };

        let server_name = match lookup("RSA_SERVER_NAME") {
            Some(raw) => HeaderValue::try_from(raw).map_err(|e| ConfigError::Invalid {
                var: "RSA_SERVER_NAME",
                reason: e.to_string(),
            })?,
            None => HeaderValue::from_static(concat!("rsa-endpoint/", env!("CARGO_PKG_VERSION"))),
        };

        let body_limit = match lookup("RSA_BODY_LIMIT") {
            Some(raw) => raw.parse::<usize>().map_err(|e| ConfigError::Invalid {
                var: "RSA_BODY_LIMIT",
                reason: e.to_string(),
            })?,
            None => 65536,
        };

        Ok(Config {
            bind_addr,
            public_key_path: lookup("RSA_PUBLIC_KEY_PATH")
                .unwrap_or_else(|| "./config/publicKey.pem".to_string())
                .into(),
            private_key_path: lookup("RSA_PRIVATE_KEY_PATH")
                .unwrap_or_else(|| "./config/privateKey.pem".to_string())
                .into(),
            log_file: lookup("RSA_LOG_FILE").map(PathBuf::from),
            server_name,
            body_limit,
        })
    }
}
