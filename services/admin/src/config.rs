//! Service configuration

use config::{ConfigError, Environment};
use serde::Deserialize;
use std::env;

/// Settings read from `ADMIN_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub tfa_code_ttl_minutes: i64,
    pub tfa_max_attempts: u32,
    pub tfa_window_seconds: u64,
    /// Messaging provider endpoint; push is disabled when unset
    pub push_endpoint: Option<String>,
    pub push_server_key: Option<String>,
    /// Mail relay endpoint; mail is disabled when unset
    pub mail_endpoint: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3001)?
            .set_default("tfa_code_ttl_minutes", 10)?
            .set_default("tfa_max_attempts", 5)?
            .set_default("tfa_window_seconds", 300)?
            .set_default("mail_from", "no-reply@localhost")?
            .add_source(Environment::with_prefix("ADMIN"))
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// JWT verification configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// PEM encoded RSA public key
    pub public_key: String,
}

impl JwtConfig {
    /// Read `JWT_PUBLIC_KEY`, either the PEM itself or a path to it
    pub fn from_env() -> Result<Self, String> {
        let public_key = env::var("JWT_PUBLIC_KEY")
            .map_err(|_| "JWT_PUBLIC_KEY environment variable not set".to_string())?;

        let public_key = if public_key.starts_with("-----BEGIN") {
            public_key
        } else {
            std::fs::read_to_string(&public_key)
                .or_else(|_| {
                    let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
                    path.push(&public_key);
                    std::fs::read_to_string(path)
                })
                .map_err(|e| format!("Failed to read public key file: {}", e))?
                .trim()
                .to_string()
        };

        Ok(JwtConfig { public_key })
    }
}
