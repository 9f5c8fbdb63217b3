// src/config.rs
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    3000
}

fn default_auto_approve_interval_secs() -> u64 {
    60 * 60
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Server Configuration
    #[serde(default = "default_server_host")]
    pub server_host: String,
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    // Bearer token verification (HS256)
    pub jwt_secret: String,

    // Scheduled auto-approval
    #[serde(default = "default_auto_approve_interval_secs")]
    pub auto_approve_interval_secs: u64,

    // CSV snapshot of the time entries, loaded at startup
    pub data_file: Option<PathBuf>,

    // TLS is enabled when both are set
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,

    // Include internal error text in 500 responses
    #[serde(default = "default_true")]
    pub expose_error_details: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        // Parse environment variables into Config struct
        envy::from_env::<Config>()
    }

    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    pub fn auto_approve_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic.
        Duration::from_secs(self.auto_approve_interval_secs.max(1))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn tls_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        match (&self.cert_path, &self.key_path) {
            (Some(cert), Some(key)) => Some((cert, key)),
            _ => None,
        }
    }
}
