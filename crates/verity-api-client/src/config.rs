//! Configuration module
//!
//! Where the analysis service lives and how patient the client is with it. Values come
//! from the environment (and a `.env` file, if present) with defaults that match a local
//! development backend.

use serde::Serialize;
use std::env;
use std::time::Duration;

// Common constants
const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_PREDICT_PATH: &str = "/api/predict";
const TIMEOUT_SECS: u64 = 120;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const CHUNK_SIZE_KB: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClientConfig {
    /// Origin of the analysis service, without trailing slash
    pub base_url: String,
    /// Path of the prediction endpoint, starting with `/`
    pub predict_path: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Granularity of upload progress reports
    pub chunk_size_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            predict_path: DEFAULT_PREDICT_PATH.to_string(),
            timeout_secs: TIMEOUT_SECS,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            chunk_size_bytes: CHUNK_SIZE_KB * 1024,
        }
    }
}

impl ClientConfig {
    /// Load from VERITY_API_URL (or API_URL), VERITY_PREDICT_PATH, VERITY_TIMEOUT_SECS,
    /// VERITY_CONNECT_TIMEOUT_SECS and VERITY_CHUNK_SIZE_KB.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, anyhow::Error> {
        let base_url = lookup("VERITY_API_URL")
            .or_else(|| lookup("API_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let predict_path =
            lookup("VERITY_PREDICT_PATH").unwrap_or_else(|| DEFAULT_PREDICT_PATH.to_string());

        let timeout_secs = lookup("VERITY_TIMEOUT_SECS")
            .unwrap_or_else(|| TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("VERITY_TIMEOUT_SECS must be a valid number"))?;

        let connect_timeout_secs = lookup("VERITY_CONNECT_TIMEOUT_SECS")
            .unwrap_or_else(|| CONNECT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("VERITY_CONNECT_TIMEOUT_SECS must be a valid number"))?;

        let chunk_size_kb = lookup("VERITY_CHUNK_SIZE_KB")
            .unwrap_or_else(|| CHUNK_SIZE_KB.to_string())
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("VERITY_CHUNK_SIZE_KB must be a valid number"))?;
        let chunk_size_bytes = chunk_size_kb
            .checked_mul(1024)
            .ok_or_else(|| anyhow::anyhow!("VERITY_CHUNK_SIZE_KB is too large"))?;

        let config = Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            predict_path: predict_path.trim().to_string(),
            timeout_secs,
            connect_timeout_secs,
            chunk_size_bytes,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "VERITY_API_URL must start with http:// or https://"
            ));
        }

        if !self.predict_path.starts_with('/') {
            return Err(anyhow::anyhow!("VERITY_PREDICT_PATH must start with '/'"));
        }

        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Timeouts must be greater than zero"));
        }

        if self.chunk_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "VERITY_CHUNK_SIZE_KB must be greater than zero"
            ));
        }

        Ok(())
    }

    /// Override the base URL, e.g. from a command-line flag.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_predict_path(mut self, predict_path: &str) -> Self {
        self.predict_path = predict_path.trim().to_string();
        self
    }

    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url, self.predict_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
