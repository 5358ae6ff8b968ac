use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::clock::{self, TimeSpecError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Backend
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub location_id: String,

    // Reporting
    pub tz: String,

    // Runtime
    pub watch: bool,
    pub refresh_secs: u64,
    pub http_timeout_ms: u64,
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().map(|s| s.trim().to_lowercase()) {
        None => default,
        Some(v) if v.is_empty() => default,
        Some(v) if v == "1" || v == "true" || v == "yes" || v == "y" || v == "on" => true,
        Some(v) if v == "0" || v == "false" || v == "no" || v == "n" || v == "off" => false,
        Some(_) => default,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|x| x.parse().ok())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Backend
        let api_base_url = std::env::var("KITCHEN_API_URL")
            .unwrap_or_else(|_| "http://localhost:4000/api".to_string());
        let api_token = std::env::var("KITCHEN_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        let location_id = std::env::var("KITCHEN_LOCATION_ID")
            .map_err(|_| anyhow!("KITCHEN_LOCATION_ID is required"))?;
        if location_id.trim().is_empty() {
            return Err(anyhow!("KITCHEN_LOCATION_ID cannot be empty"));
        }

        // Reporting
        let tz = std::env::var("KITCHEN_TZ").unwrap_or_else(|_| "America/New_York".to_string());
        // Validated here so a typo fails boot, not the first snapshot.
        clock::parse_zone(&tz)?;

        // Runtime
        let watch = env_bool("KITCHEN_WATCH", false);
        let refresh_secs = env_parse::<u64>("KITCHEN_REFRESH_SECS").unwrap_or(300);
        if watch && refresh_secs == 0 {
            return Err(anyhow!("KITCHEN_REFRESH_SECS must be positive in watch mode"));
        }
        let http_timeout_ms = env_parse::<u64>("KITCHEN_HTTP_TIMEOUT_MS").unwrap_or(10_000);

        Ok(Self {
            api_base_url,
            api_token,
            location_id,
            tz,
            watch,
            refresh_secs,
            http_timeout_ms,
        })
    }

    /// The zone snapshots are reported in. `from_env` already validated it,
    /// but hand-built configs go through the same check.
    pub fn zone(&self) -> Result<Tz, TimeSpecError> {
        clock::parse_zone(&self.tz)
    }
}
