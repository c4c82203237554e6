use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::clock::DEFAULT_TIMEZONE;
use crate::schedule::WEEKDAY_NAMES;

/// Where the weekday documents live by default
pub const DEFAULT_SCHEDULE_BASE_URL: &str =
    "https://raw.githubusercontent.com/WJTB-Radio/ShowData/master";

#[derive(Debug, Clone)]
pub struct Config {
    // Base URL; each weekday is fetched from "{base}/{Weekday}.json"
    pub schedule_base_url: String,

    // Station time zone used for "now" and for show times
    pub timezone: Tz,

    // Per-request timeout for schedule fetches
    pub fetch_timeout_secs: u64,

    // Re-fetch all five days at this period (0 = fetch once at startup)
    pub refresh_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env if present, ignore if missing
        Self::from_getter(|key| env::var(key).ok())
    }

    /// Parse config from a custom getter function (for testing)
    pub fn from_getter<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timezone = match get("SCHEDULE_TIMEZONE").filter(|s| !s.trim().is_empty()) {
            Some(name) => name
                .trim()
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("{}", e))
                .with_context(|| format!("SCHEDULE_TIMEZONE '{}' is not a known time zone", name))?,
            None => DEFAULT_TIMEZONE,
        };

        Ok(Config {
            schedule_base_url: get("SCHEDULE_BASE_URL")
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_SCHEDULE_BASE_URL.to_string()),

            timezone,

            fetch_timeout_secs: get("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("FETCH_TIMEOUT_SECS must be a whole number of seconds")?,

            refresh_interval_secs: get("REFRESH_INTERVAL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        })
    }

    /// Create config from a HashMap (convenience for testing)
    pub fn from_map(map: &HashMap<&str, &str>) -> Result<Self> {
        Self::from_getter(|key| map.get(key).map(|v| v.to_string()))
    }

    /// URL of one weekday's document, 0 = Monday .. 4 = Friday
    pub fn day_url(&self, weekday: usize) -> Option<String> {
        WEEKDAY_NAMES
            .get(weekday)
            .map(|day| format!("{}/{}.json", self.schedule_base_url, day))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// None when refreshing is disabled
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    /// Validate configuration values at startup.
    /// Returns Ok(()) if all validations pass, or Err with details of what failed.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if !(self.schedule_base_url.starts_with("https://")
            || self.schedule_base_url.starts_with("http://"))
        {
            errors.push(format!(
                "SCHEDULE_BASE_URL '{}' must start with http:// or https://.",
                self.schedule_base_url
            ));
        }

        if self.fetch_timeout_secs == 0 {
            errors.push("FETCH_TIMEOUT_SECS must be greater than 0.".to_string());
        } else if self.fetch_timeout_secs > 120 {
            errors.push(format!(
                "FETCH_TIMEOUT_SECS={} seems too long (max: 120).",
                self.fetch_timeout_secs
            ));
        }

        // Schedules change rarely; don't hammer the server
        if self.refresh_interval_secs > 0 && self.refresh_interval_secs < 60 {
            errors.push(format!(
                "REFRESH_INTERVAL_SECS={} is too short (0 to disable, otherwise at least 60).",
                self.refresh_interval_secs
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )
        }
    }
}
