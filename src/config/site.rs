//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::generator::REVALIDATE_SECONDS;
use crate::helpers::DateFormatter;

/// Environment variable that overrides `access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,

    // Content repository
    pub api_endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    pub request_timeout_secs: u64,

    // Pagination
    pub page_size: usize,
    pub paths_page_size: usize,

    // Regeneration interval of every static page, in seconds
    pub revalidate: u64,

    // Date / Time format
    pub timezone: String,
    pub date_format: String,

    // Directory
    pub public_dir: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),

            api_endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "publication".to_string(),
            request_timeout_secs: 30,

            page_size: 4,
            paths_page_size: 1,

            revalidate: REVALIDATE_SECONDS,

            timezone: "America/Sao_Paulo".to_string(),
            date_format: "DD MMM YYYY".to_string(),

            public_dir: "public".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Apply environment overrides (currently only the access token)
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.is_empty() {
                tracing::debug!("Using access token from {}", ACCESS_TOKEN_ENV);
                self.access_token = Some(token);
            }
        }
    }

    /// Build the date formatter shared by every page of this session
    pub fn date_formatter(&self) -> Result<DateFormatter> {
        let timezone: chrono_tz::Tz = self
            .timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("Unknown timezone '{}': {}", self.timezone, e))?;
        Ok(DateFormatter::new(timezone, &self.date_format))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
