//! spacetraveling: statically generated blog pages from a headless CMS
//!
//! Posts live in a remote content repository. This crate pages through them,
//! turns raw documents into list summaries and full posts (with reading time
//! and previous/next navigation), and emits page data that is regenerated
//! once its revalidation interval has passed.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod pagination;
pub mod server;
pub mod source;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use source::{ContentSource, MemorySource, PrismicClient};

/// The site being built: configuration plus resolved directories
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
}

impl Site {
    /// Create a site from a base directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self { config, public_dir })
    }

    /// Create the content source: a fixture file when given, else the remote repository
    pub fn source(&self, fixture: Option<&Path>) -> Result<Arc<dyn ContentSource>> {
        match fixture {
            Some(path) => {
                tracing::info!("Reading content from fixture {:?}", path);
                Ok(Arc::new(MemorySource::load(path)?))
            }
            None => {
                tracing::info!("Reading content from {}", self.config.api_endpoint);
                Ok(Arc::new(PrismicClient::new(
                    &self.config.api_endpoint,
                    self.config.access_token.clone(),
                    self.config.request_timeout(),
                )?))
            }
        }
    }

    /// Create a page builder on top of a content source
    pub fn builder(&self, source: Arc<dyn ContentSource>) -> Result<generator::PageBuilder> {
        generator::PageBuilder::new(source, &self.config)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
