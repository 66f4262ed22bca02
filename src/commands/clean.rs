//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Site;

/// Remove every generated page
pub fn run(site: &Site) -> Result<()> {
    if site.public_dir.exists() {
        fs::remove_dir_all(&site.public_dir)?;
        tracing::info!("Deleted: {:?}", site.public_dir);
    }

    Ok(())
}
