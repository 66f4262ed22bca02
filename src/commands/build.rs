//! Build the static page data

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::generator::{PageBuilder, PageOutcome, StaticPage};
use crate::helpers::encode_segment;
use crate::Site;

/// Options of a build run
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Build every post instead of only the pre-generated paths
    pub all: bool,
    /// Mark the generated post pages as previews
    pub preview: bool,
}

/// What a build run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub posts: usize,
    /// Paths that resolved to no post
    pub skipped: Vec<String>,
}

/// Location of the list page data
pub fn index_path(public_dir: &Path) -> PathBuf {
    public_dir.join("index.json")
}

/// Location of a post page's data
pub fn post_path(public_dir: &Path, uid: &str) -> PathBuf {
    public_dir
        .join("post")
        .join(format!("{}.json", encode_segment(uid)))
}

/// Serialize a page next to its siblings, creating directories as needed
pub fn write_page<T: Serialize>(path: &Path, page: &StaticPage<T>) -> Result<()> {
    write_atomic(path, serde_json::to_string_pretty(page)?.as_bytes())
}

/// Replace `path` in one step: readers see either the old or the new file
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("{:?} has no parent directory", path))?;
    fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(contents)?;
    file.persist(path)?;

    tracing::debug!("Wrote {:?}", path);
    Ok(())
}

/// Generate the list page and the post pages into the public directory
pub async fn run(site: &Site, builder: &PageBuilder, options: &BuildOptions) -> Result<BuildReport> {
    let start = std::time::Instant::now();
    tracing::info!("Building {} into {:?}", site.config.title, site.public_dir);
    fs::create_dir_all(&site.public_dir)?;

    let list = builder.list_page().await?;
    write_page(&index_path(&site.public_dir), &list)?;

    let paths = if options.all {
        builder.all_paths().await?
    } else {
        builder.static_paths().await?.paths
    };
    tracing::info!("Generating {} post pages", paths.len());

    let mut report = BuildReport::default();
    for uid in paths {
        match builder.detail_page(&uid, options.preview).await? {
            PageOutcome::Found(page) => {
                write_page(&post_path(&site.public_dir, &uid), &page)?;
                report.posts += 1;
            }
            PageOutcome::NotFound => {
                tracing::warn!("Skipping {}: post not found", uid);
                report.skipped.push(uid);
            }
        }
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} post pages in {:.2}s",
        report.posts,
        duration.as_secs_f64()
    );

    Ok(report)
}
