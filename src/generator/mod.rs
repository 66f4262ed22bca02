//! Generator module - builds the input data of every static page
//!
//! [`PageBuilder`] is the only place that talks to the content source during
//! a build. It composes the transforms, the read time estimate, navigation
//! and pagination into page props plus a revalidation interval.

pub mod navigation;

use anyhow::Result as AnyResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::content::{read_time, ContentRecord, PostDetail};
use crate::error::{Error, Result};
use crate::helpers::DateFormatter;
use crate::pagination::{LoadOutcome, PaginationState, Paginator};
use crate::source::{ContentSource, QueryOptions};

pub use navigation::NavigationLinks;

/// Regenerate every page once a day
pub const REVALIDATE_SECONDS: u64 = 60 * 60 * 24;

/// Page input data plus how long it stays fresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPage<T> {
    pub props: T,
    /// Seconds until the page should be regenerated
    pub revalidate: u64,
}

/// Outcome of building a page that may not exist
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome<T> {
    Found(StaticPage<T>),
    NotFound,
}

/// Input data of a post page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailProps {
    pub post: PostDetail,
    pub navigation: NavigationLinks,
    pub preview: bool,
    /// Estimated reading time in minutes
    pub read_time: usize,
    /// Sanitized HTML of each content block body, in order
    pub content_html: Vec<String>,
}

/// Paths to generate ahead of time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPaths {
    pub paths: Vec<String>,
    /// Paths outside `paths` are generated on first request
    pub fallback: bool,
}

/// Builds list pages, post pages and the static path set
pub struct PageBuilder {
    source: Arc<dyn ContentSource>,
    doc_type: String,
    page_size: usize,
    paths_page_size: usize,
    revalidate: u64,
    dates: DateFormatter,
}

impl PageBuilder {
    /// Create a builder around an already constructed content source
    pub fn new(source: Arc<dyn ContentSource>, config: &SiteConfig) -> AnyResult<Self> {
        Ok(Self {
            source,
            doc_type: config.document_type.clone(),
            page_size: config.page_size,
            paths_page_size: config.paths_page_size,
            revalidate: config.revalidate,
            dates: config.date_formatter()?,
        })
    }

    /// A fresh paginator over all posts, nothing fetched yet
    pub fn paginator(&self) -> Paginator {
        Paginator::new(
            self.source.clone(),
            &self.doc_type,
            self.page_size,
            self.dates.clone(),
        )
    }

    /// Continue paginating from a list page's props
    pub fn resume(&self, state: PaginationState) -> Paginator {
        Paginator::resume(
            self.source.clone(),
            &self.doc_type,
            self.page_size,
            self.dates.clone(),
            state,
        )
    }

    /// Build the post list page: the first page of summaries and its cursor
    pub async fn list_page(&self) -> Result<StaticPage<PaginationState>> {
        let paginator = self.paginator();
        paginator.load_more().await?;
        let state = paginator.into_state();

        tracing::info!(
            posts = state.results.len(),
            has_more = state.next_page.is_some(),
            "Built list page"
        );

        Ok(self.page(state))
    }

    /// Build the page of the post `uid`
    pub async fn detail_page(&self, uid: &str, preview: bool) -> Result<PageOutcome<DetailProps>> {
        let record = match self.fetch_post(uid).await {
            Ok(record) => record,
            Err(Error::NotFound { .. }) => {
                tracing::debug!(uid, "Post not found");
                return Ok(PageOutcome::NotFound);
            }
            Err(e) => return Err(e),
        };

        let post = PostDetail::from_record(&record, &self.dates)?;
        let read_time = read_time::estimate(&post.data.content);
        let navigation =
            navigation::resolve(self.source.as_ref(), &self.doc_type, &record, &self.dates)
                .await?;
        let content_html = post.content_html();

        tracing::info!(uid, read_time, "Built post page");

        Ok(PageOutcome::Found(self.page(DetailProps {
            post,
            navigation,
            preview,
            read_time,
            content_html,
        })))
    }

    /// The minimal set of post paths to pre-generate
    pub async fn static_paths(&self) -> Result<StaticPaths> {
        let page = self
            .source
            .query_by_type(&self.doc_type, &QueryOptions::page_size(self.paths_page_size))
            .await?;

        let paths = page
            .results
            .into_iter()
            .filter_map(|record| {
                if record.uid.is_none() {
                    tracing::warn!(id = %record.id, "Skipping document without uid");
                }
                record.uid
            })
            .collect();

        Ok(StaticPaths {
            paths,
            fallback: true,
        })
    }

    /// Every post uid, walking the paginated list to its end
    pub async fn all_paths(&self) -> Result<Vec<String>> {
        let paginator = self.paginator();
        while let LoadOutcome::Loaded { .. } = paginator.load_more().await? {}

        Ok(paginator
            .into_state()
            .results
            .into_iter()
            .map(|summary| summary.uid)
            .collect())
    }

    async fn fetch_post(&self, uid: &str) -> Result<ContentRecord> {
        self.source
            .query_by_uid(&self.doc_type, uid)
            .await?
            .ok_or_else(|| Error::NotFound {
                doc_type: self.doc_type.clone(),
                uid: uid.to_string(),
            })
    }

    fn page<T>(&self, props: T) -> StaticPage<T> {
        StaticPage {
            props,
            revalidate: self.revalidate,
        }
    }
}
