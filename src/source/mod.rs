//! Content source contract
//!
//! The pipeline only ever reads from the content service through the
//! [`ContentSource`] trait. The remote client and the in-memory fixture
//! source both implement it, and page builders receive it as an explicit
//! `Arc<dyn ContentSource>` dependency.

mod memory;
mod prismic;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use memory::MemorySource;
pub use prismic::PrismicClient;

use crate::content::ContentRecord;
use crate::error::Result;

/// Field used for chronological ordering
pub const PUBLICATION_DATE: &str = "document.first_publication_date";

/// Sort direction of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// A single ordering clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub field: String,
    pub direction: Direction,
}

impl Ordering {
    pub fn by_publication_date(direction: Direction) -> Self {
        Self {
            field: PUBLICATION_DATE.to_string(),
            direction,
        }
    }

    /// Query-string form, e.g. `[document.first_publication_date desc]`
    pub fn to_query(&self) -> String {
        match self.direction {
            Direction::Asc => format!("[{}]", self.field),
            Direction::Desc => format!("[{} desc]", self.field),
        }
    }
}

/// Options accepted by [`ContentSource::query_by_type`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub page_size: usize,
    /// Only return documents positioned after this document id
    pub after: Option<String>,
    pub orderings: Option<Ordering>,
}

impl QueryOptions {
    pub fn page_size(page_size: usize) -> Self {
        Self {
            page_size,
            after: None,
            orderings: None,
        }
    }

    pub fn after(mut self, id: &str) -> Self {
        self.after = Some(id.to_string());
        self
    }

    pub fn ordered(mut self, ordering: Ordering) -> Self {
        self.orderings = Some(ordering);
        self
    }
}

/// One page of query results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiPage {
    pub page: u32,
    pub results_per_page: usize,
    pub total_results_size: usize,
    /// Cursor URL of the following page; `None` on the last page
    pub next_page: Option<String>,
    pub results: Vec<ContentRecord>,
}

/// Read-only access to typed documents
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Query documents of one type
    async fn query_by_type(&self, doc_type: &str, options: &QueryOptions) -> Result<ApiPage>;

    /// Look up a single document by its uid; `Ok(None)` when absent
    async fn query_by_uid(&self, doc_type: &str, uid: &str) -> Result<Option<ContentRecord>>;

    /// Follow a `next_page` cursor returned by an earlier query
    async fn fetch_page(&self, url: &str) -> Result<ApiPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_query() {
        assert_eq!(
            Ordering::by_publication_date(Direction::Asc).to_query(),
            "[document.first_publication_date]"
        );
        assert_eq!(
            Ordering::by_publication_date(Direction::Desc).to_query(),
            "[document.first_publication_date desc]"
        );
    }

    #[test]
    fn test_parse_api_page() {
        let json = r#"{
            "page": 1,
            "results_per_page": 4,
            "results_size": 1,
            "total_results_size": 9,
            "total_pages": 9,
            "next_page": "https://repo.cdn.prismic.io/api/v2/documents/search?page=2",
            "prev_page": null,
            "results": [{"id": "a", "uid": "first", "type": "publication"}]
        }"#;
        let page: ApiPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.total_results_size, 9);
        assert!(page.next_page.unwrap().ends_with("page=2"));
        assert_eq!(page.results[0].uid.as_deref(), Some("first"));
    }
}
