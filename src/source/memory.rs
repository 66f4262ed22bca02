//! In-memory content source
//!
//! Serves documents from a fixture with the same query semantics as the
//! remote repository: type filter, ordering, `after` cursor and paging.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;

use super::{ApiPage, ContentSource, Direction, QueryOptions, PUBLICATION_DATE};
use crate::content::ContentRecord;
use crate::error::{Error, Result};
use crate::helpers::parse_publication_date;

const CURSOR_SCHEME: &str = "memory://";

/// Fixture files hold either a bare list or a search response
#[derive(Deserialize)]
#[serde(untagged)]
enum Fixture {
    Records(Vec<ContentRecord>),
    Page { results: Vec<ContentRecord> },
}

/// A page that a previously issued `next_page` cursor points to
#[derive(Debug, Clone, PartialEq)]
struct PageCursor {
    doc_type: String,
    options: QueryOptions,
    page: u32,
}

/// Content source backed by a list of documents
#[derive(Debug, Default)]
pub struct MemorySource {
    records: Vec<ContentRecord>,
    cursors: Mutex<Vec<PageCursor>>,
    requests: AtomicUsize,
}

impl MemorySource {
    pub fn new(records: Vec<ContentRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    /// Load documents from a JSON fixture file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let records = match serde_json::from_str::<Fixture>(&content)? {
            Fixture::Records(records) => records,
            Fixture::Page { results } => results,
        };
        tracing::debug!(
            "Loaded {} fixture documents from {:?}",
            records.len(),
            path.as_ref()
        );
        Ok(Self::new(records))
    }

    /// Number of queries answered so far
    pub fn request_count(&self) -> usize {
        self.requests.load(AtomicOrdering::SeqCst)
    }

    fn page(&self, doc_type: &str, options: &QueryOptions, page: u32) -> Result<ApiPage> {
        let mut docs: Vec<&ContentRecord> = self
            .records
            .iter()
            .filter(|r| r.doc_type == doc_type)
            .collect();

        if let Some(ordering) = &options.orderings {
            if ordering.field == PUBLICATION_DATE {
                docs.sort_by(|a, b| {
                    let a = a.first_publication_date.as_deref().and_then(parse_publication_date);
                    let b = b.first_publication_date.as_deref().and_then(parse_publication_date);
                    match ordering.direction {
                        Direction::Asc => a.cmp(&b),
                        Direction::Desc => b.cmp(&a),
                    }
                });
            } else {
                tracing::debug!(field = %ordering.field, "Ignoring unsupported ordering");
            }
        }

        if let Some(after) = &options.after {
            docs = match docs.iter().position(|r| &r.id == after) {
                Some(pos) => docs.split_off(pos + 1),
                None => Vec::new(),
            };
        }

        let page_size = options.page_size.max(1);
        let total = docs.len();
        let start = (page.max(1) as usize - 1) * page_size;
        let results: Vec<ContentRecord> = docs
            .into_iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();

        let next_page = if start + page_size < total {
            let mut cursors = self
                .cursors
                .lock()
                .map_err(|_| Error::TransientFetch("cursor table poisoned".to_string()))?;
            let cursor = PageCursor {
                doc_type: doc_type.to_string(),
                options: options.clone(),
                page: page + 1,
            };
            // Same query, same cursor: the table is bounded by the distinct queries
            let index = match cursors.iter().position(|c| *c == cursor) {
                Some(index) => index,
                None => {
                    cursors.push(cursor);
                    cursors.len() - 1
                }
            };
            Some(format!("{}{}/{}", CURSOR_SCHEME, doc_type, index))
        } else {
            None
        };

        Ok(ApiPage {
            page,
            results_per_page: page_size,
            total_results_size: total,
            next_page,
            results,
        })
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn query_by_type(&self, doc_type: &str, options: &QueryOptions) -> Result<ApiPage> {
        self.requests.fetch_add(1, AtomicOrdering::SeqCst);
        self.page(doc_type, options, 1)
    }

    async fn query_by_uid(&self, doc_type: &str, uid: &str) -> Result<Option<ContentRecord>> {
        self.requests.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(self
            .records
            .iter()
            .find(|r| r.doc_type == doc_type && r.uid.as_deref() == Some(uid))
            .cloned())
    }

    async fn fetch_page(&self, url: &str) -> Result<ApiPage> {
        self.requests.fetch_add(1, AtomicOrdering::SeqCst);

        let unknown = || Error::TransientFetch(format!("Unknown page cursor: {}", url));
        let index: usize = url
            .strip_prefix(CURSOR_SCHEME)
            .and_then(|rest| rest.rsplit_once('/'))
            .and_then(|(_, index)| index.parse().ok())
            .ok_or_else(unknown)?;

        let cursor = self
            .cursors
            .lock()
            .map_err(|_| Error::TransientFetch("cursor table poisoned".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(unknown)?;

        self.page(&cursor.doc_type, &cursor.options, cursor.page)
    }
}
