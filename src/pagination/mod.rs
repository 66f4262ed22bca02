//! Cursor-based "load more" pagination
//!
//! A [`Paginator`] owns the list of summaries shown so far plus the cursor of
//! the next page. Pages are only ever appended, and at most one fetch may be
//! in flight per paginator: an overlapping [`Paginator::load_more`] is
//! rejected with [`Error::ConcurrentLoadRejected`] rather than queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::content::PostSummary;
use crate::error::{Error, Result};
use crate::helpers::DateFormatter;
use crate::source::{ApiPage, ContentSource, QueryOptions};

/// The list of posts fetched so far and where to continue from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationState {
    /// Summaries in fetch order; never reordered or shrunk
    pub results: Vec<PostSummary>,
    /// Cursor of the next page; `None` once the last page was fetched
    pub next_page: Option<String>,
    /// Number of the most recently fetched page (starts at 1)
    pub page: u32,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            next_page: None,
            page: 1,
        }
    }
}

/// Result of an accepted [`Paginator::load_more`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and this many summaries were appended
    Loaded { appended: usize },
    /// The cursor is exhausted; nothing was requested
    Exhausted,
}

struct Inner {
    state: PaginationState,
    /// Whether the first page has been fetched
    started: bool,
}

/// Marks a fetch as in flight until dropped
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::ConcurrentLoadRejected)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

enum Request {
    First,
    Next(String),
}

/// Walks a paginated result set, appending each page to an in-memory list
pub struct Paginator {
    source: Arc<dyn ContentSource>,
    doc_type: String,
    page_size: usize,
    dates: DateFormatter,
    inner: Mutex<Inner>,
    in_flight: AtomicBool,
}

impl Paginator {
    /// Start from nothing; the first `load_more` fetches the first page
    pub fn new(
        source: Arc<dyn ContentSource>,
        doc_type: &str,
        page_size: usize,
        dates: DateFormatter,
    ) -> Self {
        Self {
            source,
            doc_type: doc_type.to_string(),
            page_size,
            dates,
            inner: Mutex::new(Inner {
                state: PaginationState::default(),
                started: false,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Continue from a state produced earlier (e.g. a list page's props)
    pub fn resume(
        source: Arc<dyn ContentSource>,
        doc_type: &str,
        page_size: usize,
        dates: DateFormatter,
        state: PaginationState,
    ) -> Self {
        let paginator = Self::new(source, doc_type, page_size, dates);
        *paginator.lock() = Inner {
            state,
            started: true,
        };
        paginator
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the next page and append it
    ///
    /// Returns [`LoadOutcome::Exhausted`] without issuing a request once the
    /// cursor is `None`. A call made while another is still in flight fails
    /// with [`Error::ConcurrentLoadRejected`]. On any error the state is left
    /// untouched.
    pub async fn load_more(&self) -> Result<LoadOutcome> {
        let _flight = InFlight::acquire(&self.in_flight)?;

        let request = {
            let inner = self.lock();
            if !inner.started {
                Request::First
            } else {
                match &inner.state.next_page {
                    Some(url) => Request::Next(url.clone()),
                    None => return Ok(LoadOutcome::Exhausted),
                }
            }
        };

        let page: ApiPage = match request {
            Request::First => {
                let options = QueryOptions::page_size(self.page_size);
                self.source.query_by_type(&self.doc_type, &options).await?
            }
            Request::Next(url) => self.source.fetch_page(&url).await?,
        };

        let summaries = page
            .results
            .iter()
            .map(|record| PostSummary::from_record(record, &self.dates))
            .collect::<Result<Vec<_>>>()?;
        let appended = summaries.len();

        let mut inner = self.lock();
        inner.started = true;
        inner.state.results.extend(summaries);
        inner.state.next_page = page.next_page;
        inner.state.page = page.page.max(1);

        tracing::debug!(
            page = inner.state.page,
            appended,
            total = inner.state.results.len(),
            has_more = inner.state.next_page.is_some(),
            "Loaded page"
        );

        Ok(LoadOutcome::Loaded { appended })
    }

    /// Whether another `load_more` would issue a request
    pub fn has_more(&self) -> bool {
        let inner = self.lock();
        !inner.started || inner.state.next_page.is_some()
    }

    /// Whether a fetch is currently in flight
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Snapshot of the current state
    pub fn state(&self) -> PaginationState {
        self.lock().state.clone()
    }

    pub fn into_state(self) -> PaginationState {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }
}
