//! Previous/next post resolution

use serde::{Deserialize, Serialize};

use crate::content::{ContentRecord, PostSummary};
use crate::error::Result;
use crate::helpers::DateFormatter;
use crate::source::{ApiPage, ContentSource, Direction, Ordering, QueryOptions};

/// Chronological neighbours of a post; each side holds zero or one post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationLinks {
    /// The closest older post
    pub prev_post: Vec<PostSummary>,
    /// The closest newer post
    pub next_post: Vec<PostSummary>,
}

/// Look up the posts published just before and just after `reference`
///
/// Both lookups start after the reference document id: walking the
/// descending date order yields the older neighbour, the ascending order
/// the newer one. An empty side means `reference` sits at that end of the
/// timeline.
pub async fn resolve(
    source: &dyn ContentSource,
    doc_type: &str,
    reference: &ContentRecord,
    dates: &DateFormatter,
) -> Result<NavigationLinks> {
    let older = QueryOptions::page_size(1)
        .after(&reference.id)
        .ordered(Ordering::by_publication_date(Direction::Desc));
    let newer = QueryOptions::page_size(1)
        .after(&reference.id)
        .ordered(Ordering::by_publication_date(Direction::Asc));

    let (prev, next) = tokio::try_join!(
        source.query_by_type(doc_type, &older),
        source.query_by_type(doc_type, &newer)
    )?;

    Ok(NavigationLinks {
        prev_post: adjacent(prev, reference, dates)?,
        next_post: adjacent(next, reference, dates)?,
    })
}

fn adjacent(
    page: ApiPage,
    reference: &ContentRecord,
    dates: &DateFormatter,
) -> Result<Vec<PostSummary>> {
    page.results
        .iter()
        .filter(|record| record.id != reference.id)
        .take(1)
        .map(|record| PostSummary::from_record(record, dates))
        .collect()
}
