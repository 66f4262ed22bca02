//! Display-ready post models derived from raw documents

use serde::{Deserialize, Serialize};

use super::record::{ContentRecord, RichText};
use super::rich_text::{to_markup, to_plain_text};
use crate::error::{Error, Result};
use crate::helpers::DateFormatter;

/// A post as shown in the list view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: String,

    /// Already formatted (e.g. `17 mar 2021`)
    pub first_publication_date: String,

    pub data: SummaryData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A full post as shown on its own page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: String,

    /// Already formatted (e.g. `17 mar 2021`)
    pub first_publication_date: String,

    pub data: DetailData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailData {
    pub title: String,
    pub subtitle: String,
    pub banner: BannerData,
    pub author: String,
    /// Never empty; blocks keep the source order
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BannerData {
    pub url: Option<String>,
}

/// A `{heading, body}` section of a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: RichText,
}

impl ContentBlock {
    /// Render the body as sanitized HTML
    pub fn body_html(&self) -> String {
        to_markup(&self.body)
    }
}

fn require_uid(record: &ContentRecord) -> Result<String> {
    record
        .uid
        .clone()
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| Error::InvalidRecord {
            id: record.id.clone(),
            reason: "document has no uid".to_string(),
        })
}

impl PostSummary {
    /// Build a summary; fails without producing output on a missing uid or date
    pub fn from_record(record: &ContentRecord, dates: &DateFormatter) -> Result<Self> {
        let uid = require_uid(record)?;
        let first_publication_date =
            dates.format(&record.id, record.first_publication_date.as_deref())?;

        Ok(Self {
            uid,
            first_publication_date,
            data: SummaryData {
                title: to_plain_text(&record.data.title),
                subtitle: record.data.subtitle.clone(),
                author: record.data.author.clone(),
            },
        })
    }
}

impl PostDetail {
    /// Build a full post; bodies are deep copies of the source rich text
    pub fn from_record(record: &ContentRecord, dates: &DateFormatter) -> Result<Self> {
        let uid = require_uid(record)?;
        if record.data.content.is_empty() {
            return Err(Error::InvalidRecord {
                id: record.id.clone(),
                reason: "document has no content blocks".to_string(),
            });
        }
        let first_publication_date =
            dates.format(&record.id, record.first_publication_date.as_deref())?;

        let content = record
            .data
            .content
            .iter()
            .map(|block| ContentBlock {
                heading: block.heading.clone(),
                body: block.body.clone(),
            })
            .collect();

        Ok(Self {
            uid,
            first_publication_date,
            data: DetailData {
                title: to_plain_text(&record.data.title),
                subtitle: record.data.subtitle.clone(),
                banner: BannerData {
                    url: record.data.banner.url.clone(),
                },
                author: record.data.author.clone(),
                content,
            },
        })
    }

    /// Sanitized HTML for every content block, in order
    pub fn content_html(&self) -> Vec<String> {
        self.data.content.iter().map(ContentBlock::body_html).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;

    #[test]
    fn test_summary_from_record() {
        let record = record("X1", "hooks", "2021-03-17T12:00:00+0000");
        let summary = PostSummary::from_record(&record, &DateFormatter::default()).unwrap();

        assert_eq!(summary.uid, "hooks");
        assert_eq!(summary.first_publication_date, "17 mar 2021");
        assert_eq!(summary.data.title, "Post hooks");
        assert_eq!(summary.data.subtitle, "About hooks");
        assert_eq!(summary.data.author, "Joseph Oliveira");
    }

    #[test]
    fn test_summary_requires_date() {
        let mut record = record("X1", "hooks", "2021-03-17T12:00:00+0000");
        record.first_publication_date = None;
        let err = PostSummary::from_record(&record, &DateFormatter::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidDate { id, .. } if id == "X1"));
    }

    #[test]
    fn test_summary_requires_uid() {
        let mut record = record("X1", "hooks", "2021-03-17T12:00:00+0000");
        record.uid = None;
        assert!(matches!(
            PostSummary::from_record(&record, &DateFormatter::default()),
            Err(Error::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_summary_transform_is_pure() {
        let source = record("X1", "hooks", "2021-03-17T12:00:00+0000");
        let dates = DateFormatter::default();
        let mut first = PostSummary::from_record(&source, &dates).unwrap();
        let second = PostSummary::from_record(&source, &dates).unwrap();
        assert_eq!(first, second);

        first.data.title.push_str(" (edited)");
        assert_ne!(first, second);
        assert_eq!(second.data.title, "Post hooks");
        assert_eq!(source.data.title[0].text, "Post hooks");
    }

    #[test]
    fn test_detail_from_record() {
        let source = record("X1", "hooks", "2021-03-17T12:00:00+0000");
        let detail = PostDetail::from_record(&source, &DateFormatter::default()).unwrap();

        assert_eq!(detail.uid, "hooks");
        assert_eq!(detail.data.title, "Post hooks");
        assert_eq!(
            detail.data.banner.url.as_deref(),
            Some("https://images.example.com/hooks.png")
        );
        let headings: Vec<_> = detail.data.content.iter().map(|b| b.heading.as_str()).collect();
        assert_eq!(headings, vec!["Proin et varius", "Cras laoreet"]);
        assert_eq!(detail.data.content[1].body.len(), 2);
    }

    #[test]
    fn test_detail_bodies_are_independent_copies() {
        let mut source = record("X1", "hooks", "2021-03-17T12:00:00+0000");
        let detail = PostDetail::from_record(&source, &DateFormatter::default()).unwrap();

        source.data.content[0].body[0].text = "changed".to_string();
        source.data.content.clear();

        assert_eq!(detail.data.content.len(), 2);
        assert_eq!(
            detail.data.content[0].body[0].text,
            "Lorem ipsum dolor sit amet"
        );
    }

    #[test]
    fn test_detail_requires_content() {
        let mut source = record("X1", "hooks", "2021-03-17T12:00:00+0000");
        source.data.content.clear();
        assert!(matches!(
            PostDetail::from_record(&source, &DateFormatter::default()),
            Err(Error::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_content_html() {
        let source = record("X1", "hooks", "2021-03-17T12:00:00+0000");
        let detail = PostDetail::from_record(&source, &DateFormatter::default()).unwrap();
        assert_eq!(
            detail.content_html(),
            vec![
                "<p>Lorem ipsum dolor sit amet</p>".to_string(),
                "<p>Nullam dolor</p><ul><li>item</li></ul>".to_string(),
            ]
        );
    }
}
