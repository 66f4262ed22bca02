//! Shared fixtures for unit tests

use crate::content::{Banner, ContentRecord, RecordBlock, RecordData, RichTextBlock};

/// A complete publication document
pub fn record(id: &str, uid: &str, date: &str) -> ContentRecord {
    ContentRecord {
        id: id.to_string(),
        uid: Some(uid.to_string()),
        doc_type: "publication".to_string(),
        first_publication_date: Some(date.to_string()),
        last_publication_date: Some(date.to_string()),
        data: RecordData {
            title: vec![RichTextBlock::new("heading1", &format!("Post {}", uid))],
            subtitle: format!("About {}", uid),
            author: "Joseph Oliveira".to_string(),
            banner: Banner {
                url: Some(format!("https://images.example.com/{}.png", uid)),
                alt: None,
            },
            content: vec![
                RecordBlock {
                    heading: "Proin et varius".to_string(),
                    body: vec![RichTextBlock::paragraph("Lorem ipsum dolor sit amet")],
                },
                RecordBlock {
                    heading: "Cras laoreet".to_string(),
                    body: vec![
                        RichTextBlock::paragraph("Nullam dolor"),
                        RichTextBlock::new("list-item", "item"),
                    ],
                },
            ],
        },
    }
}

/// `n` posts published one day apart: `id-1`/`post-1` is the oldest
pub fn timeline(n: usize) -> Vec<ContentRecord> {
    (1..=n)
        .map(|i| {
            record(
                &format!("id-{}", i),
                &format!("post-{}", i),
                &format!("2021-03-{:02}T12:00:00+0000", i),
            )
        })
        .collect()
}
