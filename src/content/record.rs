//! Raw document shapes returned by the content source

use serde::{Deserialize, Serialize};

/// A structured rich-text value: an ordered list of blocks
pub type RichText = Vec<RichTextBlock>;

/// One document as stored in the content service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Service-assigned document id (used as the adjacency cursor)
    pub id: String,

    /// Human-friendly unique identifier (the post slug)
    #[serde(default)]
    pub uid: Option<String>,

    /// Custom type name
    #[serde(rename = "type", default)]
    pub doc_type: String,

    #[serde(default)]
    pub first_publication_date: Option<String>,

    #[serde(default)]
    pub last_publication_date: Option<String>,

    #[serde(default)]
    pub data: RecordData,
}

/// Custom fields of a publication document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordData {
    pub title: RichText,
    pub subtitle: String,
    pub author: String,
    pub banner: Banner,
    pub content: Vec<RecordBlock>,
}

/// Banner image field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Banner {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// One `{heading, body}` group of the content slice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordBlock {
    pub heading: String,
    pub body: RichText,
}

/// A rich-text block (paragraph, heading, list item, image, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub block_type: String,

    pub text: String,

    pub spans: Vec<Span>,

    /// Image source for `image` blocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Alternative text for `image` blocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    /// oEmbed payload for `embed` blocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

impl RichTextBlock {
    /// Build a plain block with no spans
    pub fn new(block_type: &str, text: &str) -> Self {
        Self {
            block_type: block_type.to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }

    /// Shorthand for a plain paragraph
    pub fn paragraph(text: &str) -> Self {
        Self::new("paragraph", text)
    }
}

/// An inline formatting span, offsets counted in characters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Span {
    pub start: usize,
    pub end: usize,

    #[serde(rename = "type")]
    pub span_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

/// Payload of `hyperlink` and `label` spans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanData {
    pub link_type: Option<String>,
    pub url: Option<String>,
    pub uid: Option<String>,
    pub target: Option<String>,
    pub label: Option<String>,
}

/// oEmbed data attached to an `embed` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Embed {
    pub embed_url: String,
    pub html: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_document() {
        let json = r#"{
            "id": "YFtkQhIAACMA6P0v",
            "uid": "como-utilizar-hooks",
            "type": "publication",
            "href": "https://example.cdn.prismic.io/api/v2/documents/search",
            "tags": [],
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "last_publication_date": "2021-03-25T19:25:28+0000",
            "lang": "pt-br",
            "data": {
                "title": [{"type": "heading1", "text": "Como utilizar Hooks", "spans": []}],
                "subtitle": "Pensando em sincronização em vez de ciclos de vida",
                "author": "Joseph Oliveira",
                "banner": {"url": "https://images.prismic.io/banner.png", "dimensions": {"width": 1, "height": 1}},
                "content": [
                    {
                        "heading": "Proin et varius",
                        "body": [{"type": "paragraph", "text": "Nullam dolor sapien", "spans": [
                            {"start": 0, "end": 6, "type": "strong"}
                        ]}]
                    }
                ]
            }
        }"#;

        let record: ContentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.uid.as_deref(), Some("como-utilizar-hooks"));
        assert_eq!(record.doc_type, "publication");
        assert_eq!(record.data.title[0].text, "Como utilizar Hooks");
        assert_eq!(
            record.data.banner.url.as_deref(),
            Some("https://images.prismic.io/banner.png")
        );
        assert_eq!(record.data.content.len(), 1);
        assert_eq!(record.data.content[0].body[0].spans[0].span_type, "strong");
    }

    #[test]
    fn test_missing_fields_default() {
        let record: ContentRecord =
            serde_json::from_str(r#"{"id": "a", "first_publication_date": null}"#).unwrap();
        assert!(record.uid.is_none());
        assert!(record.first_publication_date.is_none());
        assert!(record.data.content.is_empty());
        assert!(record.data.title.is_empty());
    }
}
