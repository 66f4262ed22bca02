//! Content module - raw documents, rich text and derived post views

mod post;
pub mod read_time;
mod record;
pub mod rich_text;

pub use post::{BannerData, ContentBlock, DetailData, PostDetail, PostSummary, SummaryData};
pub use record::{
    Banner, ContentRecord, Embed, RecordBlock, RecordData, RichText, RichTextBlock, Span, SpanData,
};
