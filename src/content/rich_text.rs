//! Rich text flattening
//!
//! Converts structured rich-text fields into plain text (titles, word counts)
//! or into sanitized HTML (post bodies only).

use std::cmp::Reverse;

use super::record::{RichTextBlock, Span};
use crate::helpers::{
    encode_segment, html_escape, image_tag, is_external_url, is_safe_url, link_to,
};

/// Concatenate the text of every block in document order, dropping markup
///
/// Blocks are joined with a single space; an empty value yields `""`.
pub fn to_plain_text(rich: &[RichTextBlock]) -> String {
    rich.iter()
        .map(|block| block.text.as_str())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render rich-text blocks into escaped HTML, preserving block order
///
/// Consecutive list items are wrapped in a single `<ul>`/`<ol>`.
pub fn to_markup(rich: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in rich {
        let list_tag = match block.block_type.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        html.push_str(&render_block(block));
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn render_block(block: &RichTextBlock) -> String {
    let kind = block.block_type.as_str();
    match kind {
        "heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6" => {
            let level = &kind["heading".len()..];
            format!(
                "<h{level}>{}</h{level}>",
                render_inline(&block.text, &block.spans)
            )
        }
        "preformatted" => format!("<pre>{}</pre>", render_inline(&block.text, &block.spans)),
        "list-item" | "o-list-item" => {
            format!("<li>{}</li>", render_inline(&block.text, &block.spans))
        }
        "image" => match block.url.as_deref() {
            Some(url) if is_safe_url(url) => format!(
                r#"<p class="block-img">{}</p>"#,
                image_tag(url, block.alt.as_deref())
            ),
            _ => String::new(),
        },
        "embed" => match &block.oembed {
            Some(embed) if is_safe_url(&embed.embed_url) => format!(
                r#"<div data-oembed="{}">{}</div>"#,
                html_escape(&embed.embed_url),
                link_to(&embed.embed_url, &html_escape(&embed.embed_url), true)
            ),
            _ => String::new(),
        },
        _ => format!("<p>{}</p>", render_inline(&block.text, &block.spans)),
    }
}

/// An opened inline element: where it ends and how to close it
struct OpenSpan {
    end: usize,
    open: String,
    close: &'static str,
}

fn span_tags(span: &Span) -> Option<(String, &'static str)> {
    match span.span_type.as_str() {
        "strong" => Some(("<strong>".to_string(), "</strong>")),
        "em" => Some(("<em>".to_string(), "</em>")),
        "label" => {
            let class = span
                .data
                .as_ref()
                .and_then(|d| d.label.as_deref())
                .unwrap_or_default();
            Some((format!(r#"<span class="{}">"#, html_escape(class)), "</span>"))
        }
        "hyperlink" => {
            let data = span.data.as_ref()?;
            let href = if data.link_type.as_deref() == Some("Document") {
                format!("/post/{}", encode_segment(data.uid.as_deref()?))
            } else {
                data.url.clone().filter(|url| is_safe_url(url))?
            };
            let external = is_external_url(&href);
            // Reuse the anchor helper and split it around the inner text
            let anchor = link_to(&href, "", external);
            let open = anchor.trim_end_matches("</a>").to_string();
            Some((open, "</a>"))
        }
        _ => None,
    }
}

/// Render a text run with its spans, closing and reopening on overlap
fn render_inline(text: &str, spans: &[Span]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut pending: Vec<(usize, OpenSpan)> = spans
        .iter()
        .filter_map(|span| {
            let end = span.end.min(len);
            if span.start >= end {
                return None;
            }
            let (open, close) = span_tags(span)?;
            Some((span.start, OpenSpan { end, open, close }))
        })
        .collect();
    pending.sort_by_key(|(start, span)| (*start, Reverse(span.end)));

    let mut pending = pending.into_iter().peekable();
    let mut stack: Vec<OpenSpan> = Vec::new();
    let mut html = String::with_capacity(text.len());

    for i in 0..=len {
        if stack.iter().any(|span| span.end == i) {
            let mut reopen = Vec::new();
            while let Some(span) = stack.pop() {
                html.push_str(span.close);
                if span.end != i {
                    reopen.push(span);
                }
                if !stack.iter().any(|span| span.end == i) {
                    break;
                }
            }
            for span in reopen.into_iter().rev() {
                html.push_str(&span.open);
                stack.push(span);
            }
        }

        if i == len {
            break;
        }

        while let Some((_, span)) = pending.next_if(|(start, _)| *start == i) {
            html.push_str(&span.open);
            stack.push(span);
        }

        push_escaped(&mut html, chars[i]);
    }

    html
}

fn push_escaped(html: &mut String, c: char) {
    match c {
        '&' => html.push_str("&amp;"),
        '<' => html.push_str("&lt;"),
        '>' => html.push_str("&gt;"),
        '"' => html.push_str("&quot;"),
        '\'' => html.push_str("&#39;"),
        '\n' => html.push_str("<br />"),
        _ => html.push(c),
    }
}
