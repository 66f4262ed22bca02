//! Reading time estimation

use super::post::ContentBlock;

/// Average reading speed used for every post
pub const WORDS_PER_MINUTE: usize = 200;

/// Count whitespace-delimited words in headings and body text
pub fn count_words(content: &[ContentBlock]) -> usize {
    content
        .iter()
        .map(|block| {
            let heading = block.heading.split_whitespace().count();
            let body: usize = block
                .body
                .iter()
                .map(|span| span.text.split_whitespace().count())
                .sum();
            heading + body
        })
        .sum()
}

/// Estimated minutes to read, rounded up; empty content reads in 0 minutes
pub fn estimate(content: &[ContentBlock]) -> usize {
    count_words(content).div_ceil(WORDS_PER_MINUTE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::record::RichTextBlock;

    fn words(n: usize) -> String {
        vec!["palavra"; n].join(" ")
    }

    fn block(heading: &str, body: &[&str]) -> ContentBlock {
        ContentBlock {
            heading: heading.to_string(),
            body: body.iter().map(|t| RichTextBlock::paragraph(t)).collect(),
        }
    }

    #[test]
    fn test_four_hundred_words_is_two_minutes() {
        let body = words(397);
        let content = vec![block("one two three", &[&body])];
        assert_eq!(count_words(&content), 400);
        assert_eq!(estimate(&content), 2);
    }

    #[test]
    fn test_rounds_up() {
        let body = words(200);
        let content = vec![block("", &[&body])];
        assert_eq!(estimate(&content), 1);

        let content = vec![block("extra", &[&body])];
        assert_eq!(estimate(&content), 2);
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(estimate(&[]), 0);
        assert_eq!(estimate(&[block("", &["", "   "])]), 0);
    }

    #[test]
    fn test_irregular_whitespace() {
        let content = vec![block("  Um   título ", &["a\tb\nc  d"])];
        assert_eq!(count_words(&content), 6);
    }

    #[test]
    fn test_monotonic_when_appending_blocks() {
        let mut content = vec![block("Intro", &[&words(150)])];
        let mut previous = estimate(&content);
        for n in [1, 49, 200, 3] {
            content.push(block("", &[&words(n)]));
            let current = estimate(&content);
            assert!(current >= previous);
            previous = current;
        }
    }
}
