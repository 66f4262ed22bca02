//! List the posts of the content repository

use anyhow::Result;

use crate::generator::PageBuilder;
use crate::pagination::LoadOutcome;

/// Page through every post and print one line per post
pub async fn run(builder: &PageBuilder) -> Result<usize> {
    let paginator = builder.paginator();
    let mut printed = 0;

    while let LoadOutcome::Loaded { .. } = paginator.load_more().await? {
        let state = paginator.state();
        for post in &state.results[printed..] {
            println!(
                "  {} - {} [{}]",
                post.first_publication_date, post.data.title, post.uid
            );
        }
        printed = state.results.len();
    }

    println!("Posts ({})", printed);
    Ok(printed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::source::MemorySource;
    use crate::test_support::timeline;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_lists_every_page() {
        let source = Arc::new(MemorySource::new(timeline(10)));
        let builder = PageBuilder::new(source.clone(), &SiteConfig::default()).unwrap();

        assert_eq!(run(&builder).await.unwrap(), 10);
        // Three pages of four, no request after the cursor ran out
        assert_eq!(source.request_count(), 3);
    }
}
