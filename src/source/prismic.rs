//! HTTP client for the hosted content repository (Prismic REST API v2)

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ApiPage, ContentSource, QueryOptions};
use crate::content::ContentRecord;
use crate::error::{Error, Result};

/// API root document, only the refs are needed
#[derive(Debug, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// Content repository client, created once and shared by every build
#[derive(Debug, Clone)]
pub struct PrismicClient {
    client: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

impl PrismicClient {
    /// Create a client for an API endpoint such as `https://repo.cdn.prismic.io/api/v2`
    pub fn new(endpoint: &str, access_token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token: access_token.filter(|t| !t.is_empty()),
        })
    }

    /// Resolve the master ref, i.e. the currently published content snapshot
    async fn master_ref(&self) -> Result<String> {
        let info: ApiInfo = self.get_json(&self.endpoint, &self.token_param()).await?;
        info.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or_else(|| Error::TransientFetch("API root lists no master ref".to_string()))
    }

    async fn search(&self, mut params: Vec<(&'static str, String)>) -> Result<ApiPage> {
        let reference = self.master_ref().await?;
        params.push(("ref", reference));
        params.extend(self.token_param());

        let url = format!("{}/documents/search", self.endpoint);
        self.get_json(&url, &params).await
    }

    fn token_param(&self) -> Vec<(&'static str, String)> {
        self.access_token
            .iter()
            .map(|token| ("access_token", token.clone()))
            .collect()
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(Error::TransientFetch(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

/// Build an `at` predicate, e.g. `[[at(document.type,"publication")]]`
fn at_predicate(path: &str, value: &str) -> String {
    format!(
        r#"[[at({},"{}")]]"#,
        path,
        value.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn query_by_type(&self, doc_type: &str, options: &QueryOptions) -> Result<ApiPage> {
        tracing::debug!(doc_type, ?options, "Querying documents by type");

        let mut params = vec![
            ("q", at_predicate("document.type", doc_type)),
            ("pageSize", options.page_size.to_string()),
        ];
        if let Some(after) = &options.after {
            params.push(("after", after.clone()));
        }
        if let Some(ordering) = &options.orderings {
            params.push(("orderings", ordering.to_query()));
        }

        self.search(params).await
    }

    async fn query_by_uid(&self, doc_type: &str, uid: &str) -> Result<Option<ContentRecord>> {
        tracing::debug!(doc_type, uid, "Querying document by uid");

        let params = vec![
            ("q", at_predicate(&format!("my.{}.uid", doc_type), uid)),
            ("pageSize", "1".to_string()),
        ];
        let page = self.search(params).await?;
        Ok(page.results.into_iter().next())
    }

    async fn fetch_page(&self, url: &str) -> Result<ApiPage> {
        tracing::debug!(url, "Following next_page cursor");
        self.get_json(url, &[]).await
    }
}
