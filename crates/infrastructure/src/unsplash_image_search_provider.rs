use async_trait::async_trait;
use picsearch_application::ImageSearchProvider;
use picsearch_core::{AppError, AppResult};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// Unsplash photo search adapter.
#[derive(Clone)]
pub struct UnsplashImageSearchProvider {
    http_client: reqwest::Client,
    base_url: Url,
    access_key: String,
}

impl UnsplashImageSearchProvider {
    /// Creates a provider against `base_url` (normally `https://api.unsplash.com`).
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        access_key: impl Into<String>,
    ) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid UNSPLASH_API_BASE_URL '{base_url}': {error}"))
        })?;

        Ok(Self {
            http_client,
            base_url,
            access_key: access_key.into(),
        })
    }

    fn search_url(&self, query: &str, page: u32) -> AppResult<Url> {
        let mut url = self.base_url.join("search/photos").map_err(|error| {
            AppError::Internal(format!("failed to build unsplash search url: {error}"))
        })?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.access_key)
            .append_pair("query", query)
            .append_pair("page", &page.to_string());
        Ok(url)
    }
}

#[async_trait]
impl ImageSearchProvider for UnsplashImageSearchProvider {
    async fn search_photos(&self, query: &str, page: u32) -> AppResult<Value> {
        debug!(query, page, "querying unsplash");
        let response = self
            .http_client
            .get(self.search_url(query, page)?)
            .header("Accept-Version", "v1")
            .send()
            .await
            .map_err(|error| AppError::Upstream(format!("unsplash request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, query, page, "unsplash search failed");
            return Err(AppError::Upstream(format!(
                "unsplash answered with status {status}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|error| AppError::Upstream(format!("failed to parse unsplash response: {error}")))
    }
}
