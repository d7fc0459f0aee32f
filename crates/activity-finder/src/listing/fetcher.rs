//! Paginated listing fetcher.

use std::time::Duration;

use async_trait::async_trait;

use super::normalize::normalize;
use super::parser::ListingParser;
use super::types::Activity;
use crate::error::{FinderError, Result};

/// Activity search endpoint; `{offset}` is the index of the first result.
pub const DEFAULT_BASE_URL: &str = "https://www.mountaineers.org/explore/activities/@@faceted_query?b_start%5B%5D=0&b_start:int={offset}";

/// Number of results the site returns per page.
pub const ACTIVITIES_PER_PAGE: usize = 50;

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Source of raw listing pages.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the page whose first result is at `offset`.
    async fn fetch_page(&self, offset: usize) -> Result<String>;
}

/// Fetches listing pages over HTTP.
pub struct HttpListingSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpListingSource {
    /// Create a source for the default Mountaineers search URL.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a source for a URL template containing `{offset}`.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("activity-finder/", env!("CARGO_PKG_VERSION")))
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn page_url(&self, offset: usize) -> String {
        self.base_url.replace("{offset}", &offset.to_string())
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch_page(&self, offset: usize) -> Result<String> {
        let url = self.page_url(offset);
        tracing::debug!(url = %url, "Fetching listing page");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FinderError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Fetch every page until one comes back empty, then normalize all listings.
///
/// Any page or normalization failure aborts the whole fetch.
pub async fn fetch_all_activities(source: &dyn ListingSource) -> Result<Vec<Activity>> {
    let mut activities = Vec::new();
    let mut offset = 0;

    loop {
        let html = source.fetch_page(offset).await?;
        let raw = ListingParser::parse(&html)?;
        if raw.is_empty() {
            break;
        }

        tracing::debug!(offset, count = raw.len(), "Fetched listing page");
        for entry in raw {
            activities.push(normalize(entry)?);
        }
        offset += ACTIVITIES_PER_PAGE;
    }

    tracing::info!(count = activities.len(), "Fetched all activities");
    Ok(activities)
}
