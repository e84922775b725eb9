//! Structured search API path.
//!
//! The endpoint takes `query`, `display` (page size, at most 100), `start`
//! (1-based offset, at most 1000) and `sort=date`, authenticates through two
//! headers, and answers with a JSON object whose `items` carry
//! markup-decorated titles and snippets plus an RFC 2822 `pubDate`.

use super::{SearchClient, source_for_link};
use crate::error::{FetchError, SearchError};
use crate::fetch::{PageFetcher, with_query};
use crate::models::{PubDate, SearchResultRecord};
use crate::utils::{strip_markup, truncate_for_log};
use serde::Deserialize;
use std::collections::HashSet;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Largest `start` offset the endpoint accepts.
pub const API_MAX_START: usize = 1000;

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    #[serde(default)]
    pub items: Vec<ApiItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub originallink: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "pubDate")]
    pub pub_date: String,
}

impl ApiItem {
    /// Attribution prefers the publisher's own URL over the portal copy.
    fn source(&self) -> String {
        if self.originallink.is_empty() {
            source_for_link(&self.link)
        } else {
            source_for_link(&self.originallink)
        }
    }

    pub(crate) fn into_record(self, pub_date: PubDate, keyword: Option<&str>) -> SearchResultRecord {
        SearchResultRecord {
            title: strip_markup(&self.title),
            description: strip_markup(&self.description),
            source: self.source(),
            link: self.link,
            pub_date,
            keyword: keyword.map(str::to_string),
        }
    }
}

impl<F: PageFetcher> SearchClient<F> {
    /// Request URL for one API page.
    pub(crate) fn api_request_url(&self, keyword: &str, display: usize, start: usize) -> Result<String, FetchError> {
        let display = display.to_string();
        let start = start.to_string();
        with_query(
            &self.config.api_url,
            &[
                ("query", keyword),
                ("display", display.as_str()),
                ("start", start.as_str()),
                ("sort", "date"),
            ],
        )
    }

    /// Fetch and decode one API page of at most `requested` items.
    pub(crate) async fn api_page(
        &self,
        keyword: &str,
        requested: usize,
        start: usize,
    ) -> Result<Vec<ApiItem>, SearchError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(SearchError::MissingCredentials)?;
        let url = self.api_request_url(keyword, requested, start)?;
        let headers = [
            ("X-Naver-Client-Id", credentials.client_id.as_str()),
            ("X-Naver-Client-Secret", credentials.client_secret.as_str()),
        ];
        let body = self
            .fetcher
            .get(&url, &headers, self.config.api_timeout())
            .await?;
        let payload: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(body = %truncate_for_log(&body, 200), "Undecodable API payload");
            SearchError::Payload(e)
        })?;
        debug!(start, requested, returned = payload.items.len(), "API page");
        Ok(payload.items)
    }

    /// Page through the API until `max_results` distinct titles are collected
    /// or the endpoint runs dry. A repeated title keeps its first hit and the
    /// paging continues to make up for it. Any failing page fails the whole
    /// call.
    #[instrument(level = "info", skip(self))]
    pub(crate) async fn search_api(
        &self,
        keyword: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResultRecord>, SearchError> {
        let page_size = self.config.api_page_size() as usize;
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let mut start = 1;

        while records.len() < max_results && start <= API_MAX_START {
            if start > 1 {
                sleep(self.config.request_delay()).await;
            }
            let requested = page_size.min(max_results - records.len());
            let items = self.api_page(keyword, requested, start).await?;
            let returned = items.len();

            for item in items {
                let pub_date = PubDate::from_rfc2822(&item.pub_date);
                let record = item.into_record(pub_date, None);
                if seen.insert(record.title.clone()) {
                    records.push(record);
                }
            }

            if returned < requested {
                break;
            }
            start += requested;
        }

        records.truncate(max_results);
        Ok(records)
    }
}
