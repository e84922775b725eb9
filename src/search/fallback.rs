//! Scraped search-results path, used when the API is unavailable or fails.
//!
//! The public results page shows ten hits per page. Each hit is a
//! `div.news_area` holding the title anchor, a snippet and an info line of
//! the form `outlet · … · date`. Dates stay as displayed.

use super::{SearchClient, source_for_link};
use crate::error::FetchError;
use crate::fetch::{PageFetcher, with_query};
use crate::models::{PubDate, SearchResultRecord};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Hits per results page.
pub const FALLBACK_PAGE_SIZE: usize = 10;

/// Last page reachable with a `start` offset of at most 1000.
const FALLBACK_MAX_PAGE: usize = 100;

static RESULT_BLOCK: Lazy<Selector> = Lazy::new(|| Selector::parse("div.news_area").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("a.news_tit").unwrap());
static SNIPPET: Lazy<Selector> = Lazy::new(|| Selector::parse("div.news_dsc").unwrap());
static INFO: Lazy<Selector> = Lazy::new(|| Selector::parse("span.info").unwrap());

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Split an info line into `(outlet, date)`. Needs at least two `·` parts.
fn split_info(info: &str) -> (String, String) {
    let parts: Vec<&str> = info.split('·').collect();
    match (parts.first(), parts.last()) {
        (Some(first), Some(last)) if parts.len() >= 2 => {
            (first.trim().to_string(), last.trim().to_string())
        }
        _ => (String::new(), String::new()),
    }
}

fn parse_block(block: ElementRef<'_>) -> Option<SearchResultRecord> {
    let anchor = block.select(&TITLE).next()?;
    let title = text_of(anchor);
    if title.is_empty() {
        return None;
    }
    let link = anchor.value().attr("href").unwrap_or_default().to_string();
    let description = block.select(&SNIPPET).next().map(text_of).unwrap_or_default();
    let (outlet, date) = block
        .select(&INFO)
        .next()
        .map(|info| split_info(&info.text().collect::<String>()))
        .unwrap_or_default();
    let source = if outlet.is_empty() {
        source_for_link(&link)
    } else {
        outlet
    };

    Some(SearchResultRecord {
        title,
        link,
        description,
        pub_date: PubDate::Raw(date),
        source,
        keyword: None,
    })
}

/// Hits on one results page, or `None` when the page has no result blocks.
/// Blocks without a title anchor are skipped.
pub fn parse_results_page(html: &str) -> Option<Vec<SearchResultRecord>> {
    let document = Html::parse_document(html);
    let blocks: Vec<ElementRef<'_>> = document.select(&RESULT_BLOCK).collect();
    if blocks.is_empty() {
        return None;
    }
    Some(blocks.into_iter().filter_map(parse_block).collect())
}

impl<F: PageFetcher> SearchClient<F> {
    /// Request URL for 1-based results page `page`.
    pub(crate) fn fallback_request_url(&self, keyword: &str, page: usize) -> Result<String, FetchError> {
        let start = ((page.max(1) - 1) * FALLBACK_PAGE_SIZE + 1).to_string();
        with_query(
            &self.config.fallback_url,
            &[("where", "news"), ("query", keyword), ("start", start.as_str())],
        )
    }

    /// Walk results pages until `max_results` distinct titles are collected
    /// or a page comes back without results. A page that fails to load is
    /// skipped. Hits dropped as repeated titles are made up from one more
    /// page.
    #[instrument(level = "info", skip(self))]
    pub(crate) async fn search_fallback(&self, keyword: &str, max_results: usize) -> Vec<SearchResultRecord> {
        let mut last_page = max_results.div_ceil(FALLBACK_PAGE_SIZE).min(FALLBACK_MAX_PAGE);
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let mut page = 0;

        while page < last_page && records.len() < max_results {
            page += 1;
            if page > 1 {
                sleep(self.config.fallback_page_delay()).await;
            }

            let url = match self.fallback_request_url(keyword, page) {
                Ok(url) => url,
                Err(e) => {
                    warn!(error = %e, "Cannot build results page URL");
                    break;
                }
            };
            let html = match self
                .fetcher
                .get(&url, &[], self.config.fallback_timeout())
                .await
            {
                Ok(html) => html,
                Err(e) => {
                    warn!(page, error = %e, "Results page failed; skipping");
                    continue;
                }
            };

            match parse_results_page(&html) {
                Some(hits) => {
                    let parsed = hits.len();
                    let before = records.len();
                    records.extend(hits.into_iter().filter(|hit| seen.insert(hit.title.clone())));
                    let repeated = parsed - (records.len() - before);
                    debug!(page, hits = parsed, repeated, "Results page");
                    if repeated > 0 && page == last_page && last_page < FALLBACK_MAX_PAGE {
                        last_page += 1;
                    }
                }
                None => {
                    debug!(page, "No result blocks; stopping");
                    break;
                }
            }
        }

        records.truncate(max_results);
        records
    }
}
