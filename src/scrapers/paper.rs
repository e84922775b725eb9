//! Walks one newspaper's print-edition listing for one date.

use crate::config::CollectorConfig;
use crate::error::{ConfigError, CrawlError, FetchError};
use crate::fetch::{PageFetcher, with_query};
use crate::models::ListingEntry;
use crate::scrapers::listing::extract_listing;
use chrono::NaiveDate;
use rand::{Rng, rng};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Crawls listing pages `1..=max_pages_per_newspaper` for a newspaper and date.
///
/// The walk stops early at the first page with no articles or no listing
/// container. If page 1 cannot be fetched the whole crawl fails with
/// [`CrawlError::FirstPage`]; a failure on a later page keeps what was
/// collected so far.
#[derive(Debug)]
pub struct PaperCrawler<F> {
    fetcher: F,
    config: CollectorConfig,
}

impl<F: PageFetcher> PaperCrawler<F> {
    pub fn new(fetcher: F, config: CollectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { fetcher, config })
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// URL of listing page `page` for `source_id` on `date`.
    pub fn listing_url(&self, source_id: &str, date: NaiveDate, page: u32) -> Result<Url, FetchError> {
        let date = date.format("%Y%m%d").to_string();
        let page = page.to_string();
        let mut params = vec![
            ("mode", "LPOD"),
            ("mid", "sec"),
            ("oid", source_id),
            ("listType", "paper"),
            ("date", date.as_str()),
        ];
        if page != "1" {
            params.push(("page", page.as_str()));
        }
        let raw = with_query(&self.config.listing_base_url, &params)?;
        Url::parse(&raw).map_err(|e| FetchError::InvalidUrl {
            url: raw,
            message: e.to_string(),
        })
    }

    /// Collect every article listed for `source_id` on `date`, in page order.
    #[instrument(level = "info", skip_all, fields(%source_id, %date))]
    pub async fn crawl(&self, source_id: &str, date: NaiveDate) -> Result<Vec<ListingEntry>, CrawlError> {
        let max_pages = self.config.max_pages_per_newspaper;
        let mut entries = Vec::new();

        for page in 1..=max_pages {
            let (url, body) = match self.fetch_page(source_id, date, page).await {
                Ok(fetched) => fetched,
                Err(e) if page == 1 => {
                    warn!(error = %e, "First listing page failed");
                    return Err(CrawlError::FirstPage(e));
                }
                Err(e) => {
                    warn!(page, error = %e, "Listing page failed; keeping earlier pages");
                    break;
                }
            };

            let Some(page_entries) = extract_listing(&body, &url) else {
                debug!(page, "No listing container; end of listing");
                break;
            };
            if page_entries.is_empty() {
                debug!(page, "Empty listing page; end of listing");
                break;
            }

            debug!(page, count = page_entries.len(), "Extracted listing page");
            entries.extend(page_entries);

            if page < max_pages {
                self.pace().await;
            }
        }

        info!(count = entries.len(), "Crawled newspaper listing");
        Ok(entries)
    }

    async fn fetch_page(&self, source_id: &str, date: NaiveDate, page: u32) -> Result<(Url, String), FetchError> {
        let url = self.listing_url(source_id, date, page)?;
        let body = self
            .fetcher
            .get(url.as_str(), &[], self.config.request_timeout())
            .await?;
        Ok((url, body))
    }

    async fn pace(&self) {
        let delay = pacing_delay(self.config.page_delay_min_ms, self.config.page_delay_max_ms);
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

/// Uniform random delay in `min_ms..=max_ms`.
fn pacing_delay(min_ms: u64, max_ms: u64) -> Duration {
    if min_ms >= max_ms {
        return Duration::from_millis(max_ms);
    }
    Duration::from_millis(rng().random_range(min_ms..=max_ms))
}
