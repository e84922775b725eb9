//! Same-day news for a set of market keywords ("급등주", "신저가", …).
//!
//! Only the API path is used here: the fallback's display dates cannot be
//! compared against a calendar date.

use super::SearchClient;
use super::api::API_MAX_START;
use crate::fetch::PageFetcher;
use crate::models::{PubDate, SearchResultRecord, dedup_by_title};
use chrono::NaiveDate;
use std::cmp::Reverse;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

/// Split `max_results` across `keywords` keywords as evenly as possible.
/// The first `max_results % keywords` keywords get one extra slot.
pub fn keyword_budgets(keywords: usize, max_results: usize) -> Vec<usize> {
    if keywords == 0 {
        return Vec::new();
    }
    let share = max_results / keywords;
    let extra = max_results % keywords;
    (0..keywords)
        .map(|i| share + usize::from(i < extra))
        .collect()
}

impl<F: PageFetcher> SearchClient<F> {
    /// Articles published on `date` for each keyword, merged, deduplicated by
    /// title and returned newest first, at most `max_results` in total.
    ///
    /// A keyword whose API request fails contributes what it gathered before
    /// the failure; the remaining keywords are still searched.
    #[instrument(level = "info", skip(self))]
    pub async fn search_stock_news(
        &self,
        keywords: &[String],
        date: NaiveDate,
        max_results: usize,
    ) -> Vec<SearchResultRecord> {
        if !self.api_available() {
            warn!("Stock news needs search API credentials; returning nothing");
            return Vec::new();
        }
        let keywords: Vec<&str> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            warn!("No keywords given for stock news");
            return Vec::new();
        }

        let mut combined = Vec::new();
        for (keyword, budget) in keywords.iter().zip(keyword_budgets(keywords.len(), max_results)) {
            if budget == 0 {
                continue;
            }
            let found = self.same_day_for_keyword(keyword, date, budget).await;
            info!(keyword, count = found.len(), "Keyword finished");
            combined.extend(found);
        }

        let mut unique = dedup_by_title(combined);
        unique.sort_by_key(|r| Reverse(r.pub_date.timestamp()));
        unique.truncate(max_results);
        unique
    }

    async fn same_day_for_keyword(
        &self,
        keyword: &str,
        date: NaiveDate,
        budget: usize,
    ) -> Vec<SearchResultRecord> {
        let display = self.config.api_page_size() as usize;
        let mut found = Vec::new();
        let mut start = 1;

        'pages: while found.len() < budget && start <= API_MAX_START {
            if start > 1 {
                sleep(self.config.request_delay()).await;
            }
            let items = match self.api_page(keyword, display, start).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(keyword, start, error = %e, "API page failed; keeping partial results");
                    break;
                }
            };
            let returned = items.len();

            for item in items {
                let pub_date = PubDate::from_rfc2822(&item.pub_date);
                let Some(published) = pub_date.timestamp() else {
                    continue;
                };
                let day = published.date_naive();
                if day > date {
                    continue;
                }
                if day < date {
                    // Results are newest first; everything after this is older.
                    break 'pages;
                }
                found.push(item.into_record(pub_date, Some(keyword)));
                if found.len() >= budget {
                    break 'pages;
                }
            }

            if returned < display {
                break;
            }
            start += display;
        }

        found
    }
}
