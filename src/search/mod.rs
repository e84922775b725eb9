//! Keyword news search with an API-first, scrape-second strategy.
//!
//! Each call to [`SearchClient::search`] moves through:
//!
//! ```text
//! START ─► API_ATTEMPT ─► API_SUCCESS
//!               │
//!               └─► API_FAILURE ─► FALLBACK_ATTEMPT ─► FALLBACK_SUCCESS | FALLBACK_EXHAUSTED
//! ```
//!
//! The API is attempted only when credentials were supplied at construction.
//! An API failure diverts that one call to the fallback; the next call tries
//! the API again. Paging is strictly sequential with a pause between pages,
//! because both endpoints are rate limited.
//!
//! | Module | Path |
//! |--------|------|
//! | [`api`] | Structured search API, JSON payloads |
//! | [`fallback`] | Public search-results page, HTML scraping |
//! | [`stock`] | Date-filtered multi-keyword search over the API |

pub mod api;
pub mod fallback;
pub mod stock;

use crate::config::{Credentials, SearchConfig};
use crate::error::ConfigError;
use crate::fetch::PageFetcher;
use crate::models::{SearchOutcome, SearchPath, SearchResultRecord};
use tracing::{info, instrument, warn};

/// Fallback label when a link matches no known outlet.
pub const UNKNOWN_SOURCE: &str = "기타";

/// Link domain fragment → outlet name.
const OUTLETS: &[(&str, &str)] = &[
    ("news.naver.com", "네이버뉴스"),
    ("chosun.com", "조선일보"),
    ("joongang.co.kr", "중앙일보"),
    ("donga.com", "동아일보"),
    ("hankyung.com", "한국경제"),
    ("mk.co.kr", "매일경제"),
    ("hani.co.kr", "한겨레"),
    ("khan.co.kr", "경향신문"),
];

/// Best-effort outlet name for an article link.
pub fn source_for_link(link: &str) -> String {
    OUTLETS
        .iter()
        .find(|(fragment, _)| link.contains(fragment))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

/// Keyword search client.
#[derive(Debug)]
pub struct SearchClient<F> {
    fetcher: F,
    config: SearchConfig,
    credentials: Option<Credentials>,
}

impl<F: PageFetcher> SearchClient<F> {
    /// Build a client. API availability is fixed here: without credentials
    /// every call goes straight to the fallback.
    pub fn new(
        fetcher: F,
        config: SearchConfig,
        credentials: Option<Credentials>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if credentials.is_none() {
            warn!("Search API credentials not configured; using web search results only");
        }
        Ok(Self {
            fetcher,
            config,
            credentials,
        })
    }

    pub fn api_available(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// At most `max_results` hits for `keyword`, newest first on the API path.
    pub async fn search(&self, keyword: &str, max_results: usize) -> Vec<SearchResultRecord> {
        self.search_with_outcome(keyword, max_results).await.records
    }

    /// [`search`](Self::search), also reporting which path answered and any
    /// notice about an API failure.
    #[instrument(level = "info", skip(self))]
    pub async fn search_with_outcome(&self, keyword: &str, max_results: usize) -> SearchOutcome {
        let keyword = keyword.trim();
        if keyword.is_empty() || max_results == 0 {
            warn!("Empty keyword or zero result budget; nothing to search");
            return SearchOutcome {
                records: Vec::new(),
                path: self.preferred_path(),
                notice: None,
            };
        }

        let mut notice = None;
        if self.api_available() {
            match self.search_api(keyword, max_results).await {
                Ok(records) => {
                    info!(count = records.len(), "API search finished");
                    return SearchOutcome {
                        records,
                        path: SearchPath::Api,
                        notice: None,
                    };
                }
                Err(e) => {
                    warn!(error = %e, "API search failed; switching to web results for this call");
                    notice = Some(format!("API search failed ({e}); showing web search results instead"));
                }
            }
        }

        let records = self.search_fallback(keyword, max_results).await;
        info!(count = records.len(), "Web search finished");
        SearchOutcome {
            records,
            path: SearchPath::Fallback,
            notice,
        }
    }

    fn preferred_path(&self) -> SearchPath {
        if self.api_available() {
            SearchPath::Api
        } else {
            SearchPath::Fallback
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for the search tests.

    use super::*;
    use crate::fetch::testing::ScriptedFetcher;
    use serde_json::json;

    pub fn config() -> SearchConfig {
        SearchConfig {
            request_delay_ms: 0,
            fallback_page_delay_ms: 0,
            ..SearchConfig::default()
        }
    }

    pub fn credentials() -> Credentials {
        Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    pub fn client(fetcher: ScriptedFetcher, with_credentials: bool) -> SearchClient<ScriptedFetcher> {
        let credentials = with_credentials.then(credentials);
        SearchClient::new(fetcher, config(), credentials).unwrap()
    }

    /// A client with no routes, used only to compute request URLs.
    pub fn url_client() -> SearchClient<ScriptedFetcher> {
        client(ScriptedFetcher::new(), true)
    }

    /// API payload with one item per `(title, pubDate)`.
    pub fn api_json(items: &[(&str, &str)]) -> String {
        let items: Vec<_> = items
            .iter()
            .enumerate()
            .map(|(i, (title, pub_date))| {
                json!({
                    "title": format!("<b>{title}</b>"),
                    "originallink": format!("https://www.hankyung.com/article/{i}"),
                    "link": format!("https://n.news.naver.com/mnews/article/015/{i}"),
                    "description": format!("{title} &quot;요약&quot;"),
                    "pubDate": pub_date,
                })
            })
            .collect();
        json!({ "total": items.len(), "start": 1, "display": items.len(), "items": items }).to_string()
    }

    /// Search-results page with one block per `(title, info)`.
    pub fn results_html(blocks: &[(&str, &str)]) -> String {
        let blocks: String = blocks
            .iter()
            .enumerate()
            .map(|(i, (title, info))| {
                format!(
                    r#"<div class="news_area">
                         <a class="news_tit" href="https://www.donga.com/news/{i}">{title}</a>
                         <div class="news_dsc">{title} 관련 요약</div>
                         <span class="info">{info}</span>
                       </div>"#
                )
            })
            .collect();
        format!("<html><body><div class=\"group_news\">{blocks}</div></body></html>")
    }
}
