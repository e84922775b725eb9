//! Records produced by the two acquisition paths.
//!
//! - [`ListingEntry`]: one article anchor found on a print-edition listing page,
//!   before it is attributed to a newspaper
//! - [`ArticleRecord`]: a listing entry tagged with its newspaper
//! - [`SearchResultRecord`]: one keyword-search hit, from the API or the
//!   scraped results page
//! - [`SourceStatus`]: per-newspaper outcome of a multi-paper crawl
//!
//! Paper-edition articles are identified by URL, search results by title.
//! The two dedup helpers at the bottom of this module keep that distinction.

use chrono::{DateTime, FixedOffset, Local};
use itertools::Itertools;
use serde::{Serialize, Serializer};
use std::fmt;

/// A configured newspaper: display name plus the id used in listing URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub name: String,
    pub id: String,
}

impl Source {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// An article anchor extracted from one listing page.
///
/// No newspaper is attached yet; the orchestrator owns that attribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingEntry {
    pub title: String,
    /// Absolute article URL.
    pub url: String,
    /// Print-edition page label such as `A12면`, or empty when none was found.
    pub page: String,
    pub collected_at: DateTime<Local>,
}

/// A print-edition article attributed to its newspaper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleRecord {
    pub title: String,
    pub url: String,
    pub newspaper: String,
    pub page: String,
    pub collected_at: DateTime<Local>,
}

impl ArticleRecord {
    pub fn from_entry(entry: ListingEntry, newspaper: &str) -> Self {
        Self {
            title: entry.title,
            url: entry.url,
            newspaper: newspaper.to_string(),
            page: entry.page,
            collected_at: entry.collected_at,
        }
    }
}

/// Publish date of a search hit.
///
/// The API path yields RFC 2822 timestamps that parse; the scraped path
/// yields display strings ("3시간 전", "2025.05.28.") that are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PubDate {
    Parsed(DateTime<FixedOffset>),
    Raw(String),
}

impl PubDate {
    /// Parse an RFC 2822 date, keeping the input when it does not parse.
    pub fn from_rfc2822(raw: &str) -> Self {
        match DateTime::parse_from_rfc2822(raw.trim()) {
            Ok(dt) => PubDate::Parsed(dt),
            Err(_) => PubDate::Raw(raw.to_string()),
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            PubDate::Parsed(dt) => Some(*dt),
            PubDate::Raw(_) => None,
        }
    }
}

impl fmt::Display for PubDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PubDate::Parsed(dt) => write!(f, "{}", dt.format("%Y.%m.%d %H:%M")),
            PubDate::Raw(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for PubDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One keyword-search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResultRecord {
    pub title: String,
    pub link: String,
    pub description: String,
    #[serde(rename = "pubDate")]
    pub pub_date: PubDate,
    /// Outlet name, `기타` when the link matches no known outlet.
    pub source: String,
    /// Query that produced this hit, set by the stock-news search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

/// Which acquisition path served a search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPath {
    Api,
    Fallback,
}

/// Search results plus how they were obtained.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub records: Vec<SearchResultRecord>,
    pub path: SearchPath,
    /// Informational message when the API failed and the fallback served the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Outcome of crawling one newspaper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Collected { count: usize },
    Failed { reason: String },
}

/// Per-newspaper progress entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub newspaper: String,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
}

impl SourceStatus {
    pub fn collected(newspaper: &str, count: usize) -> Self {
        Self {
            newspaper: newspaper.to_string(),
            outcome: SourceOutcome::Collected { count },
        }
    }

    pub fn failed(newspaper: &str, reason: impl Into<String>) -> Self {
        Self {
            newspaper: newspaper.to_string(),
            outcome: SourceOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, SourceOutcome::Collected { .. })
    }

    pub fn count(&self) -> usize {
        match self.outcome {
            SourceOutcome::Collected { count } => count,
            SourceOutcome::Failed { .. } => 0,
        }
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            SourceOutcome::Collected { count } => {
                write!(f, "{}: ok, {} articles", self.newspaper, count)
            }
            SourceOutcome::Failed { reason } => {
                write!(f, "{}: failed, 0 articles ({})", self.newspaper, reason)
            }
        }
    }
}

/// Everything one multi-paper crawl produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Collection {
    pub articles: Vec<ArticleRecord>,
    pub statuses: Vec<SourceStatus>,
}

/// Keep the first article seen for each URL, preserving order.
pub fn dedup_by_url(articles: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    articles
        .into_iter()
        .unique_by(|a| a.url.clone())
        .collect()
}

/// Keep the first search hit seen for each title, preserving order.
pub fn dedup_by_title(results: Vec<SearchResultRecord>) -> Vec<SearchResultRecord> {
    results
        .into_iter()
        .unique_by(|r| r.title.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: &str, newspaper: &str) -> ArticleRecord {
        ArticleRecord {
            title: format!("title of {url}"),
            url: url.to_string(),
            newspaper: newspaper.to_string(),
            page: String::new(),
            collected_at: Local::now(),
        }
    }

    fn hit(title: &str, link: &str) -> SearchResultRecord {
        SearchResultRecord {
            title: title.to_string(),
            link: link.to_string(),
            description: String::new(),
            pub_date: PubDate::Raw(String::new()),
            source: "기타".to_string(),
            keyword: None,
        }
    }

    #[test]
    fn test_from_entry_sets_newspaper() {
        let entry = ListingEntry {
            title: "반도체 수출 회복".to_string(),
            url: "https://n.news.naver.com/mnews/article/009/0001".to_string(),
            page: "A1면".to_string(),
            collected_at: Local::now(),
        };
        let record = ArticleRecord::from_entry(entry, "매일경제");
        assert_eq!(record.newspaper, "매일경제");
        assert_eq!(record.page, "A1면");
    }

    #[test]
    fn test_dedup_by_url_keeps_first_newspaper() {
        let deduped = dedup_by_url(vec![
            article("https://x/1", "A"),
            article("https://x/2", "A"),
            article("https://x/1", "B"),
        ]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].newspaper, "A");
        assert_eq!(deduped[1].url, "https://x/2");
    }

    #[test]
    fn test_dedup_by_title_ignores_links() {
        let deduped = dedup_by_title(vec![
            hit("같은 제목", "https://a/1"),
            hit("같은 제목", "https://b/2"),
            hit("다른 제목", "https://a/1"),
        ]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].link, "https://a/1");
    }

    #[test]
    fn test_pub_date_parses_rfc2822() {
        let date = PubDate::from_rfc2822("Wed, 28 May 2025 09:30:00 +0900");
        assert_eq!(date.to_string(), "2025.05.28 09:30");
        assert!(date.timestamp().is_some());
    }

    #[test]
    fn test_pub_date_keeps_raw_on_failure() {
        let date = PubDate::from_rfc2822("3시간 전");
        assert_eq!(date, PubDate::Raw("3시간 전".to_string()));
        assert!(date.timestamp().is_none());
    }

    #[test]
    fn test_search_record_serializes_pub_date_key() {
        let json = serde_json::to_value(hit("t", "https://l")).unwrap();
        assert!(json.get("pubDate").is_some());
        assert!(json.get("keyword").is_none());
    }

    #[test]
    fn test_source_status_display() {
        assert_eq!(
            SourceStatus::collected("한국경제", 42).to_string(),
            "한국경제: ok, 42 articles"
        );
        let failed = SourceStatus::failed("서울경제", "timed out");
        assert!(!failed.is_success());
        assert_eq!(failed.count(), 0);
        assert!(failed.to_string().contains("failed"));
    }

    #[test]
    fn test_source_status_serialization() {
        let json = serde_json::to_value(SourceStatus::collected("A", 3)).unwrap();
        assert_eq!(json["newspaper"], "A");
        assert_eq!(json["status"], "collected");
        assert_eq!(json["count"], 3);
    }
}
