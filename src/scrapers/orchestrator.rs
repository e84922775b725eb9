//! Concurrent crawl across many newspapers.
//!
//! One crawl per newspaper runs on a bounded pool of `max_workers`
//! in-flight futures. Results are merged on the consuming side as each crawl
//! finishes, in completion order, so no crawl ever writes into shared state
//! while it is still running. Each crawl has a wall-clock budget; a crawl
//! that fails or runs over is recorded as a failed source and the others
//! carry on.
//!
//! Status entries are pushed to an optional channel from the same consuming
//! loop, so a single receiver can own all progress display.

use crate::config::CollectorConfig;
use crate::error::{ConfigError, CrawlError};
use crate::fetch::PageFetcher;
use crate::models::{ArticleRecord, Collection, ListingEntry, Source, SourceStatus};
use crate::scrapers::paper::PaperCrawler;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

#[derive(Debug)]
pub struct MultiPaperOrchestrator<F> {
    crawler: PaperCrawler<F>,
}

impl<F: PageFetcher> MultiPaperOrchestrator<F> {
    pub fn new(fetcher: F, config: CollectorConfig) -> Result<Self, ConfigError> {
        let crawler = PaperCrawler::new(fetcher, config)?;
        Ok(Self { crawler })
    }

    fn max_workers(&self) -> usize {
        self.crawler.config().max_workers
    }

    fn task_timeout(&self) -> Duration {
        self.crawler.config().task_timeout()
    }

    /// Crawl every source for `date`.
    ///
    /// The returned articles are not deduplicated across sources; see
    /// [`crate::models::dedup_by_url`].
    pub async fn collect(&self, sources: &[Source], date: NaiveDate) -> Collection {
        self.collect_with_progress(sources, date, None).await
    }

    /// Like [`collect`](Self::collect), also sending each source's status to
    /// `progress` as soon as that source finishes.
    #[instrument(level = "info", skip_all, fields(%date, sources = sources.len(), workers = self.max_workers()))]
    pub async fn collect_with_progress(
        &self,
        sources: &[Source],
        date: NaiveDate,
        progress: Option<&UnboundedSender<SourceStatus>>,
    ) -> Collection {
        let t0 = Instant::now();
        let mut finished = stream::iter(sources)
            .map(|source| async move { (source, self.crawl_one(source, date).await) })
            .buffer_unordered(self.max_workers());

        let mut collection = Collection::default();
        while let Some((source, result)) = finished.next().await {
            let status = match result {
                Ok(entries) => {
                    let count = entries.len();
                    collection.articles.extend(
                        entries
                            .into_iter()
                            .map(|entry| ArticleRecord::from_entry(entry, &source.name)),
                    );
                    info!(newspaper = %source.name, count, "Newspaper collected");
                    SourceStatus::collected(&source.name, count)
                }
                Err(e) => {
                    warn!(newspaper = %source.name, error = %e, "Newspaper failed");
                    SourceStatus::failed(&source.name, e.to_string())
                }
            };

            if let Some(tx) = progress {
                if tx.send(status.clone()).is_err() {
                    warn!("Progress receiver dropped; continuing without progress updates");
                }
            }
            collection.statuses.push(status);
        }

        let failed = collection.statuses.iter().filter(|s| !s.is_success()).count();
        info!(
            total = collection.articles.len(),
            failed,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Multi-paper collection finished"
        );
        collection
    }

    async fn crawl_one(&self, source: &Source, date: NaiveDate) -> Result<Vec<ListingEntry>, CrawlError> {
        let budget = self.task_timeout();
        match timeout(budget, self.crawler.crawl(&source.id, date)).await {
            Ok(result) => result,
            Err(_) => Err(CrawlError::TimedOut {
                secs: budget.as_secs(),
            }),
        }
    }
}
