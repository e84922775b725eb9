//! # papernews
//!
//! Collects Korean news in two ways and emits the results as JSON:
//!
//! - **Print editions**: walks the paginated print-edition listing of many
//!   newspapers for one date, concurrently, tagging each article with its
//!   newspaper and print page and reporting a status per newspaper.
//! - **Keyword search**: queries the structured search API when credentials
//!   are configured, falling back to scraping the public results page when
//!   the API is unavailable or fails.
//!
//! ## Usage
//!
//! ```sh
//! papernews sources
//! papernews papers --date 2025-05-28 --category economic
//! papernews search --keyword 삼성전자 --max 50
//! papernews stock-news -k 급등주 -k 신저가 --date 2025-05-28 --names kospi.txt
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: one pooled HTTP client behind the [`fetch::PageFetcher`] seam
//! 2. **Extraction**: pure HTML-to-record functions per page type
//! 3. **Orchestration**: bounded concurrent crawl with per-source timeouts
//! 4. **Output**: JSON on stdout or under a dated output directory

use chrono::{Local, NaiveDate};
use clap::Parser;
use serde::Serialize;
use std::error::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod fetch;
mod matcher;
mod models;
mod outputs;
mod scrapers;
mod search;
mod utils;

use cli::{Cli, Command};
use config::{Credentials, Settings};
use fetch::HttpFetcher;
use matcher::{KeywordCount, StockMatch, StockNewsMatcher, extract_candidate_names};
use models::{Collection, SearchResultRecord, Source, SourceStatus, dedup_by_url};
use outputs::json;
use scrapers::catalog::{self, Category};
use scrapers::orchestrator::MultiPaperOrchestrator;
use search::SearchClient;

/// Output of the `stock-news` subcommand.
#[derive(Debug, Serialize)]
struct StockNewsReport {
    date: NaiveDate,
    keyword_counts: Vec<KeywordCount>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    matches: Vec<StockMatch>,
    articles: Vec<SearchResultRecord>,
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("papernews starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.output, ?args.command, "Parsed CLI arguments");

    let settings = Settings::load(args.config.as_deref())?;
    let credentials = Credentials::from_parts(args.client_id.clone(), args.client_secret.clone());
    let output = args.output.as_deref();
    let today = Local::now().date_naive();

    match args.command {
        Command::Sources => print_catalog(),
        Command::Papers {
            date,
            category,
            paper,
        } => {
            let date = date.unwrap_or(today);
            let sources = select_sources(category, &paper)?;
            let collection = run_papers(&settings, &sources, date).await?;
            json::emit(&collection, output, date, "papers").await?;
        }
        Command::Search { keyword, max } => {
            let client = SearchClient::new(HttpFetcher::new()?, settings.search.clone(), credentials)?;
            let outcome = client.search_with_outcome(&keyword, max).await;
            if let Some(notice) = &outcome.notice {
                eprintln!("{notice}");
            }
            json::emit(&outcome, output, today, "search").await?;
        }
        Command::StockNews {
            keyword,
            date,
            max,
            names,
        } => {
            let date = date.unwrap_or(today);
            let report = run_stock_news(&settings, credentials, &keyword, date, max, names.as_deref()).await?;
            json::emit(&report, output, date, "stock_news").await?;
        }
    }

    info!(
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "papernews finished"
    );
    Ok(())
}

fn print_catalog() {
    for category in Category::ALL {
        println!("[{}]", category.label());
        for source in catalog::sources_in(category) {
            println!("  {}\t{}", source.id, source.name);
        }
    }
}

/// Sources named on the command line, else one category, else the whole
/// catalog.
fn select_sources(category: Option<Category>, papers: &[String]) -> Result<Vec<Source>, Box<dyn Error>> {
    if !papers.is_empty() {
        return papers
            .iter()
            .map(|p| catalog::find(p).ok_or_else(|| format!("unknown newspaper: {p}").into()))
            .collect();
    }
    Ok(match category {
        Some(category) => catalog::sources_in(category),
        None => catalog::all_sources(),
    })
}

#[instrument(level = "info", skip_all, fields(%date, sources = sources.len()))]
async fn run_papers(settings: &Settings, sources: &[Source], date: NaiveDate) -> Result<Collection, Box<dyn Error>> {
    let orchestrator = MultiPaperOrchestrator::new(HttpFetcher::new()?, settings.collector.clone())?;

    // Single consumer owns all progress display.
    let (tx, mut rx) = mpsc::unbounded_channel::<SourceStatus>();
    let printer = tokio::spawn(async move {
        while let Some(status) = rx.recv().await {
            eprintln!("{status}");
        }
    });

    let mut collection = orchestrator.collect_with_progress(sources, date, Some(&tx)).await;
    drop(tx);
    if let Err(e) = printer.await {
        error!(error = %e, "Progress printer task failed");
    }

    let reported: usize = collection.statuses.iter().map(SourceStatus::count).sum();
    collection.articles = dedup_by_url(collection.articles);
    info!(
        reported,
        unique = collection.articles.len(),
        "Deduplicated articles by URL"
    );
    Ok(collection)
}

#[instrument(level = "info", skip(settings, credentials, names))]
async fn run_stock_news(
    settings: &Settings,
    credentials: Option<Credentials>,
    keywords: &[String],
    date: NaiveDate,
    max: usize,
    names: Option<&str>,
) -> Result<StockNewsReport, Box<dyn Error>> {
    let client = SearchClient::new(HttpFetcher::new()?, settings.search.clone(), credentials)?;
    if !client.api_available() {
        warn!("Stock news is served by the search API only; set NAVER_CLIENT_ID and NAVER_CLIENT_SECRET");
    }
    let articles = client.search_stock_news(keywords, date, max).await;

    let names = match names {
        Some(path) => {
            let text = tokio::fs::read_to_string(path).await?;
            StockNewsMatcher::names_from_lines(&text)
        }
        None => articles
            .iter()
            .flat_map(|a| extract_candidate_names(&format!("{} {}", a.title, a.description)))
            .collect(),
    };
    let matcher = StockNewsMatcher::new(names, keywords.iter().cloned());
    debug!(names = matcher.names().len(), "Instrument names loaded");
    let report = matcher.report(&articles);
    info!(
        articles = articles.len(),
        matched = report.matches.len(),
        "Stock news ready"
    );

    Ok(StockNewsReport {
        date,
        keyword_counts: report.keyword_counts,
        matches: report.matches,
        articles,
    })
}
