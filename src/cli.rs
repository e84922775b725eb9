//! Command-line interface definitions for papernews.
//!
//! Search credentials can come from flags or from the environment; without
//! both halves the search subcommands use scraped web results.

use crate::scrapers::catalog::Category;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Command-line arguments for papernews.
///
/// # Examples
///
/// ```sh
/// # Every economic daily for one date, written under ./out
/// papernews --output ./out papers --date 2025-05-28 --category economic
///
/// # Keyword search, API first when NAVER_CLIENT_ID/SECRET are set
/// papernews search --keyword 삼성전자 --max 50
///
/// # Same-day stock news for several keywords, matched against a name list
/// papernews stock-news -k 급등주 -k 신저가 --date 2025-05-28 --names kospi.txt
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory to write JSON results into (stdout when omitted)
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Search API client id
    #[arg(long, env = "NAVER_CLIENT_ID", global = true, hide_env_values = true)]
    pub client_id: Option<String>,

    /// Search API client secret
    #[arg(long, env = "NAVER_CLIENT_SECRET", global = true, hide_env_values = true)]
    pub client_secret: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the built-in newspaper catalog
    Sources,

    /// Collect print-edition article listings for one date
    Papers {
        /// Edition date (YYYY-MM-DD), today when omitted
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Restrict to one catalog category
        #[arg(long, value_enum, conflicts_with = "paper")]
        category: Option<Category>,

        /// Newspaper name or id; repeat for several
        #[arg(short, long)]
        paper: Vec<String>,
    },

    /// Keyword news search
    Search {
        #[arg(short, long)]
        keyword: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 100)]
        max: usize,
    },

    /// Same-day news for market keywords, optionally grouped by instrument
    StockNews {
        /// Search keyword; repeat for several
        #[arg(short, long, required = true)]
        keyword: Vec<String>,

        /// Publication date (YYYY-MM-DD), today when omitted
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Maximum number of articles across all keywords
        #[arg(short, long, default_value_t = 100)]
        max: usize,

        /// File with one instrument name per line
        #[arg(long)]
        names: Option<String>,
    },
}
