//! Article extraction from one print-edition listing page.
//!
//! A listing page holds its articles inside `div.list_body.newsflash_body`.
//! Every anchor under it whose `href` points at `mnews/article` is a
//! candidate; anchors with fewer than [`MIN_TITLE_CHARS`] characters of text
//! (photo thumbnails, icons, "more" links) are dropped, and the first
//! occurrence of each resolved URL wins.
//!
//! # Page labels
//!
//! The printed page (`A12면`) sits in a `span.newspaper_info`, but not
//! always in the same place: ordinary entries carry it next to the title
//! inside the `dt`, the top story of each page carries it in the `dd` of the
//! enclosing `dl`, and a few layouts put it elsewhere nearby. The label is
//! looked up through [`LABEL_TIERS`] in order and the first hit wins.

use crate::models::ListingEntry;
use chrono::Local;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Titles shorter than this, in characters, are navigation noise.
pub const MIN_TITLE_CHARS: usize = 3;

const ARTICLE_HREF_MARKER: &str = "mnews/article";

/// How many ancestors [`LabelTier::Ancestors`] climbs.
const ANCESTOR_DEPTH: usize = 3;

static LISTING_BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.list_body.newsflash_body").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static NEWSPAPER_INFO: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.newspaper_info").unwrap());
static DD: Lazy<Selector> = Lazy::new(|| Selector::parse("dd").unwrap());
static PAGE_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z]?\d+면)").unwrap());

/// One place a page label may live, relative to the article anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTier {
    /// The `dt` holding the anchor (ordinary entries).
    Heading,
    /// The `dd` paired with the anchor's `dt` inside the same `dl` (top stories).
    DefinitionPair,
    /// Anything under the anchor's first few ancestors.
    Ancestors,
}

/// Label lookup order.
pub const LABEL_TIERS: [LabelTier; 3] = [
    LabelTier::Heading,
    LabelTier::DefinitionPair,
    LabelTier::Ancestors,
];

impl LabelTier {
    /// Try this tier for `anchor`.
    pub fn find(self, anchor: ElementRef<'_>) -> Option<String> {
        match self {
            LabelTier::Heading => nearest_ancestor(anchor, "dt").and_then(label_in),
            LabelTier::DefinitionPair => nearest_ancestor(anchor, "dl")
                .and_then(|dl| dl.select(&DD).next())
                .and_then(label_in),
            LabelTier::Ancestors => anchor
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take(ANCESTOR_DEPTH)
                .find_map(label_in),
        }
    }
}

/// Page label for `anchor`, or an empty string when no tier finds one.
pub fn page_label(anchor: ElementRef<'_>) -> String {
    LABEL_TIERS
        .iter()
        .find_map(|tier| tier.find(anchor))
        .unwrap_or_default()
}

/// Extract the articles on one listing page.
///
/// `page_url` resolves relative links. Returns `None` when the page has no
/// listing container at all, which marks the end of the listing.
pub fn extract_listing(html: &str, page_url: &Url) -> Option<Vec<ListingEntry>> {
    let document = Html::parse_document(html);
    let body = document.select(&LISTING_BODY).next()?;
    let collected_at = Local::now();

    let entries = body
        .select(&ANCHOR)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            if !href.contains(ARTICLE_HREF_MARKER) {
                return None;
            }
            let title = anchor.text().flat_map(str::split_whitespace).join(" ");
            if title.chars().count() < MIN_TITLE_CHARS {
                return None;
            }
            let url = page_url.join(href).ok()?;
            Some(ListingEntry {
                title,
                url: url.to_string(),
                page: page_label(anchor),
                collected_at,
            })
        })
        .unique_by(|entry| entry.url.clone())
        .collect();

    Some(entries)
}

fn nearest_ancestor<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == tag)
}

/// First `span.newspaper_info` under `scope`, reduced to its page label.
fn label_in(scope: ElementRef<'_>) -> Option<String> {
    let info = scope.select(&NEWSPAPER_INFO).next()?;
    let text = info.text().collect::<String>();
    PAGE_LABEL
        .captures(&text)
        .map(|caps| caps[1].to_string())
}
