//! Print-edition acquisition: newspaper listing pages, walked per source and
//! fanned out across sources.
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Built-in newspaper names and ids, grouped by category |
//! | [`listing`] | Pure extraction of articles and page labels from one listing page |
//! | [`paper`] | Paginated crawl of one newspaper for one date |
//! | [`orchestrator`] | Concurrent crawl of many newspapers with per-source status |
//!
//! Articles leave this module tagged with their newspaper but not
//! deduplicated across newspapers; callers apply
//! [`dedup_by_url`](crate::models::dedup_by_url) afterwards.

pub mod catalog;
pub mod listing;
pub mod orchestrator;
pub mod paper;
