//! Cross-reference keyword search hits with a list of instrument names.
//!
//! A hit belongs to every instrument whose name appears in its title or
//! snippet. Matching is plain substring containment, so short names can
//! match inside longer words.

use crate::models::SearchResultRecord;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

static CANDIDATE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[가-힣]{2,10}(?:주식|증권|기업|회사|주)").unwrap());

const NAME_SUFFIXES: &[&str] = &["주식", "증권", "기업", "회사", "주"];

/// Articles grouped under one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockMatch {
    pub name: String,
    pub articles: Vec<SearchResultRecord>,
    /// Search keywords found in any of the articles.
    pub keywords: BTreeSet<String>,
}

/// How many hits mention a keyword in their title or snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub keyword_counts: Vec<KeywordCount>,
    pub matches: Vec<StockMatch>,
}

#[derive(Debug, Clone, Default)]
pub struct StockNewsMatcher {
    names: BTreeSet<String>,
    keywords: Vec<String>,
}

impl StockNewsMatcher {
    pub fn new<N, K>(names: N, keywords: K) -> Self
    where
        N: IntoIterator<Item = String>,
        K: IntoIterator<Item = String>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
            keywords: keywords
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .unique()
                .collect(),
        }
    }

    /// Parse a name list with one instrument per line. Blank lines and lines
    /// starting with `#` are ignored.
    pub fn names_from_lines(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect()
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    pub fn keyword_counts(&self, articles: &[SearchResultRecord]) -> Vec<KeywordCount> {
        self.keywords
            .iter()
            .map(|keyword| KeywordCount {
                keyword: keyword.clone(),
                count: articles
                    .iter()
                    .filter(|a| a.title.contains(keyword.as_str()) || a.description.contains(keyword.as_str()))
                    .count(),
            })
            .collect()
    }

    /// Group `articles` by instrument, most covered first, ties by name.
    pub fn match_articles(&self, articles: &[SearchResultRecord]) -> Vec<StockMatch> {
        let mut grouped: BTreeMap<&str, StockMatch> = BTreeMap::new();

        for article in articles {
            let text = format!("{} {}", article.title, article.description);
            let found: Vec<&String> = self
                .keywords
                .iter()
                .filter(|k| text.contains(k.as_str()))
                .collect();

            for name in self.names.iter().filter(|n| text.contains(n.as_str())) {
                let entry = grouped.entry(name).or_insert_with(|| StockMatch {
                    name: name.clone(),
                    articles: Vec::new(),
                    keywords: BTreeSet::new(),
                });
                entry.articles.push(article.clone());
                entry.keywords.extend(found.iter().map(|k| k.to_string()));
            }
        }

        grouped
            .into_values()
            .sorted_by(|a, b| {
                b.articles
                    .len()
                    .cmp(&a.articles.len())
                    .then_with(|| a.name.cmp(&b.name))
            })
            .collect()
    }

    pub fn report(&self, articles: &[SearchResultRecord]) -> MatchReport {
        MatchReport {
            keyword_counts: self.keyword_counts(articles),
            matches: self.match_articles(articles),
        }
    }
}

/// Guess instrument names from text: Hangul words ending in a corporate
/// suffix (주식, 증권, 기업, 회사, 주), with the suffix removed. Distinct
/// names in order of first appearance.
pub fn extract_candidate_names(text: &str) -> Vec<String> {
    CANDIDATE_NAME
        .find_iter(text)
        .map(|m| {
            let word = m.as_str();
            NAME_SUFFIXES
                .iter()
                .find_map(|suffix| word.strip_suffix(suffix))
                .unwrap_or(word)
                .to_string()
        })
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PubDate;

    fn hit(title: &str, description: &str) -> SearchResultRecord {
        SearchResultRecord {
            title: title.to_string(),
            link: format!("https://n.news.naver.com/{title}"),
            description: description.to_string(),
            pub_date: PubDate::Raw(String::new()),
            source: "네이버뉴스".to_string(),
            keyword: None,
        }
    }

    fn matcher() -> StockNewsMatcher {
        StockNewsMatcher::new(
            ["삼성전자", "카카오", "에코프로"].map(String::from),
            ["급등주", "신고가", "상한가"].map(String::from),
        )
    }

    fn articles() -> Vec<SearchResultRecord> {
        vec![
            hit("삼성전자 신고가 경신", "반도체 업황 개선"),
            hit("급등주 점검: 카카오", "삼성전자도 강세"),
            hit("에코프로 상한가", "2차전지 급등주 부각"),
            hit("환율 하락", "외국인 순매수"),
        ]
    }

    #[test]
    fn test_groups_by_instrument_and_orders_by_count() {
        let matches = matcher().match_articles(&articles());
        let names: Vec<&str> = matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["삼성전자", "에코프로", "카카오"]);
        assert_eq!(matches[0].articles.len(), 2);
        assert_eq!(
            matches[0].keywords,
            BTreeSet::from(["급등주".to_string(), "신고가".to_string()])
        );
        assert_eq!(
            matches[1].keywords,
            BTreeSet::from(["급등주".to_string(), "상한가".to_string()])
        );
    }

    #[test]
    fn test_keyword_counts_keep_keyword_order() {
        let counts = matcher().keyword_counts(&articles());
        assert_eq!(
            counts,
            vec![
                KeywordCount { keyword: "급등주".into(), count: 2 },
                KeywordCount { keyword: "신고가".into(), count: 1 },
                KeywordCount { keyword: "상한가".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_no_names_no_matches() {
        let matcher = StockNewsMatcher::new(Vec::new(), vec!["급등주".to_string()]);
        assert!(matcher.match_articles(&articles()).is_empty());
        assert_eq!(matcher.report(&articles()).keyword_counts[0].count, 2);
    }

    #[test]
    fn test_names_from_lines() {
        let names = StockNewsMatcher::names_from_lines("# KOSPI\n삼성전자\n\n  카카오  \n");
        assert_eq!(names, vec!["삼성전자", "카카오"]);
    }

    #[test]
    fn test_blank_names_are_dropped() {
        let matcher = StockNewsMatcher::new(vec!["".to_string(), " 카카오 ".to_string()], Vec::new());
        assert_eq!(matcher.names().len(), 1);
        assert!(matcher.names().contains("카카오"));
    }

    #[test]
    fn test_extract_candidate_names() {
        assert_eq!(
            extract_candidate_names("삼성전자주식 매수세, 미래에셋증권 리포트"),
            vec!["삼성전자", "미래에셋"]
        );
        assert_eq!(extract_candidate_names("삼성전자주식 삼성전자주식"), vec!["삼성전자"]);
        assert!(extract_candidate_names("환율 하락").is_empty());
    }
}
