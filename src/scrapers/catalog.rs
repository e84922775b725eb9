//! Built-in newspaper catalog, grouped the way the print editions are sold.

use crate::models::Source;
use serde::Serialize;

/// Newspaper groupings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// 경제신문
    Economic,
    /// 종합일간지
    General,
    /// 석간신문
    Evening,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Economic => "경제신문",
            Category::General => "종합일간지",
            Category::Evening => "석간신문",
        }
    }

    pub const ALL: [Category; 3] = [Category::Economic, Category::General, Category::Evening];
}

const CATALOG: &[(Category, &str, &str)] = &[
    (Category::Economic, "매일경제", "009"),
    (Category::Economic, "머니투데이", "008"),
    (Category::Economic, "서울경제", "011"),
    (Category::Economic, "이데일리", "018"),
    (Category::Economic, "파이낸셜뉴스", "014"),
    (Category::Economic, "한국경제", "015"),
    (Category::General, "경향신문", "032"),
    (Category::General, "국민일보", "005"),
    (Category::General, "동아일보", "020"),
    (Category::General, "서울신문", "081"),
    (Category::General, "세계일보", "022"),
    (Category::General, "조선일보", "023"),
    (Category::General, "중앙일보", "025"),
    (Category::General, "한겨레", "028"),
    (Category::General, "한국일보", "469"),
    (Category::General, "디지털타임스", "029"),
    (Category::General, "전자신문", "030"),
    (Category::Evening, "문화일보", "021"),
    (Category::Evening, "헤럴드경제", "016"),
    (Category::Evening, "아시아경제", "277"),
];

/// Every newspaper in `category`, in catalog order.
pub fn sources_in(category: Category) -> Vec<Source> {
    CATALOG
        .iter()
        .filter(|(c, _, _)| *c == category)
        .map(|(_, name, id)| Source::new(*name, *id))
        .collect()
}

/// Every newspaper in the catalog.
pub fn all_sources() -> Vec<Source> {
    CATALOG
        .iter()
        .map(|(_, name, id)| Source::new(*name, *id))
        .collect()
}

/// Look a newspaper up by display name or by id.
pub fn find(name_or_id: &str) -> Option<Source> {
    let needle = name_or_id.trim();
    CATALOG
        .iter()
        .find(|(_, name, id)| *name == needle || *id == needle)
        .map(|(_, name, id)| Source::new(*name, *id))
}
