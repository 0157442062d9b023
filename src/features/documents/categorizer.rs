//! Keyword-based auto-categorization of documents.
//!
//! The first label (in table order) whose keywords occur anywhere in
//! `title + description` wins. Matching is plain substring search, so
//! `稅` also matches `節稅` and `遺產稅`.

/// Label used when no keyword matches
pub const FALLBACK_CATEGORY: &str = "其他";

const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "保險",
        &["保險", "保單", "理賠", "壽險", "醫療險", "意外險", "年金", "保費", "投保"],
    ),
    (
        "投資",
        &["投資", "基金", "股票", "美股", "債券", "ETF", "配置", "報酬", "股息"],
    ),
    ("市場", &["市場", "經濟", "利率", "通膨", "總經", "央行"]),
    ("稅務", &["稅", "遺產", "贈與", "節稅"]),
];

pub fn categorize(title: &str, description: &str) -> &'static str {
    let text = format!("{}{}", title, description);

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(label, _)| *label)
        .unwrap_or(FALLBACK_CATEGORY)
}

/// Every label `categorize` can return, fallback last
pub fn labels() -> impl Iterator<Item = &'static str> {
    CATEGORY_KEYWORDS
        .iter()
        .map(|(label, _)| *label)
        .chain(std::iter::once(FALLBACK_CATEGORY))
}
