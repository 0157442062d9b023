//! Static sample content shown on the section pages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::documents::models::DocumentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Subcategory {
    Products,
    Proposals,
    Promotions,
    Info,
    Quotes,
    Daily,
    Macro,
    Stocks,
}

impl Subcategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subcategory::Products => "products",
            Subcategory::Proposals => "proposals",
            Subcategory::Promotions => "promotions",
            Subcategory::Info => "info",
            Subcategory::Quotes => "quotes",
            Subcategory::Daily => "daily",
            Subcategory::Macro => "macro",
            Subcategory::Stocks => "stocks",
        }
    }
}

impl fmt::Display for Subcategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subcategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(Subcategory::Products),
            "proposals" => Ok(Subcategory::Proposals),
            "promotions" => Ok(Subcategory::Promotions),
            "info" => Ok(Subcategory::Info),
            "quotes" => Ok(Subcategory::Quotes),
            "daily" => Ok(Subcategory::Daily),
            "macro" => Ok(Subcategory::Macro),
            "stocks" => Ok(Subcategory::Stocks),
            other => Err(format!("Unknown subcategory: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentItem {
    pub title: &'static str,
    pub summary: &'static str,
    pub date: &'static str,
}

#[derive(Debug)]
pub struct ContentSection {
    pub category: DocumentType,
    pub subcategory: Subcategory,
    pub heading: &'static str,
    pub items: &'static [ContentItem],
}

const fn item(title: &'static str, summary: &'static str, date: &'static str) -> ContentItem {
    ContentItem {
        title,
        summary,
        date,
    }
}

static CATALOG: &[ContentSection] = &[
    ContentSection {
        category: DocumentType::Insurance,
        subcategory: Subcategory::Products,
        heading: "保險商品",
        items: &[
            item("安心終身醫療險", "住院日額與手術給付，保障終身", "2024-03-01"),
            item("穩健還本年金險", "六年期繳，第七年起每年領回", "2024-02-15"),
            item("樂活意外傷害險", "意外身故、失能與實支實付", "2024-01-20"),
        ],
    },
    ContentSection {
        category: DocumentType::Insurance,
        subcategory: Subcategory::Proposals,
        heading: "建議書範本",
        items: &[
            item("新婚家庭保障規劃", "壽險與醫療險組合範例", "2024-03-05"),
            item("退休金缺口試算", "年金險搭配儲蓄險的建議書", "2024-02-10"),
        ],
    },
    ContentSection {
        category: DocumentType::Insurance,
        subcategory: Subcategory::Promotions,
        heading: "優惠活動",
        items: &[
            item("春季投保優惠", "指定商品首年保費九五折", "2024-03-10"),
            item("保單健檢月", "免費保單檢視與缺口分析", "2024-02-01"),
        ],
    },
    ContentSection {
        category: DocumentType::Insurance,
        subcategory: Subcategory::Info,
        heading: "保險資訊",
        items: &[
            item("理賠申請流程", "文件準備與送件時程說明", "2024-01-15"),
            item("保單借款須知", "利率計算與還款方式", "2023-12-20"),
        ],
    },
    ContentSection {
        category: DocumentType::Investment,
        subcategory: Subcategory::Quotes,
        heading: "市場報價",
        items: &[
            item("主要指數收盤", "台股、美股、日股指數彙整", "2024-03-12"),
            item("匯率走勢", "美元、日圓、人民幣兌台幣", "2024-03-12"),
        ],
    },
    ContentSection {
        category: DocumentType::Investment,
        subcategory: Subcategory::Daily,
        heading: "每日晨報",
        items: &[
            item("晨間市場摘要", "隔夜美股與亞洲開盤重點", "2024-03-12"),
            item("債市日報", "公債殖利率與信用利差變化", "2024-03-11"),
        ],
    },
    ContentSection {
        category: DocumentType::Investment,
        subcategory: Subcategory::Macro,
        heading: "總經觀點",
        items: &[
            item("聯準會利率展望", "點陣圖與降息時點分析", "2024-03-08"),
            item("通膨數據解讀", "CPI 與 PCE 最新走勢", "2024-02-28"),
        ],
    },
    ContentSection {
        category: DocumentType::Investment,
        subcategory: Subcategory::Stocks,
        heading: "個股研究",
        items: &[
            item("半導體產業展望", "AI 需求帶動先進製程", "2024-03-06"),
            item("高股息 ETF 比較", "殖利率、成分股與費用率", "2024-02-22"),
        ],
    },
];

/// Section for a category pair; `None` when the pair is not in the catalog
pub fn lookup(category: DocumentType, subcategory: Subcategory) -> Option<&'static ContentSection> {
    CATALOG
        .iter()
        .find(|s| s.category == category && s.subcategory == subcategory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_section_is_reachable() {
        for section in CATALOG {
            let found = lookup(section.category, section.subcategory).unwrap();
            assert!(!found.items.is_empty());
        }
        assert_eq!(CATALOG.len(), 8);
    }

    #[test]
    fn test_cross_category_pairs_are_absent() {
        assert!(lookup(DocumentType::Insurance, Subcategory::Quotes).is_none());
        assert!(lookup(DocumentType::Investment, Subcategory::Products).is_none());
        assert_eq!(
            lookup(DocumentType::Investment, Subcategory::Macro).unwrap().heading,
            "總經觀點"
        );
    }

    #[test]
    fn test_subcategory_parse() {
        assert_eq!("daily".parse::<Subcategory>(), Ok(Subcategory::Daily));
        assert!("weekly".parse::<Subcategory>().is_err());
    }
}
