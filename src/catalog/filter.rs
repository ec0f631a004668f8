// 车辆筛选状态
//
// 保存用户选择的筛选条件（搜索词、价格区间、年份、车型级别、排序），
// 并计算当前生效的筛选条件数量。

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 可被筛选的目录条目
pub trait CatalogItem {
    /// 参与全文搜索的文本（品牌、型号、名称等）
    fn search_text(&self) -> String;
    fn price(&self) -> i64;
    fn year(&self) -> i32;
    fn category(&self) -> &str;
    fn popularity(&self) -> i32;
}

/// 价格区间（闭区间），不校验 min <= max
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}

impl PriceRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// 集合中实际出现的价格范围，空集合时为 `0..=0`
    pub fn observed<T: CatalogItem>(items: &[T]) -> Self {
        let min = items.iter().map(CatalogItem::price).min().unwrap_or(0);
        let max = items.iter().map(CatalogItem::price).max().unwrap_or(0);
        Self { min, max }
    }

    pub fn contains(&self, price: i64) -> bool {
        price >= self.min && price <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    #[default]
    Popular,
    PriceAsc,
    PriceDesc,
    YearNewest,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::Popular,
        SortOption::PriceAsc,
        SortOption::PriceDesc,
        SortOption::YearNewest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Popular => "popular",
            SortOption::PriceAsc => "price_asc",
            SortOption::PriceDesc => "price_desc",
            SortOption::YearNewest => "year_newest",
        }
    }

    fn compare<T: CatalogItem>(&self, a: &T, b: &T) -> Ordering {
        match self {
            SortOption::Popular => b.popularity().cmp(&a.popularity()),
            SortOption::PriceAsc => a.price().cmp(&b.price()),
            SortOption::PriceDesc => b.price().cmp(&a.price()),
            SortOption::YearNewest => b.year().cmp(&a.year()),
        }
    }
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(SortOption::Popular),
            "price_asc" => Ok(SortOption::PriceAsc),
            "price_desc" => Ok(SortOption::PriceDesc),
            "year_newest" => Ok(SortOption::YearNewest),
            _ => Err(format!("Invalid sort option: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub search_text: String,
    pub price_range: PriceRange,
    pub year: Option<i32>,
    pub category: Option<String>,
    pub sort: SortOption,
}

impl FilterCriteria {
    fn with_defaults(price_range: PriceRange) -> Self {
        Self {
            search_text: String::new(),
            price_range,
            year: None,
            category: None,
            sort: SortOption::default(),
        }
    }

    pub fn matches<T: CatalogItem>(&self, item: &T) -> bool {
        let needle = self.search_text.trim().to_lowercase();
        if !needle.is_empty() && !item.search_text().to_lowercase().contains(&needle) {
            return false;
        }

        if !self.price_range.contains(item.price()) {
            return false;
        }

        if let Some(year) = self.year {
            if item.year() != year {
                return false;
            }
        }

        if let Some(ref category) = self.category {
            if item.category() != category.as_str() {
                return false;
            }
        }

        true
    }
}

/// 筛选状态
///
/// 默认价格区间在构造时给定，`reset` 会恢复到它。
#[derive(Debug, Clone)]
pub struct FilterState {
    default_price_range: PriceRange,
    criteria: FilterCriteria,
}

impl FilterState {
    pub fn new(default_price_range: PriceRange) -> Self {
        Self {
            default_price_range,
            criteria: FilterCriteria::with_defaults(default_price_range),
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn default_price_range(&self) -> PriceRange {
        self.default_price_range
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.criteria.search_text = text.into();
    }

    pub fn set_price_range(&mut self, min: i64, max: i64) {
        self.criteria.price_range = PriceRange::new(min, max);
    }

    pub fn set_year(&mut self, year: Option<i32>) {
        self.criteria.year = year;
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.criteria.category = category;
    }

    pub fn set_sort(&mut self, sort: SortOption) {
        self.criteria.sort = sort;
    }

    pub fn reset(&mut self) {
        self.criteria = FilterCriteria::with_defaults(self.default_price_range);
    }

    /// 偏离默认值的筛选条件数量（排序不计入）
    pub fn active_filter_count(&self) -> usize {
        let criteria = &self.criteria;
        [
            !criteria.search_text.trim().is_empty(),
            criteria.price_range != self.default_price_range,
            criteria.year.is_some(),
            criteria.category.is_some(),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }

    /// 按当前条件筛选并排序，返回新的集合
    ///
    /// 排序是稳定的，相同排序键的条目保持原有顺序。
    pub fn apply<T: CatalogItem + Clone>(&self, items: &[T]) -> Vec<T> {
        let mut matched: Vec<T> = items
            .iter()
            .filter(|item| self.criteria.matches(*item))
            .cloned()
            .collect();
        matched.sort_by(|a, b| self.criteria.sort.compare(a, b));
        matched
    }
}
