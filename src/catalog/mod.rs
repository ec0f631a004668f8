// 目录核心：筛选与分页
//
// 调用方先用 FilterState 从完整车队中筛出匹配的子集，
// 再交给 PaginationController 切出当前页。

pub mod filter;
pub mod pagination;

pub use filter::{CatalogItem, FilterCriteria, FilterState, PriceRange, SortOption};
pub use pagination::{
    normalize_page_size, PageToken, PaginationController, DEFAULT_ITEMS_PER_PAGE,
    PAGE_SIZE_OPTIONS,
};
