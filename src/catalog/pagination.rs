// 分页控制器
//
// 根据总条目数和每页条数计算分页边界，提供翻页操作，
// 并从任意有序集合中切出当前页的条目。
// 所有操作都不会报错：越界请求被忽略，失效的页码被自动收回到有效范围。

use serde::Serialize;

/// 默认每页条数
pub const DEFAULT_ITEMS_PER_PAGE: usize = 12;

/// 允许的每页条数选项
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [6, 12, 24, 48];

/// 当前页两侧最多显示的页码数
const WINDOW_SIBLINGS: usize = 2;

/// 页码条中的一个元素
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PageToken {
    Page(usize),
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationController {
    current_page: usize,
    items_per_page: usize,
    total_items: usize,
}

impl PaginationController {
    /// 使用默认每页条数，从第一页开始
    pub fn new(total_items: usize) -> Self {
        Self::with_options(total_items, DEFAULT_ITEMS_PER_PAGE, 1)
    }

    /// 指定每页条数和初始页码
    ///
    /// `items_per_page` 为 0 时使用默认值；初始页码按自动校正规则收回到有效范围。
    pub fn with_options(total_items: usize, items_per_page: usize, initial_page: usize) -> Self {
        let items_per_page = if items_per_page == 0 {
            DEFAULT_ITEMS_PER_PAGE
        } else {
            items_per_page
        };

        let mut controller = Self {
            current_page: initial_page.max(1),
            items_per_page,
            total_items,
        };
        controller.clamp_current_page();
        controller
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// 总页数，没有条目时为 0
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.items_per_page)
    }

    pub fn start_index(&self) -> usize {
        (self.current_page - 1) * self.items_per_page
    }

    pub fn end_index(&self) -> usize {
        (self.start_index() + self.items_per_page).min(self.total_items)
    }

    pub fn can_go_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_page > 1
    }

    /// 跳转到指定页，仅接受 `1..=total_pages` 内的页码
    pub fn set_current_page(&mut self, page: usize) {
        if page >= 1 && page <= self.total_pages() {
            self.current_page = page;
        }
    }

    /// 修改每页条数并回到第一页
    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        if items_per_page == 0 {
            return;
        }
        self.items_per_page = items_per_page;
        self.current_page = 1;
    }

    /// 更新总条目数（例如筛选条件改变后），必要时收回当前页
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.clamp_current_page();
    }

    pub fn go_to_next_page(&mut self) {
        if self.can_go_next() {
            self.current_page += 1;
        }
    }

    pub fn go_to_previous_page(&mut self) {
        if self.can_go_previous() {
            self.current_page -= 1;
        }
    }

    pub fn go_to_first_page(&mut self) {
        self.current_page = 1;
    }

    pub fn go_to_last_page(&mut self) {
        let total_pages = self.total_pages();
        if total_pages > 0 {
            self.current_page = total_pages;
        }
    }

    /// 取出当前页的条目，不修改输入集合
    ///
    /// 调用方负责保证 `items.len() == total_items`；若集合更短，窗口按集合长度截断。
    pub fn paginated_items<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = self.end_index().min(items.len());
        let start = self.start_index().min(end);
        &items[start..end]
    }

    /// 页码条：首页和末页始终显示，当前页两侧最多各 2 页，其余用省略号代替
    pub fn page_window(&self) -> Vec<PageToken> {
        let total_pages = self.total_pages();
        if total_pages == 0 {
            return Vec::new();
        }

        let low = self.current_page.saturating_sub(WINDOW_SIBLINGS).max(1);
        let high = (self.current_page + WINDOW_SIBLINGS).min(total_pages);

        let mut tokens = Vec::new();
        if low > 1 {
            tokens.push(PageToken::Page(1));
            if low > 2 {
                tokens.push(PageToken::Ellipsis);
            }
        }
        tokens.extend((low..=high).map(PageToken::Page));
        if high < total_pages {
            if high < total_pages - 1 {
                tokens.push(PageToken::Ellipsis);
            }
            tokens.push(PageToken::Page(total_pages));
        }
        tokens
    }

    fn clamp_current_page(&mut self) {
        let total_pages = self.total_pages();
        if total_pages == 0 {
            self.current_page = 1;
        } else if self.current_page > total_pages {
            self.current_page = total_pages;
        }
    }
}

/// 把请求的每页条数收敛到允许的选项，不支持的值回退为默认值
pub fn normalize_page_size(requested: Option<usize>) -> usize {
    match requested {
        Some(size) if PAGE_SIZE_OPTIONS.contains(&size) => size,
        _ => DEFAULT_ITEMS_PER_PAGE,
    }
}
