use serde::{Deserialize, Serialize};

/// 結果集合の1ページ分のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u32,
    pub total_pages: u32,
    pub current_page_index: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    /// ページ番号とページサイズからページを作成
    ///
    /// `page_size` は最低1、かつ `items` の件数以上に揃える。
    /// 件数が1件以上ある場合、`current_page_index` は最終ページを超えない。
    pub fn new(items: Vec<T>, total_items: u32, page_index: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1).max(items.len() as u32);
        let total_pages = total_items.div_ceil(page_size);
        let current_page_index = if total_pages > 0 {
            page_index.min(total_pages - 1)
        } else {
            page_index
        };

        Self {
            items,
            total_items,
            total_pages,
            current_page_index,
            page_size,
        }
    }

    /// startAt / maxResults 形式のページングから作成
    pub fn from_offset(items: Vec<T>, total_items: u32, start_at: u32, max_results: u32) -> Self {
        let page_size = max_results.max(1);
        Self::new(items, total_items, start_at / page_size, page_size)
    }

    pub fn empty(page_size: u32) -> Self {
        Self::new(Vec::new(), 0, 0, page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.current_page_index + 1 < self.total_pages
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            total_pages: self.total_pages,
            current_page_index: self.current_page_index,
            page_size: self.page_size,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty(1)
    }
}
