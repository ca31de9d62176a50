use crate::error::Result;
use serde::Deserialize;
use std::future::Future;

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// startAt / maxResults / total 形式のページ
pub trait HttpPage<T> {
    fn max_results(&self) -> u32;
    fn start_at(&self) -> u32;
    fn total(&self) -> u32;
    fn values(&self) -> &[T];
    fn into_values(self) -> Vec<T>;
}

/// `values` に要素を持つ標準的なページ
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultHttpPage<T> {
    #[serde(rename = "maxResults", default)]
    pub max_results: u32,
    #[serde(rename = "startAt", default)]
    pub start_at: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
}

impl<T> HttpPage<T> for DefaultHttpPage<T> {
    fn max_results(&self) -> u32 {
        self.max_results
    }

    fn start_at(&self) -> u32 {
        self.start_at
    }

    fn total(&self) -> u32 {
        self.total
    }

    fn values(&self) -> &[T] {
        &self.values
    }

    fn into_values(self) -> Vec<T> {
        self.values
    }
}

/// 一覧APIを全件取得する。返却件数が `page_size` 未満になったら終了
pub async fn collect_all<T, F, Fut>(page_size: u32, mut call: F) -> Result<Vec<T>>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let page_size = page_size.max(1);
    let mut index = 0u32;
    let mut elements = Vec::new();
    loop {
        let batch = call(index, page_size).await?;
        let fetched = batch.len() as u32;
        tracing::debug!("fetched {} elements at index {}", fetched, index);
        elements.extend(batch);
        index = index.saturating_add(fetched);
        if fetched < page_size {
            break;
        }
    }
    Ok(elements)
}

/// ページAPIを全件取得する
pub async fn collect_all_pages<T, P, F, Fut>(page_size: u32, mut call: F) -> Result<Vec<T>>
where
    P: HttpPage<T>,
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<P>>,
{
    collect_all(page_size, move |index, size| {
        let page = call(index, size);
        async move { page.await.map(HttpPage::into_values) }
    })
    .await
}
