use super::api::{ObjectEditItem, ObjectEntriesResponse, ObjectUpdateResponse};
use crate::error::{Error, Result};
use crate::http::{HttpClientContext, QueryParams, collect_all, query_params};
use crate::insight::cache::InsightSchemaCache;
use crate::insight::{
    DEFAULT_OBJECTS_PER_PAGE, InsightAttribute, InsightObject, InsightObjectId,
    InsightObjectOperator, InsightObjectTypeId, ObjectAttributeValue, object_type_iql,
};
use crate::page::Page;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const IQL_OBJECTS_PATH: &str = "/rest/insight/1.0/iql/objects";

pub struct HttpInsightObjectOperator {
    context: Arc<HttpClientContext>,
    cache: Arc<InsightSchemaCache>,
    results_per_page: u32,
}

impl HttpInsightObjectOperator {
    pub fn new(context: Arc<HttpClientContext>, cache: Arc<InsightSchemaCache>) -> Self {
        Self {
            context,
            cache,
            results_per_page: DEFAULT_OBJECTS_PER_PAGE,
        }
    }

    /// 全件取得時のページサイズ
    pub fn with_results_per_page(mut self, results_per_page: u32) -> Self {
        self.results_per_page = results_per_page.max(1);
        self
    }

    /// IQL検索の共通パラメーター。`page` は1始まり
    fn iql_params(iql: &str, page: Option<(u32, u32)>) -> QueryParams {
        let mut params = query_params([
            ("iql", iql.to_string()),
            ("includeTypeAttributes", "true".to_string()),
            ("includeExtendedInfo", "true".to_string()),
        ]);
        if let Some((page_index, page_size)) = page {
            params.push(("page".to_string(), (u64::from(page_index) + 1).to_string()));
            params.push(("resultPerPage".to_string(), page_size.to_string()));
        }
        params
    }

    async fn search(&self, params: &[(String, String)]) -> Result<(u32, Vec<InsightObject>)> {
        let response: Option<ObjectEntriesResponse> =
            self.context.execute_get(IQL_OBJECTS_PATH, params).await?;
        let Some(response) = response else {
            return Ok((0, Vec::new()));
        };

        // キャッシュ未初期化でもレスポンス内の属性名で変換できる
        let snapshot = self.cache.snapshot().await.ok();
        let objects = response
            .object_entries
            .into_iter()
            .map(|entry| entry.into_object(self.context.base_url(), snapshot.as_deref()))
            .collect();
        Ok((response.total_filter_count, objects))
    }

    /// 先頭ページの最初の1件
    async fn get_object_by_plain_iql(&self, iql: &str) -> Result<Option<InsightObject>> {
        let (_, objects) = self.search(&Self::iql_params(iql, None)).await?;
        Ok(objects.into_iter().next())
    }

    async fn send_edit(
        &self,
        method: &str,
        path: &str,
        item: &ObjectEditItem,
    ) -> Result<InsightObjectId> {
        let body = serde_json::to_string(item)?;
        let response = self
            .context
            .execute_rest::<ObjectUpdateResponse>(method, path, &[], Some(body))
            .await?;
        let updated = response.body.ok_or_else(|| {
            Error::JsonParsing(format!("Empty response body from {}", path))
        })?;
        debug!("{} object {} ({})", method, updated.object_key, updated.id);
        Ok(updated.id)
    }
}

#[async_trait]
impl InsightObjectOperator for HttpInsightObjectOperator {
    async fn get_object_by_id(&self, id: InsightObjectId) -> Result<Option<InsightObject>> {
        self.get_object_by_plain_iql(&format!("objectId={}", id))
            .await
    }

    async fn get_object_by_key(&self, key: &str) -> Result<Option<InsightObject>> {
        self.get_object_by_plain_iql(&format!("Key=\"{}\"", key))
            .await
    }

    async fn get_object_by_name(
        &self,
        object_type_id: InsightObjectTypeId,
        name: &str,
    ) -> Result<Option<InsightObject>> {
        self.get_object_by_plain_iql(&format!(
            "{} AND Name=\"{}\"",
            object_type_iql(object_type_id, false),
            name
        ))
        .await
    }

    async fn get_objects_by_object_type_name(
        &self,
        object_type_name: &str,
    ) -> Result<Vec<InsightObject>> {
        let iql = format!("objectType={}", object_type_name);
        collect_all(self.results_per_page, |index, page_size| {
            let params = Self::iql_params(&iql, Some((index / page_size, page_size)));
            async move { self.search(&params).await.map(|(_, objects)| objects) }
        })
        .await
    }

    async fn get_objects_by_iql(
        &self,
        iql: &str,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page<InsightObject>> {
        let page_size = page_size.max(1);
        let (total, objects) = self
            .search(&Self::iql_params(iql, Some((page_index, page_size))))
            .await?;
        Ok(Page::new(objects, total, page_index, page_size))
    }

    async fn get_object_count(&self, iql: &str) -> Result<u32> {
        let params = query_params([
            ("iql", iql.to_string()),
            ("page", "1".to_string()),
            ("resultsPerPage", "1".to_string()),
        ]);
        let body: Value = self.context.execute_get_body(IQL_OBJECTS_PATH, &params).await?;
        body.get("totalFilterCount")
            .and_then(Value::as_u64)
            .map(|count| u32::try_from(count).unwrap_or(u32::MAX))
            .ok_or_else(|| Error::JsonParsing("totalFilterCount missing".to_string()))
    }

    async fn create_object(
        &self,
        object_type_id: InsightObjectTypeId,
        attributes: Vec<InsightAttribute>,
    ) -> Result<InsightObject> {
        let item = ObjectEditItem::new(object_type_id, &attributes);
        let id = self
            .send_edit("POST", "/rest/insight/1.0/object/create", &item)
            .await?;

        self.get_object_by_id(id).await?.ok_or_else(|| {
            Error::internal(
                "InsightObject create failed.",
                "Could not retrieve the object after seemingly successful creation.",
            )
        })
    }

    async fn create_object_by_attribute_names(
        &self,
        object_type_id: InsightObjectTypeId,
        attributes: Vec<(String, Vec<ObjectAttributeValue>)>,
    ) -> Result<InsightObject> {
        let snapshot = self.cache.snapshot().await?;
        let attributes = attributes
            .into_iter()
            .map(|(name, values)| {
                let attribute_id = snapshot.attribute_id(object_type_id, &name).ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "Unknown attribute '{}' for object type {}",
                        name, object_type_id
                    ))
                })?;
                Ok(InsightAttribute {
                    attribute_id,
                    attribute_name: name,
                    values,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.create_object(object_type_id, attributes).await
    }

    async fn update_object(&self, object: &InsightObject) -> Result<InsightObject> {
        let item = ObjectEditItem::new(object.object_type_id, &object.attributes);
        let id = self
            .send_edit(
                "PUT",
                &format!("/rest/insight/1.0/object/{}", object.id),
                &item,
            )
            .await?;

        self.get_object_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Object {} not found after update", id)))
    }

    async fn delete_object(&self, id: InsightObjectId) -> Result<()> {
        self.context
            .execute_rest_call(
                "DELETE",
                &format!("/rest/insight/1.0/object/{}", id),
                &[],
                None,
                None,
            )
            .await?;
        Ok(())
    }
}
