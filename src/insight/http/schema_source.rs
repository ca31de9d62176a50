use super::{HttpInsightObjectTypeOperator, HttpInsightSchemaOperator};
use crate::error::Result;
use crate::http::HttpClientContext;
use crate::insight::{
    InsightObjectTypeDescription, InsightObjectTypeOperator, InsightSchemaDescription,
    InsightSchemaOperator, SchemaSource,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// スキーマ -> オブジェクトタイプ -> 属性 の順にたどってキャッシュ内容を作る
pub struct HttpSchemaSource {
    schemas: HttpInsightSchemaOperator,
    object_types: HttpInsightObjectTypeOperator,
}

impl HttpSchemaSource {
    pub fn new(context: Arc<HttpClientContext>) -> Self {
        Self {
            schemas: HttpInsightSchemaOperator::new(context.clone()),
            object_types: HttpInsightObjectTypeOperator::new(context),
        }
    }
}

#[async_trait]
impl SchemaSource for HttpSchemaSource {
    async fn fetch_schemas(&self) -> Result<Vec<InsightSchemaDescription>> {
        let mut descriptions = Vec::new();
        for schema in self.schemas.get_schemas().await? {
            let object_types = self.object_types.get_object_types_by_schema(schema.id).await?;
            debug!(
                "schema {} has {} object types",
                schema.name,
                object_types.len()
            );
            descriptions.push(InsightSchemaDescription {
                id: schema.id,
                name: schema.name,
                object_types: object_types
                    .iter()
                    .map(InsightObjectTypeDescription::from_schema)
                    .collect(),
            });
        }
        Ok(descriptions)
    }
}
