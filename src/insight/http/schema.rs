use super::api::SchemaListResponse;
use crate::error::Result;
use crate::http::HttpClientContext;
use crate::insight::{InsightSchema, InsightSchemaId, InsightSchemaOperator};
use async_trait::async_trait;
use std::sync::Arc;

pub struct HttpInsightSchemaOperator {
    context: Arc<HttpClientContext>,
}

impl HttpInsightSchemaOperator {
    pub fn new(context: Arc<HttpClientContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl InsightSchemaOperator for HttpInsightSchemaOperator {
    async fn get_schemas(&self) -> Result<Vec<InsightSchema>> {
        let list: SchemaListResponse = self
            .context
            .execute_get_body("/rest/insight/1.0/objectschema/list", &[])
            .await?;
        Ok(list.objectschemas)
    }

    async fn get_schema(&self, schema_id: InsightSchemaId) -> Result<Option<InsightSchema>> {
        let path = format!("/rest/insight/1.0/objectschema/{}", schema_id);
        match self.context.execute_get::<InsightSchema>(&path, &[]).await {
            Err(e) if e.status_code() == Some(404) => Ok(None),
            other => other,
        }
    }
}
