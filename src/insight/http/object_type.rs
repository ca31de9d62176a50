use crate::error::Result;
use crate::http::HttpClientContext;
use crate::insight::{
    InsightObjectTypeId, InsightObjectTypeOperator, InsightSchemaId, ObjectTypeSchema,
    ObjectTypeSchemaAttribute,
};
use async_trait::async_trait;
use std::sync::Arc;

pub struct HttpInsightObjectTypeOperator {
    context: Arc<HttpClientContext>,
}

impl HttpInsightObjectTypeOperator {
    pub fn new(context: Arc<HttpClientContext>) -> Self {
        Self { context }
    }

    /// `objecttype/{id}/attributes` で属性定義を埋める
    async fn populate_attributes(&self, mut object_type: ObjectTypeSchema) -> Result<ObjectTypeSchema> {
        object_type.attributes = self
            .context
            .execute_get::<Vec<ObjectTypeSchemaAttribute>>(
                &format!("/rest/insight/1.0/objecttype/{}/attributes", object_type.id),
                &[],
            )
            .await?
            .unwrap_or_default();
        Ok(object_type)
    }
}

#[async_trait]
impl InsightObjectTypeOperator for HttpInsightObjectTypeOperator {
    async fn get_object_type(
        &self,
        object_type_id: InsightObjectTypeId,
    ) -> Result<Option<ObjectTypeSchema>> {
        let path = format!("/rest/insight/1.0/objecttype/{}", object_type_id);
        let object_type = match self.context.execute_get::<ObjectTypeSchema>(&path, &[]).await {
            Err(e) if e.status_code() == Some(404) => return Ok(None),
            other => other?,
        };

        match object_type {
            Some(object_type) => self.populate_attributes(object_type).await.map(Some),
            None => Ok(None),
        }
    }

    async fn get_object_types_by_schema(
        &self,
        schema_id: InsightSchemaId,
    ) -> Result<Vec<ObjectTypeSchema>> {
        let object_types = self
            .context
            .execute_get::<Vec<ObjectTypeSchema>>(
                &format!("/rest/insight/1.0/objectschema/{}/objecttypes/flat", schema_id),
                &[],
            )
            .await?
            .unwrap_or_default();

        let mut populated = Vec::with_capacity(object_types.len());
        for object_type in object_types {
            populated.push(self.populate_attributes(object_type).await?);
        }
        Ok(populated)
    }
}
