use crate::error::Result;
use crate::http::HttpClientContext;
use crate::insight::{InsightHistory, InsightHistoryItem, InsightHistoryOperator, InsightObjectId};
use async_trait::async_trait;
use std::sync::Arc;

pub struct HttpInsightHistoryOperator {
    context: Arc<HttpClientContext>,
}

impl HttpInsightHistoryOperator {
    pub fn new(context: Arc<HttpClientContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl InsightHistoryOperator for HttpInsightHistoryOperator {
    async fn get_history(&self, object_id: InsightObjectId) -> Result<InsightHistory> {
        let history_items = self
            .context
            .execute_get::<Vec<InsightHistoryItem>>(
                &format!("/rest/insight/1.0/object/{}/history", object_id),
                &[],
            )
            .await?
            .unwrap_or_default();

        Ok(InsightHistory {
            object_id,
            history_items,
        })
    }
}
