use crate::error::Result;
use crate::http::HttpClientContext;
use crate::jira::IssueLinkOperator;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub struct HttpJiraIssueLinkOperator {
    context: Arc<HttpClientContext>,
}

impl HttpJiraIssueLinkOperator {
    pub fn new(context: Arc<HttpClientContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl IssueLinkOperator for HttpJiraIssueLinkOperator {
    async fn create_issue_link(
        &self,
        inward_issue_key: &str,
        outward_issue_key: &str,
        relation_name: &str,
    ) -> Result<()> {
        let body = json!({
            "type": { "name": relation_name },
            "inwardIssue": { "key": inward_issue_key },
            "outwardIssue": { "key": outward_issue_key }
        });

        self.context
            .execute_rest_call("POST", "/rest/api/2/issueLink", &[], Some(body.to_string()), None)
            .await?;
        Ok(())
    }

    async fn delete_issue_link(&self, link_id: &str) -> Result<()> {
        self.context
            .execute_rest_call(
                "DELETE",
                &format!("/rest/api/2/issueLink/{}", link_id),
                &[],
                None,
                None,
            )
            .await?;
        Ok(())
    }
}
