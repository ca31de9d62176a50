use crate::error::Result;
use crate::http::HttpClientContext;
use crate::jira::ProjectOperator;
use crate::models::JiraProject;
use async_trait::async_trait;
use std::sync::Arc;

pub struct HttpJiraProjectOperator {
    context: Arc<HttpClientContext>,
}

impl HttpJiraProjectOperator {
    pub fn new(context: Arc<HttpClientContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ProjectOperator for HttpJiraProjectOperator {
    async fn get_projects(&self) -> Result<Vec<JiraProject>> {
        let projects = self
            .context
            .execute_get::<Vec<JiraProject>>("/rest/api/2/project", &[])
            .await?;
        Ok(projects.unwrap_or_default())
    }

    async fn get_project(&self, project_id: i64) -> Result<Option<JiraProject>> {
        let path = format!("/rest/api/2/project/{}", project_id);
        match self.context.execute_get::<JiraProject>(&path, &[]).await {
            Err(e) if e.status_code() == Some(404) => Ok(None),
            other => other,
        }
    }
}
