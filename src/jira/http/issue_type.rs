use crate::error::Result;
use crate::http::{
    DEFAULT_PAGE_SIZE, DefaultHttpPage, HttpClientContext, collect_all_pages, query_params,
};
use crate::jira::IssueTypeOperator;
use crate::models::{
    HttpJiraIssueType, HttpJiraIssueTypeAttribute, JiraIssueType, JiraIssueTypeAttribute,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub struct HttpJiraIssueTypeOperator {
    context: Arc<HttpClientContext>,
}

impl HttpJiraIssueTypeOperator {
    pub fn new(context: Arc<HttpClientContext>) -> Self {
        Self { context }
    }

    /// createmetaの一覧を全ページ取得
    async fn collect_createmeta<T>(&self, path: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        collect_all_pages(DEFAULT_PAGE_SIZE, |index, page_size| {
            let params = query_params([
                ("startAt", index.to_string()),
                ("maxResults", page_size.to_string()),
            ]);
            async move {
                self.context
                    .execute_get_body::<DefaultHttpPage<T>>(path, &params)
                    .await
            }
        })
        .await
    }
}

#[async_trait]
impl IssueTypeOperator for HttpJiraIssueTypeOperator {
    async fn get_issue_types(&self, project_id: i64) -> Result<Vec<JiraIssueType>> {
        let path = format!("/rest/api/2/issue/createmeta/{}/issuetypes", project_id);
        let issue_types: Vec<HttpJiraIssueType> = self.collect_createmeta(&path).await?;

        Ok(issue_types
            .into_iter()
            .map(HttpJiraIssueType::into_jira_issue_type)
            .collect())
    }

    async fn get_issue_type(&self, issue_type_id: i64) -> Result<Option<JiraIssueType>> {
        let issue_type = self
            .context
            .execute_get::<HttpJiraIssueType>(&format!("/rest/api/2/issuetype/{}", issue_type_id), &[])
            .await?;
        Ok(issue_type.map(HttpJiraIssueType::into_jira_issue_type))
    }

    async fn get_attributes_of_issue_type(
        &self,
        project_id: i64,
        issue_type_id: i64,
    ) -> Result<Vec<JiraIssueTypeAttribute>> {
        let path = format!(
            "/rest/api/2/issue/createmeta/{}/issuetypes/{}",
            project_id, issue_type_id
        );
        let attributes: Vec<HttpJiraIssueTypeAttribute> = self.collect_createmeta(&path).await?;

        Ok(attributes
            .into_iter()
            .map(HttpJiraIssueTypeAttribute::into_jira_issue_type_attribute)
            .collect())
    }
}
