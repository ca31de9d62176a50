use crate::error::Result;
use crate::field::{FieldMappings, HttpField, HttpFieldFactory, render_fields};
use crate::http::{
    DEFAULT_PAGE_SIZE, DefaultHttpPage, HttpClientContext, HttpPage, collect_all,
    collect_all_pages, query_params,
};
use crate::jira::{DEFAULT_RESULTS_PER_PAGE, IssueOperator, IssueParser, map_missing_issue};
use crate::models::{HttpJiraIssuePage, HttpMappingField, JiraIssue, invert_names, mappings_from_fields};
use crate::page::Page;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

const SEARCH_PATH: &str = "/rest/api/2/search";
const ISSUE_EXPAND: &str = "names,transitions";

pub struct HttpJiraIssueOperator {
    context: Arc<HttpClientContext>,
    factory: HttpFieldFactory,
    results_per_page: u32,
}

impl HttpJiraIssueOperator {
    pub fn new(context: Arc<HttpClientContext>) -> Self {
        Self {
            context,
            factory: HttpFieldFactory,
            results_per_page: DEFAULT_RESULTS_PER_PAGE,
        }
    }

    /// 全件取得時の1回あたりの件数
    pub fn with_results_per_page(mut self, results_per_page: u32) -> Self {
        self.results_per_page = results_per_page.max(1);
        self
    }

    async fn search(&self, jql: &str, start_at: u32, max_results: u32) -> Result<HttpJiraIssuePage> {
        let params = query_params([
            ("jql", jql.to_string()),
            ("startAt", start_at.to_string()),
            ("maxResults", max_results.to_string()),
            ("expand", ISSUE_EXPAND.to_string()),
        ]);
        self.context.execute_get_body(SEARCH_PATH, &params).await
    }

    /// createmetaから 表示名 -> フィールドID を取得
    async fn get_mappings(&self, project_id: i64, issue_type_id: i64) -> Result<FieldMappings> {
        let path = format!(
            "/rest/api/2/issue/createmeta/{}/issuetypes/{}",
            project_id, issue_type_id
        );
        let fields = collect_all_pages(DEFAULT_PAGE_SIZE, |index, page_size| {
            let params = query_params([
                ("startAt", index.to_string()),
                ("maxResults", page_size.to_string()),
                ("expand", "projects.issuetypes.fields".to_string()),
            ]);
            let path = path.clone();
            async move {
                self.context
                    .execute_get_body::<DefaultHttpPage<HttpMappingField>>(&path, &params)
                    .await
            }
        })
        .await?;

        Ok(mappings_from_fields(fields))
    }

    async fn prepare_request_body(
        &self,
        project_id: i64,
        issue_type_id: i64,
        fields: &[HttpField],
    ) -> Result<String> {
        let mappings = self.get_mappings(project_id, issue_type_id).await?;
        Ok(render_fields(fields, &mappings).to_string())
    }
}

fn parse_issues<T>(page: HttpJiraIssuePage, parser: &IssueParser<T>) -> Result<Vec<T>> {
    if page.total() == 0 {
        return Ok(Vec::new());
    }
    let mappings = page.mappings();
    page.into_values()
        .iter()
        .map(|issue| parser(issue, &mappings))
        .collect()
}

#[async_trait]
impl IssueOperator for HttpJiraIssueOperator {
    type Field = HttpField;
    type Factory = HttpFieldFactory;

    fn field_factory(&self) -> &HttpFieldFactory {
        &self.factory
    }

    async fn get_issues_by_jql<T>(&self, jql: &str, parser: &IssueParser<T>) -> Result<Vec<T>>
    where
        T: Send,
    {
        collect_all(self.results_per_page, |index, page_size| async move {
            let page = self.search(jql, index, page_size).await?;
            parse_issues(page, parser)
        })
        .await
    }

    async fn get_issues_by_jql_paginated<T>(
        &self,
        jql: &str,
        page_index: u32,
        page_size: u32,
        parser: &IssueParser<T>,
    ) -> Result<Page<T>>
    where
        T: Send,
    {
        let start_at = page_index.saturating_mul(page_size);
        let page = self.search(jql, start_at, page_size).await?;
        let total = page.total();
        let start_at = page.start_at();
        let max_results = page.max_results();
        let issues = parse_issues(page, parser)?;

        Ok(Page::from_offset(issues, total, start_at, max_results))
    }

    async fn get_issue_by_key<T>(&self, key: &str, parser: &IssueParser<T>) -> Result<Option<T>>
    where
        T: Send,
    {
        let params = query_params([("expand", ISSUE_EXPAND.to_string())]);
        let body = match self
            .context
            .execute_get_call(&format!("/rest/api/2/issue/{}", key), &params)
            .await
        {
            Ok(body) => body,
            // 404は課題なしとして扱う
            Err(e) if e.status_code() == Some(404) => return Ok(None),
            Err(e) => return Err(e),
        };

        let issue: Value = serde_json::from_str(&body)?;
        if issue.get("id").is_none() {
            return Ok(None);
        }
        let mappings = invert_names(&issue["names"]);
        parser(&issue, &mappings).map(Some)
    }

    async fn create_issue(
        &self,
        project_id: i64,
        issue_type_id: i64,
        fields: Vec<HttpField>,
    ) -> Result<Option<JiraIssue>> {
        let body = self
            .prepare_request_body(project_id, issue_type_id, &fields)
            .await?;

        let response = self
            .context
            .execute_rest::<JiraIssue>("POST", "/rest/api/2/issue", &[], Some(body))
            .await?;
        Ok(response.body)
    }

    async fn update_issue(
        &self,
        project_id: i64,
        issue_type_id: i64,
        issue_key: &str,
        fields: Vec<HttpField>,
    ) -> Result<()> {
        let body = self
            .prepare_request_body(project_id, issue_type_id, &fields)
            .await?;

        self.context
            .execute_rest_call(
                "PUT",
                &format!("/rest/api/2/issue/{}", issue_key),
                &[],
                Some(body),
                None,
            )
            .await
            .map_err(|e| map_missing_issue(issue_key, e))?;
        Ok(())
    }

    async fn delete_issue(&self, issue_key: &str) -> Result<()> {
        self.context
            .execute_rest_call(
                "DELETE",
                &format!("/rest/api/2/issue/{}", issue_key),
                &[],
                None,
                None,
            )
            .await
            .map_err(|e| map_missing_issue(issue_key, e))?;
        Ok(())
    }
}
