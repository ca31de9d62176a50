use crate::error::Result;
use crate::http::{DEFAULT_PAGE_SIZE, HttpClientContext, HttpPage, collect_all_pages, query_params};
use crate::jira::CommentOperator;
use crate::models::{HttpCommentPage, HttpJiraIssueComment, JiraIssueComment};
use crate::page::Page;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub struct HttpJiraCommentOperator {
    context: Arc<HttpClientContext>,
}

impl HttpJiraCommentOperator {
    pub fn new(context: Arc<HttpClientContext>) -> Self {
        Self { context }
    }

    async fn comment_page(&self, issue_key: &str, start_at: u32, max_results: u32) -> Result<HttpCommentPage> {
        let params = query_params([
            ("startAt", start_at.to_string()),
            ("maxResults", max_results.to_string()),
        ]);
        self.context
            .execute_get_body(&format!("/rest/api/2/issue/{}/comment", issue_key), &params)
            .await
    }
}

fn comment_body(content: &str) -> String {
    json!({ "body": content }).to_string()
}

#[async_trait]
impl CommentOperator for HttpJiraCommentOperator {
    async fn get_comments(&self, issue_key: &str) -> Result<Vec<JiraIssueComment>> {
        let comments = collect_all_pages(DEFAULT_PAGE_SIZE, |index, page_size| {
            self.comment_page(issue_key, index, page_size)
        })
        .await?;

        Ok(comments
            .into_iter()
            .map(HttpJiraIssueComment::into_jira_issue_comment)
            .collect())
    }

    async fn get_comments_paginated(
        &self,
        issue_key: &str,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page<JiraIssueComment>> {
        let page = self
            .comment_page(issue_key, page_index.saturating_mul(page_size), page_size)
            .await?;
        let total = page.total();
        let start_at = page.start_at();
        let max_results = page.max_results();
        let comments = page
            .into_values()
            .into_iter()
            .map(HttpJiraIssueComment::into_jira_issue_comment)
            .collect();

        Ok(Page::from_offset(comments, total, start_at, max_results))
    }

    async fn create_comment(&self, issue_key: &str, content: &str) -> Result<()> {
        self.context
            .execute_rest_call(
                "POST",
                &format!("/rest/api/2/issue/{}/comment", issue_key),
                &[],
                Some(comment_body(content)),
                None,
            )
            .await?;
        Ok(())
    }

    async fn update_comment(&self, issue_key: &str, comment_id: &str, content: &str) -> Result<()> {
        self.context
            .execute_rest_call(
                "PUT",
                &format!("/rest/api/2/issue/{}/comment/{}", issue_key, comment_id),
                &[],
                Some(comment_body(content)),
                None,
            )
            .await?;
        Ok(())
    }

    async fn delete_comment(&self, issue_key: &str, comment_id: &str) -> Result<()> {
        self.context
            .execute_rest_call(
                "DELETE",
                &format!("/rest/api/2/issue/{}/comment/{}", issue_key, comment_id),
                &[],
                None,
                None,
            )
            .await?;
        Ok(())
    }
}
