use super::{CommentStore, HostComment, IssueStore, MutableIssue, existing_issue, parse_id};
use crate::error::{Error, Result};
use crate::jira::CommentOperator;
use crate::models::JiraIssueComment;
use crate::page::Page;
use async_trait::async_trait;
use std::sync::Arc;

/// REST APIの `created` と同じ書式
const COMMENT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

pub struct NativeCommentOperator<H> {
    host: Arc<H>,
}

impl<H> NativeCommentOperator<H>
where
    H: IssueStore + CommentStore + 'static,
{
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    fn all_comments(&self, issue: &MutableIssue) -> Result<Vec<JiraIssueComment>> {
        let comments = self
            .host
            .comments(issue)
            .map_err(|e| Error::native(&e))?;
        Ok(comments.iter().map(to_jira_issue_comment).collect())
    }
}

fn to_jira_issue_comment(comment: &HostComment) -> JiraIssueComment {
    JiraIssueComment {
        id: comment.id.to_string(),
        content: comment.body.clone(),
        author: comment.author_name.clone(),
        date_time: comment.created.format(COMMENT_DATE_FORMAT).to_string(),
    }
}

fn comment_not_found(comment_id: &str) -> Error {
    Error::not_found(format!("Comment {} does not exist", comment_id))
}

#[async_trait]
impl<H> CommentOperator for NativeCommentOperator<H>
where
    H: IssueStore + CommentStore + 'static,
{
    async fn get_comments(&self, issue_key: &str) -> Result<Vec<JiraIssueComment>> {
        let issue = existing_issue(self.host.as_ref(), issue_key)?;
        self.all_comments(&issue)
    }

    async fn get_comments_paginated(
        &self,
        issue_key: &str,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page<JiraIssueComment>> {
        let issue = existing_issue(self.host.as_ref(), issue_key)?;
        let comments = self.all_comments(&issue)?;
        let total = u32::try_from(comments.len()).unwrap_or(u32::MAX);

        let page_size = page_size.max(1);
        let start = page_index.saturating_mul(page_size) as usize;
        let items = comments
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();
        Ok(Page::new(items, total, page_index, page_size))
    }

    async fn create_comment(&self, issue_key: &str, content: &str) -> Result<()> {
        let issue = existing_issue(self.host.as_ref(), issue_key)?;
        self.host
            .add_comment(&issue, content)
            .map_err(|e| Error::native(&e))
    }

    async fn update_comment(
        &self,
        issue_key: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<()> {
        let id = parse_id("Comment", comment_id)?;
        let issue = existing_issue(self.host.as_ref(), issue_key)?;
        let updated = self
            .host
            .update_comment(&issue, id, content)
            .map_err(|e| Error::native(&e))?;
        if updated {
            Ok(())
        } else {
            Err(comment_not_found(comment_id))
        }
    }

    async fn delete_comment(&self, issue_key: &str, comment_id: &str) -> Result<()> {
        let id = parse_id("Comment", comment_id)?;
        let issue = existing_issue(self.host.as_ref(), issue_key)?;
        let deleted = self
            .host
            .delete_comment(&issue, id)
            .map_err(|e| Error::native(&e))?;
        if deleted {
            Ok(())
        } else {
            Err(comment_not_found(comment_id))
        }
    }
}
