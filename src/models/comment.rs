use crate::http::HttpPage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraIssueComment {
    pub id: String,
    pub content: String,
    pub author: String,
    pub date_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpJiraIssueCommentAuthor {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpJiraIssueComment {
    pub id: String,
    pub body: String,
    pub author: HttpJiraIssueCommentAuthor,
    pub created: String,
}

impl HttpJiraIssueComment {
    pub fn into_jira_issue_comment(self) -> JiraIssueComment {
        JiraIssueComment {
            id: self.id,
            content: self.body,
            author: self.author.name,
            date_time: self.created,
        }
    }
}

/// コメント一覧のページ。要素は `comments` に入る
#[derive(Debug, Clone, Deserialize)]
pub struct HttpCommentPage {
    #[serde(rename = "maxResults", default)]
    pub max_results: u32,
    #[serde(rename = "startAt", default)]
    pub start_at: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub comments: Vec<HttpJiraIssueComment>,
}

impl HttpPage<HttpJiraIssueComment> for HttpCommentPage {
    fn max_results(&self) -> u32 {
        self.max_results
    }

    fn start_at(&self) -> u32 {
        self.start_at
    }

    fn total(&self) -> u32 {
        self.total
    }

    fn values(&self) -> &[HttpJiraIssueComment] {
        &self.comments
    }

    fn into_values(self) -> Vec<HttpJiraIssueComment> {
        self.comments
    }
}
