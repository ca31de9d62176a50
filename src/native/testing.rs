//! ネイティブオペレーターのテスト用ホスト

use super::host::{
    CommentStore, HostComment, HostProject, HostTransition, HostUser, IssueLinkStore,
    IssueTypeDirectory, ProjectDirectory, ScreenField, UserDirectory, Workflow,
};
use super::{HostIssueType, IssueStore, MutableIssue, NativeHost, PagerFilter, SearchResults};
use crate::field::FieldMappings;
use crate::models::JiraIssueTypeAttributeSchema;
use chrono::DateTime;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

#[derive(Debug)]
pub struct HostError(pub String);

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for HostError {}

type HostResult<T> = std::result::Result<T, HostError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLink {
    pub id: i64,
    pub source: i64,
    pub destination: i64,
    pub link_type: i64,
}

/// 課題 TEST-1 / TEST-2、プロジェクト TEST、ユーザー3人を持つホスト
pub struct FakeHost {
    pub issues: Vec<MutableIssue>,
    pub comments: Mutex<BTreeMap<String, Vec<HostComment>>>,
    pub links: Mutex<Vec<StoredLink>>,
    /// 実行済みの遷移（課題キー、遷移ID、コメント）
    pub executed: Mutex<Vec<(String, i32, Option<String>)>>,
    /// 失敗させたいホスト呼び出し
    pub fail_with: Option<String>,
}

impl Default for FakeHost {
    fn default() -> Self {
        let issue = |id: i64, key: &str| MutableIssue {
            id: Some(id),
            key: Some(key.to_string()),
            project_id: Some(10000),
            issue_type_id: Some("10001".to_string()),
            ..MutableIssue::default()
        };
        Self {
            issues: vec![issue(10001, "TEST-1"), issue(10002, "TEST-2")],
            comments: Mutex::new(BTreeMap::new()),
            links: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }
}

impl FakeHost {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn check(&self) -> HostResult<()> {
        match &self.fail_with {
            Some(message) => Err(HostError(message.clone())),
            None => Ok(()),
        }
    }

    fn issue_key(issue: &MutableIssue) -> String {
        issue.key.clone().unwrap_or_default()
    }

    pub fn user(name: &str) -> HostUser {
        HostUser {
            key: format!("JIRAUSER-{}", name),
            name: name.to_string(),
            email_address: format!("{}@example.com", name),
            display_name: name.to_uppercase(),
            avatar_url: None,
        }
    }

    pub fn project() -> HostProject {
        HostProject {
            id: 10000,
            key: "TEST".to_string(),
            name: "Test Project".to_string(),
        }
    }

    pub fn task_type() -> HostIssueType {
        HostIssueType {
            id: "10001".to_string(),
            name: "Task".to_string(),
        }
    }
}

impl NativeHost for FakeHost {
    type Error = HostError;
}

impl IssueStore for FakeHost {
    fn create_issue(&self, issue: MutableIssue) -> HostResult<MutableIssue> {
        self.check()?;
        Ok(issue)
    }

    fn issue_by_key(&self, key: &str) -> HostResult<Option<MutableIssue>> {
        self.check()?;
        Ok(self
            .issues
            .iter()
            .find(|issue| issue.key.as_deref() == Some(key))
            .cloned())
    }

    fn update_issue(&self, _issue: MutableIssue) -> HostResult<()> {
        self.check()
    }

    fn delete_issue(&self, _key: &str) -> HostResult<()> {
        self.check()
    }

    fn search(&self, _jql: &str, _filter: &PagerFilter) -> HostResult<SearchResults> {
        self.check()?;
        Ok(SearchResults::default())
    }

    fn custom_field_mappings(&self, _issue: &MutableIssue) -> HostResult<FieldMappings> {
        Ok(FieldMappings::new())
    }

    fn base_url(&self) -> String {
        "http://jira.local".to_string()
    }
}

impl CommentStore for FakeHost {
    fn comments(&self, issue: &MutableIssue) -> HostResult<Vec<HostComment>> {
        self.check()?;
        let comments = self.comments.lock().unwrap();
        Ok(comments
            .get(&Self::issue_key(issue))
            .cloned()
            .unwrap_or_default())
    }

    fn add_comment(&self, issue: &MutableIssue, body: &str) -> HostResult<()> {
        self.check()?;
        let mut comments = self.comments.lock().unwrap();
        let next_id = 100 + comments.values().map(Vec::len).sum::<usize>() as i64;
        let created = DateTime::parse_from_rfc3339("2024-01-15T10:30:00+09:00")
            .map_err(|e| HostError(e.to_string()))?;
        comments
            .entry(Self::issue_key(issue))
            .or_default()
            .push(HostComment {
                id: next_id,
                body: body.to_string(),
                author_name: "admin".to_string(),
                created,
            });
        Ok(())
    }

    fn update_comment(&self, issue: &MutableIssue, comment_id: i64, body: &str) -> HostResult<bool> {
        self.check()?;
        let mut comments = self.comments.lock().unwrap();
        let comment = comments
            .get_mut(&Self::issue_key(issue))
            .and_then(|comments| comments.iter_mut().find(|c| c.id == comment_id));
        Ok(match comment {
            Some(comment) => {
                comment.body = body.to_string();
                true
            }
            None => false,
        })
    }

    fn delete_comment(&self, issue: &MutableIssue, comment_id: i64) -> HostResult<bool> {
        self.check()?;
        let mut comments = self.comments.lock().unwrap();
        let Some(comments) = comments.get_mut(&Self::issue_key(issue)) else {
            return Ok(false);
        };
        let before = comments.len();
        comments.retain(|comment| comment.id != comment_id);
        Ok(comments.len() < before)
    }
}

impl Workflow for FakeHost {
    fn workflow_transitions(&self, _issue: &MutableIssue) -> HostResult<Vec<HostTransition>> {
        self.check()?;
        Ok(vec![
            HostTransition {
                action_id: 11,
                name: "To Do".to_string(),
            },
            HostTransition {
                action_id: 21,
                name: "In Progress".to_string(),
            },
            HostTransition {
                action_id: 31,
                name: "Done".to_string(),
            },
        ])
    }

    /// "To Do" には戻れない
    fn validate_transition(
        &self,
        _issue: &MutableIssue,
        action_id: i32,
        _comment: Option<&str>,
    ) -> HostResult<bool> {
        Ok(action_id != 11)
    }

    fn transition(
        &self,
        issue: &MutableIssue,
        action_id: i32,
        comment: Option<&str>,
    ) -> HostResult<bool> {
        self.executed.lock().unwrap().push((
            Self::issue_key(issue),
            action_id,
            comment.map(str::to_string),
        ));
        Ok(true)
    }
}

impl IssueLinkStore for FakeHost {
    fn link_type_id(&self, relation_name: &str) -> HostResult<Option<i64>> {
        self.check()?;
        Ok(match relation_name {
            "Relates" => Some(10003),
            "Blocks" => Some(10000),
            _ => None,
        })
    }

    fn create_link(&self, source: i64, destination: i64, link_type: i64) -> HostResult<()> {
        let mut links = self.links.lock().unwrap();
        let id = 20000 + links.len() as i64;
        links.push(StoredLink {
            id,
            source,
            destination,
            link_type,
        });
        Ok(())
    }

    fn remove_link(&self, link_id: i64) -> HostResult<bool> {
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|link| link.id != link_id);
        Ok(links.len() < before)
    }
}

impl ProjectDirectory for FakeHost {
    fn projects(&self) -> HostResult<Vec<HostProject>> {
        self.check()?;
        Ok(vec![
            Self::project(),
            HostProject {
                id: 10001,
                key: "OPS".to_string(),
                name: "Operations".to_string(),
            },
        ])
    }

    fn project_by_id(&self, project_id: i64) -> HostResult<Option<HostProject>> {
        Ok(self.projects()?.into_iter().find(|p| p.id == project_id))
    }

    fn project_by_key(&self, project_key: &str) -> HostResult<Option<HostProject>> {
        Ok(self.projects()?.into_iter().find(|p| p.key == project_key))
    }
}

impl IssueTypeDirectory for FakeHost {
    fn project_issue_types(&self, project: &HostProject) -> HostResult<Vec<HostIssueType>> {
        Ok(match project.key.as_str() {
            "TEST" => vec![
                Self::task_type(),
                HostIssueType {
                    id: "10002".to_string(),
                    name: "Bug".to_string(),
                },
            ],
            _ => Vec::new(),
        })
    }

    fn issue_type(&self, issue_type_id: &str) -> HostResult<Option<HostIssueType>> {
        Ok(self
            .project_issue_types(&Self::project())?
            .into_iter()
            .find(|issue_type| issue_type.id == issue_type_id))
    }

    fn create_screen_fields(
        &self,
        _project: &HostProject,
        _issue_type: &HostIssueType,
    ) -> HostResult<Vec<ScreenField>> {
        Ok(vec![
            ScreenField {
                id: "summary".to_string(),
                name: "Summary".to_string(),
                schema: Some(JiraIssueTypeAttributeSchema {
                    schema_type: "string".to_string(),
                    items: None,
                    system: Some("summary".to_string()),
                    custom: None,
                    custom_id: None,
                }),
            },
            ScreenField {
                id: "customfield_10300".to_string(),
                name: "Legacy".to_string(),
                schema: None,
            },
        ])
    }
}

impl UserDirectory for FakeHost {
    /// alice は2つのロールに属する
    fn project_role_users(&self, _project: &HostProject) -> HostResult<Vec<HostUser>> {
        self.check()?;
        Ok(vec![
            Self::user("alice"),
            Self::user("bob"),
            Self::user("alice"),
            Self::user("carol"),
        ])
    }

    fn has_permission(
        &self,
        user: &HostUser,
        _project: &HostProject,
        permission_name: &str,
    ) -> HostResult<bool> {
        Ok(match permission_name {
            "PROJECT_ADMIN" => user.name == "alice",
            "ASSIGNABLE_USER" => user.name != "carol",
            _ => false,
        })
    }

    fn system_administrators(&self) -> HostResult<Vec<HostUser>> {
        Ok(vec![Self::user("admin")])
    }
}
