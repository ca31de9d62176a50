use super::{HostIssueType, MutableIssue, NativeHost};
use crate::models::{JiraIssueTypeAttributeSchema, JiraProject, JiraUser};
use chrono::{DateTime, FixedOffset};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostComment {
    pub id: i64,
    pub body: String,
    pub author_name: String,
    pub created: DateTime<FixedOffset>,
}

/// 課題へのコメント
pub trait CommentStore: NativeHost {
    /// ログインユーザーが参照できるコメント。作成順
    fn comments(&self, issue: &MutableIssue) -> Result<Vec<HostComment>, Self::Error>;

    fn add_comment(&self, issue: &MutableIssue, body: &str) -> Result<(), Self::Error>;

    /// コメントがなければ `false`
    fn update_comment(
        &self,
        issue: &MutableIssue,
        comment_id: i64,
        body: &str,
    ) -> Result<bool, Self::Error>;

    /// コメントがなければ `false`
    fn delete_comment(&self, issue: &MutableIssue, comment_id: i64) -> Result<bool, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTransition {
    pub action_id: i32,
    pub name: String,
}

/// 課題のワークフロー
pub trait Workflow: NativeHost {
    /// ワークフローに定義されたすべての遷移。現在のステータスでは使えないものも含む
    fn workflow_transitions(&self, issue: &MutableIssue)
    -> Result<Vec<HostTransition>, Self::Error>;

    fn validate_transition(
        &self,
        issue: &MutableIssue,
        action_id: i32,
        comment: Option<&str>,
    ) -> Result<bool, Self::Error>;

    /// 実行できたら `true`
    fn transition(
        &self,
        issue: &MutableIssue,
        action_id: i32,
        comment: Option<&str>,
    ) -> Result<bool, Self::Error>;
}

pub trait IssueLinkStore: NativeHost {
    fn link_type_id(&self, relation_name: &str) -> Result<Option<i64>, Self::Error>;

    fn create_link(
        &self,
        source_issue_id: i64,
        destination_issue_id: i64,
        link_type_id: i64,
    ) -> Result<(), Self::Error>;

    /// リンクがなければ `false`
    fn remove_link(&self, link_id: i64) -> Result<bool, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProject {
    pub id: i64,
    pub key: String,
    pub name: String,
}

impl HostProject {
    pub fn to_jira_project(&self) -> JiraProject {
        JiraProject {
            id: self.id.to_string(),
            key: self.key.clone(),
            name: self.name.clone(),
        }
    }
}

pub trait ProjectDirectory: NativeHost {
    /// ログインユーザーが参照できるプロジェクト
    fn projects(&self) -> Result<Vec<HostProject>, Self::Error>;

    fn project_by_id(&self, project_id: i64) -> Result<Option<HostProject>, Self::Error>;

    fn project_by_key(&self, project_key: &str) -> Result<Option<HostProject>, Self::Error>;
}

/// 作成画面に並ぶフィールド。REST向けのスキーマを持たないものは `schema` が `None`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenField {
    pub id: String,
    pub name: String,
    pub schema: Option<JiraIssueTypeAttributeSchema>,
}

pub trait IssueTypeDirectory: NativeHost {
    /// プロジェクトの課題タイプスキームに含まれる課題タイプ
    fn project_issue_types(&self, project: &HostProject)
    -> Result<Vec<HostIssueType>, Self::Error>;

    fn issue_type(&self, issue_type_id: &str) -> Result<Option<HostIssueType>, Self::Error>;

    /// 作成画面の全タブのフィールドをタブ順に返す
    fn create_screen_fields(
        &self,
        project: &HostProject,
        issue_type: &HostIssueType,
    ) -> Result<Vec<ScreenField>, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostUser {
    pub key: String,
    pub name: String,
    pub email_address: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl HostUser {
    pub fn to_jira_user(&self) -> JiraUser {
        JiraUser {
            key: self.key.clone(),
            name: self.name.clone(),
            email_address: self.email_address.clone(),
            avatar_url: self.avatar_url.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

pub trait UserDirectory: NativeHost {
    /// プロジェクトロールに属するユーザー。グループは展開済みで、重複を含みうる
    fn project_role_users(&self, project: &HostProject) -> Result<Vec<HostUser>, Self::Error>;

    /// 未知の権限名なら `false`
    fn has_permission(
        &self,
        user: &HostUser,
        project: &HostProject,
        permission_name: &str,
    ) -> Result<bool, Self::Error>;

    fn system_administrators(&self) -> Result<Vec<HostUser>, Self::Error>;
}
