//! 課題管理側のドメインオペレーター
//!
//! 各トレイトはバックエンドに依存しない。HTTP実装は [`http`]、プロセス内実装は
//! [`crate::native`] にある。

pub mod http;

use crate::error::{Error, Result};
use crate::field::{Field, FieldFactory, FieldMappings};
use crate::models::{
    JiraIssue, JiraIssueComment, JiraIssueType, JiraIssueTypeAttribute, JiraProject,
    JiraTransition, JiraUser,
};
use crate::page::Page;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;

pub const DEFAULT_RESULTS_PER_PAGE: u32 = 25;
pub const DEFAULT_LINK_RELATION: &str = "Relates";

/// 課題JSONとフィールドマッピングから呼び出し側の型を作る
pub type IssueParser<T> = dyn Fn(&Value, &FieldMappings) -> Result<T> + Send + Sync;

/// プロジェクトと課題タイプで絞り込むJQL
pub fn issue_type_jql(project_id: i64, issue_type_id: i64) -> String {
    format!("project={} AND issueType={}", project_id, issue_type_id)
}

/// 書き込み対象の課題が存在しない。バックエンドによらず同じ値になる
pub fn issue_not_found(issue_key: &str) -> Error {
    Error::not_found(format!("Issue {} does not exist", issue_key))
}

/// 404 を [`issue_not_found`] に読み替える
pub(crate) fn map_missing_issue(issue_key: &str, err: Error) -> Error {
    if err.status_code() == Some(404) {
        issue_not_found(issue_key)
    } else {
        err
    }
}

/// 名前で重複を除く。最初に現れたものを残す
pub(crate) fn distinct_by_name<T, F>(items: Vec<T>, name: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(name(item).to_string()))
        .collect()
}

#[async_trait]
pub trait IssueOperator: Send + Sync {
    type Field: Send + Sync;
    type Factory: FieldFactory<Self::Field> + Send + Sync;

    fn field_factory(&self) -> &Self::Factory;

    /// 全件取得
    async fn get_issues_by_jql<T>(&self, jql: &str, parser: &IssueParser<T>) -> Result<Vec<T>>
    where
        T: Send;

    async fn get_issues_by_jql_paginated<T>(
        &self,
        jql: &str,
        page_index: u32,
        page_size: u32,
        parser: &IssueParser<T>,
    ) -> Result<Page<T>>
    where
        T: Send;

    /// 存在しなければ `None`
    async fn get_issue_by_key<T>(&self, key: &str, parser: &IssueParser<T>) -> Result<Option<T>>
    where
        T: Send;

    async fn create_issue(
        &self,
        project_id: i64,
        issue_type_id: i64,
        fields: Vec<Self::Field>,
    ) -> Result<Option<JiraIssue>>;

    async fn update_issue(
        &self,
        project_id: i64,
        issue_type_id: i64,
        issue_key: &str,
        fields: Vec<Self::Field>,
    ) -> Result<()>;

    async fn delete_issue(&self, issue_key: &str) -> Result<()>;

    /// JQLに一致する最初の課題。なければ `None`
    async fn get_issue_by_jql<T>(&self, jql: &str, parser: &IssueParser<T>) -> Result<Option<T>>
    where
        T: Send,
    {
        let page = self.get_issues_by_jql_paginated(jql, 0, 1, parser).await?;
        Ok(page.items.into_iter().next())
    }

    async fn get_issue_by_id<T>(&self, id: i64, parser: &IssueParser<T>) -> Result<Option<T>>
    where
        T: Send,
    {
        self.get_issue_by_key(&id.to_string(), parser).await
    }

    async fn get_issues_by_issue_type<T>(
        &self,
        project_id: i64,
        issue_type_id: i64,
        parser: &IssueParser<T>,
    ) -> Result<Vec<T>>
    where
        T: Send,
    {
        self.get_issues_by_jql(&issue_type_jql(project_id, issue_type_id), parser)
            .await
    }

    async fn get_issues_by_type_paginated<T>(
        &self,
        project_id: i64,
        issue_type_id: i64,
        page_index: u32,
        page_size: u32,
        parser: &IssueParser<T>,
    ) -> Result<Page<T>>
    where
        T: Send,
    {
        self.get_issues_by_jql_paginated(
            &issue_type_jql(project_id, issue_type_id),
            page_index,
            page_size,
            parser,
        )
        .await
    }

    /// ドメインの `Field` をファクトリで実体化してから作成する
    async fn create_issue_from_fields(
        &self,
        project_id: i64,
        issue_type_id: i64,
        fields: &[Field],
    ) -> Result<Option<JiraIssue>> {
        let realized = self.field_factory().realize_all(fields);
        self.create_issue(project_id, issue_type_id, realized).await
    }

    async fn update_issue_from_fields(
        &self,
        project_id: i64,
        issue_type_id: i64,
        issue_key: &str,
        fields: &[Field],
    ) -> Result<()> {
        let realized = self.field_factory().realize_all(fields);
        self.update_issue(project_id, issue_type_id, issue_key, realized)
            .await
    }
}

#[async_trait]
pub trait CommentOperator: Send + Sync {
    async fn get_comments(&self, issue_key: &str) -> Result<Vec<JiraIssueComment>>;

    async fn get_comments_paginated(
        &self,
        issue_key: &str,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page<JiraIssueComment>>;

    async fn create_comment(&self, issue_key: &str, content: &str) -> Result<()>;

    async fn update_comment(&self, issue_key: &str, comment_id: &str, content: &str)
    -> Result<()>;

    async fn delete_comment(&self, issue_key: &str, comment_id: &str) -> Result<()>;
}

#[async_trait]
pub trait TransitionOperator: Send + Sync {
    async fn get_available_transitions(&self, issue_key: &str) -> Result<Vec<JiraTransition>>;

    async fn do_transition(
        &self,
        issue_key: &str,
        transition_id: &str,
        comment: Option<&str>,
    ) -> Result<()>;
}

#[async_trait]
pub trait IssueLinkOperator: Send + Sync {
    /// `relation_name` は通常 [`DEFAULT_LINK_RELATION`]
    async fn create_issue_link(
        &self,
        inward_issue_key: &str,
        outward_issue_key: &str,
        relation_name: &str,
    ) -> Result<()>;

    async fn delete_issue_link(&self, link_id: &str) -> Result<()>;
}

#[async_trait]
pub trait ProjectOperator: Send + Sync {
    async fn get_projects(&self) -> Result<Vec<JiraProject>>;

    async fn get_project(&self, project_id: i64) -> Result<Option<JiraProject>>;
}

#[async_trait]
pub trait IssueTypeOperator: Send + Sync {
    async fn get_issue_types(&self, project_id: i64) -> Result<Vec<JiraIssueType>>;

    async fn get_issue_type(&self, issue_type_id: i64) -> Result<Option<JiraIssueType>>;

    async fn get_attributes_of_issue_type(
        &self,
        project_id: i64,
        issue_type_id: i64,
    ) -> Result<Vec<JiraIssueTypeAttribute>>;
}

#[async_trait]
pub trait UserOperator: Send + Sync {
    /// プロジェクトロールに属するユーザー（グループは展開、名前で重複除去）
    async fn get_users_by_project_key(&self, project_key: &str) -> Result<Vec<JiraUser>>;

    async fn get_project_admin_users(&self, project_key: &str) -> Result<Vec<JiraUser>> {
        self.get_users_by_project_key_and_permission(project_key, "PROJECT_ADMIN")
            .await
    }

    async fn get_system_admin_users(&self) -> Result<Vec<JiraUser>>;

    async fn get_assignable_users_by_project_key(&self, project_key: &str) -> Result<Vec<JiraUser>> {
        self.get_users_by_project_key_and_permission(project_key, "ASSIGNABLE_USER")
            .await
    }

    async fn get_users_by_project_key_and_permission(
        &self,
        project_key: &str,
        permission_name: &str,
    ) -> Result<Vec<JiraUser>>;
}
