//! プロセス内のJiraオブジェクトモデルに対するアダプター
//!
//! ホスト側の機能はトレイトとして受け取り、このクレートは具体的な実装を持たない。

pub mod comment;
pub mod host;
pub mod issue;
pub mod issue_type;
pub mod json;
pub mod link;
pub mod project;
pub mod transition;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

use crate::error::Error;
use crate::field::FieldMappings;
use crate::jira::issue_not_found;
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

pub use comment::NativeCommentOperator;
pub use host::{
    CommentStore, HostComment, HostProject, HostTransition, HostUser, IssueLinkStore,
    IssueTypeDirectory, ProjectDirectory, ScreenField, UserDirectory, Workflow,
};
pub use issue::NativeIssueOperator;
pub use issue_type::NativeIssueTypeOperator;
pub use json::IssueJsonConverter;
pub use link::NativeIssueLinkOperator;
pub use project::NativeProjectOperator;
pub use transition::NativeTransitionOperator;
pub use user::NativeUserOperator;

/// 日付ピッカー型のカスタムフィールド
pub const DATE_PICKER_TYPE: &str = "com.atlassian.jira.plugin.system.customfieldtypes:datepicker";

/// ホスト実装の共通部分。失敗はホスト固有のエラー型で返す
pub trait NativeHost: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldInfo {
    pub id: String,
    pub name: String,
    pub type_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIssueType {
    pub id: String,
    pub name: String,
}

/// オプション値を解決するためのプロジェクト/課題タイプの組
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IssueContext {
    pub project_id: Option<i64>,
    pub issue_type_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeStyle {
    DatePicker,
    DateTimePicker,
}

impl DateTimeStyle {
    pub fn for_field(field: &CustomFieldInfo) -> Self {
        if field.type_key == DATE_PICKER_TYPE {
            DateTimeStyle::DatePicker
        } else {
            DateTimeStyle::DateTimePicker
        }
    }
}

/// フィールド定義の参照
pub trait FieldRegistry: NativeHost {
    /// 表示名が一致するカスタムフィールドをすべて返す
    fn custom_fields_by_name(&self, name: &str) -> Result<Vec<CustomFieldInfo>, Self::Error>;

    fn issue_types(&self) -> Result<Vec<HostIssueType>, Self::Error>;

    /// 課題のコンテキストで有効なオプションのID
    fn option_id(
        &self,
        field: &CustomFieldInfo,
        context: &IssueContext,
        value: &str,
    ) -> Result<Option<i64>, Self::Error>;

    /// ログインユーザーの表示形式で日時を書式化する
    fn format_date_time(
        &self,
        style: DateTimeStyle,
        date_time: &DateTime<FixedOffset>,
    ) -> Result<String, Self::Error>;
}

/// フィールドを書き込む対象の課題
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MutableIssue {
    pub id: Option<i64>,
    pub key: Option<String>,
    pub project_id: Option<i64>,
    pub issue_type_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<String>,
    pub reporter_id: Option<String>,
    pub custom_field_values: BTreeMap<String, Vec<String>>,
}

impl MutableIssue {
    pub fn set_custom_field_values(&mut self, field_id: &str, values: Vec<String>) {
        self.custom_field_values.insert(field_id.to_string(), values);
    }

    pub fn custom_field_values(&self, field_id: &str) -> Option<&[String]> {
        self.custom_field_values.get(field_id).map(Vec::as_slice)
    }

    pub fn context(&self) -> IssueContext {
        IssueContext {
            project_id: self.project_id,
            issue_type_id: self.issue_type_id.clone(),
        }
    }
}

/// 検索範囲。`page_size` が `None` なら無制限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerFilter {
    pub start: u32,
    pub page_size: Option<u32>,
}

impl PagerFilter {
    pub fn unlimited() -> Self {
        Self {
            start: 0,
            page_size: None,
        }
    }

    pub fn page_aligned(start: u32, page_size: u32) -> Self {
        Self {
            start,
            page_size: Some(page_size),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResults {
    pub issues: Vec<MutableIssue>,
    pub total: u32,
}

/// 課題の永続化と検索
pub trait IssueStore: NativeHost {
    /// 作成した課題（ID/キー採番済み）を返す
    fn create_issue(&self, issue: MutableIssue) -> Result<MutableIssue, Self::Error>;

    fn issue_by_key(&self, key: &str) -> Result<Option<MutableIssue>, Self::Error>;

    fn update_issue(&self, issue: MutableIssue) -> Result<(), Self::Error>;

    fn delete_issue(&self, key: &str) -> Result<(), Self::Error>;

    fn search(&self, jql: &str, filter: &PagerFilter) -> Result<SearchResults, Self::Error>;

    /// 課題で使えるカスタムフィールドの 表示名 -> ID
    fn custom_field_mappings(&self, issue: &MutableIssue) -> Result<FieldMappings, Self::Error>;

    fn base_url(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostField {
    pub id: String,
    pub name: String,
    /// シリアライズ対象外のフィールド
    pub transient: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayoutItem {
    pub field: HostField,
    pub required: bool,
}

/// 1フィールド分のJSON表現
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldJsonBean {
    pub standard_data: Option<Value>,
}

/// REST APIと同じ形の課題JSON
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct IssueBean {
    pub expand: String,
    pub id: String,
    #[serde(rename = "self")]
    pub self_link: String,
    pub key: String,
    pub fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub names: Map<String, Value>,
}

impl IssueBean {
    pub fn has_field(&self, field_id: &str) -> bool {
        self.fields.contains_key(field_id)
    }

    pub fn add_field(&mut self, field: &HostField, data: Value) {
        self.fields.insert(field.id.clone(), data);
        self.names
            .insert(field.id.clone(), Value::String(field.name.clone()));
    }
}

/// 課題のJSON化に必要なホスト機能
pub trait IssueRenderer: NativeHost {
    fn build_bean(&self, issue: &MutableIssue, expand: &str) -> Result<IssueBean, Self::Error>;

    /// 課題のフィールドレイアウトに含まれる項目
    fn field_layout(&self, issue: &MutableIssue) -> Result<Vec<FieldLayoutItem>, Self::Error>;

    /// システム全体で参照可能なフィールド
    fn navigable_fields(&self) -> Result<Vec<HostField>, Self::Error>;

    /// JSONとして描画できないフィールドは `None`
    fn render_field(
        &self,
        issue: &MutableIssue,
        field: &HostField,
        layout_item: Option<&FieldLayoutItem>,
    ) -> Result<Option<FieldJsonBean>, Self::Error>;
}

/// プロセス内の各オペレーターへの入口
pub struct NativeJiraClient<H> {
    host: Arc<H>,
}

impl<H> Clone for NativeJiraClient<H> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
        }
    }
}

impl<H: NativeHost + 'static> NativeJiraClient<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn issues(&self) -> NativeIssueOperator<H>
    where
        H: IssueStore + FieldRegistry + IssueRenderer,
    {
        NativeIssueOperator::new(self.host.clone())
    }

    pub fn comments(&self) -> NativeCommentOperator<H>
    where
        H: IssueStore + CommentStore,
    {
        NativeCommentOperator::new(self.host.clone())
    }

    pub fn transitions(&self) -> NativeTransitionOperator<H>
    where
        H: IssueStore + Workflow,
    {
        NativeTransitionOperator::new(self.host.clone())
    }

    pub fn issue_links(&self) -> NativeIssueLinkOperator<H>
    where
        H: IssueStore + IssueLinkStore,
    {
        NativeIssueLinkOperator::new(self.host.clone())
    }

    pub fn projects(&self) -> NativeProjectOperator<H>
    where
        H: ProjectDirectory,
    {
        NativeProjectOperator::new(self.host.clone())
    }

    pub fn issue_types(&self) -> NativeIssueTypeOperator<H>
    where
        H: ProjectDirectory + IssueTypeDirectory,
    {
        NativeIssueTypeOperator::new(self.host.clone())
    }

    pub fn users(&self) -> NativeUserOperator<H>
    where
        H: ProjectDirectory + UserDirectory,
    {
        NativeUserOperator::new(self.host.clone())
    }
}

/// キーで課題を引く。なければ [`issue_not_found`]
pub(crate) fn existing_issue<H: IssueStore + ?Sized>(host: &H, issue_key: &str) -> crate::error::Result<MutableIssue> {
    host.issue_by_key(issue_key)
        .map_err(|e| Error::native(&e))?
        .ok_or_else(|| issue_not_found(issue_key))
}

/// 採番済みの課題ID。未採番の課題は存在しないものとして扱う
pub(crate) fn issue_id(issue: &MutableIssue, issue_key: &str) -> crate::error::Result<i64> {
    issue.id.ok_or_else(|| issue_not_found(issue_key))
}

/// 文字列で受け取ったIDを数値にする
pub(crate) fn parse_id<T: FromStr>(kind: &str, id: &str) -> crate::error::Result<T> {
    id.trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{} id {} must be a number", kind, id)))
}

/// REST APIの404と同じ形の失敗
pub(crate) fn missing(category: &str, message: String) -> Error {
    Error::Http {
        error: category.to_string(),
        message,
        status_code: Some(404),
    }
}

pub(crate) fn project_not_found(reference: &str) -> Error {
    missing("Project not found", format!("No Project with {} found.", reference))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_rejects_non_numbers() {
        assert_eq!(parse_id::<i64>("Comment", " 42 ").unwrap(), 42);

        let error = parse_id::<i32>("Transition", "abc").unwrap_err();

        assert_eq!(
            error,
            Error::InvalidInput("Transition id abc must be a number".to_string())
        );
    }

    #[test]
    fn test_native_client_shares_one_host() {
        use crate::jira::{CommentOperator, ProjectOperator, UserOperator};
        use testing::FakeHost;

        tokio_test::block_on(async {
            // Given: 1つのホストから作ったクライアント
            let client = NativeJiraClient::new(Arc::new(FakeHost::default()));

            // When: 別々のオペレーターで書き込みと読み取りを行う
            client.comments().create_comment("TEST-1", "hello").await.unwrap();
            let comments = client.clone().comments().get_comments("TEST-1").await.unwrap();
            let projects = client.projects().get_projects().await.unwrap();
            let admins = client.users().get_system_admin_users().await.unwrap();

            // Then: 同じホストの状態が見える
            assert_eq!(comments.len(), 1);
            assert_eq!(projects[0].key, "TEST");
            assert_eq!(admins[0].name, "admin");
            assert_eq!(client.host().comments.lock().unwrap().len(), 1);
        });
    }

    #[test]
    fn test_missing_reports_404() {
        let error = project_not_found("projectKey NOPE");

        assert_eq!(error.category(), "Project not found");
        assert_eq!(error.message(), "No Project with projectKey NOPE found.");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_date_time_style_for_field() {
        let date_picker = CustomFieldInfo {
            id: "customfield_1".to_string(),
            name: "Due".to_string(),
            type_key: DATE_PICKER_TYPE.to_string(),
        };
        let date_time_picker = CustomFieldInfo {
            type_key: "com.atlassian.jira.plugin.system.customfieldtypes:datetime".to_string(),
            ..date_picker.clone()
        };

        assert_eq!(DateTimeStyle::for_field(&date_picker), DateTimeStyle::DatePicker);
        assert_eq!(
            DateTimeStyle::for_field(&date_time_picker),
            DateTimeStyle::DateTimePicker
        );
    }

    #[test]
    fn test_issue_bean_add_field_records_name() {
        let mut bean = IssueBean::default();
        let field = HostField {
            id: "customfield_10100".to_string(),
            name: "Epic Link".to_string(),
            transient: false,
        };

        bean.add_field(&field, Value::String("EPIC-1".to_string()));

        assert!(bean.has_field("customfield_10100"));
        assert_eq!(bean.names["customfield_10100"], "Epic Link");
    }
}
