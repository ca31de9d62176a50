pub mod http;
pub mod native;

use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

pub use http::{HttpField, HttpFieldFactory, FieldTarget, render_fields};
pub use native::{FieldApplyError, NativeField, NativeFieldFactory};

pub const EPIC_LINK_FIELD: &str = "Epic Link";
pub const EPIC_NAME_FIELD: &str = "Epic Name";

/// フィールド表示名 -> フィールドID
pub type FieldMappings = HashMap<String, String>;

/// 名前に対応するフィールドIDを返す。未登録なら名前そのもの
pub fn resolve_field_id<'a>(name: &'a str, mappings: &'a FieldMappings) -> &'a str {
    mappings.get(name).map(String::as_str).unwrap_or(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Summary,
    Description,
    Project,
    IssueType,
    IssueTypeByName,
    Assignee,
    Reporter,
    EpicLink,
    EpicName,
    CustomText,
    CustomNumber,
    CustomDateTime,
    CustomRadio,
    CustomObjectRef,
    CustomObjectRefs,
}

/// 課題に設定できるフィールド値
///
/// バックエンドに依存しない意味上の値だけを持つ。`None` は「値なし（クリア）」を表し、
/// 空文字とは区別される。
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Summary(String),
    Description(String),
    Project(i64),
    IssueType(i64),
    IssueTypeByName(String),
    Assignee(String),
    Reporter(String),
    EpicLink(Option<String>),
    EpicName(String),
    CustomText {
        field_name: String,
        text: String,
    },
    CustomNumber {
        field_name: String,
        number: f64,
    },
    CustomDateTime {
        field_name: String,
        date_time: DateTime<FixedOffset>,
    },
    CustomRadio {
        field_name: String,
        value: String,
    },
    CustomObjectRef {
        field_name: String,
        object_key: Option<String>,
    },
    CustomObjectRefs {
        field_name: String,
        object_keys: Vec<String>,
    },
}

impl Field {
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Summary(_) => FieldKind::Summary,
            Field::Description(_) => FieldKind::Description,
            Field::Project(_) => FieldKind::Project,
            Field::IssueType(_) => FieldKind::IssueType,
            Field::IssueTypeByName(_) => FieldKind::IssueTypeByName,
            Field::Assignee(_) => FieldKind::Assignee,
            Field::Reporter(_) => FieldKind::Reporter,
            Field::EpicLink(_) => FieldKind::EpicLink,
            Field::EpicName(_) => FieldKind::EpicName,
            Field::CustomText { .. } => FieldKind::CustomText,
            Field::CustomNumber { .. } => FieldKind::CustomNumber,
            Field::CustomDateTime { .. } => FieldKind::CustomDateTime,
            Field::CustomRadio { .. } => FieldKind::CustomRadio,
            Field::CustomObjectRef { .. } => FieldKind::CustomObjectRef,
            Field::CustomObjectRefs { .. } => FieldKind::CustomObjectRefs,
        }
    }

    /// カスタムフィールド（エピック系を含む）の表示名
    pub fn custom_field_name(&self) -> Option<&str> {
        match self {
            Field::EpicLink(_) => Some(EPIC_LINK_FIELD),
            Field::EpicName(_) => Some(EPIC_NAME_FIELD),
            Field::CustomText { field_name, .. }
            | Field::CustomNumber { field_name, .. }
            | Field::CustomDateTime { field_name, .. }
            | Field::CustomRadio { field_name, .. }
            | Field::CustomObjectRef { field_name, .. }
            | Field::CustomObjectRefs { field_name, .. } => Some(field_name),
            _ => None,
        }
    }
}

/// フィールドの種類ごとにバックエンド固有の表現 `F` を作るファクトリ
///
/// 実装は状態を持たず、同じ入力には同じ値を返すこと。
pub trait FieldFactory<F> {
    fn summary_field(&self, summary: &str) -> F;

    fn description_field(&self, description: &str) -> F;

    fn project_field(&self, project_id: i64) -> F;

    fn issue_type_field(&self, issue_type_id: i64) -> F;

    fn issue_type_by_name_field(&self, issue_type_name: &str) -> F;

    fn assignee_field(&self, user_name: &str) -> F;

    fn reporter_field(&self, user_name: &str) -> F;

    fn epic_link_field(&self, epic_issue_key: Option<&str>) -> F;

    fn epic_name_field(&self, epic_name: &str) -> F;

    fn custom_text_field(&self, field_name: &str, text: &str) -> F;

    fn custom_number_field(&self, field_name: &str, number: f64) -> F;

    fn custom_date_time_field(&self, field_name: &str, date_time: &DateTime<FixedOffset>) -> F;

    fn custom_radio_field(&self, field_name: &str, value: &str) -> F;

    fn custom_object_ref_field(&self, field_name: &str, object_key: Option<&str>) -> F;

    fn custom_object_refs_field(&self, field_name: &str, object_keys: &[String]) -> F;

    /// ドメインの `Field` をこのバックエンドの表現にする
    fn realize(&self, field: &Field) -> F {
        match field {
            Field::Summary(summary) => self.summary_field(summary),
            Field::Description(description) => self.description_field(description),
            Field::Project(project_id) => self.project_field(*project_id),
            Field::IssueType(issue_type_id) => self.issue_type_field(*issue_type_id),
            Field::IssueTypeByName(name) => self.issue_type_by_name_field(name),
            Field::Assignee(user_name) => self.assignee_field(user_name),
            Field::Reporter(user_name) => self.reporter_field(user_name),
            Field::EpicLink(key) => self.epic_link_field(key.as_deref()),
            Field::EpicName(name) => self.epic_name_field(name),
            Field::CustomText { field_name, text } => self.custom_text_field(field_name, text),
            Field::CustomNumber { field_name, number } => {
                self.custom_number_field(field_name, *number)
            }
            Field::CustomDateTime {
                field_name,
                date_time,
            } => self.custom_date_time_field(field_name, date_time),
            Field::CustomRadio { field_name, value } => self.custom_radio_field(field_name, value),
            Field::CustomObjectRef {
                field_name,
                object_key,
            } => self.custom_object_ref_field(field_name, object_key.as_deref()),
            Field::CustomObjectRefs {
                field_name,
                object_keys,
            } => self.custom_object_refs_field(field_name, object_keys),
        }
    }

    fn realize_all(&self, fields: &[Field]) -> Vec<F> {
        fields.iter().map(|field| self.realize(field)).collect()
    }
}
