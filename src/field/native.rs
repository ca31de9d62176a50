use super::{EPIC_LINK_FIELD, EPIC_NAME_FIELD, FieldFactory};
use crate::native::{CustomFieldInfo, DateTimeStyle, FieldRegistry, MutableIssue};
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// フィールド適用時の失敗
#[derive(Error, Debug)]
pub enum FieldApplyError<E>
where
    E: std::error::Error + 'static,
{
    #[error("Field name is unknown")]
    UnknownFieldName(String),

    #[error("Field name is not unique")]
    AmbiguousFieldName(String),

    #[error("Unknown Issue Type {0}")]
    UnknownIssueType(String),

    #[error("Unknown option '{value}' for field {field_name}")]
    UnknownOption { field_name: String, value: String },

    #[error(transparent)]
    Host(E),
}

/// プロセス内の課題に直接書き込むフィールド
#[derive(Debug, Clone, PartialEq)]
pub enum NativeField {
    Summary(String),
    Description(String),
    ProjectId(i64),
    IssueTypeId(String),
    IssueTypeName(String),
    AssigneeId(String),
    ReporterId(String),
    /// 名前で指定したカスタムフィールドにそのまま値を入れる
    CustomValues {
        field_name: String,
        values: Vec<String>,
    },
    /// フィールドの種類に応じた表示形式で書き込む
    CustomDateTime {
        field_name: String,
        date_time: DateTime<FixedOffset>,
    },
    /// 課題のコンテキストでオプションIDに解決して書き込む
    CustomOption { field_name: String, value: String },
}

impl NativeField {
    pub fn apply<R>(
        &self,
        issue: &mut MutableIssue,
        registry: &R,
    ) -> Result<(), FieldApplyError<R::Error>>
    where
        R: FieldRegistry + ?Sized,
    {
        match self {
            NativeField::Summary(summary) => issue.summary = Some(summary.clone()),
            NativeField::Description(description) => {
                issue.description = Some(description.clone())
            }
            NativeField::ProjectId(project_id) => issue.project_id = Some(*project_id),
            NativeField::IssueTypeId(issue_type_id) => {
                issue.issue_type_id = Some(issue_type_id.clone())
            }
            NativeField::IssueTypeName(name) => {
                let issue_type = registry
                    .issue_types()
                    .map_err(FieldApplyError::Host)?
                    .into_iter()
                    .find(|issue_type| &issue_type.name == name)
                    .ok_or_else(|| FieldApplyError::UnknownIssueType(name.clone()))?;
                issue.issue_type_id = Some(issue_type.id);
            }
            NativeField::AssigneeId(user_name) => issue.assignee_id = Some(user_name.clone()),
            NativeField::ReporterId(user_name) => issue.reporter_id = Some(user_name.clone()),
            NativeField::CustomValues { field_name, values } => {
                let field = unique_custom_field(registry, field_name)?;
                issue.set_custom_field_values(&field.id, values.clone());
            }
            NativeField::CustomDateTime {
                field_name,
                date_time,
            } => {
                let field = unique_custom_field(registry, field_name)?;
                let formatted = registry
                    .format_date_time(DateTimeStyle::for_field(&field), date_time)
                    .map_err(FieldApplyError::Host)?;
                issue.set_custom_field_values(&field.id, vec![formatted]);
            }
            NativeField::CustomOption { field_name, value } => {
                let field = unique_custom_field(registry, field_name)?;
                let option_id = registry
                    .option_id(&field, &issue.context(), value)
                    .map_err(FieldApplyError::Host)?
                    .ok_or_else(|| FieldApplyError::UnknownOption {
                        field_name: field_name.clone(),
                        value: value.clone(),
                    })?;
                issue.set_custom_field_values(&field.id, vec![option_id.to_string()]);
            }
        }
        Ok(())
    }
}

fn unique_custom_field<R>(
    registry: &R,
    field_name: &str,
) -> Result<CustomFieldInfo, FieldApplyError<R::Error>>
where
    R: FieldRegistry + ?Sized,
{
    let mut fields = registry
        .custom_fields_by_name(field_name)
        .map_err(FieldApplyError::Host)?;
    match fields.len() {
        0 => Err(FieldApplyError::UnknownFieldName(field_name.to_string())),
        1 => Ok(fields.remove(0)),
        _ => Err(FieldApplyError::AmbiguousFieldName(field_name.to_string())),
    }
}

fn custom_values(field_name: &str, values: Vec<String>) -> NativeField {
    NativeField::CustomValues {
        field_name: field_name.to_string(),
        values,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFieldFactory;

impl FieldFactory<NativeField> for NativeFieldFactory {
    fn summary_field(&self, summary: &str) -> NativeField {
        NativeField::Summary(summary.to_string())
    }

    fn description_field(&self, description: &str) -> NativeField {
        NativeField::Description(description.to_string())
    }

    fn project_field(&self, project_id: i64) -> NativeField {
        NativeField::ProjectId(project_id)
    }

    fn issue_type_field(&self, issue_type_id: i64) -> NativeField {
        NativeField::IssueTypeId(issue_type_id.to_string())
    }

    fn issue_type_by_name_field(&self, issue_type_name: &str) -> NativeField {
        NativeField::IssueTypeName(issue_type_name.to_string())
    }

    fn assignee_field(&self, user_name: &str) -> NativeField {
        NativeField::AssigneeId(user_name.to_string())
    }

    fn reporter_field(&self, user_name: &str) -> NativeField {
        NativeField::ReporterId(user_name.to_string())
    }

    // キーなしは値を空にしてクリアする。空文字はそのまま値として渡す
    fn epic_link_field(&self, epic_issue_key: Option<&str>) -> NativeField {
        custom_values(
            EPIC_LINK_FIELD,
            epic_issue_key.map(str::to_string).into_iter().collect(),
        )
    }

    fn epic_name_field(&self, epic_name: &str) -> NativeField {
        custom_values(EPIC_NAME_FIELD, vec![epic_name.to_string()])
    }

    fn custom_text_field(&self, field_name: &str, text: &str) -> NativeField {
        custom_values(field_name, vec![text.to_string()])
    }

    fn custom_number_field(&self, field_name: &str, number: f64) -> NativeField {
        custom_values(field_name, vec![number.to_string()])
    }

    fn custom_date_time_field(&self, field_name: &str, date_time: &DateTime<FixedOffset>) -> NativeField {
        NativeField::CustomDateTime {
            field_name: field_name.to_string(),
            date_time: *date_time,
        }
    }

    fn custom_radio_field(&self, field_name: &str, value: &str) -> NativeField {
        NativeField::CustomOption {
            field_name: field_name.to_string(),
            value: value.to_string(),
        }
    }

    fn custom_object_ref_field(&self, field_name: &str, object_key: Option<&str>) -> NativeField {
        custom_values(
            field_name,
            object_key.map(str::to_string).into_iter().collect(),
        )
    }

    fn custom_object_refs_field(&self, field_name: &str, object_keys: &[String]) -> NativeField {
        custom_values(field_name, object_keys.to_vec())
    }
}
