use super::{
    EPIC_LINK_FIELD, EPIC_NAME_FIELD, Field, FieldFactory, FieldKind, FieldMappings,
    resolve_field_id,
};
use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value, json};

/// Jiraが受け付ける日時形式（例: 2024-01-15T10:30:00.000+0900）
pub const JIRA_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// JSONのキーの決め方
#[derive(Debug, Clone, PartialEq)]
pub enum FieldTarget {
    /// システムフィールド。キーは固定
    Fixed(&'static str),
    /// 名前で指定するフィールド。マッピングでIDに解決する
    Mapped(String),
}

/// REST APIのリクエストボディに書き込むフィールド
#[derive(Debug, Clone, PartialEq)]
pub struct HttpField {
    kind: FieldKind,
    target: FieldTarget,
    value: Value,
}

impl HttpField {
    fn fixed(kind: FieldKind, key: &'static str, value: Value) -> Self {
        Self {
            kind,
            target: FieldTarget::Fixed(key),
            value,
        }
    }

    fn mapped(kind: FieldKind, name: &str, value: Value) -> Self {
        Self {
            kind,
            target: FieldTarget::Mapped(name.to_string()),
            value,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn target(&self) -> &FieldTarget {
        &self.target
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// 書き込み先のJSONキー
    pub fn key<'a>(&'a self, mappings: &'a FieldMappings) -> &'a str {
        match &self.target {
            FieldTarget::Fixed(key) => *key,
            FieldTarget::Mapped(name) => resolve_field_id(name, mappings),
        }
    }

    /// `fields` オブジェクトに自身を書き込む
    pub fn render(&self, fields: &mut Map<String, Value>, mappings: &FieldMappings) {
        fields.insert(self.key(mappings).to_string(), self.value.clone());
    }

    /// 書き込む値からドメインの `Field` を復元する
    pub fn decode(&self) -> Result<Field> {
        let name = match &self.target {
            FieldTarget::Fixed(key) => key.to_string(),
            FieldTarget::Mapped(name) => name.clone(),
        };

        let field = match self.kind {
            FieldKind::Summary => Field::Summary(self.string()?),
            FieldKind::Description => Field::Description(self.string()?),
            FieldKind::Project => Field::Project(self.nested_i64("id")?),
            FieldKind::IssueType => Field::IssueType(self.nested_i64("id")?),
            FieldKind::IssueTypeByName => Field::IssueTypeByName(self.nested_string("name")?),
            FieldKind::Assignee => Field::Assignee(self.nested_string("name")?),
            FieldKind::Reporter => Field::Reporter(self.nested_string("name")?),
            FieldKind::EpicLink => match &self.value {
                Value::Null => Field::EpicLink(None),
                _ => Field::EpicLink(Some(self.string()?)),
            },
            FieldKind::EpicName => Field::EpicName(self.string()?),
            FieldKind::CustomText => Field::CustomText {
                field_name: name,
                text: self.string()?,
            },
            FieldKind::CustomNumber => Field::CustomNumber {
                field_name: name,
                number: self.value.as_f64().ok_or_else(|| self.decode_error())?,
            },
            FieldKind::CustomDateTime => {
                let raw = self.string()?;
                let date_time = DateTime::parse_from_str(&raw, JIRA_DATE_TIME_FORMAT)
                    .map_err(|e| Error::InvalidInput(format!("Invalid date time '{}': {}", raw, e)))?;
                Field::CustomDateTime {
                    field_name: name,
                    date_time,
                }
            }
            FieldKind::CustomRadio => Field::CustomRadio {
                field_name: name,
                value: self.nested_string("value")?,
            },
            FieldKind::CustomObjectRef => {
                let mut keys = self.object_keys()?;
                if keys.len() > 1 {
                    return Err(self.decode_error());
                }
                Field::CustomObjectRef {
                    field_name: name,
                    object_key: keys.pop(),
                }
            }
            FieldKind::CustomObjectRefs => Field::CustomObjectRefs {
                field_name: name,
                object_keys: self.object_keys()?,
            },
        };
        Ok(field)
    }

    fn decode_error(&self) -> Error {
        Error::InvalidInput(format!(
            "Cannot decode {:?} field from {}",
            self.kind, self.value
        ))
    }

    fn string(&self) -> Result<String> {
        self.value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.decode_error())
    }

    fn nested_string(&self, key: &str) -> Result<String> {
        self.value
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| self.decode_error())
    }

    fn nested_i64(&self, key: &str) -> Result<i64> {
        self.value
            .get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| self.decode_error())
    }

    fn object_keys(&self) -> Result<Vec<String>> {
        let entries = self.value.as_array().ok_or_else(|| self.decode_error())?;
        entries
            .iter()
            .map(|entry| {
                entry
                    .get("key")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| self.decode_error())
            })
            .collect()
    }
}

/// フィールド一覧を `{"fields": {...}}` 形式のボディにする
pub fn render_fields(fields: &[HttpField], mappings: &FieldMappings) -> Value {
    let mut rendered = Map::new();
    for field in fields {
        field.render(&mut rendered, mappings);
    }
    json!({ "fields": rendered })
}

fn object_key_entries<'a>(keys: impl IntoIterator<Item = &'a str>) -> Value {
    Value::Array(keys.into_iter().map(|key| json!({ "key": key })).collect())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFieldFactory;

impl FieldFactory<HttpField> for HttpFieldFactory {
    fn summary_field(&self, summary: &str) -> HttpField {
        HttpField::fixed(FieldKind::Summary, "summary", json!(summary))
    }

    fn description_field(&self, description: &str) -> HttpField {
        HttpField::fixed(FieldKind::Description, "description", json!(description))
    }

    fn project_field(&self, project_id: i64) -> HttpField {
        HttpField::fixed(FieldKind::Project, "project", json!({ "id": project_id }))
    }

    fn issue_type_field(&self, issue_type_id: i64) -> HttpField {
        HttpField::fixed(
            FieldKind::IssueType,
            "issuetype",
            json!({ "id": issue_type_id }),
        )
    }

    fn issue_type_by_name_field(&self, issue_type_name: &str) -> HttpField {
        HttpField::fixed(
            FieldKind::IssueTypeByName,
            "issuetype",
            json!({ "name": issue_type_name }),
        )
    }

    fn assignee_field(&self, user_name: &str) -> HttpField {
        HttpField::mapped(FieldKind::Assignee, "assignee", json!({ "name": user_name }))
    }

    fn reporter_field(&self, user_name: &str) -> HttpField {
        HttpField::mapped(FieldKind::Reporter, "reporter", json!({ "name": user_name }))
    }

    fn epic_link_field(&self, epic_issue_key: Option<&str>) -> HttpField {
        HttpField::mapped(FieldKind::EpicLink, EPIC_LINK_FIELD, json!(epic_issue_key))
    }

    fn epic_name_field(&self, epic_name: &str) -> HttpField {
        HttpField::mapped(FieldKind::EpicName, EPIC_NAME_FIELD, json!(epic_name))
    }

    fn custom_text_field(&self, field_name: &str, text: &str) -> HttpField {
        HttpField::mapped(FieldKind::CustomText, field_name, json!(text))
    }

    fn custom_number_field(&self, field_name: &str, number: f64) -> HttpField {
        // NaN/無限大はJSONで表せないためnullになる
        HttpField::mapped(FieldKind::CustomNumber, field_name, json!(number))
    }

    fn custom_date_time_field(&self, field_name: &str, date_time: &DateTime<FixedOffset>) -> HttpField {
        let formatted = date_time.format(JIRA_DATE_TIME_FORMAT).to_string();
        HttpField::mapped(FieldKind::CustomDateTime, field_name, json!(formatted))
    }

    fn custom_radio_field(&self, field_name: &str, value: &str) -> HttpField {
        HttpField::mapped(FieldKind::CustomRadio, field_name, json!({ "value": value }))
    }

    fn custom_object_ref_field(&self, field_name: &str, object_key: Option<&str>) -> HttpField {
        HttpField::mapped(
            FieldKind::CustomObjectRef,
            field_name,
            object_key_entries(object_key),
        )
    }

    fn custom_object_refs_field(&self, field_name: &str, object_keys: &[String]) -> HttpField {
        HttpField::mapped(
            FieldKind::CustomObjectRefs,
            field_name,
            object_key_entries(object_keys.iter().map(String::as_str)),
        )
    }
}
