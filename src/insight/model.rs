use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(InsightSchemaId);
id_type!(InsightObjectTypeId);
id_type!(
    /// 未保存のオブジェクトは [`InsightObjectId::NOT_PERSISTED`]
    InsightObjectId
);
id_type!(InsightAttributeId);
id_type!(AttachmentId);

impl InsightObjectId {
    pub const NOT_PERSISTED: InsightObjectId = InsightObjectId(-1);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSchema {
    pub id: InsightSchemaId,
    pub name: String,
    #[serde(default)]
    pub object_count: u32,
    #[serde(default)]
    pub object_type_count: u32,
}

/// オブジェクトタイプと、その属性定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTypeSchema {
    pub id: InsightObjectTypeId,
    pub name: String,
    #[serde(default)]
    pub parent_object_type_id: Option<InsightObjectTypeId>,
    #[serde(default)]
    pub attributes: Vec<ObjectTypeSchemaAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTypeSchemaAttribute {
    pub id: InsightAttributeId,
    pub name: String,
    /// 0: 値, 1: 参照, 2: ユーザー ...
    #[serde(rename = "type", default)]
    pub attribute_type: i32,
    #[serde(default)]
    pub default_type: Option<DefaultType>,
    #[serde(default)]
    pub reference_object_type_id: Option<InsightObjectTypeId>,
    #[serde(default)]
    pub minimum_cardinality: i32,
    #[serde(default)]
    pub maximum_cardinality: i32,
    #[serde(default)]
    pub include_child_object_types: bool,
}

impl ObjectTypeSchemaAttribute {
    pub const VALUE: i32 = 0;
    pub const REFERENCE: i32 = 1;

    pub fn is_value(&self) -> bool {
        self.attribute_type == Self::VALUE
    }

    pub fn is_reference(&self) -> bool {
        self.attribute_type == Self::REFERENCE
    }

    /// 値属性ならデフォルト型の名前、それ以外は空文字
    pub fn type_name(&self) -> &str {
        self.default_type
            .as_ref()
            .map(|default_type| default_type.name.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightUser {
    pub display_name: String,
    pub name: String,
    #[serde(default)]
    pub email_address: Option<String>,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencedObjectType {
    pub id: InsightObjectTypeId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencedObject {
    pub id: InsightObjectId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub object_key: String,
    #[serde(default)]
    pub object_type: Option<ReferencedObjectType>,
}

/// 属性値1件。参照属性なら `referenced_object`、ユーザー属性なら `user` が入る
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectAttributeValue {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub display_value: Option<Value>,
    #[serde(default)]
    pub referenced_object: Option<ReferencedObject>,
    #[serde(default)]
    pub user: Option<InsightUser>,
}

impl ObjectAttributeValue {
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn reference(object_id: InsightObjectId) -> Self {
        Self {
            referenced_object: Some(ReferencedObject {
                id: object_id,
                label: String::new(),
                object_key: String::new(),
                object_type: None,
            }),
            ..Self::default()
        }
    }

    /// 書き込み時に送る値。参照は参照先ID、ユーザーはキー
    pub fn edit_value(&self) -> Option<Value> {
        if let Some(referenced) = &self.referenced_object {
            return Some(Value::from(referenced.id.0));
        }
        if let Some(user) = &self.user {
            return Some(Value::String(user.key.clone()));
        }
        self.value.clone().filter(|value| !value.is_null())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightAttribute {
    pub attribute_id: InsightAttributeId,
    /// スキーマキャッシュから解決した名前。未解決なら空
    #[serde(default)]
    pub attribute_name: String,
    #[serde(default)]
    pub values: Vec<ObjectAttributeValue>,
}

impl InsightAttribute {
    pub fn new(attribute_id: InsightAttributeId, values: Vec<ObjectAttributeValue>) -> Self {
        Self {
            attribute_id,
            attribute_name: String::new(),
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightObject {
    pub object_type_id: InsightObjectTypeId,
    pub id: InsightObjectId,
    pub object_type_name: String,
    pub object_key: String,
    pub label: String,
    pub attributes: Vec<InsightAttribute>,
    pub attachments_exist: bool,
    pub object_self: String,
}

impl InsightObject {
    pub fn attribute(&self, attribute_id: InsightAttributeId) -> Option<&InsightAttribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.attribute_id == attribute_id)
    }

    pub fn attribute_by_name(&self, name: &str) -> Option<&InsightAttribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.attribute_name == name)
    }

    /// 名前で指定した属性の最初の値を文字列で返す
    pub fn string_value(&self, name: &str) -> Option<String> {
        let value = self.attribute_by_name(name)?.values.first()?;
        match value.value.as_ref()? {
            Value::String(text) => Some(text.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// 属性値を置き換える。なければ追加する
    pub fn set_values(&mut self, attribute_id: InsightAttributeId, values: Vec<ObjectAttributeValue>) {
        match self
            .attributes
            .iter_mut()
            .find(|attribute| attribute.attribute_id == attribute_id)
        {
            Some(attribute) => attribute.values = values,
            None => self.attributes.push(InsightAttribute::new(attribute_id, values)),
        }
    }
}

/// 型付きの属性値。`None` / 空リストは値のクリア
#[derive(Debug, Clone, PartialEq)]
pub enum InsightValue {
    Text(Option<String>),
    Integer(Option<i64>),
    Double(Option<f64>),
    Bool(Option<bool>),
    Date(Option<NaiveDate>),
    DateTime(Option<DateTime<FixedOffset>>),
    Select(Vec<String>),
    References(Vec<InsightObjectId>),
}

impl InsightValue {
    pub fn is_reference(&self) -> bool {
        matches!(self, InsightValue::References(_))
    }

    pub fn into_values(self) -> Vec<ObjectAttributeValue> {
        match self {
            InsightValue::Text(text) => text.map(ObjectAttributeValue::value).into_iter().collect(),
            InsightValue::Integer(number) => {
                number.map(ObjectAttributeValue::value).into_iter().collect()
            }
            InsightValue::Double(number) => {
                number.map(ObjectAttributeValue::value).into_iter().collect()
            }
            InsightValue::Bool(flag) => flag.map(ObjectAttributeValue::value).into_iter().collect(),
            InsightValue::Date(date) => date
                .map(|date| ObjectAttributeValue::value(date.format(DATE_FORMAT).to_string()))
                .into_iter()
                .collect(),
            InsightValue::DateTime(date_time) => date_time
                .map(|date_time| ObjectAttributeValue::value(date_time.to_rfc3339()))
                .into_iter()
                .collect(),
            InsightValue::Select(options) => {
                options.into_iter().map(ObjectAttributeValue::value).collect()
            }
            InsightValue::References(ids) => {
                ids.into_iter().map(ObjectAttributeValue::reference).collect()
            }
        }
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn parse_date_time(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, DATE_TIME_FORMAT))
        .ok()
}

/// 属性IDで読み書きする型付きアクセサ
///
/// 型が合わない値は `None` として読む。
impl InsightObject {
    pub fn has_attribute(&self, attribute_id: InsightAttributeId) -> bool {
        self.attribute(attribute_id).is_some()
    }

    pub fn attribute_id_by_name(&self, name: &str) -> Option<InsightAttributeId> {
        self.attribute_by_name(name)
            .map(|attribute| attribute.attribute_id)
    }

    fn first_value(&self, attribute_id: InsightAttributeId) -> Option<&Value> {
        self.attribute(attribute_id)?
            .values
            .iter()
            .filter_map(|value| value.value.as_ref())
            .find(|value| !value.is_null())
    }

    pub fn text_value(&self, attribute_id: InsightAttributeId) -> Option<String> {
        self.first_value(attribute_id).and_then(as_text)
    }

    pub fn int_value(&self, attribute_id: InsightAttributeId) -> Option<i64> {
        match self.first_value(attribute_id)? {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn double_value(&self, attribute_id: InsightAttributeId) -> Option<f64> {
        match self.first_value(attribute_id)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn bool_value(&self, attribute_id: InsightAttributeId) -> Option<bool> {
        match self.first_value(attribute_id)? {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn date_value(&self, attribute_id: InsightAttributeId) -> Option<NaiveDate> {
        let text = self.text_value(attribute_id)?;
        NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .ok()
            .or_else(|| parse_date_time(&text).map(|date_time| date_time.date_naive()))
    }

    pub fn date_time_value(&self, attribute_id: InsightAttributeId) -> Option<DateTime<FixedOffset>> {
        parse_date_time(&self.text_value(attribute_id)?)
    }

    pub fn select_values(&self, attribute_id: InsightAttributeId) -> Vec<String> {
        self.attribute(attribute_id)
            .map(|attribute| {
                attribute
                    .values
                    .iter()
                    .filter_map(|value| value.value.as_ref().and_then(as_text))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn user_values(&self, attribute_id: InsightAttributeId) -> Vec<&InsightUser> {
        self.attribute(attribute_id)
            .map(|attribute| {
                attribute
                    .values
                    .iter()
                    .filter_map(|value| value.user.as_ref())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn references(&self, attribute_id: InsightAttributeId) -> Vec<&ReferencedObject> {
        self.attribute(attribute_id)
            .map(|attribute| {
                attribute
                    .values
                    .iter()
                    .filter_map(|value| value.referenced_object.as_ref())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn single_reference(&self, attribute_id: InsightAttributeId) -> Option<&ReferencedObject> {
        self.references(attribute_id).into_iter().next()
    }

    pub fn set_value(&mut self, attribute_id: InsightAttributeId, value: InsightValue) {
        self.set_values(attribute_id, value.into_values());
    }

    pub fn set_text_value(&mut self, attribute_id: InsightAttributeId, text: Option<&str>) {
        self.set_value(attribute_id, InsightValue::Text(text.map(str::to_string)));
    }

    pub fn set_int_value(&mut self, attribute_id: InsightAttributeId, number: Option<i64>) {
        self.set_value(attribute_id, InsightValue::Integer(number));
    }

    pub fn set_double_value(&mut self, attribute_id: InsightAttributeId, number: Option<f64>) {
        self.set_value(attribute_id, InsightValue::Double(number));
    }

    pub fn set_bool_value(&mut self, attribute_id: InsightAttributeId, flag: Option<bool>) {
        self.set_value(attribute_id, InsightValue::Bool(flag));
    }

    pub fn set_date_value(&mut self, attribute_id: InsightAttributeId, date: Option<NaiveDate>) {
        self.set_value(attribute_id, InsightValue::Date(date));
    }

    pub fn set_date_time_value(
        &mut self,
        attribute_id: InsightAttributeId,
        date_time: Option<DateTime<FixedOffset>>,
    ) {
        self.set_value(attribute_id, InsightValue::DateTime(date_time));
    }

    pub fn set_select_values(&mut self, attribute_id: InsightAttributeId, options: Vec<String>) {
        self.set_value(attribute_id, InsightValue::Select(options));
    }

    pub fn add_select_value(&mut self, attribute_id: InsightAttributeId, option: &str) {
        let mut options = self.select_values(attribute_id);
        options.push(option.to_string());
        self.set_select_values(attribute_id, options);
    }

    pub fn remove_select_value(&mut self, attribute_id: InsightAttributeId, option: &str) {
        let options = self
            .select_values(attribute_id)
            .into_iter()
            .filter(|existing| existing != option)
            .collect();
        self.set_select_values(attribute_id, options);
    }

    pub fn clear_select_values(&mut self, attribute_id: InsightAttributeId) {
        self.set_select_values(attribute_id, Vec::new());
    }

    /// 既に参照していれば何もしない
    pub fn add_reference(&mut self, attribute_id: InsightAttributeId, object_id: InsightObjectId) {
        let mut values: Vec<ObjectAttributeValue> = self
            .references(attribute_id)
            .into_iter()
            .cloned()
            .map(|referenced| ObjectAttributeValue {
                referenced_object: Some(referenced),
                ..ObjectAttributeValue::default()
            })
            .collect();
        let exists = values.iter().any(|value| {
            value
                .referenced_object
                .as_ref()
                .is_some_and(|referenced| referenced.id == object_id)
        });
        if !exists {
            values.push(ObjectAttributeValue::reference(object_id));
        }
        self.set_values(attribute_id, values);
    }

    pub fn remove_reference(&mut self, attribute_id: InsightAttributeId, object_id: InsightObjectId) {
        let values = self
            .references(attribute_id)
            .into_iter()
            .filter(|referenced| referenced.id != object_id)
            .cloned()
            .map(|referenced| ObjectAttributeValue {
                referenced_object: Some(referenced),
                ..ObjectAttributeValue::default()
            })
            .collect();
        self.set_values(attribute_id, values);
    }

    pub fn clear_references(&mut self, attribute_id: InsightAttributeId) {
        self.set_values(attribute_id, Vec::new());
    }

    pub fn set_single_reference(
        &mut self,
        attribute_id: InsightAttributeId,
        object_id: InsightObjectId,
    ) {
        self.set_values(attribute_id, vec![ObjectAttributeValue::reference(object_id)]);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightHistoryItem {
    pub id: i64,
    #[serde(default)]
    pub affected_attribute: Option<String>,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    pub actor: Actor,
    #[serde(rename = "type")]
    pub history_type: i32,
    pub created: String,
    pub object_id: InsightObjectId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightHistory {
    pub object_id: InsightObjectId,
    pub history_items: Vec<InsightHistoryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightAttachment {
    pub id: AttachmentId,
    pub author: String,
    pub mime_type: String,
    pub filename: String,
    /// 表示用（例: "10.1 kB"）
    pub filesize: String,
    pub created: String,
    #[serde(default)]
    pub comment: String,
    pub url: String,
}

/// スキーマキャッシュの1スキーマ分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightSchemaDescription {
    pub id: InsightSchemaId,
    pub name: String,
    pub object_types: Vec<InsightObjectTypeDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightObjectTypeDescription {
    pub id: InsightObjectTypeId,
    pub name: String,
    pub parent_object_type_id: Option<InsightObjectTypeId>,
    pub attributes: Vec<InsightAttributeDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightAttributeDescription {
    pub id: InsightAttributeId,
    pub name: String,
    pub type_name: String,
}

impl InsightObjectTypeDescription {
    pub fn from_schema(object_type: &ObjectTypeSchema) -> Self {
        Self {
            id: object_type.id,
            name: object_type.name.clone(),
            parent_object_type_id: object_type.parent_object_type_id,
            attributes: object_type
                .attributes
                .iter()
                .map(|attribute| InsightAttributeDescription {
                    id: attribute.id,
                    name: attribute.name.clone(),
                    type_name: attribute.type_name().to_string(),
                })
                .collect(),
        }
    }
}
