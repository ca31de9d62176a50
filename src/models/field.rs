use crate::field::FieldMappings;
use serde::Deserialize;

/// createmetaが返すフィールドIDと表示名の組
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpMappingField {
    #[serde(rename = "fieldId")]
    pub field_id: String,
    pub name: String,
}

/// 表示名 -> フィールドID のマッピングを作る。同名があれば後勝ち
pub fn mappings_from_fields(fields: Vec<HttpMappingField>) -> FieldMappings {
    fields
        .into_iter()
        .map(|field| (field.name, field.field_id))
        .collect()
}
