//! `rest/insight/1.0` の送受信形式

use crate::insight::cache::SchemaSnapshot;
use crate::insight::model::{
    InsightAttribute, InsightAttributeId, InsightObject, InsightObjectId, InsightObjectTypeId,
    InsightSchema, ObjectAttributeValue,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct SchemaListResponse {
    #[serde(default)]
    pub objectschemas: Vec<InsightSchema>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ObjectEntriesResponse {
    #[serde(default)]
    pub total_filter_count: u32,
    #[serde(default)]
    pub object_entries: Vec<ObjectResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetaObjectType {
    pub id: InsightObjectTypeId,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExtendedInfo {
    #[serde(default)]
    pub attachments_exists: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TypeAttributeRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttributeResponse {
    pub object_type_attribute_id: InsightAttributeId,
    #[serde(default)]
    pub object_type_attribute: Option<TypeAttributeRef>,
    #[serde(default)]
    pub object_attribute_values: Vec<ObjectAttributeValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ObjectResponse {
    pub id: InsightObjectId,
    #[serde(default)]
    pub label: String,
    pub object_key: String,
    pub object_type: MetaObjectType,
    #[serde(default)]
    pub attributes: Vec<AttributeResponse>,
    #[serde(default)]
    pub extended_info: Option<ExtendedInfo>,
}

impl ObjectResponse {
    /// 属性名はスナップショットを優先し、なければレスポンス内の定義を使う
    pub fn into_object(self, base_url: &str, snapshot: Option<&SchemaSnapshot>) -> InsightObject {
        let object_type_id = self.object_type.id;
        let attributes = self
            .attributes
            .into_iter()
            .map(|attribute| {
                let cached = snapshot.and_then(|snapshot| {
                    snapshot.attribute_name(object_type_id, attribute.object_type_attribute_id)
                });
                let attribute_name = match (cached, &attribute.object_type_attribute) {
                    (Some(name), _) => name.to_string(),
                    (None, Some(type_attribute)) => type_attribute.name.clone(),
                    (None, None) => String::new(),
                };
                InsightAttribute {
                    attribute_id: attribute.object_type_attribute_id,
                    attribute_name,
                    values: attribute.object_attribute_values,
                }
            })
            .collect();

        InsightObject {
            object_type_id,
            id: self.id,
            object_type_name: self.object_type.name,
            object_self: format!("{}/secure/insight/assets/{}", base_url, self.object_key),
            object_key: self.object_key,
            label: self.label,
            attributes,
            attachments_exist: self
                .extended_info
                .map(|info| info.attachments_exists)
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ObjectUpdateResponse {
    pub id: InsightObjectId,
    #[serde(default)]
    pub object_key: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct EditValue {
    pub value: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EditAttribute {
    pub object_type_attribute_id: InsightAttributeId,
    pub object_attribute_values: Vec<EditValue>,
}

/// 作成・更新リクエストのボディ
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ObjectEditItem {
    pub object_type_id: InsightObjectTypeId,
    pub attributes: Vec<EditAttribute>,
}

impl ObjectEditItem {
    /// 属性はすべて送る。値のない属性は空配列になり、サーバー側でクリアされる
    pub fn new(object_type_id: InsightObjectTypeId, attributes: &[InsightAttribute]) -> Self {
        Self {
            object_type_id,
            attributes: attributes
                .iter()
                .map(|attribute| EditAttribute {
                    object_type_attribute_id: attribute.attribute_id,
                    object_attribute_values: attribute
                        .values
                        .iter()
                        .filter_map(ObjectAttributeValue::edit_value)
                        .map(|value| EditValue { value })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::model::{
        InsightAttributeDescription, InsightObjectTypeDescription, InsightSchemaDescription,
        InsightSchemaId,
    };
    use serde_json::json;

    fn entry() -> Value {
        json!({
            "id": 15,
            "label": "web-01",
            "objectKey": "IT-15",
            "objectType": {"id": 7, "name": "Server", "objectSchemaId": 1},
            "extendedInfo": {"openIssuesExists": false, "attachmentsExists": true},
            "attributes": [
                {
                    "id": 1,
                    "objectTypeAttributeId": 70,
                    "objectTypeAttribute": {"id": 70, "name": "Name"},
                    "objectAttributeValues": [{"value": "web-01", "displayValue": "web-01"}]
                },
                {
                    "id": 2,
                    "objectTypeAttributeId": 71,
                    "objectAttributeValues": [{
                        "displayValue": "IT-3",
                        "referencedObject": {"id": 3, "label": "Rack A", "objectKey": "IT-3"}
                    }]
                }
            ]
        })
    }

    #[test]
    fn test_into_object_without_cache_uses_inline_names() {
        // Given: 属性定義付きのIQLレスポンス
        let response: ObjectResponse = serde_json::from_value(entry()).unwrap();

        // When: キャッシュなしで変換
        let object = response.into_object("http://jira.local", None);

        // Then: レスポンス内の名前が使われ、未定義の属性は空名
        assert_eq!(object.object_key, "IT-15");
        assert_eq!(object.object_self, "http://jira.local/secure/insight/assets/IT-15");
        assert!(object.attachments_exist);
        assert_eq!(object.attributes[0].attribute_name, "Name");
        assert_eq!(object.attributes[1].attribute_name, "");
        assert_eq!(
            object.attributes[1].values[0]
                .referenced_object
                .as_ref()
                .unwrap()
                .object_key,
            "IT-3"
        );
    }

    #[test]
    fn test_into_object_prefers_cached_names() {
        let snapshot = SchemaSnapshot::new(vec![InsightSchemaDescription {
            id: InsightSchemaId(1),
            name: "IT".to_string(),
            object_types: vec![InsightObjectTypeDescription {
                id: InsightObjectTypeId(7),
                name: "Server".to_string(),
                parent_object_type_id: None,
                attributes: vec![InsightAttributeDescription {
                    id: InsightAttributeId(71),
                    name: "Rack".to_string(),
                    type_name: String::new(),
                }],
            }],
        }]);
        let response: ObjectResponse = serde_json::from_value(entry()).unwrap();

        let object = response.into_object("http://jira.local", Some(&snapshot));

        assert_eq!(object.attributes[0].attribute_name, "Name");
        assert_eq!(object.attributes[1].attribute_name, "Rack");
    }

    #[test]
    fn test_edit_item_serializes_reference_ids() {
        let attributes = vec![
            InsightAttribute::new(
                InsightAttributeId(70),
                vec![ObjectAttributeValue::value("web-02")],
            ),
            InsightAttribute::new(
                InsightAttributeId(71),
                vec![ObjectAttributeValue::reference(InsightObjectId(3))],
            ),
            InsightAttribute::new(InsightAttributeId(72), Vec::new()),
        ];

        let body = serde_json::to_value(ObjectEditItem::new(InsightObjectTypeId(7), &attributes))
            .unwrap();

        assert_eq!(
            body,
            json!({
                "objectTypeId": 7,
                "attributes": [
                    {"objectTypeAttributeId": 70, "objectAttributeValues": [{"value": "web-02"}]},
                    {"objectTypeAttributeId": 71, "objectAttributeValues": [{"value": 3}]},
                    {"objectTypeAttributeId": 72, "objectAttributeValues": []}
                ]
            })
        );
    }
}
