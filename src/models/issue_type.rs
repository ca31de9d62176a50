use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraIssueType {
    pub id: String,
    pub name: String,
}

/// 課題タイプに設定できる属性（フィールド）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraIssueTypeAttribute {
    pub id: String,
    pub name: String,
    pub schema: JiraIssueTypeAttributeSchema,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraIssueTypeAttributeSchema {
    /// "date" などのJSON型
    #[serde(rename = "type")]
    pub schema_type: String,
    pub items: Option<String>,
    /// システムフィールドの場合のみ（例: "assignee"）
    pub system: Option<String>,
    /// 例: com.atlassian.jira.plugin.system.customfieldtypes:datepicker
    pub custom: Option<String>,
    #[serde(rename = "customId")]
    pub custom_id: Option<i64>,
}

impl JiraIssueTypeAttributeSchema {
    /// 型情報を持たない属性
    pub fn any() -> Self {
        Self {
            schema_type: "Any".to_string(),
            items: None,
            system: None,
            custom: None,
            custom_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpJiraIssueType {
    pub id: String,
    pub name: String,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subtask: Option<bool>,
}

impl HttpJiraIssueType {
    pub fn into_jira_issue_type(self) -> JiraIssueType {
        JiraIssueType {
            id: self.id,
            name: self.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpJiraIssueTypeAttribute {
    #[serde(default)]
    pub required: bool,
    pub schema: Option<HttpJiraIssueTypeAttributeSchema>,
    pub name: String,
    #[serde(rename = "fieldId")]
    pub field_id: String,
    #[serde(rename = "hasDefaultValue", default)]
    pub has_default_value: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpJiraIssueTypeAttributeSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub items: Option<String>,
    pub system: Option<String>,
    pub custom: Option<String>,
    #[serde(rename = "customId")]
    pub custom_id: Option<i64>,
}

impl HttpJiraIssueTypeAttribute {
    /// スキーマがない属性は "Any" 型として扱う
    pub fn into_jira_issue_type_attribute(self) -> JiraIssueTypeAttribute {
        let schema = match self.schema {
            Some(schema) => JiraIssueTypeAttributeSchema {
                schema_type: schema.schema_type,
                items: schema.items,
                system: schema.system,
                custom: schema.custom,
                custom_id: schema.custom_id,
            },
            None => JiraIssueTypeAttributeSchema::any(),
        };

        JiraIssueTypeAttribute {
            id: self.field_id,
            name: self.name,
            schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_conversion() {
        let attribute: HttpJiraIssueTypeAttribute = serde_json::from_value(json!({
            "required": false,
            "schema": {
                "type": "date",
                "custom": "com.atlassian.jira.plugin.system.customfieldtypes:datepicker",
                "customId": 10202
            },
            "name": "Due",
            "fieldId": "customfield_10202",
            "hasDefaultValue": false
        }))
        .unwrap();

        let attribute = attribute.into_jira_issue_type_attribute();

        assert_eq!(attribute.id, "customfield_10202");
        assert_eq!(attribute.schema.schema_type, "date");
        assert_eq!(attribute.schema.custom_id, Some(10202));
    }

    #[test]
    fn test_attribute_without_schema_is_any() {
        let attribute: HttpJiraIssueTypeAttribute = serde_json::from_value(json!({
            "required": true,
            "name": "Attachment",
            "fieldId": "attachment"
        }))
        .unwrap();

        let attribute = attribute.into_jira_issue_type_attribute();

        assert_eq!(attribute.schema.schema_type, "Any");
        assert!(attribute.schema.custom.is_none());
    }
}
