use serde::{Deserialize, Serialize};

/// 作成された課題の参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraIssue {
    pub id: String,
    pub key: String,
    #[serde(rename = "self")]
    pub self_link: String,
}

impl JiraIssue {
    pub fn new(id: impl Into<String>, key: impl Into<String>, self_link: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            self_link: self_link.into(),
        }
    }
}
