use crate::field::FieldMappings;
use crate::http::HttpPage;
use serde::Deserialize;
use serde_json::Value;

/// 検索結果のページ。課題はパーサーに渡すため生のJSONのまま保持する
#[derive(Debug, Clone, Deserialize)]
pub struct HttpJiraIssuePage {
    #[serde(rename = "maxResults", default)]
    pub max_results: u32,
    #[serde(rename = "startAt", default)]
    pub start_at: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<Value>,
    #[serde(default)]
    pub names: Value,
}

impl HttpJiraIssuePage {
    pub fn mappings(&self) -> FieldMappings {
        invert_names(&self.names)
    }
}

impl HttpPage<Value> for HttpJiraIssuePage {
    fn max_results(&self) -> u32 {
        self.max_results
    }

    fn start_at(&self) -> u32 {
        self.start_at
    }

    fn total(&self) -> u32 {
        self.total
    }

    fn values(&self) -> &[Value] {
        &self.issues
    }

    fn into_values(self) -> Vec<Value> {
        self.issues
    }
}

/// `names` オブジェクト（ID -> 表示名）を 表示名 -> ID に反転する
pub fn invert_names(names: &Value) -> FieldMappings {
    names
        .as_object()
        .map(|names| {
            names
                .iter()
                .filter_map(|(id, name)| name.as_str().map(|name| (name.to_string(), id.clone())))
                .collect()
        })
        .unwrap_or_default()
}
