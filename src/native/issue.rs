use super::{
    FieldRegistry, IssueJsonConverter, IssueRenderer, IssueStore, MutableIssue, PagerFilter,
    existing_issue,
};
use crate::error::{Error, Result};
use crate::field::{NativeField, NativeFieldFactory};
use crate::jira::{IssueOperator, IssueParser};
use crate::models::JiraIssue;
use crate::page::Page;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// ホストのオブジェクトモデルを直接操作する課題オペレーター
pub struct NativeIssueOperator<H> {
    host: Arc<H>,
    factory: NativeFieldFactory,
}

impl<H> NativeIssueOperator<H>
where
    H: IssueStore + FieldRegistry + IssueRenderer + 'static,
{
    pub fn new(host: Arc<H>) -> Self {
        Self {
            host,
            factory: NativeFieldFactory,
        }
    }

    fn apply_fields(&self, issue: &mut MutableIssue, fields: &[NativeField]) -> Result<()> {
        for field in fields {
            field
                .apply(issue, self.host.as_ref())
                .map_err(|e| Error::native(&e))?;
        }
        Ok(())
    }

    /// JSON化して呼び出し側のパーサーに渡す
    fn to_concrete<T>(&self, issue: &MutableIssue, parser: &IssueParser<T>) -> Result<T> {
        let json = IssueJsonConverter::new(self.host.as_ref())
            .create_json_issue(issue)
            .map_err(|e| Error::native(&e))?;
        let mappings = self
            .host
            .custom_field_mappings(issue)
            .map_err(|e| Error::native(&e))?;
        parser(&json, &mappings)
    }

    fn search<T>(
        &self,
        jql: &str,
        filter: &PagerFilter,
        parser: &IssueParser<T>,
    ) -> Result<Page<T>> {
        let results = self
            .host
            .search(jql, filter)
            .map_err(|e| Error::native(&e))?;
        let items = results
            .issues
            .iter()
            .map(|issue| self.to_concrete(issue, parser))
            .collect::<Result<Vec<T>>>()?;

        let page_size = filter.page_size.unwrap_or(items.len() as u32);
        let page_index = if page_size == 0 {
            0
        } else {
            filter.start / page_size
        };
        Ok(Page::new(items, results.total, page_index, page_size))
    }
}

#[async_trait]
impl<H> IssueOperator for NativeIssueOperator<H>
where
    H: IssueStore + FieldRegistry + IssueRenderer + 'static,
{
    type Field = NativeField;
    type Factory = NativeFieldFactory;

    fn field_factory(&self) -> &NativeFieldFactory {
        &self.factory
    }

    async fn get_issues_by_jql<T>(&self, jql: &str, parser: &IssueParser<T>) -> Result<Vec<T>>
    where
        T: Send,
    {
        let page = self.search(jql, &PagerFilter::unlimited(), parser)?;
        Ok(page.items)
    }

    async fn get_issues_by_jql_paginated<T>(
        &self,
        jql: &str,
        page_index: u32,
        page_size: u32,
        parser: &IssueParser<T>,
    ) -> Result<Page<T>>
    where
        T: Send,
    {
        let page_size = page_size.max(1);
        let filter = PagerFilter::page_aligned(page_index.saturating_mul(page_size), page_size);
        self.search(jql, &filter, parser)
    }

    async fn get_issue_by_key<T>(&self, key: &str, parser: &IssueParser<T>) -> Result<Option<T>>
    where
        T: Send,
    {
        let issue = self
            .host
            .issue_by_key(key)
            .map_err(|e| Error::native(&e))?;
        match issue {
            Some(issue) => self.to_concrete(&issue, parser).map(Some),
            None => Ok(None),
        }
    }

    async fn create_issue(
        &self,
        project_id: i64,
        issue_type_id: i64,
        fields: Vec<NativeField>,
    ) -> Result<Option<JiraIssue>> {
        let mut issue = MutableIssue {
            project_id: Some(project_id),
            issue_type_id: Some(issue_type_id.to_string()),
            ..MutableIssue::default()
        };
        self.apply_fields(&mut issue, &fields)?;

        let created = self
            .host
            .create_issue(issue)
            .map_err(|e| Error::native(&e))?;
        let (Some(id), Some(key)) = (created.id, created.key) else {
            return Ok(None);
        };
        debug!("Created issue {} ({})", key, id);

        let self_link = format!(
            "{}/rest/api/2/issue/{}",
            self.host.base_url().trim_end_matches('/'),
            id
        );
        Ok(Some(JiraIssue::new(id.to_string(), key, self_link)))
    }

    async fn update_issue(
        &self,
        project_id: i64,
        issue_type_id: i64,
        issue_key: &str,
        fields: Vec<NativeField>,
    ) -> Result<()> {
        let mut issue = existing_issue(self.host.as_ref(), issue_key)?;
        issue.project_id = Some(project_id);
        issue.issue_type_id = Some(issue_type_id.to_string());
        self.apply_fields(&mut issue, &fields)?;

        self.host
            .update_issue(issue)
            .map_err(|e| Error::native(&e))
    }

    async fn delete_issue(&self, issue_key: &str) -> Result<()> {
        let issue = existing_issue(self.host.as_ref(), issue_key)?;
        let key = issue.key.as_deref().unwrap_or(issue_key);
        self.host.delete_issue(key).map_err(|e| Error::native(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldFactory, FieldMappings};
    use crate::jira::issue_not_found;
    use crate::native::{
        CustomFieldInfo, DateTimeStyle, FieldJsonBean, FieldLayoutItem, HostField, HostIssueType,
        IssueBean, IssueContext, NativeHost, SearchResults,
    };
    use chrono::{DateTime, FixedOffset};
    use serde_json::{Value, json};
    use std::fmt;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct HostError(String);

    impl fmt::Display for HostError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl std::error::Error for HostError {}

    /// メモリ上の課題を持つホスト
    #[derive(Default)]
    struct InMemoryHost {
        issues: Mutex<Vec<MutableIssue>>,
    }

    impl InMemoryHost {
        fn stored(&self, key: &str) -> Option<MutableIssue> {
            self.issues
                .lock()
                .unwrap()
                .iter()
                .find(|issue| issue.key.as_deref() == Some(key))
                .cloned()
        }
    }

    impl NativeHost for InMemoryHost {
        type Error = HostError;
    }

    impl FieldRegistry for InMemoryHost {
        fn custom_fields_by_name(&self, name: &str) -> std::result::Result<Vec<CustomFieldInfo>, HostError> {
            Ok(match name {
                "Epic Link" => vec![CustomFieldInfo {
                    id: "customfield_10100".to_string(),
                    name: name.to_string(),
                    type_key: "gh-epic-link".to_string(),
                }],
                _ => Vec::new(),
            })
        }

        fn issue_types(&self) -> std::result::Result<Vec<HostIssueType>, HostError> {
            Ok(Vec::new())
        }

        fn option_id(
            &self,
            _field: &CustomFieldInfo,
            _context: &IssueContext,
            _value: &str,
        ) -> std::result::Result<Option<i64>, HostError> {
            Ok(None)
        }

        fn format_date_time(
            &self,
            _style: DateTimeStyle,
            date_time: &DateTime<FixedOffset>,
        ) -> std::result::Result<String, HostError> {
            Ok(date_time.to_rfc3339())
        }
    }

    impl IssueStore for InMemoryHost {
        fn create_issue(&self, mut issue: MutableIssue) -> std::result::Result<MutableIssue, HostError> {
            let mut issues = self.issues.lock().unwrap();
            let id = 10000 + issues.len() as i64 + 1;
            issue.id = Some(id);
            issue.key = Some(format!("TEST-{}", issues.len() + 1));
            issues.push(issue.clone());
            Ok(issue)
        }

        fn issue_by_key(&self, key: &str) -> std::result::Result<Option<MutableIssue>, HostError> {
            Ok(self.stored(key))
        }

        fn update_issue(&self, issue: MutableIssue) -> std::result::Result<(), HostError> {
            let mut issues = self.issues.lock().unwrap();
            let slot = issues
                .iter_mut()
                .find(|stored| stored.key == issue.key)
                .ok_or_else(|| HostError("missing".to_string()))?;
            *slot = issue;
            Ok(())
        }

        fn delete_issue(&self, key: &str) -> std::result::Result<(), HostError> {
            self.issues
                .lock()
                .unwrap()
                .retain(|issue| issue.key.as_deref() != Some(key));
            Ok(())
        }

        fn search(
            &self,
            jql: &str,
            filter: &PagerFilter,
        ) -> std::result::Result<SearchResults, HostError> {
            if jql.contains("invalid") {
                return Err(HostError("JQL parse failed".to_string()));
            }
            let issues = self.issues.lock().unwrap().clone();
            let total = issues.len() as u32;
            let page: Vec<MutableIssue> = issues
                .into_iter()
                .skip(filter.start as usize)
                .take(filter.page_size.map(|size| size as usize).unwrap_or(usize::MAX))
                .collect();
            Ok(SearchResults { issues: page, total })
        }

        fn custom_field_mappings(
            &self,
            _issue: &MutableIssue,
        ) -> std::result::Result<FieldMappings, HostError> {
            Ok(FieldMappings::from([(
                "Epic Link".to_string(),
                "customfield_10100".to_string(),
            )]))
        }

        fn base_url(&self) -> String {
            "http://jira.local/".to_string()
        }
    }

    impl IssueRenderer for InMemoryHost {
        fn build_bean(&self, issue: &MutableIssue, expand: &str) -> std::result::Result<IssueBean, HostError> {
            let mut bean = IssueBean {
                expand: expand.to_string(),
                id: issue.id.map(|id| id.to_string()).unwrap_or_default(),
                key: issue.key.clone().unwrap_or_default(),
                ..IssueBean::default()
            };
            bean.fields.insert("summary".to_string(), json!(issue.summary));
            Ok(bean)
        }

        fn field_layout(&self, _issue: &MutableIssue) -> std::result::Result<Vec<FieldLayoutItem>, HostError> {
            Ok(Vec::new())
        }

        fn navigable_fields(&self) -> std::result::Result<Vec<HostField>, HostError> {
            Ok(vec![HostField {
                id: "customfield_10100".to_string(),
                name: "Epic Link".to_string(),
                transient: false,
            }])
        }

        fn render_field(
            &self,
            issue: &MutableIssue,
            field: &HostField,
            _layout_item: Option<&FieldLayoutItem>,
        ) -> std::result::Result<Option<FieldJsonBean>, HostError> {
            let values = issue.custom_field_values(&field.id);
            Ok(Some(FieldJsonBean {
                standard_data: values.and_then(|values| values.first()).map(|v| json!(v)),
            }))
        }
    }

    fn summary_parser(json: &Value, mappings: &FieldMappings) -> Result<(String, Option<String>)> {
        let summary = json["fields"]["summary"]
            .as_str()
            .ok_or_else(|| Error::JsonParsing("summary missing".to_string()))?;
        let epic = mappings
            .get("Epic Link")
            .and_then(|id| json["fields"][id].as_str())
            .map(str::to_string);
        Ok((summary.to_string(), epic))
    }

    fn operator() -> (Arc<InMemoryHost>, NativeIssueOperator<InMemoryHost>) {
        let host = Arc::new(InMemoryHost::default());
        (host.clone(), NativeIssueOperator::new(host))
    }

    #[test]
    fn test_create_issue_returns_self_link() {
        tokio_test::block_on(async {
            // Given: 空のホスト
            let (host, operator) = operator();
            let fields = vec![
                Field::Summary("Native".to_string()),
                Field::EpicLink(Some("EPIC-1".to_string())),
            ];

            // When: 課題を作成
            let created = operator
                .create_issue_from_fields(10000, 10001, &fields)
                .await
                .unwrap()
                .unwrap();

            // Then: IDとキー、selfリンクが返り、フィールドが書き込まれる
            assert_eq!(created.key, "TEST-1");
            assert_eq!(created.self_link, "http://jira.local/rest/api/2/issue/10001");
            let stored = host.stored("TEST-1").unwrap();
            assert_eq!(stored.project_id, Some(10000));
            assert_eq!(stored.issue_type_id.as_deref(), Some("10001"));
            assert_eq!(
                stored.custom_field_values("customfield_10100"),
                Some(&["EPIC-1".to_string()][..])
            );
        });
    }

    #[test]
    fn test_get_issue_by_key_parses_json() {
        tokio_test::block_on(async {
            let (_host, operator) = operator();
            let fields = vec![
                Field::Summary("Parsed".to_string()),
                Field::EpicLink(Some("EPIC-2".to_string())),
            ];
            operator
                .create_issue_from_fields(10000, 10001, &fields)
                .await
                .unwrap();

            let issue = operator
                .get_issue_by_key("TEST-1", &summary_parser)
                .await
                .unwrap();

            assert_eq!(
                issue,
                Some(("Parsed".to_string(), Some("EPIC-2".to_string())))
            );
        });
    }

    #[test]
    fn test_missing_issue_is_none_for_reads_and_error_for_writes() {
        tokio_test::block_on(async {
            let (_host, operator) = operator();

            let issue = operator
                .get_issue_by_key("NOPE-1", &summary_parser)
                .await
                .unwrap();
            assert!(issue.is_none());

            let by_jql = operator
                .get_issue_by_jql("project=NOPE", &summary_parser)
                .await
                .unwrap();
            assert!(by_jql.is_none());

            let update = operator
                .update_issue(10000, 10001, "NOPE-1", Vec::new())
                .await
                .unwrap_err();
            let delete = operator.delete_issue("NOPE-1").await.unwrap_err();
            assert_eq!(update, issue_not_found("NOPE-1"));
            assert_eq!(delete, issue_not_found("NOPE-1"));
        });
    }

    #[test]
    fn test_update_and_delete_issue() {
        tokio_test::block_on(async {
            let (host, operator) = operator();
            let factory = operator.field_factory();
            operator
                .create_issue(10000, 10001, vec![factory.summary_field("Before")])
                .await
                .unwrap();

            operator
                .update_issue(10000, 10002, "TEST-1", vec![factory.summary_field("After")])
                .await
                .unwrap();
            let stored = host.stored("TEST-1").unwrap();
            assert_eq!(stored.summary.as_deref(), Some("After"));
            assert_eq!(stored.issue_type_id.as_deref(), Some("10002"));

            operator.delete_issue("TEST-1").await.unwrap();
            assert!(host.stored("TEST-1").is_none());
        });
    }

    #[test]
    fn test_paginated_search() {
        tokio_test::block_on(async {
            let (_host, operator) = operator();
            let factory = operator.field_factory();
            for i in 0..5 {
                operator
                    .create_issue(10000, 10001, vec![factory.summary_field(&format!("Issue {}", i))])
                    .await
                    .unwrap();
            }

            let page = operator
                .get_issues_by_jql_paginated("project=10000", 1, 2, &summary_parser)
                .await
                .unwrap();

            assert_eq!(page.total_items, 5);
            assert_eq!(page.total_pages, 3);
            assert_eq!(page.current_page_index, 1);
            assert_eq!(page.page_size, 2);
            assert_eq!(page.items[0].0, "Issue 2");

            let all = operator
                .get_issues_by_jql("project=10000", &summary_parser)
                .await
                .unwrap();
            assert_eq!(all.len(), 5);
        });
    }

    #[test]
    fn test_host_failure_becomes_native_error() {
        tokio_test::block_on(async {
            let (_host, operator) = operator();

            let error = operator
                .get_issues_by_jql("invalid ((", &summary_parser)
                .await
                .unwrap_err();

            assert_eq!(error.category(), "HostError");
            assert_eq!(error.message(), "JQL parse failed");
        });
    }

    #[test]
    fn test_unknown_field_name_fails_create() {
        tokio_test::block_on(async {
            let (_host, operator) = operator();

            let error = operator
                .create_issue_from_fields(
                    10000,
                    10001,
                    &[Field::CustomText {
                        field_name: "Nope".to_string(),
                        text: "x".to_string(),
                    }],
                )
                .await
                .unwrap_err();

            assert_eq!(error.category(), "FieldApplyError");
            assert_eq!(error.message(), "Field name is unknown");
        });
    }
}
