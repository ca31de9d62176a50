use super::{FieldLayoutItem, HostField, IssueRenderer, MutableIssue};
use serde_json::Value;
use tracing::warn;

const ISSUE_EXPAND: &str = "names,transitions";

/// プロセス内の課題をREST APIと同じ形のJSONに変換する
pub struct IssueJsonConverter<'a, R: IssueRenderer + ?Sized> {
    renderer: &'a R,
}

impl<'a, R: IssueRenderer + ?Sized> IssueJsonConverter<'a, R> {
    pub fn new(renderer: &'a R) -> Self {
        Self { renderer }
    }

    /// レイアウト項目、参照可能フィールドの順に埋める。描画できないフィールドは省く
    pub fn create_json_issue(&self, issue: &MutableIssue) -> Result<Value, R::Error> {
        let mut bean = self.renderer.build_bean(issue, ISSUE_EXPAND)?;

        for item in self.renderer.field_layout(issue)? {
            if bean.has_field(&item.field.id) || item.field.transient {
                continue;
            }
            if let Some(data) = self.render(issue, &item.field, Some(&item))? {
                bean.add_field(&item.field, data);
            }
        }

        for field in self.renderer.navigable_fields()? {
            if bean.has_field(&field.id) || field.transient {
                continue;
            }
            if let Some(data) = self.render(issue, &field, None)? {
                bean.add_field(&field, data);
            }
        }

        // Map<String, Value> のみで構成されるため失敗しない
        Ok(serde_json::to_value(&bean).unwrap_or(Value::Null))
    }

    fn render(
        &self,
        issue: &MutableIssue,
        field: &HostField,
        layout_item: Option<&FieldLayoutItem>,
    ) -> Result<Option<Value>, R::Error> {
        let data = self
            .renderer
            .render_field(issue, field, layout_item)?
            .and_then(|bean| bean.standard_data);

        if data.is_none() {
            warn!("{} with id {} not rendered in JSON", field.name, field.id);
        }
        Ok(data)
    }
}
