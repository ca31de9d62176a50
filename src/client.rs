use crate::config_store::ClientSettings;
use crate::error::{Error, Result};
use crate::http::{HttpClientContext, HttpTransport, ReqwestTransport};
use crate::insight::DEFAULT_OBJECTS_PER_PAGE;
use crate::insight::cache::InsightSchemaCache;
use crate::insight::http::{
    HttpInsightAttachmentOperator, HttpInsightHistoryOperator, HttpInsightObjectOperator,
    HttpInsightObjectTypeOperator, HttpInsightSchemaOperator, HttpSchemaSource,
};
use crate::jira::DEFAULT_RESULTS_PER_PAGE;
use crate::jira::http::{
    HttpJiraCommentOperator, HttpJiraIssueLinkOperator, HttpJiraIssueOperator,
    HttpJiraIssueTypeOperator, HttpJiraProjectOperator, HttpJiraTransitionOperator,
    HttpJiraUserOperator,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Auth {
    Basic { username: String, api_token: String },
    Bearer { token: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JiraConfig {
    pub base_url: String,
    pub auth: Auth,
}

impl JiraConfig {
    pub fn new(base_url: impl Into<String>, auth: Auth) -> Result<Self> {
        let base_url = base_url.into();

        // Validate URL
        let _ = Url::parse(&base_url)
            .map_err(|_| Error::InvalidConfiguration("Invalid base URL".to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// 環境変数（.envがあればそれも）から設定を読み込む
    ///
    /// `JIRA_BEARER_TOKEN` があればBearer認証、なければ `JIRA_USER` / `JIRA_API_TOKEN` のBasic認証。
    pub fn from_env() -> Result<Self> {
        use std::env;

        dotenv::dotenv().ok();

        let base_url = env::var("JIRA_URL").map_err(|_| {
            Error::ConfigurationMissing("JIRA_URL not found in environment".to_string())
        })?;

        if let Ok(token) = env::var("JIRA_BEARER_TOKEN") {
            return Self::new(base_url, Auth::Bearer { token });
        }

        let username = env::var("JIRA_USER").map_err(|_| {
            Error::ConfigurationMissing("JIRA_USER not found in environment".to_string())
        })?;

        let api_token = env::var("JIRA_API_TOKEN").map_err(|_| {
            Error::ConfigurationMissing("JIRA_API_TOKEN not found in environment".to_string())
        })?;

        Self::new(base_url, Auth::Basic { username, api_token })
    }
}

/// Jira本体の各オペレーターへの入口
#[derive(Clone)]
pub struct JiraClient {
    context: Arc<HttpClientContext>,
    config: Arc<JiraConfig>,
    results_per_page: u32,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// 保存済み設定から作成する。ページサイズも設定に従う
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Ok(Self::new(settings.jira.clone())?.with_results_per_page(settings.results_per_page))
    }

    pub fn with_transport(config: JiraConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let context = HttpClientContext::new(config.base_url.clone(), transport);
        Self {
            context: Arc::new(context),
            config: Arc::new(config),
            results_per_page: DEFAULT_RESULTS_PER_PAGE,
        }
    }

    pub fn with_results_per_page(mut self, results_per_page: u32) -> Self {
        self.results_per_page = results_per_page.max(1);
        self
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    pub fn context(&self) -> Arc<HttpClientContext> {
        self.context.clone()
    }

    pub fn issues(&self) -> HttpJiraIssueOperator {
        HttpJiraIssueOperator::new(self.context.clone())
            .with_results_per_page(self.results_per_page)
    }

    pub fn comments(&self) -> HttpJiraCommentOperator {
        HttpJiraCommentOperator::new(self.context.clone())
    }

    pub fn transitions(&self) -> HttpJiraTransitionOperator {
        HttpJiraTransitionOperator::new(self.context.clone())
    }

    pub fn issue_links(&self) -> HttpJiraIssueLinkOperator {
        HttpJiraIssueLinkOperator::new(self.context.clone())
    }

    pub fn projects(&self) -> HttpJiraProjectOperator {
        HttpJiraProjectOperator::new(self.context.clone())
    }

    pub fn issue_types(&self) -> HttpJiraIssueTypeOperator {
        HttpJiraIssueTypeOperator::new(self.context.clone())
    }

    pub fn users(&self) -> HttpJiraUserOperator {
        HttpJiraUserOperator::new(self.context.clone())
    }
}

/// Insight（アセット管理）の各オペレーターへの入口
///
/// スキーマキャッシュはこのクライアントが所有し、オブジェクト系オペレーターに共有する。
#[derive(Clone)]
pub struct InsightClient {
    context: Arc<HttpClientContext>,
    cache: Arc<InsightSchemaCache>,
    objects_per_page: u32,
}

impl InsightClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Ok(Self::new(settings.jira.clone())?.with_objects_per_page(settings.insight_page_size))
    }

    pub fn with_transport(config: JiraConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let context = HttpClientContext::new(config.base_url, transport);
        Self {
            context: Arc::new(context),
            cache: Arc::new(InsightSchemaCache::new()),
            objects_per_page: DEFAULT_OBJECTS_PER_PAGE,
        }
    }

    /// 全件取得時のページサイズ
    pub fn with_objects_per_page(mut self, objects_per_page: u32) -> Self {
        self.objects_per_page = objects_per_page.max(1);
        self
    }

    /// スキーマキャッシュを初期化する。失敗時はキャッシュは未初期化のまま
    pub async fn init(&self) -> Result<()> {
        self.cache.initialize(&self.schema_source()).await
    }

    pub async fn refresh_schema_cache(&self) -> Result<()> {
        self.cache.refresh(&self.schema_source()).await
    }

    pub fn schema_cache(&self) -> Arc<InsightSchemaCache> {
        self.cache.clone()
    }

    pub fn schema_source(&self) -> HttpSchemaSource {
        HttpSchemaSource::new(self.context.clone())
    }

    pub fn schemas(&self) -> HttpInsightSchemaOperator {
        HttpInsightSchemaOperator::new(self.context.clone())
    }

    pub fn object_types(&self) -> HttpInsightObjectTypeOperator {
        HttpInsightObjectTypeOperator::new(self.context.clone())
    }

    pub fn objects(&self) -> HttpInsightObjectOperator {
        HttpInsightObjectOperator::new(self.context.clone(), self.cache.clone())
            .with_results_per_page(self.objects_per_page)
    }

    pub fn history(&self) -> HttpInsightHistoryOperator {
        HttpInsightHistoryOperator::new(self.context.clone())
    }

    pub fn attachments(&self) -> HttpInsightAttachmentOperator {
        HttpInsightAttachmentOperator::new(self.context.clone())
    }
}
