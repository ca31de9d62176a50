//! クライアント設定の保存先
//!
//! クライアント本体は設定を保存しない。[`MemoryConfigStore`] は常に使え、
//! JSONファイルへ保存する [`FileConfigStore`] は `settings-file` フィーチャー（既定で有効）で提供する。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::client::JiraConfig;
use crate::error::Result;
use crate::insight::DEFAULT_OBJECTS_PER_PAGE;
use crate::jira::DEFAULT_RESULTS_PER_PAGE;

#[cfg(feature = "settings-file")]
pub use file::FileConfigStore;

/// クライアント設定の保存先
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn save_settings(&self, settings: &ClientSettings) -> Result<()>;

    /// 未保存なら `None`
    async fn load_settings(&self) -> Result<Option<ClientSettings>>;

    async fn clear(&self) -> Result<()>;
}

/// 接続設定とページング設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub jira: JiraConfig,
    /// 課題検索の1ページあたりの件数
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,
    /// Insightオブジェクトを全件取得する際のページサイズ
    #[serde(default = "default_insight_page_size")]
    pub insight_page_size: u32,
}

fn default_results_per_page() -> u32 {
    DEFAULT_RESULTS_PER_PAGE
}

fn default_insight_page_size() -> u32 {
    DEFAULT_OBJECTS_PER_PAGE
}

impl ClientSettings {
    pub fn new(jira: JiraConfig) -> Self {
        Self {
            jira,
            results_per_page: DEFAULT_RESULTS_PER_PAGE,
            insight_page_size: DEFAULT_OBJECTS_PER_PAGE,
        }
    }
}

/// プロセス内だけで保持する設定ストア
#[derive(Default)]
pub struct MemoryConfigStore {
    settings: RwLock<Option<ClientSettings>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn save_settings(&self, settings: &ClientSettings) -> Result<()> {
        *self.settings.write().await = Some(settings.clone());
        Ok(())
    }

    async fn load_settings(&self) -> Result<Option<ClientSettings>> {
        Ok(self.settings.read().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.settings.write().await = None;
        Ok(())
    }
}

#[cfg(feature = "settings-file")]
mod file {
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use tokio::fs;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::{ClientSettings, ConfigStore};
    use crate::error::{Error, Result};

    const SETTINGS_FILE: &str = "settings.json";

    /// JSONファイルに保存する設定ストア
    pub struct FileConfigStore {
        config_dir: PathBuf,
    }

    impl FileConfigStore {
        pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
            Self {
                config_dir: config_dir.as_ref().to_path_buf(),
            }
        }

        /// `dirs::config_dir()/atlassian-client` を使う
        pub fn default_config_dir() -> Result<Self> {
            let config_dir = dirs::config_dir()
                .ok_or_else(|| {
                    Error::ConfigurationMissing("設定ディレクトリが見つかりません".to_string())
                })?
                .join("atlassian-client");

            Ok(Self::new(config_dir))
        }

        pub fn settings_path(&self) -> PathBuf {
            self.config_dir.join(SETTINGS_FILE)
        }
    }

    #[async_trait]
    impl ConfigStore for FileConfigStore {
        async fn save_settings(&self, settings: &ClientSettings) -> Result<()> {
            fs::create_dir_all(&self.config_dir).await?;

            let json_data = serde_json::to_string_pretty(settings)?;
            let mut file = fs::File::create(self.settings_path()).await?;
            file.write_all(json_data.as_bytes()).await?;
            file.sync_all().await?;

            Ok(())
        }

        async fn load_settings(&self) -> Result<Option<ClientSettings>> {
            let path = self.settings_path();
            if !path.exists() {
                return Ok(None);
            }

            let mut file = fs::File::open(&path).await?;
            let mut contents = String::new();
            file.read_to_string(&mut contents).await?;

            if contents.trim().is_empty() {
                return Ok(None);
            }

            Ok(Some(serde_json::from_str(&contents)?))
        }

        async fn clear(&self) -> Result<()> {
            if self.config_dir.exists() {
                fs::remove_dir_all(&self.config_dir).await?;
            }
            Ok(())
        }
    }

}
