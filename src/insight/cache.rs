use super::SchemaSource;
use super::model::{
    InsightAttributeId, InsightObjectTypeDescription, InsightObjectTypeId, InsightSchemaDescription,
};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// ある時点で取得したスキーマ全体。作成後は変更しない
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSnapshot {
    schemas: Vec<InsightSchemaDescription>,
    object_types: HashMap<InsightObjectTypeId, InsightObjectTypeDescription>,
    last_update: DateTime<Utc>,
}

impl SchemaSnapshot {
    pub fn new(schemas: Vec<InsightSchemaDescription>) -> Self {
        let object_types = schemas
            .iter()
            .flat_map(|schema| schema.object_types.iter())
            .map(|object_type| (object_type.id, object_type.clone()))
            .collect();

        Self {
            schemas,
            object_types,
            last_update: Utc::now(),
        }
    }

    pub fn schemas(&self) -> &[InsightSchemaDescription] {
        &self.schemas
    }

    pub fn object_type(&self, id: InsightObjectTypeId) -> Option<&InsightObjectTypeDescription> {
        self.object_types.get(&id)
    }

    pub fn object_type_by_name(&self, name: &str) -> Option<&InsightObjectTypeDescription> {
        self.object_types
            .values()
            .find(|object_type| object_type.name == name)
    }

    pub fn attribute_name(
        &self,
        object_type_id: InsightObjectTypeId,
        attribute_id: InsightAttributeId,
    ) -> Option<&str> {
        self.object_type(object_type_id)?
            .attributes
            .iter()
            .find(|attribute| attribute.id == attribute_id)
            .map(|attribute| attribute.name.as_str())
    }

    pub fn attribute_id(
        &self,
        object_type_id: InsightObjectTypeId,
        attribute_name: &str,
    ) -> Option<InsightAttributeId> {
        self.object_type(object_type_id)?
            .attributes
            .iter()
            .find(|attribute| attribute.name == attribute_name)
            .map(|attribute| attribute.id)
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }
}

enum CacheState {
    /// 初期化前。直近の取得失敗を保持する
    Uninitialized { last_error: Option<Error> },
    Populated(Arc<SchemaSnapshot>),
}

/// Insightスキーマのプロセス内キャッシュ
///
/// `initialize` / `refresh` だけが書き込み、読み取りは常に完全なスナップショットを見る。
/// 取得はロックの外で行い、差し替えだけを書き込みロック内で行う。
pub struct InsightSchemaCache {
    state: RwLock<CacheState>,
}

impl Default for InsightSchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightSchemaCache {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState::Uninitialized { last_error: None }),
        }
    }

    /// 取得済みのスキーマで作成（主にテスト用）
    pub fn populated(schemas: Vec<InsightSchemaDescription>) -> Self {
        Self {
            state: RwLock::new(CacheState::Populated(Arc::new(SchemaSnapshot::new(schemas)))),
        }
    }

    pub async fn initialize<S>(&self, source: &S) -> Result<()>
    where
        S: SchemaSource + ?Sized,
    {
        let count = self.load(source).await?;
        info!("Insight schema cache initialized with {} schemas", count);
        Ok(())
    }

    /// 取得し直して丸ごと差し替える。失敗時は以前のスナップショットを残す
    pub async fn refresh<S>(&self, source: &S) -> Result<()>
    where
        S: SchemaSource + ?Sized,
    {
        match self.load(source).await {
            Ok(count) => {
                info!("Insight schema cache refreshed with {} schemas", count);
                Ok(())
            }
            Err(e) => {
                warn!("Insight schema cache refresh failed: {}", e);
                Err(e)
            }
        }
    }

    async fn load<S>(&self, source: &S) -> Result<usize>
    where
        S: SchemaSource + ?Sized,
    {
        match source.fetch_schemas().await {
            Ok(schemas) => {
                let count = schemas.len();
                let snapshot = Arc::new(SchemaSnapshot::new(schemas));
                *self.state.write().await = CacheState::Populated(snapshot);
                Ok(count)
            }
            Err(e) => {
                let mut state = self.state.write().await;
                if let CacheState::Uninitialized { last_error } = &mut *state {
                    *last_error = Some(e.clone());
                }
                Err(e)
            }
        }
    }

    pub async fn is_initialized(&self) -> bool {
        matches!(*self.state.read().await, CacheState::Populated(_))
    }

    /// 現在のスナップショット。未初期化なら直近の取得エラーを返す
    pub async fn snapshot(&self) -> Result<Arc<SchemaSnapshot>> {
        match &*self.state.read().await {
            CacheState::Populated(snapshot) => Ok(snapshot.clone()),
            CacheState::Uninitialized {
                last_error: Some(e),
            } => Err(e.clone()),
            CacheState::Uninitialized { last_error: None } => Err(Error::internal(
                "SchemaCacheUninitialized",
                "Insight schema cache has not been initialized",
            )),
        }
    }

    pub async fn object_type(
        &self,
        id: InsightObjectTypeId,
    ) -> Result<Option<InsightObjectTypeDescription>> {
        Ok(self.snapshot().await?.object_type(id).cloned())
    }

    pub async fn attribute_name(
        &self,
        object_type_id: InsightObjectTypeId,
        attribute_id: InsightAttributeId,
    ) -> Result<Option<String>> {
        Ok(self
            .snapshot()
            .await?
            .attribute_name(object_type_id, attribute_id)
            .map(str::to_string))
    }

    pub async fn attribute_id(
        &self,
        object_type_id: InsightObjectTypeId,
        attribute_name: &str,
    ) -> Result<Option<InsightAttributeId>> {
        Ok(self
            .snapshot()
            .await?
            .attribute_id(object_type_id, attribute_name))
    }

    pub async fn last_update(&self) -> Option<DateTime<Utc>> {
        match &*self.state.read().await {
            CacheState::Populated(snapshot) => Some(snapshot.last_update()),
            CacheState::Uninitialized { .. } => None,
        }
    }
}
