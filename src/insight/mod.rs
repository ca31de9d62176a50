//! Insight（アセット管理）側のドメインオペレーター
//!
//! オブジェクトの属性名は [`cache::InsightSchemaCache`] を通して解決する。

pub mod cache;
pub mod http;
pub mod model;
pub mod repository;

use crate::error::Result;
use crate::page::Page;
use async_trait::async_trait;

pub use cache::{InsightSchemaCache, SchemaSnapshot};
pub use model::*;
pub use repository::{InsightObjectRepository, NameMapped, NameMappedRepository};

pub const DEFAULT_OBJECTS_PER_PAGE: u32 = 25;

/// オブジェクトタイプで絞り込むIQL。`with_children` なら子タイプも含める
pub fn object_type_iql(object_type_id: InsightObjectTypeId, with_children: bool) -> String {
    if with_children {
        format!("objectType = objectTypeAndChildren(\"{}\")", object_type_id)
    } else {
        format!("objectTypeId={}", object_type_id)
    }
}

/// スキーマキャッシュの取得元
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn fetch_schemas(&self) -> Result<Vec<InsightSchemaDescription>>;
}

#[async_trait]
pub trait InsightSchemaOperator: Send + Sync {
    async fn get_schemas(&self) -> Result<Vec<InsightSchema>>;

    async fn get_schema(&self, schema_id: InsightSchemaId) -> Result<Option<InsightSchema>>;
}

#[async_trait]
pub trait InsightObjectTypeOperator: Send + Sync {
    async fn get_object_type(
        &self,
        object_type_id: InsightObjectTypeId,
    ) -> Result<Option<ObjectTypeSchema>>;

    /// スキーマ内の全オブジェクトタイプ（属性定義付き）
    async fn get_object_types_by_schema(
        &self,
        schema_id: InsightSchemaId,
    ) -> Result<Vec<ObjectTypeSchema>>;

    /// ルートとその子孫。ルートがなければ NotFound
    async fn get_object_types_by_schema_and_root_object_type(
        &self,
        schema_id: InsightSchemaId,
        root_object_type_id: InsightObjectTypeId,
    ) -> Result<Vec<ObjectTypeSchema>> {
        let object_types = self.get_object_types_by_schema(schema_id).await?;
        select_subtree(object_types, root_object_type_id)
    }
}

/// ルートを先頭に、子孫を幅優先で並べる
fn select_subtree(
    object_types: Vec<ObjectTypeSchema>,
    root_object_type_id: InsightObjectTypeId,
) -> Result<Vec<ObjectTypeSchema>> {
    let root = object_types
        .iter()
        .find(|object_type| object_type.id == root_object_type_id)
        .cloned()
        .ok_or_else(|| {
            crate::error::Error::not_found(format!(
                "Object type with id {} was not found",
                root_object_type_id
            ))
        })?;

    let mut selected = vec![root];
    let mut cursor = 0;
    while cursor < selected.len() {
        let parent_id = selected[cursor].id;
        let children: Vec<ObjectTypeSchema> = object_types
            .iter()
            .filter(|object_type| object_type.parent_object_type_id == Some(parent_id))
            .filter(|object_type| selected.iter().all(|seen| seen.id != object_type.id))
            .cloned()
            .collect();
        selected.extend(children);
        cursor += 1;
    }
    Ok(selected)
}

#[async_trait]
pub trait InsightObjectOperator: Send + Sync {
    async fn get_objects(
        &self,
        object_type_id: InsightObjectTypeId,
        with_children: bool,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page<InsightObject>> {
        self.get_objects_by_iql(
            &object_type_iql(object_type_id, with_children),
            page_index,
            page_size,
        )
        .await
    }

    async fn get_object_by_id(&self, id: InsightObjectId) -> Result<Option<InsightObject>>;

    async fn get_object_by_key(&self, key: &str) -> Result<Option<InsightObject>>;

    async fn get_object_by_name(
        &self,
        object_type_id: InsightObjectTypeId,
        name: &str,
    ) -> Result<Option<InsightObject>>;

    /// 全ページ取得
    async fn get_objects_by_object_type_name(
        &self,
        object_type_name: &str,
    ) -> Result<Vec<InsightObject>>;

    async fn get_objects_by_iql(
        &self,
        iql: &str,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page<InsightObject>>;

    /// オブジェクトタイプの条件と `iql` を AND で結合する
    async fn get_objects_by_iql_in_type(
        &self,
        object_type_id: InsightObjectTypeId,
        with_children: bool,
        iql: &str,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page<InsightObject>> {
        let full_iql = format!(
            "{} AND {}",
            object_type_iql(object_type_id, with_children),
            iql
        );
        self.get_objects_by_iql(&full_iql, page_index, page_size)
            .await
    }

    async fn get_object_count(&self, iql: &str) -> Result<u32>;

    /// 作成したオブジェクトを取得し直して返す
    async fn create_object(
        &self,
        object_type_id: InsightObjectTypeId,
        attributes: Vec<InsightAttribute>,
    ) -> Result<InsightObject>;

    /// 属性を名前で指定して作成する。名前はスキーマキャッシュで解決する
    async fn create_object_by_attribute_names(
        &self,
        object_type_id: InsightObjectTypeId,
        attributes: Vec<(String, Vec<ObjectAttributeValue>)>,
    ) -> Result<InsightObject>;

    async fn update_object(&self, object: &InsightObject) -> Result<InsightObject>;

    async fn delete_object(&self, id: InsightObjectId) -> Result<()>;
}

#[async_trait]
pub trait InsightHistoryOperator: Send + Sync {
    async fn get_history(&self, object_id: InsightObjectId) -> Result<InsightHistory>;
}

#[async_trait]
pub trait InsightAttachmentOperator: Send + Sync {
    async fn get_attachments(&self, object_id: InsightObjectId) -> Result<Vec<InsightAttachment>>;

    /// 絶対URLも受け付ける
    async fn download_attachment(&self, url: &str) -> Result<Vec<u8>>;

    /// アップロード後の添付一覧を返す
    async fn upload_attachment(
        &self,
        object_id: InsightObjectId,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<InsightAttachment>>;

    async fn delete_attachment(&self, attachment_id: AttachmentId) -> Result<()>;
}
