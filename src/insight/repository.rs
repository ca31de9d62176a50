//! ドメイン型と Insight オブジェクトの対応付け
//!
//! [`NameMappedRepository`] はドメイン型の属性名とオブジェクトタイプの属性定義を
//! 大文字小文字を区別せずに突き合わせる。

use super::{
    InsightAttribute, InsightObject, InsightObjectId, InsightObjectOperator,
    InsightObjectTypeOperator, InsightSchemaOperator, InsightValue, ObjectTypeSchema,
    ObjectTypeSchemaAttribute,
};
use crate::error::{Error, Result};
use crate::page::Page;
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// 1つのオブジェクトタイプをドメイン型として扱うリポジトリ
#[async_trait]
pub trait InsightObjectRepository<T>: Send + Sync {
    async fn create(&self, domain_object: &T) -> Result<T>;

    /// 既存オブジェクトがなければエラー
    async fn update(&self, domain_object: &T) -> Result<T>;

    /// 既存オブジェクトがなければ何もしない
    async fn delete(&self, domain_object: &T) -> Result<()>;

    async fn get_by_name(&self, name: &str) -> Result<Option<T>>;

    async fn get_by_id(&self, object_id: InsightObjectId) -> Result<Option<T>>;

    async fn get_by_iql(
        &self,
        iql: &str,
        with_children: bool,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page<T>>;
}

/// 属性名で対応付けるドメイン型
pub trait NameMapped: Sized + Send + Sync {
    /// 対応するオブジェクトタイプの名前
    const OBJECT_TYPE_NAME: &'static str;

    /// 既存オブジェクトの検索に使う名前
    fn name(&self) -> &str;

    /// 属性名と値。オブジェクトタイプにない名前は書き込まない
    fn to_values(&self) -> Vec<(&'static str, InsightValue)>;

    /// 属性名は解決済みで渡される
    fn from_object(object: &InsightObject) -> Result<Self>;
}

pub struct NameMappedRepository<T> {
    objects: Arc<dyn InsightObjectOperator>,
    object_types: Arc<dyn InsightObjectTypeOperator>,
    schemas: Arc<dyn InsightSchemaOperator>,
    object_type: OnceCell<ObjectTypeSchema>,
    _domain: PhantomData<fn() -> T>,
}

impl<T: NameMapped> NameMappedRepository<T> {
    pub fn new(
        objects: Arc<dyn InsightObjectOperator>,
        object_types: Arc<dyn InsightObjectTypeOperator>,
        schemas: Arc<dyn InsightSchemaOperator>,
    ) -> Self {
        Self {
            objects,
            object_types,
            schemas,
            object_type: OnceCell::new(),
            _domain: PhantomData,
        }
    }

    /// 初回だけ全スキーマから名前で探す
    pub async fn object_type_schema(&self) -> Result<&ObjectTypeSchema> {
        self.object_type
            .get_or_try_init(|| self.find_object_type())
            .await
    }

    async fn find_object_type(&self) -> Result<ObjectTypeSchema> {
        for schema in self.schemas.get_schemas().await? {
            let found = self
                .object_types
                .get_object_types_by_schema(schema.id)
                .await?
                .into_iter()
                .find(|object_type| object_type.name == T::OBJECT_TYPE_NAME);
            if let Some(object_type) = found {
                debug!(
                    "Mapped {} to object type {} in schema {}",
                    T::OBJECT_TYPE_NAME,
                    object_type.id,
                    schema.id
                );
                return Ok(object_type);
            }
        }
        Err(Error::not_found(format!(
            "Object type {} was not found",
            T::OBJECT_TYPE_NAME
        )))
    }

    async fn load_existing(&self, domain_object: &T) -> Result<Option<InsightObject>> {
        let object_type = self.object_type_schema().await?;
        self.objects
            .get_object_by_name(object_type.id, domain_object.name())
            .await
    }

    fn to_domain(&self, object_type: &ObjectTypeSchema, mut object: InsightObject) -> Result<T> {
        for attribute in object
            .attributes
            .iter_mut()
            .filter(|attribute| attribute.attribute_name.is_empty())
        {
            if let Some(definition) = object_type
                .attributes
                .iter()
                .find(|definition| definition.id == attribute.attribute_id)
            {
                attribute.attribute_name = definition.name.clone();
            }
        }
        T::from_object(&object)
    }
}

fn definition_by_name<'a>(
    object_type: &'a ObjectTypeSchema,
    name: &str,
) -> Option<&'a ObjectTypeSchemaAttribute> {
    let name = name.to_lowercase();
    object_type
        .attributes
        .iter()
        .find(|definition| definition.name.to_lowercase() == name)
}

/// 参照属性には参照、値属性には値だけを受け付ける
fn attributes_from_domain<T: NameMapped>(
    object_type: &ObjectTypeSchema,
    domain_object: &T,
) -> Result<Vec<InsightAttribute>> {
    let mut attributes = Vec::new();
    for (name, value) in domain_object.to_values() {
        let Some(definition) = definition_by_name(object_type, name) else {
            continue;
        };
        let supported = (definition.is_value() && !value.is_reference())
            || (definition.is_reference() && value.is_reference());
        if !supported {
            return Err(Error::InvalidInput(format!(
                "Attribute.type {} is not supported",
                definition.name
            )));
        }
        attributes.push(InsightAttribute {
            attribute_id: definition.id,
            attribute_name: definition.name.clone(),
            values: value.into_values(),
        });
    }
    Ok(attributes)
}

#[async_trait]
impl<T: NameMapped> InsightObjectRepository<T> for NameMappedRepository<T> {
    async fn create(&self, domain_object: &T) -> Result<T> {
        let object_type = self.object_type_schema().await?;
        let attributes = attributes_from_domain(object_type, domain_object)?;
        let created = self
            .objects
            .create_object(object_type.id, attributes)
            .await?;
        self.to_domain(object_type, created)
    }

    async fn update(&self, domain_object: &T) -> Result<T> {
        let object_type = self.object_type_schema().await?;
        let mut existing = self
            .load_existing(domain_object)
            .await?
            .ok_or_else(|| {
                Error::internal("InsightObject update failed.", "Could not retrieve the object.")
            })?;
        existing.attributes = attributes_from_domain(object_type, domain_object)?;
        let updated = self.objects.update_object(&existing).await?;
        self.to_domain(object_type, updated)
    }

    async fn delete(&self, domain_object: &T) -> Result<()> {
        match self.load_existing(domain_object).await? {
            Some(existing) => self.objects.delete_object(existing.id).await,
            None => Ok(()),
        }
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<T>> {
        let object_type = self.object_type_schema().await?;
        self.objects
            .get_object_by_name(object_type.id, name)
            .await?
            .map(|object| self.to_domain(object_type, object))
            .transpose()
    }

    async fn get_by_id(&self, object_id: InsightObjectId) -> Result<Option<T>> {
        let object_type = self.object_type_schema().await?;
        self.objects
            .get_object_by_id(object_id)
            .await?
            .map(|object| self.to_domain(object_type, object))
            .transpose()
    }

    async fn get_by_iql(
        &self,
        iql: &str,
        with_children: bool,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page<T>> {
        let object_type = self.object_type_schema().await?;
        let Page {
            items,
            total_items,
            total_pages,
            current_page_index,
            page_size,
        } = self
            .objects
            .get_objects_by_iql_in_type(object_type.id, with_children, iql, page_index, page_size)
            .await?;
        let items = items
            .into_iter()
            .map(|object| self.to_domain(object_type, object))
            .collect::<Result<Vec<T>>>()?;

        Ok(Page {
            items,
            total_items,
            total_pages,
            current_page_index,
            page_size,
        })
    }
}
