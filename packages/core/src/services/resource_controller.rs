//! Generic resource controller
//!
//! A [`ResourceController`] binds one entity definition to a private
//! [`DataContext`]. The entity's storage structure is registered lazily on
//! first use and exactly once per controller; every later call only
//! re-selects the cached schema before delegating.
//!
//! Concrete controllers embed a `ResourceController` and implement
//! [`ResourceHandler`], which supplies the CRUD surface through default
//! methods.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::instrument;

use crate::db::{DataContext, RegisteredSchema};
use crate::models::{record_from, EntityDefinition, Record, EXCLUDED_FIELD, ID_FIELD};
use crate::services::ControllerError;

/// CRUD over one entity with lazy, once-only registration
#[derive(Debug)]
pub struct ResourceController {
    context: DataContext,
    entity: &'static EntityDefinition,
    schema: OnceCell<Arc<RegisteredSchema>>,
}

impl ResourceController {
    /// Controller for `entity` on its own fork of `context`
    pub fn new(context: &DataContext, entity: &'static EntityDefinition) -> Self {
        Self {
            context: context.fork(),
            entity,
            schema: OnceCell::new(),
        }
    }

    /// Register the entity structure once, then select it
    ///
    /// A failed registration leaves the cell empty, so the next call retries.
    pub async fn ensure_ready(&self) -> Result<Arc<RegisteredSchema>, ControllerError> {
        let schema = self
            .schema
            .get_or_try_init(|| async {
                let schema = self.context.define_model(self.entity).await?;
                tracing::info!(
                    entity = self.entity.name,
                    table = %schema.table,
                    backend = self.context.name(),
                    "entity registered"
                );
                Ok::<_, ControllerError>(schema)
            })
            .await?;

        self.context.select_schema(Arc::clone(schema));
        Ok(Arc::clone(schema))
    }

    #[instrument(skip(self, item), fields(entity = self.entity.name))]
    pub async fn create(&self, item: Record) -> Result<Record, ControllerError> {
        self.ensure_ready().await?;
        Ok(self.context.create(item).await?)
    }

    /// All records, or those matching every field of `query`
    #[instrument(skip(self, query), fields(entity = self.entity.name))]
    pub async fn read(&self, query: Option<Record>) -> Result<Vec<Record>, ControllerError> {
        self.ensure_ready().await?;
        Ok(self.context.read(query.as_ref()).await?)
    }

    /// Zero or one record with the given identifier
    pub async fn read_by_id(&self, id: i64) -> Result<Vec<Record>, ControllerError> {
        self.read(Some(record_from([(ID_FIELD, Value::from(id))])))
            .await
    }

    /// Sparse update; returns the number of affected records
    #[instrument(skip(self, item), fields(entity = self.entity.name))]
    pub async fn update(&self, id: i64, item: Record) -> Result<u64, ControllerError> {
        if item.is_empty() {
            return Err(ControllerError::missing_parameter("item"));
        }

        self.ensure_ready().await?;
        Ok(self.context.update(id, item).await?)
    }

    /// Hard delete of one record
    #[instrument(skip(self), fields(entity = self.entity.name))]
    pub async fn delete(&self, id: i64) -> Result<u64, ControllerError> {
        self.ensure_ready().await?;
        Ok(self.context.delete(Some(id)).await?)
    }

    /// Hard delete of every record
    #[instrument(skip(self), fields(entity = self.entity.name))]
    pub async fn delete_all(&self) -> Result<u64, ControllerError> {
        self.ensure_ready().await?;
        Ok(self.context.delete(None).await?)
    }

    /// Mark a record as excluded without removing it
    pub async fn soft_delete(&self, id: i64) -> Result<u64, ControllerError> {
        self.update(id, record_from([(EXCLUDED_FIELD, Value::Bool(true))]))
            .await
    }

    /// Remove every record and reset identifiers
    pub async fn truncate(&self) -> Result<u64, ControllerError> {
        self.ensure_ready().await?;
        Ok(self.context.truncate().await?)
    }
}

/// CRUD capability shared by every concrete controller
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// The generic controller doing the work
    fn resource(&self) -> &ResourceController;

    async fn create(&self, item: Record) -> Result<Record, ControllerError> {
        self.resource().create(item).await
    }

    async fn read(&self, query: Option<Record>) -> Result<Vec<Record>, ControllerError> {
        self.resource().read(query).await
    }

    async fn read_by_id(&self, id: i64) -> Result<Vec<Record>, ControllerError> {
        self.resource().read_by_id(id).await
    }

    async fn update(&self, id: i64, item: Record) -> Result<u64, ControllerError> {
        self.resource().update(id, item).await
    }

    async fn delete(&self, id: i64) -> Result<u64, ControllerError> {
        self.resource().delete(id).await
    }

    async fn delete_all(&self) -> Result<u64, ControllerError> {
        self.resource().delete_all().await
    }

    async fn soft_delete(&self, id: i64) -> Result<u64, ControllerError> {
        self.resource().soft_delete(id).await
    }
}
