//! DataContext - Backend-Agnostic Data Access Facade
//!
//! A `DataContext` wraps one storage adapter plus a "current schema" slot.
//! The adapter is resolved by name through the static [`BackendKind`]
//! registry, so adding a backend means one enum variant and one match arm.
//!
//! Contexts are cheap to [`fork`](DataContext::fork): every controller owns a
//! private context sharing the process-wide adapter, which keeps the
//! current-schema slot free of cross-controller interference.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use crate::config::DatabaseConfig;
use crate::db::libsql_store::{LibsqlStore, LIBSQL_BACKEND};
use crate::db::memory_store::{MemoryStore, MEMORY_BACKEND};
use crate::db::record_store::{RecordStore, RegisteredSchema};
use crate::db::DatabaseError;
use crate::models::{EntityDefinition, Record};

/// Registry of supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// libsql, embedded file or remote URL (`"libsql"` or `"sqlite"`)
    Libsql,
    /// Process memory (`"memory"`)
    Memory,
}

impl BackendKind {
    /// Registry name of the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Libsql => LIBSQL_BACKEND,
            Self::Memory => MEMORY_BACKEND,
        }
    }

    /// Instantiate the adapter for this backend
    pub async fn connect(
        &self,
        config: &DatabaseConfig,
    ) -> Result<Arc<dyn RecordStore>, DatabaseError> {
        let store: Arc<dyn RecordStore> = match self {
            Self::Libsql => Arc::new(LibsqlStore::connect(&config.location).await?),
            Self::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(store)
    }
}

impl FromStr for BackendKind {
    type Err = DatabaseError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" => Err(DatabaseError::missing_parameter("database")),
            "libsql" | "sqlite" => Ok(Self::Libsql),
            "memory" => Ok(Self::Memory),
            _ => Err(DatabaseError::unsupported_backend(name)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-agnostic data access with a current-schema slot
pub struct DataContext {
    store: Arc<dyn RecordStore>,
    current: RwLock<Option<Arc<RegisteredSchema>>>,
}

impl fmt::Debug for DataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataContext")
            .field("backend", &self.store.backend_name())
            .field("schema", &self.current_schema().map(|s| s.table.clone()))
            .finish()
    }
}

impl DataContext {
    /// Resolve the configured backend and connect to it
    ///
    /// # Errors
    ///
    /// - `MissingParameter("database")` when no backend name is configured
    /// - `UnsupportedBackend` when the name is not in the registry
    /// - `ConnectionFailed` when the backend cannot be reached
    pub async fn create_context(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let kind: BackendKind = config.backend.parse()?;
        let store = kind.connect(config).await?;

        tracing::info!(backend = %kind, location = %config.location, "data context created");
        Ok(Self::new(store))
    }

    /// Wrap an already connected adapter
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    /// New context on the same adapter, with no schema selected
    pub fn fork(&self) -> Self {
        Self::new(Arc::clone(&self.store))
    }

    /// Registry name of the underlying backend
    pub fn name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn is_connected(&self) -> bool {
        self.store.is_connected().await
    }

    /// Create or synchronize the structure for an entity
    pub async fn define_model(
        &self,
        entity: &'static EntityDefinition,
    ) -> Result<Arc<RegisteredSchema>, DatabaseError> {
        self.store.define_structure(entity).await
    }

    /// Make `schema` the target of subsequent CRUD calls
    pub fn select_schema(&self, schema: Arc<RegisteredSchema>) {
        // A poisoned slot still holds a valid Option
        let mut slot = self.current.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(schema);
    }

    pub fn current_schema(&self) -> Option<Arc<RegisteredSchema>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn schema(&self) -> Result<Arc<RegisteredSchema>, DatabaseError> {
        self.current_schema()
            .ok_or_else(|| DatabaseError::SchemaNotSelected {
                context: self.name().to_string(),
            })
    }

    pub async fn create(&self, record: Record) -> Result<Record, DatabaseError> {
        let schema = self.schema()?;
        self.store.create(&schema, record).await
    }

    pub async fn read(&self, query: Option<&Record>) -> Result<Vec<Record>, DatabaseError> {
        let schema = self.schema()?;
        self.store.read(&schema, query).await
    }

    pub async fn update(&self, id: i64, record: Record) -> Result<u64, DatabaseError> {
        let schema = self.schema()?;
        self.store.update(&schema, id, record).await
    }

    pub async fn delete(&self, id: Option<i64>) -> Result<u64, DatabaseError> {
        let schema = self.schema()?;
        self.store.delete(&schema, id).await
    }

    pub async fn truncate(&self) -> Result<u64, DatabaseError> {
        let schema = self.schema()?;
        self.store.truncate(&schema).await
    }

    pub async fn destroy(&self) -> Result<(), DatabaseError> {
        let schema = self.schema()?;
        self.store.destroy(&schema).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{record_from, ITEM, TASK};
    use async_trait::async_trait;
    use serde_json::json;

    /// Adapter that only implements the mandatory operations
    struct ReadOnlyStore;

    #[async_trait]
    impl RecordStore for ReadOnlyStore {
        fn backend_name(&self) -> &'static str {
            "read-only"
        }

        async fn is_connected(&self) -> bool {
            false
        }

        async fn define_structure(
            &self,
            entity: &'static EntityDefinition,
        ) -> Result<Arc<RegisteredSchema>, DatabaseError> {
            Ok(Arc::new(RegisteredSchema::verbatim(entity)))
        }

        async fn create(
            &self,
            _schema: &RegisteredSchema,
            record: Record,
        ) -> Result<Record, DatabaseError> {
            Ok(record)
        }

        async fn read(
            &self,
            _schema: &RegisteredSchema,
            _query: Option<&Record>,
        ) -> Result<Vec<Record>, DatabaseError> {
            Ok(Vec::new())
        }

        async fn update(
            &self,
            _schema: &RegisteredSchema,
            _id: i64,
            _record: Record,
        ) -> Result<u64, DatabaseError> {
            Ok(0)
        }

        async fn delete(
            &self,
            _schema: &RegisteredSchema,
            _id: Option<i64>,
        ) -> Result<u64, DatabaseError> {
            Ok(0)
        }
    }

    #[test]
    fn test_backend_registry() {
        assert_eq!("libsql".parse::<BackendKind>().unwrap(), BackendKind::Libsql);
        assert_eq!("SQLite".parse::<BackendKind>().unwrap(), BackendKind::Libsql);
        assert_eq!("memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);

        assert!(matches!(
            "oracle".parse::<BackendKind>(),
            Err(DatabaseError::UnsupportedBackend { name }) if name == "oracle"
        ));
        assert!(matches!(
            "".parse::<BackendKind>(),
            Err(DatabaseError::MissingParameter { name: "database" })
        ));
    }

    #[tokio::test]
    async fn test_create_context_rejects_unknown_backend() {
        let mut config = DatabaseConfig::memory();
        config.backend = "mongo".to_string();

        let result = DataContext::create_context(&config).await;
        assert!(matches!(result, Err(DatabaseError::UnsupportedBackend { .. })));
    }

    #[tokio::test]
    async fn test_crud_without_schema_fails_fast() {
        let context = DataContext::create_context(&DatabaseConfig::memory())
            .await
            .unwrap();

        assert!(matches!(
            context.read(None).await,
            Err(DatabaseError::SchemaNotSelected { .. })
        ));
        assert!(matches!(
            context.create(Record::new()).await,
            Err(DatabaseError::SchemaNotSelected { .. })
        ));
        assert!(matches!(
            context.delete(None).await,
            Err(DatabaseError::SchemaNotSelected { .. })
        ));
    }

    #[tokio::test]
    async fn test_fork_shares_adapter_but_not_schema() {
        let context = DataContext::create_context(&DatabaseConfig::memory())
            .await
            .unwrap();
        let items = context.define_model(&ITEM).await.unwrap();
        context.select_schema(items);
        context
            .create(record_from([("parentTaskId", json!(1))]))
            .await
            .unwrap();

        let forked = context.fork();
        assert!(forked.current_schema().is_none());

        let tasks = forked.define_model(&TASK).await.unwrap();
        forked.select_schema(tasks);
        assert!(forked.read(None).await.unwrap().is_empty());

        let items_again = forked.define_model(&ITEM).await.unwrap();
        forked.select_schema(items_again);
        assert_eq!(forked.read(None).await.unwrap().len(), 1);
        assert_eq!(context.current_schema().unwrap().table, "task_items");
    }

    #[tokio::test]
    async fn test_optional_capabilities_report_not_implemented() {
        let context = DataContext::new(Arc::new(ReadOnlyStore));
        let schema = context.define_model(&ITEM).await.unwrap();
        context.select_schema(schema);

        match context.truncate().await {
            Err(DatabaseError::NotImplemented { backend, operation }) => {
                assert_eq!(backend, "read-only");
                assert_eq!(operation, "truncate");
            }
            other => panic!("expected NotImplemented, got {:?}", other),
        }
        assert!(matches!(
            context.destroy().await,
            Err(DatabaseError::NotImplemented { operation: "destroy", .. })
        ));
        assert!(!context.is_connected().await);
    }
}
