//! Task item controller

use serde_json::Value;
use tracing::instrument;

use crate::db::DataContext;
use crate::models::{record_from, Record, ITEM, PARENT_TASK_FIELD};
use crate::services::{ControllerError, ResourceController, ResourceHandler};

/// Checklist items of tasks
#[derive(Debug)]
pub struct ItemController {
    resource: ResourceController,
}

impl ItemController {
    pub fn new(context: &DataContext) -> Self {
        Self {
            resource: ResourceController::new(context, &ITEM),
        }
    }

    /// Every item of a task
    #[instrument(skip(self))]
    pub async fn read_by_task_id(&self, task_id: i64) -> Result<Vec<Record>, ControllerError> {
        self.resource
            .read(Some(record_from([(PARENT_TASK_FIELD, Value::from(task_id))])))
            .await
    }

    /// Soft delete: the item stays readable with `excluded = true`
    pub async fn exclude(&self, id: i64) -> Result<u64, ControllerError> {
        self.resource.soft_delete(id).await
    }
}

impl ResourceHandler for ItemController {
    fn resource(&self) -> &ResourceController {
        &self.resource
    }
}
