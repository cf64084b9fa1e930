//! Task controller

use serde_json::Value;
use tracing::instrument;

use crate::db::DataContext;
use crate::models::{record_from, Record, PARENT_ACCOUNT_FIELD, TASK};
use crate::services::{ControllerError, ResourceController, ResourceHandler};

/// Tasks owned by accounts
#[derive(Debug)]
pub struct TaskController {
    resource: ResourceController,
}

impl TaskController {
    pub fn new(context: &DataContext) -> Self {
        Self {
            resource: ResourceController::new(context, &TASK),
        }
    }

    /// Every task of an account, excluded ones included
    #[instrument(skip(self))]
    pub async fn read_by_account_id(&self, account_id: i64) -> Result<Vec<Record>, ControllerError> {
        self.resource
            .read(Some(record_from([(
                PARENT_ACCOUNT_FIELD,
                Value::from(account_id),
            )])))
            .await
    }
}

impl ResourceHandler for TaskController {
    fn resource(&self) -> &ResourceController {
        &self.resource
    }
}
