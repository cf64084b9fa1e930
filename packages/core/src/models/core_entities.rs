//! Core Entity Definitions
//!
//! The three resources served by Taskboard. Each definition is versioned
//! independently; the shared bookkeeping fields (timestamps, `excluded`,
//! `active`) recur by convention, not through a common base.
//!
//! | Entity  | Table        | Parent            |
//! |---------|--------------|-------------------|
//! | account | `accounts`   | -                 |
//! | task    | `tasks`      | `parentAccountId` |
//! | item    | `task_items` | `parentTaskId`    |

use super::entity::{
    DefaultValue, EntityDefinition, FieldDescriptor, FieldType, ACTIVE_FIELD,
    CREATION_TIMESTAMP_FIELD, EXCLUDED_FIELD, ID_FIELD, UPDATE_TIMESTAMP_FIELD,
};

/// Foreign key from a task to its owning account
pub const PARENT_ACCOUNT_FIELD: &str = "parentAccountId";

/// Foreign key from an item to its task
pub const PARENT_TASK_FIELD: &str = "parentTaskId";

/// Account field holding the login e-mail
pub const EMAIL_FIELD: &str = "email";

/// Account field holding the hashed secret
pub const SECRET_FIELD: &str = "secret";

static ACCOUNT_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::primary_key(ID_FIELD),
    FieldDescriptor::new("name", FieldType::Text { max_len: Some(60) }),
    FieldDescriptor::new(EMAIL_FIELD, FieldType::Text { max_len: Some(100) }),
    FieldDescriptor::new(SECRET_FIELD, FieldType::Text { max_len: Some(150) }),
    FieldDescriptor::timestamp(CREATION_TIMESTAMP_FIELD),
    FieldDescriptor::timestamp(UPDATE_TIMESTAMP_FIELD),
    FieldDescriptor::flag(ACTIVE_FIELD, true),
    FieldDescriptor::flag(EXCLUDED_FIELD, false),
];

static TASK_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::primary_key(ID_FIELD),
    FieldDescriptor::new(PARENT_ACCOUNT_FIELD, FieldType::Integer),
    FieldDescriptor::new("title", FieldType::Text { max_len: Some(32) })
        .with_default(DefaultValue::Text("New task")),
    FieldDescriptor::new("description", FieldType::Text { max_len: Some(150) }),
    FieldDescriptor::flag("done", false),
    FieldDescriptor::timestamp(CREATION_TIMESTAMP_FIELD),
    FieldDescriptor::timestamp(UPDATE_TIMESTAMP_FIELD),
    FieldDescriptor::flag(ACTIVE_FIELD, true),
    FieldDescriptor::flag(EXCLUDED_FIELD, false),
];

static ITEM_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::primary_key(ID_FIELD),
    FieldDescriptor::new(PARENT_TASK_FIELD, FieldType::Integer),
    FieldDescriptor::new("description", FieldType::Text { max_len: Some(50) })
        .with_default(DefaultValue::Text("New item")),
    FieldDescriptor::flag("done", false),
    FieldDescriptor::timestamp(CREATION_TIMESTAMP_FIELD),
    FieldDescriptor::timestamp(UPDATE_TIMESTAMP_FIELD),
    FieldDescriptor::flag(EXCLUDED_FIELD, false),
];

/// Registered user able to log in and own tasks
pub static ACCOUNT: EntityDefinition = EntityDefinition::new("account", "accounts", ACCOUNT_FIELDS);

/// Task owned by an account
pub static TASK: EntityDefinition = EntityDefinition::new("task", "tasks", TASK_FIELDS);

/// Checklist item belonging to a task
pub static ITEM: EntityDefinition = EntityDefinition::new("item", "task_items", ITEM_FIELDS);

/// All core entities, in dependency order
pub static CORE_ENTITIES: [&EntityDefinition; 3] = [&ACCOUNT, &TASK, &ITEM];
