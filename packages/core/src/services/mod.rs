//! Business Services
//!
//! This module contains the controllers the HTTP layer talks to:
//!
//! - `ResourceController` - generic CRUD over one entity, lazily registered
//! - `AccountController` - accounts, secret hashing and login
//! - `TaskController` - tasks, queried by owning account
//! - `ItemController` - task items, queried by task, soft-deletable
//!
//! Controllers coordinate between the database layer and the transport,
//! implementing the rules that are not storage concerns (secret hashing,
//! token issuing, soft deletion).

pub mod account_controller;
pub mod credentials;
pub mod error;
pub mod item_controller;
pub mod resource_controller;
pub mod task_controller;

pub use account_controller::{AccountController, LoginOutcome, INVALID_CREDENTIALS};
pub use credentials::{SecretHasher, TokenClaims, TokenIssuer};
pub use error::ControllerError;
pub use item_controller::ItemController;
pub use resource_controller::{ResourceController, ResourceHandler};
pub use task_controller::TaskController;
