//! Task item endpoints (bearer token required)
//!
//! - `POST /items` - create an item
//! - `GET /tasks/:id/items` - items of a task
//! - `PUT /items/:id` - sparse update
//! - `DELETE /items/:id` - soft delete (`excluded = true`)

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::Json,
    routing::{get, post, put},
    Router,
};
use taskboard_core::models::{Record, ITEM};
use taskboard_core::services::ResourceHandler;

use crate::http_error::HttpError;
use crate::routes::{json_body, path_id, Affected};
use crate::validation::{validate_create, validate_update};
use crate::AppState;

async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<Record>, JsonRejection>,
) -> Result<Json<Record>, HttpError> {
    let payload = json_body(payload)?;
    validate_create(&ITEM, &payload)?;

    let item = state.items.create(payload).await?;
    Ok(Json(item))
}

async fn get_task_items(
    State(state): State<AppState>,
    task_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Record>>, HttpError> {
    let task_id = path_id(task_id)?;
    Ok(Json(state.items.read_by_task_id(task_id).await?))
}

async fn update_item(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Record>, JsonRejection>,
) -> Result<Json<Affected>, HttpError> {
    let id = path_id(id)?;
    let payload = json_body(payload)?;
    validate_update(&ITEM, &payload)?;

    let affected = state.items.update(id, payload).await?;
    Ok(Json(Affected { affected }))
}

async fn exclude_item(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Affected>, HttpError> {
    let id = path_id(id)?;
    let affected = state.items.exclude(id).await?;
    tracing::debug!(id, affected, "item excluded");
    Ok(Json(Affected { affected }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", post(create_item))
        .route("/items/:id", put(update_item).delete(exclude_item))
        .route("/tasks/:id/items", get(get_task_items))
}
