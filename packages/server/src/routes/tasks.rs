//! Task endpoints (bearer token required)
//!
//! - `POST /tasks` - create a task (owner defaults to the caller)
//! - `GET /tasks/:id` - task by id, as a zero- or one-element array
//! - `GET /accounts/:id/tasks` - tasks of an account
//! - `PATCH /tasks/:id` - sparse update
//! - `DELETE /tasks/:id` - hard delete

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde_json::Value;
use taskboard_core::models::{Record, PARENT_ACCOUNT_FIELD, TASK};
use taskboard_core::services::{ResourceHandler, TokenClaims};

use crate::http_error::HttpError;
use crate::routes::{json_body, path_id, Affected};
use crate::validation::{validate_create, validate_update};
use crate::AppState;

async fn create_task(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    payload: Result<Json<Record>, JsonRejection>,
) -> Result<Json<Record>, HttpError> {
    let mut payload = json_body(payload)?;
    payload
        .entry(PARENT_ACCOUNT_FIELD)
        .or_insert_with(|| Value::from(claims.id));
    validate_create(&TASK, &payload)?;

    let task = state.tasks.create(payload).await?;
    Ok(Json(task))
}

async fn get_task(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Record>>, HttpError> {
    let id = path_id(id)?;
    Ok(Json(state.tasks.read_by_id(id).await?))
}

async fn get_account_tasks(
    State(state): State<AppState>,
    account_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Record>>, HttpError> {
    let account_id = path_id(account_id)?;
    Ok(Json(state.tasks.read_by_account_id(account_id).await?))
}

async fn update_task(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Record>, JsonRejection>,
) -> Result<Json<Affected>, HttpError> {
    let id = path_id(id)?;
    let payload = json_body(payload)?;
    validate_update(&TASK, &payload)?;

    let affected = state.tasks.update(id, payload).await?;
    tracing::debug!(id, affected, "task updated");
    Ok(Json(Affected { affected }))
}

async fn delete_task(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Affected>, HttpError> {
    let id = path_id(id)?;
    let affected = state.tasks.delete(id).await?;
    tracing::debug!(id, affected, "task deleted");
    Ok(Json(Affected { affected }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/accounts/:id/tasks", get(get_account_tasks))
}
