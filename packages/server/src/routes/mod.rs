//! Route modules, one per resource

pub mod accounts;
pub mod health;
pub mod items;
pub mod tasks;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::Json;
use serde::Serialize;

use crate::http_error::HttpError;

/// Body returned by update and delete endpoints
#[derive(Debug, Serialize)]
pub struct Affected {
    pub affected: u64,
}

/// Unwrap a JSON body, turning malformed payloads into validation errors
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| HttpError::validation(rejection.body_text()))
}

/// Unwrap a numeric path identifier, answering non-numeric ids with validation errors
pub(crate) fn path_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, HttpError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| HttpError::validation(rejection.body_text()))
}
