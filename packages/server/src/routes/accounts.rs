//! Account endpoints
//!
//! - `POST /register` - create an account (secret is hashed, never echoed)
//! - `POST /login` - exchange e-mail and secret for a bearer token

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use taskboard_core::models::{Record, RecordExt, ACCOUNT, EMAIL_FIELD, SECRET_FIELD};
use taskboard_core::services::LoginOutcome;

use crate::http_error::HttpError;
use crate::routes::json_body;
use crate::validation::{validate_create, validate_email, validate_secret};
use crate::AppState;

/// Login payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub secret: String,
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Record>, JsonRejection>,
) -> Result<Json<Record>, HttpError> {
    let payload = json_body(payload)?;
    validate_create(&ACCOUNT, &payload)?;
    validate_email(payload.get_str(EMAIL_FIELD).unwrap_or_default())?;
    validate_secret(payload.get_str(SECRET_FIELD).unwrap_or_default())?;

    let mut account = state.accounts.register(payload).await?;
    account.remove(SECRET_FIELD);

    tracing::info!(account_id = ?account.id(), "account registered");
    Ok(Json(account))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LoginOutcome>), HttpError> {
    let LoginRequest { email, secret } = json_body(payload)?;
    validate_email(&email)?;
    validate_secret(&secret)?;

    let outcome = state.accounts.login(&email, &secret).await?;
    let status = if outcome.is_authorized() {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };

    Ok((status, Json(outcome)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
