use crate::errors::{AppError, MISSING_DEFAULT_CREDENTIALS};
use crate::hrv::resolve_hrv;
use crate::models::{
    ConnectQuery, ConnectResponse, DisconnectResponse, HrvQuery, HrvResponse, SleepResponse,
    StatusResponse, UserQuery,
};
use crate::sleep::resolve_sleep;
use crate::state::AppState;
use crate::vendor::{Credentials, SharedHandle};
use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tracing::warn;

pub const SYNC_SECRET_HEADER: &str = "x-sync-secret";

pub async fn home() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub async fn sleep(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<SleepResponse>, AppError> {
    let handle = sleep_handle(&state, query.user_id.as_deref()).await?;
    Ok(Json(freshest_sleep(&state, handle).await?))
}

pub async fn sync_sleep(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<UserQuery>,
) -> Result<Json<SleepResponse>, AppError> {
    let presented = headers
        .get(SYNC_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    match (state.sync_secret.as_deref(), presented) {
        (Some(expected), Some(presented)) if secrets_match(expected, presented) => {}
        _ => return Err(AppError::unauthorized()),
    }

    let handle = sleep_handle(&state, query.user_id.as_deref()).await?;
    Ok(Json(freshest_sleep(&state, handle).await?))
}

pub async fn connect(
    State(state): State<AppState>,
    Query(query): Query<ConnectQuery>,
) -> Result<Json<ConnectResponse>, AppError> {
    let user_id = required(query.user_id, "user_id")?;
    let identity = required(query.identity, "identity")?;
    let secret = required(query.secret, "secret")?;

    let connected = state
        .sessions
        .connect(&user_id, &Credentials::new(identity, secret))
        .await?;

    Ok(Json(ConnectResponse {
        connected: true,
        user_id: connected.user_id,
    }))
}

pub async fn garmin_status(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<StatusResponse>, AppError> {
    let user_id = required(query.user_id, "user_id")?;
    let connected = state.sessions.status(&user_id).await;
    Ok(Json(StatusResponse { user_id, connected }))
}

pub async fn disconnect_garmin(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<DisconnectResponse>, AppError> {
    let user_id = required(query.user_id, "user_id")?;
    let disconnected = state.sessions.disconnect(&user_id).await;
    Ok(Json(DisconnectResponse {
        disconnected: true,
        user_id: disconnected.user_id,
    }))
}

pub async fn hrv(
    State(state): State<AppState>,
    Query(query): Query<HrvQuery>,
) -> Result<Json<HrvResponse>, AppError> {
    let user_id = required(query.user_id, "user_id")?;
    let day = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::bad_request("date must be YYYY-MM-DD"))?,
        None => state.day_boundary.today(),
    };

    let handle = state
        .sessions
        .handle(&user_id)
        .await
        .ok_or_else(AppError::not_connected)?;
    let resolved = resolve_hrv(&*handle, day).await?;

    Ok(Json(HrvResponse {
        date: day.to_string(),
        operation: resolved.operation.to_string(),
        hrv: resolved.record,
    }))
}

async fn sleep_handle(state: &AppState, user_id: Option<&str>) -> Result<SharedHandle, AppError> {
    if let Some(user_id) = user_id.filter(|id| !id.trim().is_empty()) {
        return state
            .sessions
            .handle(user_id)
            .await
            .ok_or_else(AppError::not_connected);
    }

    let credentials = state
        .default_credentials
        .as_ref()
        .ok_or_else(|| AppError::unavailable(MISSING_DEFAULT_CREDENTIALS))?;
    match state.source.authenticate(credentials).await {
        Ok(handle) => Ok(handle),
        Err(err) => {
            warn!("default account login failed: {err}");
            Err(err.into())
        }
    }
}

async fn freshest_sleep(state: &AppState, handle: SharedHandle) -> Result<SleepResponse, AppError> {
    let resolved = resolve_sleep(&*handle, state.day_boundary.today()).await?;
    Ok(SleepResponse {
        date: resolved.date.to_string(),
        sleep: resolved.record,
    })
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::bad_request(format!("{name} is required")))
}

// Constant time for equal-length inputs.
fn secrets_match(expected: &str, presented: &str) -> bool {
    let (expected, presented) = (expected.as_bytes(), presented.as_bytes());
    if expected.len() != presented.len() {
        return false;
    }
    expected
        .iter()
        .zip(presented)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
