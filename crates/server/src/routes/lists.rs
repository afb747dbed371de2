//! List route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::error::Result;
use crate::models::{List, ListProjection};
use crate::state::AppState;

use super::parse_list_id;

/// Create a list.
///
/// # Errors
///
/// Returns a validation error map, or the remote error when MailChimp
/// rejects the create.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ListProjection>,
) -> Result<Json<List>> {
    let list = state.lists().create(payload).await?;
    Ok(Json(list))
}

/// Index all lists (local data only).
///
/// # Errors
///
/// Returns an error when the store fails.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<List>>> {
    let lists = state.lists().index().await?;
    Ok(Json(lists))
}

/// Show one list (local data only).
///
/// # Errors
///
/// Returns a not-found error for an unknown id.
pub async fn show(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> Result<Json<List>> {
    let list_id = parse_list_id(&list_id)?;
    let list = state.lists().show(list_id).await?;
    Ok(Json(list))
}

/// Update a list.
///
/// # Errors
///
/// Not-found for an unknown id, not-synced when the list was never
/// created remotely, validation or remote errors otherwise.
pub async fn update(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    Json(payload): Json<ListProjection>,
) -> Result<Json<List>> {
    let list_id = parse_list_id(&list_id)?;
    let list = state.lists().update(list_id, payload).await?;
    Ok(Json(list))
}

/// Delete a list.
///
/// Responds with an empty object on success.
///
/// # Errors
///
/// Not-found for an unknown id, not-synced when the list was never
/// created remotely, or the remote error (the local row is kept).
pub async fn remove(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> Result<Json<Value>> {
    let list_id = parse_list_id(&list_id)?;
    state.lists().remove(list_id).await?;
    Ok(Json(json!({})))
}
