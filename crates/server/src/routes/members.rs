//! Member route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::error::Result;
use crate::models::{Member, MemberProjection};
use crate::state::AppState;

use super::{parse_list_id, parse_member_id};

/// Create a member under a list.
///
/// # Errors
///
/// Not-found / not-synced for the parent list, a conflict for a
/// duplicate email, a validation error map, or the remote error.
pub async fn create(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    Json(payload): Json<MemberProjection>,
) -> Result<Json<Member>> {
    let list_id = parse_list_id(&list_id)?;
    let member = state.members().create(list_id, payload).await?;
    Ok(Json(member))
}

/// Index all members of a list (local data only).
///
/// # Errors
///
/// Returns a not-found error for an unknown list id.
pub async fn index(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> Result<Json<Vec<Member>>> {
    let list_id = parse_list_id(&list_id)?;
    let members = state.members().index(list_id).await?;
    Ok(Json(members))
}

/// Show one member (local data only).
///
/// # Errors
///
/// Returns a not-found error for an unknown list or member id.
pub async fn show(
    State(state): State<AppState>,
    Path((list_id, member_id)): Path<(String, String)>,
) -> Result<Json<Member>> {
    let parsed_list_id = parse_list_id(&list_id)?;
    let member_id = parse_member_id(&list_id, &member_id)?;
    let member = state.members().show(parsed_list_id, member_id).await?;
    Ok(Json(member))
}

/// Update a member.
///
/// # Errors
///
/// Not-found for unknown ids, a rejection when the email address would
/// change, not-synced when the member or its list was never created
/// remotely, validation or remote errors otherwise.
pub async fn update(
    State(state): State<AppState>,
    Path((list_id, member_id)): Path<(String, String)>,
    Json(payload): Json<MemberProjection>,
) -> Result<Json<Member>> {
    let parsed_list_id = parse_list_id(&list_id)?;
    let member_id = parse_member_id(&list_id, &member_id)?;
    let member = state
        .members()
        .update(parsed_list_id, member_id, payload)
        .await?;
    Ok(Json(member))
}

/// Delete a member.
///
/// Responds with an empty object on success.
///
/// # Errors
///
/// Not-found for unknown ids, not-synced for a missing remote id, or the
/// remote error (the local row is kept).
pub async fn remove(
    State(state): State<AppState>,
    Path((list_id, member_id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let parsed_list_id = parse_list_id(&list_id)?;
    let member_id = parse_member_id(&list_id, &member_id)?;
    state.members().remove(parsed_list_id, member_id).await?;
    Ok(Json(json!({})))
}
