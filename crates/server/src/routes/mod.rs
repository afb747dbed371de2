//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! POST   /mailchimp/lists                              - create list
//! GET    /mailchimp/lists                              - index lists
//! GET    /mailchimp/lists/{listId}                     - show list
//! PUT    /mailchimp/lists/{listId}                     - update list
//! DELETE /mailchimp/lists/{listId}                     - delete list
//! POST   /mailchimp/lists/{listId}/members             - create member
//! GET    /mailchimp/lists/{listId}/members             - index members
//! GET    /mailchimp/lists/{listId}/members/{memberId}  - show member
//! PUT    /mailchimp/lists/{listId}/members/{memberId}  - update member
//! DELETE /mailchimp/lists/{listId}/members/{memberId}  - delete member
//! ```
//!
//! Handlers are thin: parse the route ids, hand the payload to the sync
//! service, serialize the result. Route ids arrive as raw strings; a
//! malformed id is indistinguishable from an unknown one and yields the
//! same not-found response.

pub mod lists;
pub mod members;

use axum::{
    Router,
    routing::{get, post},
};

use mailmirror_core::{ListId, MemberId};

use crate::error::AppError;
use crate::models::IdsDesc;
use crate::state::AppState;

/// Create all routes for the mirror API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/mailchimp/lists", post(lists::create).get(lists::index))
        .route(
            "/mailchimp/lists/{list_id}",
            get(lists::show).put(lists::update).delete(lists::remove),
        )
        .route(
            "/mailchimp/lists/{list_id}/members",
            post(members::create).get(members::index),
        )
        .route(
            "/mailchimp/lists/{list_id}/members/{member_id}",
            get(members::show)
                .put(members::update)
                .delete(members::remove),
        )
}

/// Parse a list id route parameter; unparseable ids are not-found.
pub(crate) fn parse_list_id(raw: &str) -> Result<ListId, AppError> {
    raw.parse::<ListId>()
        .map_err(|_| AppError::list_not_found(IdsDesc::new().list_id(raw)))
}

/// Parse a member id route parameter; unparseable ids are not-found.
pub(crate) fn parse_member_id(raw_list_id: &str, raw: &str) -> Result<MemberId, AppError> {
    raw.parse::<MemberId>().map_err(|_| {
        AppError::member_not_found(IdsDesc::new().list_id(raw_list_id).member_id(raw))
    })
}
