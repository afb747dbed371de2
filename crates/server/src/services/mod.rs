//! Sync coordinators: the dual-write pipelines between the local store
//! and the MailChimp API.
//!
//! Each mutating operation is a short linear pipeline with early exits,
//! ordered to minimize local/remote divergence:
//!
//! - **create**: local insert first (assigns the id), then the remote
//!   create, then a second local persist attaching the remote id. A
//!   remote failure leaves an unsynced local row the caller can retry;
//!   nothing is rolled back.
//! - **update / delete**: the remote call comes first and local state is
//!   only touched after remote success, so a remote failure leaves the
//!   stored entity byte-for-byte unchanged.
//!
//! Nothing is retried; every partial failure is surfaced with the remote
//! error's message and resolved by a follow-up request.

pub mod lists;
pub mod members;

pub use lists::ListService;
pub use members::MemberService;

use serde_json::Value;

use crate::error::AppError;

/// Serialize a remote projection for the wire.
fn wire_body(projection: &impl serde::Serialize) -> Result<Value, AppError> {
    serde_json::to_value(projection)
        .map_err(|e| AppError::Internal(format!("failed to serialize remote payload: {e}")))
}
