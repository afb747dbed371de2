//! Unified error handling with Sentry integration.
//!
//! Every route handler returns `Result<T, AppError>`. All error kinds are
//! converted to the JSON envelope `{"message": …, "errors"?: …}` at the
//! operation boundary; store and internal faults are captured to Sentry
//! before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::mailchimp::MailchimpError;
use crate::models::IdsDesc;
use crate::validation::FieldErrors;

/// The kind of mirrored entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    List,
    Member,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List => write!(f, "List"),
            Self::Member => write!(f, "Member"),
        }
    }
}

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Field-level rule failures; never reaches the remote system.
    #[error("Invalid data given")]
    Validation(FieldErrors),

    /// Duplicate member email within a list; pre-empts validation and
    /// persistence.
    #[error("{0}")]
    Conflict(String),

    /// Member email mutation attempted.
    #[error(
        "Member email address is not allowed to change by this endpoint. \
         Original: {original}; New: {attempted}"
    )]
    EmailChange { original: String, attempted: String },

    /// Referenced list/member id does not exist locally.
    #[error("{entity} not found [{ids}]")]
    NotFound { entity: EntityKind, ids: String },

    /// Operation requires a remote id that is absent (entity never
    /// successfully created remotely).
    #[error("{entity} not found on remote system [{ids}]")]
    NotSynced { entity: EntityKind, ids: String },

    /// The remote call failed; the adapter's message is passed through.
    #[error("{0}")]
    Remote(#[from] MailchimpError),

    /// Local store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Not-found for a list id.
    #[must_use]
    pub fn list_not_found(ids: IdsDesc) -> Self {
        Self::NotFound {
            entity: EntityKind::List,
            ids: ids.to_string(),
        }
    }

    /// Not-found for a member id (scoped by its list).
    #[must_use]
    pub fn member_not_found(ids: IdsDesc) -> Self {
        Self::NotFound {
            entity: EntityKind::Member,
            ids: ids.to_string(),
        }
    }

    /// Not-synced (missing remote id) for a list.
    #[must_use]
    pub fn list_not_synced(ids: IdsDesc) -> Self {
        Self::NotSynced {
            entity: EntityKind::List,
            ids: ids.to_string(),
        }
    }

    /// Not-synced (missing remote id) for a member.
    #[must_use]
    pub fn member_not_synced(ids: IdsDesc) -> Self {
        Self::NotSynced {
            entity: EntityKind::Member,
            ids: ids.to_string(),
        }
    }
}

/// JSON error envelope returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_)
            | Self::Conflict(_)
            | Self::EmailChange { .. }
            | Self::NotSynced { .. }
            | Self::Remote(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let errors = match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        };

        (status, Json(ErrorBody { message, errors })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
