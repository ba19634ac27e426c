/**
 * Closed set of core error kinds (spec §7).
 *
 * The core itself is transport-agnostic — HTTP status mapping lives at the
 * API boundary (`src/api/error.rs`), not here.
 */
use serde::Serialize;
use serde_json::Value as Json;
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{message}")]
    Validation {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    #[error("{0} already exists")]
    Duplicate(String),

    #[error("invite has expired")]
    Expired,

    #[error("invite has been revoked")]
    Revoked,

    #[error("session has been finalized")]
    Finalized,

    #[error("{0} is not organizer")]
    NotOrganizer,

    #[error("venue {0} not found")]
    VenueNotFound(String),

    #[error("item {0} not found")]
    ItemNotFound(String),

    #[error("text exceeds maximum length of {limit} characters")]
    TooLong { limit: usize },

    #[error("storage operation failed")]
    StorageFailure,

    #[error("{0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        CoreError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Machine-readable error kind, stable across message wording changes.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "NotFound",
            CoreError::Validation { .. } => "Validation",
            CoreError::Duplicate(_) => "Duplicate",
            CoreError::Expired => "Expired",
            CoreError::Revoked => "Revoked",
            CoreError::Finalized => "Finalized",
            CoreError::NotOrganizer => "NotOrganizer",
            CoreError::VenueNotFound(_) => "VenueNotFound",
            CoreError::ItemNotFound(_) => "ItemNotFound",
            CoreError::TooLong { .. } => "TooLong",
            CoreError::StorageFailure => "StorageFailure",
            CoreError::Internal(_) => "Internal",
        }
    }

    /// Additional entity/limit details for the caller, never the raw
    /// storage-layer error text (that goes to `tracing::error!` only).
    pub fn details(&self) -> Option<Json> {
        match self {
            CoreError::NotFound(id)
            | CoreError::Duplicate(id)
            | CoreError::VenueNotFound(id)
            | CoreError::ItemNotFound(id) => Some(serde_json::json!({ "id": id })),
            CoreError::Validation {
                field: Some(field), ..
            } => Some(serde_json::json!({ "field": field })),
            CoreError::TooLong { limit } => Some(serde_json::json!({ "limit": limit })),
            _ => None,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
