//! # Asset Errors
//!
//! Error taxonomy shared by the catalog, the validation engine, the
//! integrity checks and the operations built on them.

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for registry operations
pub type AssetResult<T> = Result<T, AssetError>;

/// Coarse fault classification surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request cannot succeed as sent
    ClientFault,
    /// The registry or its store failed
    ServerFault,
}

#[derive(Debug, Error)]
pub enum AssetError {
    /// Malformed, missing or mistyped input, or a rejected predicate
    #[error("invalid value for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// Writer or reader group mismatch
    #[error("permission denied: {0}")]
    Permission(String),

    /// Unknown asset type, instance or reference target
    #[error("{0} not found")]
    NotFound(String),

    /// Duplicate tag
    #[error("conflict: {0}")]
    Conflict(String),

    /// Mutation attempted on a code-defined type
    #[error("asset type '{0}' does not allow dynamic modifications")]
    Immutable(String),

    /// Instances of the type are persisted
    #[error("asset type '{0}' is in use")]
    InUse(String),

    /// Another type holds a relationship property naming this one
    #[error("asset type '{tag}' is referenced by asset type '{referenced_by}'")]
    Referenced { tag: String, referenced_by: String },

    /// Unresolvable data type name
    #[error("unknown data type '{0}'")]
    UnknownType(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AssetError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Stable code for responses and logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ASSET_VALIDATION_FAILED",
            Self::Permission(_) => "ASSET_PERMISSION_DENIED",
            Self::NotFound(_) => "ASSET_NOT_FOUND",
            Self::Conflict(_) => "ASSET_CONFLICT",
            Self::Immutable(_) => "ASSET_IMMUTABLE",
            Self::InUse(_) => "ASSET_IN_USE",
            Self::Referenced { .. } => "ASSET_REFERENCED",
            Self::UnknownType(_) => "ASSET_UNKNOWN_TYPE",
            Self::Storage(e) => e.code().code(),
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::UnknownType(_) => 400,
            Self::InUse(_) => 400,
            Self::Referenced { .. } => 400,

            Self::Permission(_) => 403,
            Self::Immutable(_) => 403,

            Self::NotFound(_) => 404,

            Self::Conflict(_) => 409,
            Self::Storage(e) if e.is_conflict() => 409,

            Self::Storage(_) => 500,
        }
    }

    pub fn class(&self) -> ErrorClass {
        if self.status_code() < 500 {
            ErrorClass::ClientFault
        } else {
            ErrorClass::ServerFault
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.class() == ErrorClass::ClientFault
    }
}

impl From<serde_json::Error> for AssetError {
    fn from(e: serde_json::Error) -> Self {
        Self::validation("$root", e.to_string())
    }
}
