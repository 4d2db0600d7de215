//! The closed error taxonomy every Tinto component surfaces through (§7).
//!
//! Grounded on the teacher's `common::api::error` split between an internal,
//! detailed error type and `ErrorResponse`, the only thing that's ever
//! actually sent across a wire boundary. Here the wire boundary is the
//! (out-of-scope) REST layer, so `ErrorResponse` exists for that layer to
//! convert into — this crate never serializes a `TintoError` directly.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The seven closed categories every failure in the issuance pipeline maps
/// into. Each variant's payload is a human-readable message; structured
/// detail (DIAN error codes, which field was invalid, etc) lives in the
/// message for now — a REST layer that wants machine-readable detail can
/// pattern-match on the variant itself.
#[derive(Debug, thiserror::Error)]
pub enum TintoError {
    /// Malformed input from the caller (400-class).
    #[error("validation error: {0}")]
    Validation(String),

    /// Identifier refers to nothing (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Illegal state transition or duplicate (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any authentication sub-failure per §4.3 (401/403).
    #[error("auth failure: {0}")]
    Auth(String),

    /// Key custody or signing failure (500). Never carries raw key material.
    #[error("internal cryptographic failure (correlation id {correlation_id})")]
    Crypto { correlation_id: Uuid },

    /// SOAP/transport/DIAN service failure (502).
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Totals mismatch, numbering out of range, unsupported document type.
    #[error("business rule violation: {0}")]
    BusinessRule(String),
}

impl TintoError {
    /// Construct a [`Self::Crypto`] variant, generating a fresh correlation
    /// id. The caller is expected to `tracing::error!` the real detail
    /// alongside the same correlation id before returning this value, so an
    /// operator can cross-reference logs without the detail ever leaving
    /// the process boundary.
    pub fn crypto_with_new_correlation_id() -> Self {
        Self::Crypto {
            correlation_id: Uuid::new_v4(),
        }
    }

    /// Whether this category represents a state that a later retry of the
    /// *same* operation could plausibly resolve, independent of the more
    /// granular DIAN-error-code retryability computed in
    /// `tinto-orchestrator::error_map`.
    pub fn is_category_retryable(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}

/// The common wire representation for any `TintoError`-shaped failure,
/// mirroring `common::api::error::ErrorResponse`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub category: ErrorCategory,
    pub message: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Conflict,
    Auth,
    Crypto,
    Upstream,
    BusinessRule,
}

impl ErrorCategory {
    /// The HTTP status an out-of-scope REST layer would use for this
    /// category — named here so every caller uses the same mapping, per
    /// §7's propagation policy.
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Auth => 401,
            Self::Crypto => 500,
            Self::Upstream => 502,
            Self::BusinessRule => 400,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Auth => "auth",
            Self::Crypto => "crypto",
            Self::Upstream => "upstream",
            Self::BusinessRule => "business_rule",
        };
        f.write_str(s)
    }
}

impl From<&TintoError> for ErrorResponse {
    fn from(err: &TintoError) -> Self {
        let category = match err {
            TintoError::Validation(_) => ErrorCategory::Validation,
            TintoError::NotFound(_) => ErrorCategory::NotFound,
            TintoError::Conflict(_) => ErrorCategory::Conflict,
            TintoError::Auth(_) => ErrorCategory::Auth,
            TintoError::Crypto { .. } => ErrorCategory::Crypto,
            TintoError::Upstream(_) => ErrorCategory::Upstream,
            TintoError::BusinessRule(_) => ErrorCategory::BusinessRule,
        };
        Self {
            category,
            message: err.to_string(),
        }
    }
}
