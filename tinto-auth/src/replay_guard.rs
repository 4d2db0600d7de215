//! The replay-nonce set (§3 RequestSignature, §4.10, §5).
//!
//! A trait port, mirroring [`tinto_keys::ApiKeyRepo`]'s inversion: the
//! persistence-backed implementation lives in `tinto-store`, this crate only
//! needs "can atomically insert-if-absent".

use async_trait::async_trait;
use tinto_common::RequestSignature;

/// Insert a `(signature_digest, request_timestamp)` pair if and only if it
/// isn't already present, atomically. `(signature_digest, request_timestamp)`
/// is the single serialization point for request auth (§5) — the
/// implementation must guarantee that of two concurrent inserts of the same
/// pair, exactly one reports success.
#[async_trait]
pub trait ReplayGuard: Send + Sync {
    /// Returns `true` if the record was newly inserted (not a replay),
    /// `false` if this exact pair was already recorded.
    async fn insert_if_absent(&self, record: RequestSignature) -> anyhow::Result<bool>;
}
