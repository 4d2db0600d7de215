//! Lookup port for derived API keys.
//!
//! A trait rather than a concrete store client so that `tinto-keys` doesn't
//! depend on `tinto-store` (which in turn will depend on `tinto-keys`'s
//! [`ApiKey`] type) — the same inversion the teacher uses wherever a crate
//! needs "some persistence" without owning the storage implementation.

use async_trait::async_trait;
use tinto_common::ApiKeyFingerprint;

use crate::api_key::ApiKey;

#[async_trait]
pub trait ApiKeyRepo: Send + Sync {
    async fn find_by_fingerprint(
        &self,
        fingerprint: &ApiKeyFingerprint,
    ) -> anyhow::Result<Option<ApiKey>>;

    async fn insert(&self, key: ApiKey) -> anyhow::Result<()>;

    async fn mark_last_used(&self, fingerprint: &ApiKeyFingerprint) -> anyhow::Result<()>;
}
