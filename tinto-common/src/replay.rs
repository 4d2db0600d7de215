//! Replay-protection record (§3 RequestSignature).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ApiKeyFingerprint;

/// One authenticated request's signature, persisted so a second request
/// replaying the same `(signature_digest, request_timestamp)` pair is
/// rejected (§4.3 V3). `(signature_digest, request_timestamp)` is the
/// unique replay key; inserting a duplicate pair is the atomic operation
/// that decides who wins a race (§5).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestSignature {
    pub api_key_fingerprint: ApiKeyFingerprint,
    pub signature_digest: String,
    pub method: String,
    pub path: String,
    pub request_timestamp: DateTime<Utc>,
}
