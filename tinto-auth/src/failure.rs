//! Request-authentication failure modes (§4.3).

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum AuthFailure {
    #[error("missing authentication header")]
    Missing,
    #[error("malformed authentication header")]
    BadFormat,
    #[error("timestamp outside the acceptance window")]
    Expired,
    #[error("signature and timestamp pair already used")]
    Replay,
    #[error("operation not permitted for this role")]
    RoleDenied,
    #[error("unknown or inactive api key")]
    UnknownKey,
    #[error("signature does not match expected value")]
    BadSignature,
}
