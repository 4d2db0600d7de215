//! Cryptography primitives shared across the Tinto issuance pipeline.
//!
//! This crate intentionally wraps a single backend ([`ring`]) for every
//! primitive that doesn't strictly require something else (RSA signing lives
//! in `tinto-xmlsign` since `ring` doesn't expose raw RSA signing with
//! arbitrary padding). Centralizing primitives here keeps the attack surface
//! and the set of crypto libraries we trust small.

pub mod aes;
pub mod digest;
pub mod rng;
pub mod token;

pub use rng::{Crng, SysRng};

/// Compare two byte strings in constant time.
///
/// Uses [`ring::constant_time::verify_slices_are_equal`], which is the same
/// constant-time primitive `ring` itself uses internally for MAC/tag checks.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    ring::constant_time::verify_slices_are_equal(a, b).is_ok()
}

/// The closed set of ways a cryptographic operation in this crate can fail.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CryptoFailure {
    /// AES-GCM authentication tag didn't match — ciphertext or AAD was
    /// tampered with (or the wrong key/nonce was used).
    #[error("AES-GCM authentication tag mismatch")]
    AuthTagMismatch,
    /// Any other internal failure (malformed input length, RNG failure,
    /// etc). Deliberately doesn't carry detail — crypto failures are
    /// logged, not surfaced, per the error handling design.
    #[error("internal cryptographic failure")]
    Internal,
}
