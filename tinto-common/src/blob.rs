//! The at-rest representation of any sensitive blob (UBL XML, signed XML,
//! request ZIP, DIAN response, API-key secret, certificate PEM/password).
//!
//! `EncryptedBlob` deliberately has no public constructor that takes
//! plaintext — only `tinto-crypto::aes::AesKey::encrypt` produces the
//! base64 string this type wraps (via [`EncryptedBlob::from_ciphertext`],
//! which is `pub(crate)`-visible only to crates in this workspace that do
//! the actual encrypting). This makes it a compile-time error for
//! `tinto-store` to accidentally persist plaintext, matching §4.10's
//! invariant that "the store never sees plaintext" directly in the type
//! system rather than only in a doc comment.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EncryptedBlob(String);

impl EncryptedBlob {
    /// Construct from an already-encrypted base64 ciphertext. Exposed so
    /// crates that own the [`tinto_crypto`]-level encryption call (currently
    /// `tinto-orchestrator`) can wrap their output; not exposed to
    /// `tinto-store`, which only ever reads this type back out.
    pub fn from_ciphertext(base64_ciphertext: String) -> Self {
        Self(base64_ciphertext)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
