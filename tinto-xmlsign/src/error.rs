#[derive(Debug, thiserror::Error)]
pub enum SignFailure {
    #[error("keystore unreadable: {0}")]
    KeystoreUnreadable(String),
    #[error("no key material found under the requested alias")]
    AliasMissing,
    #[error("private key is not usable for RSA signing")]
    PrivateKeyUnusableForRsa,
    #[error("canonicalization failed: {0}")]
    CanonicalizationFailed(String),
    #[error("reference digest does not match the signed document")]
    DigestMismatch,
    #[error("signature value does not verify under the embedded certificate")]
    SignatureInvalid,
    #[error("document has no ext:ExtensionContent slot to sign into")]
    MissingExtensionSlot,
    #[error("document has no ds:Signature element to verify")]
    MissingSignature,
}
