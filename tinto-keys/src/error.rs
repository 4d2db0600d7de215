//! Failure modes for master-key loading and API-key derivation.

#[derive(Debug, thiserror::Error)]
pub enum KeyCustodyFailure {
    /// The console-access discriminator env var was unset; refuses to run
    /// outside direct console access (§4.2).
    #[error("master key load refused: no direct console access")]
    ConsoleOnly,

    #[error("master key file unreadable at {path}: {source}")]
    FileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("system key env var malformed, expected base64-encoded 32-byte AES key")]
    MalformedSystemKey,

    #[error("master key file contents are not valid base64")]
    MalformedMasterKeyFile,

    #[error("master key decryption failed: {0}")]
    Decrypt(#[from] tinto_crypto::CryptoFailure),

    #[error("decrypted master key is not exactly 32 bytes")]
    WrongKeyLength,
}
