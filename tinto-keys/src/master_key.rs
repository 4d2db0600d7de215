//! The single process-wide root credential (§3 MasterKey, §4.2).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use secrecy::{ExposeSecret, Secret};
use zeroize::Zeroize;

use tinto_crypto::aes::AesKey;

use crate::error::KeyCustodyFailure;

/// Domain separation tag for the AES-GCM AAD used when decrypting the
/// master-key file, so a ciphertext produced for some other purpose can
/// never be mistaken for a master-key blob.
const MASTER_KEY_AAD: &[u8] = b"tinto-master-key-v1";

/// The 32-byte AES-256 master key, held in memory only, never persisted in
/// plaintext and never exposed over the network (§3).
pub struct MasterKey(Secret<[u8; 32]>);

impl MasterKey {
    /// Load the master key per §4.2:
    ///
    /// 1. Refuse unless `console_discriminator` (read from the configured
    ///    env var) is set, indicating direct console access.
    /// 2. Read the encrypted blob at `key_file_path`.
    /// 3. Decrypt it with the 32-byte AES system key decoded from
    ///    `system_key_b64` (itself supplied out-of-band, typically a second
    ///    environment variable).
    /// 4. The decrypted bytes become the in-memory master key.
    pub fn load(
        console_discriminator: Option<&str>,
        key_file_path: &std::path::Path,
        system_key_b64: &str,
    ) -> Result<Self, KeyCustodyFailure> {
        if console_discriminator.is_none() {
            return Err(KeyCustodyFailure::ConsoleOnly);
        }

        let system_key_bytes = BASE64
            .decode(system_key_b64.trim())
            .map_err(|_| KeyCustodyFailure::MalformedSystemKey)?;
        let system_key: [u8; 32] = system_key_bytes
            .try_into()
            .map_err(|_| KeyCustodyFailure::MalformedSystemKey)?;
        let system_key = AesKey::new(&system_key);

        let file_contents =
            std::fs::read_to_string(key_file_path).map_err(|source| {
                KeyCustodyFailure::FileUnreadable {
                    path: key_file_path.display().to_string(),
                    source,
                }
            })?;

        let mut plaintext = system_key.decrypt(MASTER_KEY_AAD, file_contents.trim())?;
        let key_bytes: [u8; 32] = plaintext
            .as_slice()
            .try_into()
            .map_err(|_| KeyCustodyFailure::WrongKeyLength)?;
        plaintext.zeroize();

        Ok(Self(Secret::new(key_bytes)))
    }

    /// Build directly from already-loaded key bytes, for tests and for the
    /// orchestrator's in-process wiring.
    pub fn from_bytes(key_bytes: [u8; 32]) -> Self {
        Self(Secret::new(key_bytes))
    }

    pub fn aes_key(&self) -> AesKey {
        AesKey::new(self.0.expose_secret())
    }

    pub(crate) fn expose_bytes(&self) -> &[u8; 32] {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey").field("0", &"<redacted>").finish()
    }
}

#[cfg(test)]
mod test {
    use tinto_crypto::rng::SysRng;

    use super::*;

    #[test]
    fn load_refuses_without_console_discriminator() {
        let result = MasterKey::load(None, std::path::Path::new("/nonexistent"), "");
        assert!(matches!(result, Err(KeyCustodyFailure::ConsoleOnly)));
    }

    #[test]
    fn load_roundtrips_through_a_real_file() {
        let mut rng = SysRng::new();
        let system_key_bytes = tinto_crypto::rng::gen_bytes::<32>(&mut rng);
        let system_key = AesKey::new(&system_key_bytes);
        let master_key_bytes = tinto_crypto::rng::gen_bytes::<32>(&mut rng);

        let ciphertext = system_key.encrypt(&mut rng, MASTER_KEY_AAD, &master_key_bytes);

        let dir = std::env::temp_dir();
        let path = dir.join(format!("tinto-master-key-test-{}", uuid::Uuid::new_v4()));
        std::fs::write(&path, &ciphertext).unwrap();

        let system_key_b64 = base64::engine::general_purpose::STANDARD.encode(system_key_bytes);
        let loaded = MasterKey::load(Some("1"), &path, &system_key_b64).unwrap();
        assert_eq!(loaded.expose_bytes(), &master_key_bytes);

        std::fs::remove_file(&path).ok();
    }
}
