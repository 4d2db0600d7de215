//! Derived credentials (§3 ApiKey, §4.2 derivation).

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use tinto_common::{ApiKeyFingerprint, ApiKeyId, EncryptedBlob};

use crate::master_key::MasterKey;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ApiKeyRole {
    Admin,
    Operator,
    Auditor,
}

impl ApiKeyRole {
    /// The role's name exactly as it appears in the derivation string
    /// (§4.2) — must be stable, changing it would invalidate every
    /// previously-issued key's fingerprint derivation.
    pub fn label(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Operator => "OPERATOR",
            Self::Auditor => "AUDITOR",
        }
    }

    /// Role capability table (§4.3).
    pub fn can_read_invoices(self) -> bool {
        true
    }

    pub fn can_create_invoice(self) -> bool {
        matches!(self, Self::Admin | Self::Operator)
    }

    pub fn can_issue_to_dian(self) -> bool {
        matches!(self, Self::Admin | Self::Operator)
    }

    pub fn can_manage_issuers_and_keys(self) -> bool {
        matches!(self, Self::Admin)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub name: String,
    pub role: ApiKeyRole,
    pub fingerprint: ApiKeyFingerprint,
    pub secret_blob: EncryptedBlob,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl ApiKey {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.map_or(true, |exp| exp > now)
    }
}

/// The raw secret of a freshly-derived key, surfaced exactly once at
/// creation time (§4.2) and never again — callers must persist
/// [`Self::encrypted_blob`] and [`Self::fingerprint`] and then drop this
/// value.
pub struct NewApiKeySecret {
    raw_hex: Secret<String>,
    fingerprint: ApiKeyFingerprint,
}

impl NewApiKeySecret {
    /// Derive a fresh API key secret per §4.2:
    ///
    /// `raw = first 64 hex chars of SHA-512(master || ":" || name || ":" ||
    /// role || ":" || derivation_epoch_ms)`, and `fingerprint =
    /// SHA-512(raw)` for lookup.
    ///
    /// `derivation_epoch_ms` is passed in by the caller (rather than read
    /// from the system clock here) so derivation stays a pure function of
    /// its inputs, matching CUFE's determinism requirement in spirit.
    pub fn derive(
        master_key: &MasterKey,
        name: &str,
        role: ApiKeyRole,
        derivation_epoch_ms: i64,
    ) -> Self {
        let input = format!(
            "{}:{name}:{}:{derivation_epoch_ms}",
            hex::encode(master_key.expose_bytes()),
            role.label(),
        );
        let full_digest_hex = tinto_crypto::digest::sha512_hex(input.as_bytes());
        let raw_hex = full_digest_hex[..64].to_string();
        let fingerprint = ApiKeyFingerprint(tinto_crypto::digest::sha512_hex(raw_hex.as_bytes()));

        Self {
            raw_hex: Secret::new(raw_hex),
            fingerprint,
        }
    }

    pub fn fingerprint(&self) -> &ApiKeyFingerprint {
        &self.fingerprint
    }

    /// Encrypt the raw secret under the master key for storage, so it can
    /// be decrypted and shown to the caller exactly once more if the
    /// creation response is retried, but never after.
    pub fn encrypt_for_storage(
        &self,
        master_key: &MasterKey,
        rng: &mut impl tinto_crypto::rng::Crng,
    ) -> EncryptedBlob {
        let ciphertext = master_key.aes_key().encrypt(
            rng,
            self.fingerprint.0.as_bytes(),
            self.raw_hex.expose_secret().as_bytes(),
        );
        EncryptedBlob::from_ciphertext(ciphertext)
    }

    pub fn expose_raw(&self) -> &str {
        self.raw_hex.expose_secret()
    }
}

#[cfg(test)]
mod test {
    use tinto_crypto::rng::SysRng;

    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let master = MasterKey::from_bytes([4u8; 32]);
        let a = NewApiKeySecret::derive(&master, "ops-team", ApiKeyRole::Operator, 1_700_000_000_000);
        let b = NewApiKeySecret::derive(&master, "ops-team", ApiKeyRole::Operator, 1_700_000_000_000);
        assert_eq!(a.expose_raw(), b.expose_raw());
        assert_eq!(a.fingerprint().0, b.fingerprint().0);
    }

    #[test]
    fn raw_secret_is_64_hex_chars() {
        let master = MasterKey::from_bytes([1u8; 32]);
        let key = NewApiKeySecret::derive(&master, "n", ApiKeyRole::Admin, 42);
        assert_eq!(key.expose_raw().len(), 64);
        assert!(key.expose_raw().bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn different_names_or_roles_or_epochs_diverge() {
        let master = MasterKey::from_bytes([2u8; 32]);
        let base = NewApiKeySecret::derive(&master, "a", ApiKeyRole::Admin, 1);
        let diff_name = NewApiKeySecret::derive(&master, "b", ApiKeyRole::Admin, 1);
        let diff_role = NewApiKeySecret::derive(&master, "a", ApiKeyRole::Operator, 1);
        let diff_epoch = NewApiKeySecret::derive(&master, "a", ApiKeyRole::Admin, 2);
        assert_ne!(base.expose_raw(), diff_name.expose_raw());
        assert_ne!(base.expose_raw(), diff_role.expose_raw());
        assert_ne!(base.expose_raw(), diff_epoch.expose_raw());
    }

    #[test]
    fn encrypted_blob_roundtrips_under_master_key() {
        let mut rng = SysRng::new();
        let master = MasterKey::from_bytes([8u8; 32]);
        let key = NewApiKeySecret::derive(&master, "n", ApiKeyRole::Auditor, 9);
        let blob = key.encrypt_for_storage(&master, &mut rng);
        let decrypted = master
            .aes_key()
            .decrypt(key.fingerprint().0.as_bytes(), blob.as_str())
            .unwrap();
        assert_eq!(decrypted, key.expose_raw().as_bytes());
    }

    #[test]
    fn role_capability_table_matches_4_3() {
        assert!(ApiKeyRole::Admin.can_manage_issuers_and_keys());
        assert!(!ApiKeyRole::Operator.can_manage_issuers_and_keys());
        assert!(!ApiKeyRole::Auditor.can_manage_issuers_and_keys());

        assert!(ApiKeyRole::Operator.can_create_invoice());
        assert!(!ApiKeyRole::Auditor.can_create_invoice());

        assert!(ApiKeyRole::Admin.can_read_invoices());
        assert!(ApiKeyRole::Operator.can_read_invoices());
        assert!(ApiKeyRole::Auditor.can_read_invoices());
    }
}
