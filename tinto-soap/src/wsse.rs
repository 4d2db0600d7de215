//! WS-Security UsernameToken header construction (§4.8).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};

use tinto_crypto::rng::Crng;

/// The three fields DIAN's WS-Security header carries, beyond the fixed
/// `Username` (the configured `SoftwareID`): a password digest, a fresh
/// nonce, and the instant the token was created.
pub struct UsernameToken {
    pub username: String,
    pub password_digest_hex: String,
    pub nonce_b64: String,
    pub created: DateTime<Utc>,
}

impl UsernameToken {
    /// Build a fresh token: `password = SHA-256(software_pin || software_id)`
    /// as hex text, `nonce` is 16 fresh random bytes, `created` is `now`
    /// (§4.8).
    pub fn new(
        software_id: &str,
        software_pin: &str,
        rng: &mut impl Crng,
        now: DateTime<Utc>,
    ) -> Self {
        let digest_input = format!("{software_pin}{software_id}");
        let password_digest_hex = tinto_crypto::digest::sha256_hex(digest_input.as_bytes());
        let nonce_bytes: [u8; 16] = tinto_crypto::rng::gen_bytes(rng);

        Self {
            username: software_id.to_string(),
            password_digest_hex,
            nonce_b64: BASE64.encode(nonce_bytes),
            created: now,
        }
    }

    pub fn created_iso8601(&self) -> String {
        self.created.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tinto_crypto::rng::SysRng;

    #[test]
    fn password_digest_matches_4_8_recipe() {
        let mut rng = SysRng::new();
        let now = Utc::now();
        let token = UsernameToken::new("SOFT-1", "1234", &mut rng, now);
        let expected = tinto_crypto::digest::sha256_hex(b"1234SOFT-1");
        assert_eq!(token.password_digest_hex, expected);
        assert_eq!(token.username, "SOFT-1");
    }

    #[test]
    fn nonces_differ_between_tokens() {
        let mut rng = SysRng::new();
        let now = Utc::now();
        let a = UsernameToken::new("S", "P", &mut rng, now);
        let b = UsernameToken::new("S", "P", &mut rng, now);
        assert_ne!(a.nonce_b64, b.nonce_b64);
    }
}
