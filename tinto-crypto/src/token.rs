//! Random opaque token generation.
//!
//! Grounded on `common::api::auth::BearerAuthToken::encode_from_raw_bytes`:
//! URL-safe base64 without padding, so the token is safe to embed in a URL
//! path or header without further escaping.

use base64::Engine;

use crate::rng::Crng;

/// Generate a random, URL-safe, unpadded base64 token from `num_bytes` of
/// entropy. Used for nonces and opaque identifiers that don't need to be
/// human-typeable.
pub fn random_token(rng: &mut impl Crng, num_bytes: usize) -> String {
    let mut raw = vec![0u8; num_bytes];
    rng.fill_bytes(&mut raw);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rng::SysRng;

    #[test]
    fn random_token_has_no_padding_or_unsafe_chars() {
        let mut rng = SysRng::new();
        let token = random_token(&mut rng, 16);
        assert!(!token.contains('='));
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
    }

    #[test]
    fn random_tokens_are_distinct() {
        let mut rng = SysRng::new();
        let a = random_token(&mut rng, 16);
        let b = random_token(&mut rng, 16);
        assert_ne!(a, b);
    }
}
