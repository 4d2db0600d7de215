//! AES-256-GCM authenticated encryption for blobs at rest.
//!
//! Unlike the teacher's `common::aes` (which uses a "derive key mode" scheme
//! to sidestep AES-GCM's 96-bit nonce limit for a very high encryption
//! volume), Tinto's blob volume is one encryption per invoice/submission
//! field — nowhere near the 2^32 nonce-collision bound — so we use the
//! simpler, directly-specified scheme: a fresh random 12-byte nonce per
//! message, prepended to the ciphertext, the whole thing base64-encoded.

use base64::Engine;
use ring::aead;

use crate::{rng::Crng, CryptoFailure};

const NONCE_LEN: usize = 12;

/// A 32-byte AES-256 key held in memory for the lifetime of the process.
pub struct AesKey(aead::LessSafeKey);

impl AesKey {
    pub fn new(key_bytes: &[u8; 32]) -> Self {
        let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key_bytes)
            .expect("32-byte key is always valid for AES-256-GCM");
        Self(aead::LessSafeKey::new(unbound))
    }

    /// Encrypt `plaintext` under `aad`, returning `base64(nonce || ciphertext || tag)`.
    pub fn encrypt(&self, rng: &mut impl Crng, aad: &[u8], plaintext: &[u8]) -> String {
        let nonce_bytes: [u8; NONCE_LEN] = crate::rng::gen_bytes(rng);
        let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = plaintext.to_vec();
        let tag = self
            .0
            .seal_in_place_separate_tag(nonce, aead::Aad::from(aad), &mut in_out)
            .expect("sealing in-memory buffers never fails");

        let mut out = Vec::with_capacity(NONCE_LEN + in_out.len() + tag.as_ref().len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&in_out);
        out.extend_from_slice(tag.as_ref());

        base64::engine::general_purpose::STANDARD.encode(out)
    }

    /// Decrypt the output of [`Self::encrypt`], verifying `aad` matches.
    pub fn decrypt(&self, aad: &[u8], ciphertext_b64: &str) -> Result<Vec<u8>, CryptoFailure> {
        let mut data = base64::engine::general_purpose::STANDARD
            .decode(ciphertext_b64)
            .map_err(|_| CryptoFailure::Internal)?;

        if data.len() < NONCE_LEN + aead::AES_256_GCM.tag_len() {
            return Err(CryptoFailure::Internal);
        }

        let nonce_bytes: [u8; NONCE_LEN] = data[..NONCE_LEN]
            .try_into()
            .expect("length checked above");
        let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

        let ciphertext_and_tag = &mut data[NONCE_LEN..];
        let plaintext_ref = self
            .0
            .open_in_place(nonce, aead::Aad::from(aad), ciphertext_and_tag)
            .map_err(|_| CryptoFailure::AuthTagMismatch)?;
        let plaintext_len = plaintext_ref.len();

        // `open_in_place` writes the plaintext at the front of the slice it
        // was given; `data` still has the nonce prefix, so shift it out.
        data.drain(..NONCE_LEN);
        data.truncate(plaintext_len);
        Ok(data)
    }
}
