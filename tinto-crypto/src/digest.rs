//! SHA-384 and SHA-512 digests, plus HMAC-SHA512.
//!
//! A convenience module in the style of the teacher's `common::sha256`: thin
//! helpers over `ring::digest` rather than a general-purpose hashing
//! abstraction, since every call site here already knows exactly which
//! algorithm DIAN requires.

/// SHA-384 digest a single input, returned as lowercase hex.
///
/// The CUFE/CUDE fingerprint (§4.4) is exactly this function applied to the
/// fingerprint input string.
pub fn sha384_hex(input: &[u8]) -> String {
    hex::encode(sha384(input).as_ref())
}

/// SHA-384 digest a single input.
pub fn sha384(input: &[u8]) -> ring::digest::Digest {
    ring::digest::digest(&ring::digest::SHA384, input)
}

/// SHA-512 digest a single input, returned as lowercase hex.
pub fn sha512_hex(input: &[u8]) -> String {
    hex::encode(sha512(input).as_ref())
}

/// SHA-512 digest a single input.
pub fn sha512(input: &[u8]) -> ring::digest::Digest {
    ring::digest::digest(&ring::digest::SHA512, input)
}

/// SHA-512 digest several input slices concatenated together, without
/// allocating an intermediate buffer.
pub fn sha512_many(inputs: &[&[u8]]) -> ring::digest::Digest {
    let mut ctx = ring::digest::Context::new(&ring::digest::SHA512);
    for input in inputs {
        ctx.update(input);
    }
    ctx.finish()
}

/// SHA-256 digest a single input, returned as lowercase hex. Used by the
/// SOAP client's WS-Security `PasswordDigest` (`SHA-256(PIN || SoftwareID)`).
pub fn sha256_hex(input: &[u8]) -> String {
    hex::encode(ring::digest::digest(&ring::digest::SHA256, input).as_ref())
}

/// HMAC-SHA512 of `input` under `key`, returned as lowercase hex.
///
/// Not used by the `ApiKey` derivation recipe (§4.2), which is a plain
/// `SHA-512` over a colon-joined string, not a keyed MAC — but kept in this
/// crate rather than scattered per call site, the same centralization
/// rationale that keeps every other digest primitive here.
pub fn hmac_sha512_hex(key: &[u8], input: &[u8]) -> String {
    let key = ring::hmac::Key::new(ring::hmac::HMAC_SHA512, key);
    hex::encode(ring::hmac::sign(&key, input).as_ref())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sha384_of_empty_matches_known_answer() {
        let actual = sha384_hex(b"");
        let expected = "38b060a751ac96384cd9327eb1b1e36a21fdb71114be07434c0cc7bf63f6e1da274edebfe76f65fbd51ad2f14898b95b";
        assert_eq!(actual, expected);
    }

    #[test]
    fn sha512_of_empty_matches_known_answer() {
        let actual = sha512_hex(b"");
        let expected = "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e";
        assert_eq!(actual, expected);
    }

    #[test]
    fn sha256_of_empty_matches_known_answer() {
        let actual = sha256_hex(b"");
        let expected = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        assert_eq!(actual, expected);
    }

    #[test]
    fn hmac_sha512_is_keyed_and_deterministic() {
        let a = hmac_sha512_hex(b"key-one", b"message");
        let b = hmac_sha512_hex(b"key-one", b"message");
        let c = hmac_sha512_hex(b"key-two", b"message");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 128);
    }
}
