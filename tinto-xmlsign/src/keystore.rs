//! Loading a signing credential from an issuer's keystore blob (§6).
//!
//! DIAN issuers hold a PKCS#12 keystore in practice, but no PKCS#12
//! container crate appears anywhere in this corpus's dependency stack, and
//! this exercise never fabricates a dependency to fill that gap (see
//! DESIGN.md). Instead, `tinto-keys`/`tinto-store` are expected to decrypt
//! the issuer's `certificate_blob` into the two parts a keystore ultimately
//! exists to hand over — a PKCS#8 PEM private key and a DER certificate —
//! and this module parses those directly with `rsa`'s own PKCS#8 decoder
//! and `x509-parser`, the same two crates `tinto-xmlsign::sign_xml`/
//! `verify_xml` already depend on.

use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;

use crate::error::SignFailure;

/// The two pieces `sign_xml` needs, loaded once per call site and dropped
/// immediately after (§5: the signer must not retain private-key bytes
/// beyond a single `sign_xml` call). `RsaPrivateKey` zeroizes its backing
/// limbs on drop, matching the teacher's blanket use of `zeroize` on every
/// secret-carrying type.
pub struct Credential {
    pub private_key: RsaPrivateKey,
    pub certificate_der: Vec<u8>,
}

/// Parse a decrypted keystore blob's private key (PKCS#8 PEM) and
/// certificate (DER). Fails closed: a certificate that doesn't parse as
/// X.509 is rejected here rather than deferred to `sign_xml`, so a bad
/// keystore is caught at load time.
pub fn load_credential(
    private_key_pkcs8_pem: &str,
    certificate_der: Vec<u8>,
) -> Result<Credential, SignFailure> {
    let private_key = RsaPrivateKey::from_pkcs8_pem(private_key_pkcs8_pem)
        .map_err(|e| SignFailure::KeystoreUnreadable(e.to_string()))?;
    x509_parser::parse_x509_certificate(&certificate_der)
        .map_err(|e| SignFailure::KeystoreUnreadable(e.to_string()))?;
    Ok(Credential {
        private_key,
        certificate_der,
    })
}

#[cfg(test)]
mod test {
    use rsa::pkcs8::EncodePrivateKey;

    use super::*;

    #[test]
    fn rejects_malformed_pem() {
        let err = load_credential("not a pem", vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, SignFailure::KeystoreUnreadable(_)));
    }

    #[test]
    fn rejects_malformed_certificate_der() {
        let mut rng = rsa::rand_core::OsRng;
        let key = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let pem = key
            .to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
            .unwrap()
            .to_string();
        let err = load_credential(&pem, b"not a certificate".to_vec()).unwrap_err();
        assert!(matches!(err, SignFailure::KeystoreUnreadable(_)));
    }
}
