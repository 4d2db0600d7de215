//! XAdES-EPES enveloped XML digital signature (§4.6).
//!
//! Built on the `rsa` crate for RSA signing, using the standard
//! `Pkcs1v15Sign` padding XAdES requires.

pub mod canon;
pub mod error;
pub mod keystore;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rsa::pkcs1v15::Pkcs1v15Sign;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

pub use error::SignFailure;
pub use keystore::{load_credential, Credential};

const RESERVED_SLOT_SELF_CLOSED: &str = "<ext:ExtensionContent/>";
const RESERVED_SLOT_SELF_CLOSED_SPACED: &str = "<ext:ExtensionContent />";
/// The empty-element form `verify_xml` reconstructs once the signature has
/// been spliced in and then stripped back out again. `quick-xml` emits the
/// self-closed form above, so the reference digest must be computed over
/// this expanded form at sign time too, or the two sides never agree.
const RESERVED_SLOT_EXPANDED: &str = "<ext:ExtensionContent></ext:ExtensionContent>";

/// Sign `xml` per §4.6: locate the reserved `ext:ExtensionContent` slot,
/// compute the enveloped SHA-256 digest over the whole (not-yet-signed)
/// document, build and sign `ds:SignedInfo` with `private_key`
/// (RSA-SHA256), and splice the resulting `ds:Signature` into the reserved
/// slot.
///
/// `certificate_der` is the signer's X.509 certificate, DER-encoded, to be
/// embedded in `ds:KeyInfo`.
pub fn sign_xml(
    xml: &str,
    private_key: &RsaPrivateKey,
    certificate_der: &[u8],
) -> Result<String, SignFailure> {
    let slot = find_reserved_slot(xml).ok_or(SignFailure::MissingExtensionSlot)?;

    // Digest the canonical form of the document: the reserved slot expanded
    // to the same open/close empty-element bytes `verify_xml` will see once
    // it strips the signature back out of the final, spliced document.
    let canonical_xml = format!("{}{}{}", &xml[..slot.start], RESERVED_SLOT_EXPANDED, &xml[slot.end..]);
    let document_digest_b64 = BASE64.encode(Sha256::digest(canonical_xml.as_bytes()));
    let signed_info_xml = canon::build_signed_info(&document_digest_b64);

    let signed_info_digest = Sha256::digest(signed_info_xml.as_bytes());
    let signature_bytes = private_key
        .sign(Pkcs1v15Sign::new::<Sha256>(), &signed_info_digest)
        .map_err(|_| SignFailure::PrivateKeyUnusableForRsa)?;
    let signature_value_b64 = BASE64.encode(&signature_bytes);
    let certificate_der_b64 = BASE64.encode(certificate_der);

    let signature_element =
        canon::build_signature_element(&signed_info_xml, &signature_value_b64, &certificate_der_b64);

    let replacement = format!("<ext:ExtensionContent>{signature_element}</ext:ExtensionContent>");
    Ok(format!("{}{}{}", &xml[..slot.start], replacement, &xml[slot.end..]))
}

/// Verify `signed_xml` per §4.6's inverse: locate the lone `ds:Signature`,
/// extract the embedded certificate, recompute and compare the reference
/// digest, then verify the signature value under the certificate's public
/// key. Returns `Ok(())` only if both checks pass.
pub fn verify_xml(signed_xml: &str) -> Result<(), SignFailure> {
    let sig_block = extract_between(signed_xml, "<ds:Signature", "</ds:Signature>")
        .ok_or(SignFailure::MissingSignature)?;
    // `sig_block.start` points just past "<ds:Signature" (before searching
    // for the element's own closing `>`); recover the true element bounds.
    let sig_start = signed_xml[..sig_block.start].rfind("<ds:Signature").unwrap();
    let sig_end = sig_block.end;
    let full_signature_xml = &signed_xml[sig_start..sig_end];

    let signed_info_xml = extract_between(full_signature_xml, "<ds:SignedInfo", "</ds:SignedInfo>")
        .map(|r| {
            let start = full_signature_xml[..r.start].rfind("<ds:SignedInfo").unwrap();
            &full_signature_xml[start..r.end]
        })
        .ok_or(SignFailure::CanonicalizationFailed(
            "missing ds:SignedInfo".to_string(),
        ))?;

    let digest_value = extract_text_between(full_signature_xml, "<ds:DigestValue>", "</ds:DigestValue>")
        .ok_or(SignFailure::DigestMismatch)?;
    let signature_value_b64 =
        extract_text_between(full_signature_xml, "<ds:SignatureValue>", "</ds:SignatureValue>")
            .ok_or(SignFailure::SignatureInvalid)?;
    let certificate_b64 =
        extract_text_between(full_signature_xml, "<ds:X509Certificate>", "</ds:X509Certificate>")
            .ok_or(SignFailure::SignatureInvalid)?;

    // Enveloped-signature transform: hash the document with the signature
    // itself removed.
    let document_without_signature =
        format!("{}{}", &signed_xml[..sig_start], &signed_xml[sig_end..]);
    let recomputed_digest_b64 = BASE64.encode(Sha256::digest(document_without_signature.as_bytes()));
    if recomputed_digest_b64 != digest_value {
        return Err(SignFailure::DigestMismatch);
    }

    let certificate_der = BASE64
        .decode(certificate_b64)
        .map_err(|_| SignFailure::SignatureInvalid)?;
    let (_, cert) = x509_parser::parse_x509_certificate(&certificate_der)
        .map_err(|_| SignFailure::SignatureInvalid)?;
    let spki_der = cert.tbs_certificate.subject_pki.raw;
    let public_key = <RsaPublicKey as rsa::pkcs8::DecodePublicKey>::from_public_key_der(spki_der)
        .map_err(|_| SignFailure::SignatureInvalid)?;

    let signature_bytes = BASE64
        .decode(signature_value_b64)
        .map_err(|_| SignFailure::SignatureInvalid)?;
    let signed_info_digest = Sha256::digest(signed_info_xml.as_bytes());

    public_key
        .verify(Pkcs1v15Sign::new::<Sha256>(), &signed_info_digest, &signature_bytes)
        .map_err(|_| SignFailure::SignatureInvalid)
}

struct Span {
    start: usize,
    end: usize,
}

fn find_reserved_slot(xml: &str) -> Option<Span> {
    if let Some(start) = xml.find(RESERVED_SLOT_SELF_CLOSED) {
        return Some(Span {
            start,
            end: start + RESERVED_SLOT_SELF_CLOSED.len(),
        });
    }
    xml.find(RESERVED_SLOT_SELF_CLOSED_SPACED).map(|start| Span {
        start,
        end: start + RESERVED_SLOT_SELF_CLOSED_SPACED.len(),
    })
}

fn extract_between(haystack: &str, open: &str, close: &str) -> Option<Span> {
    let open_pos = haystack.find(open)?;
    let close_pos = haystack[open_pos..].find(close)? + open_pos + close.len();
    Some(Span {
        start: open_pos + open.len(),
        end: close_pos,
    })
}

fn extract_text_between<'a>(haystack: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let open_pos = haystack.find(open)? + open.len();
    let close_pos = haystack[open_pos..].find(close)? + open_pos;
    Some(&haystack[open_pos..close_pos])
}
