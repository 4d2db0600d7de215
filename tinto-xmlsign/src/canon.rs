//! A deliberately narrow canonicalization: rather than a general C14N 1.0
//! implementation, this crate only ever canonicalizes one element shape —
//! the `ds:SignedInfo` this module itself constructs — so canonical form is
//! guaranteed by construction (fixed attribute order, no insignificant
//! whitespace, single quoting convention) instead of by a post-hoc
//! normalization pass over arbitrary XML.

pub const C14N_ALGORITHM: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";
pub const RSA_SHA256_ALGORITHM: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
pub const ENVELOPED_SIGNATURE_ALGORITHM: &str =
    "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
pub const SHA256_DIGEST_ALGORITHM: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
pub const DS_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Build the exact canonical bytes of `ds:SignedInfo` for a single
/// enveloped, whole-document reference (§4.6 step 3). Because this is the
/// only shape ever produced, building it this way *is* canonicalizing it —
/// there is never a second representation to normalize away.
pub fn build_signed_info(document_digest_b64: &str) -> String {
    format!(
        "<ds:SignedInfo xmlns:ds=\"{DS_NS}\">\
<ds:CanonicalizationMethod Algorithm=\"{C14N_ALGORITHM}\"/>\
<ds:SignatureMethod Algorithm=\"{RSA_SHA256_ALGORITHM}\"/>\
<ds:Reference URI=\"\">\
<ds:Transforms><ds:Transform Algorithm=\"{ENVELOPED_SIGNATURE_ALGORITHM}\"/></ds:Transforms>\
<ds:DigestMethod Algorithm=\"{SHA256_DIGEST_ALGORITHM}\"/>\
<ds:DigestValue>{document_digest_b64}</ds:DigestValue>\
</ds:Reference>\
</ds:SignedInfo>"
    )
}

/// Build the full `ds:Signature` element to splice into the reserved
/// `ext:ExtensionContent` slot.
pub fn build_signature_element(
    signed_info_xml: &str,
    signature_value_b64: &str,
    certificate_der_b64: &str,
) -> String {
    format!(
        "<ds:Signature xmlns:ds=\"{DS_NS}\">\
{signed_info_xml}\
<ds:SignatureValue>{signature_value_b64}</ds:SignatureValue>\
<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{certificate_der_b64}</ds:X509Certificate></ds:X509Data></ds:KeyInfo>\
</ds:Signature>"
    )
}
