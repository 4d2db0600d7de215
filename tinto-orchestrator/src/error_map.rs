//! Classifying a DIAN `(error_code, error_message)` pair into one of a
//! closed set of categories (§4.11).
//!
//! Grounded on `tinto-auth::validate::authenticate`'s "algorithm as a
//! function with inline numbered steps" style: a two-stage match, first by
//! raw DIAN code, then by case-insensitive substring search over the
//! message, falling back to `Unknown`.

/// The closed category set from §4.11. Distinct from
/// `tinto_common::error::ErrorCategory`, which classifies failures at the
/// API boundary rather than DIAN's own rejection reasons.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCategory {
    XmlStructure,
    Signature,
    CufeMismatch,
    Identification,
    Numbering,
    TaxCalculation,
    DateTime,
    Duplicate,
    Authorization,
    DianServiceError,
    Unknown,
}

impl ErrorCategory {
    /// Retryable categories per §4.11: a later resubmission attempt with
    /// the same invoice data has a realistic chance of succeeding. All
    /// other categories require the issuer to correct the invoice first.
    pub fn retryable(self) -> bool {
        matches!(
            self,
            Self::Signature | Self::CufeMismatch | Self::DianServiceError
        )
    }

    /// The canned, user-facing explanation for this category.
    pub fn explanation(self) -> &'static str {
        match self {
            Self::XmlStructure => {
                "The submitted document does not conform to the UBL 2.1 schema DIAN expects."
            }
            Self::Signature => {
                "DIAN could not validate the XAdES digital signature on the submitted document."
            }
            Self::CufeMismatch => {
                "The CUFE/CUDE fingerprint embedded in the document does not match the one DIAN computed from its contents."
            }
            Self::Identification => {
                "An identification number (issuer, customer, or tax id) is invalid or unregistered with DIAN."
            }
            Self::Numbering => {
                "The invoice number or resolution range is outside what DIAN has authorized for this issuer."
            }
            Self::TaxCalculation => {
                "A tax amount on the document does not match DIAN's recomputation from the line items."
            }
            Self::DateTime => {
                "A date or time on the document is invalid or outside DIAN's accepted window."
            }
            Self::Duplicate => "DIAN has already received a document with this fingerprint.",
            Self::Authorization => {
                "DIAN rejected the credentials or technical key used to submit this document."
            }
            Self::DianServiceError => {
                "DIAN's service returned an internal error unrelated to the document's content."
            }
            Self::Unknown => "DIAN returned an error this system does not recognize.",
        }
    }

    /// Ordered suggested actions for this category, most useful first.
    pub fn suggested_actions(self) -> &'static [&'static str] {
        match self {
            Self::XmlStructure => &[
                "Review the line items and party data for missing or malformed fields.",
                "Re-issue the invoice after correcting the offending field.",
            ],
            Self::Signature => &[
                "Verify the signing certificate has not expired or been revoked.",
                "Retry the submission; transient signing-service issues resolve on retry.",
            ],
            Self::CufeMismatch => &[
                "Recompute the fingerprint from the exact field values DIAN expects (§4.4).",
                "Retry the submission once the fingerprint has been corrected.",
            ],
            Self::Identification => &[
                "Confirm the issuer and customer tax ids are correctly formatted and registered.",
                "Re-issue the invoice with corrected identification data.",
            ],
            Self::Numbering => &[
                "Confirm the invoice number falls within an active DIAN numbering resolution.",
                "Request or renew a numbering resolution before re-issuing.",
            ],
            Self::TaxCalculation => &[
                "Recompute line-item and invoice-level tax amounts using DIAN's rounding rule.",
                "Re-issue the invoice with corrected tax amounts.",
            ],
            Self::DateTime => &[
                "Confirm the issue date and due date fall within DIAN's accepted window.",
                "Re-issue the invoice with corrected dates.",
            ],
            Self::Duplicate => &[
                "Confirm whether the prior submission already succeeded before resubmitting.",
            ],
            Self::Authorization => &[
                "Confirm the technical key and software id are registered and active with DIAN.",
                "Contact DIAN support if credentials are confirmed correct.",
            ],
            Self::DianServiceError => &["Retry the submission after a short delay."],
            Self::Unknown => &["Capture the raw DIAN response and escalate for manual review."],
        }
    }
}

/// DIAN's own code table, checked before falling back to message
/// substrings. Codes not listed here fall through to stage two.
fn classify_by_code(code: &str) -> Option<ErrorCategory> {
    Some(match code {
        "90" | "FAJ03" => ErrorCategory::XmlStructure,
        "91" | "FAD06" => ErrorCategory::Signature,
        "92" => ErrorCategory::CufeMismatch,
        "93" => ErrorCategory::Identification,
        "94" => ErrorCategory::Numbering,
        "95" => ErrorCategory::TaxCalculation,
        "96" => ErrorCategory::DateTime,
        "97" => ErrorCategory::Duplicate,
        "98" => ErrorCategory::Authorization,
        "99" => ErrorCategory::DianServiceError,
        _ => return None,
    })
}

/// Stage two: case-insensitive substring search over the message, tried in
/// a fixed order so the first matching category wins deterministically.
///
/// DIAN's own `statusMessage`/fault text comes back in Spanish (e.g. §8 E2's
/// literal `"firma invalida"`), so every pattern here has a Spanish
/// counterpart alongside the English one this system's own logs and tests
/// use; neither list alone covers both sources.
fn classify_by_message(message: &str) -> ErrorCategory {
    let lower = message.to_lowercase();
    const PATTERNS: &[(&str, ErrorCategory)] = &[
        ("schema", ErrorCategory::XmlStructure),
        ("esquema", ErrorCategory::XmlStructure),
        ("xml", ErrorCategory::XmlStructure),
        ("signature", ErrorCategory::Signature),
        ("firma", ErrorCategory::Signature),
        ("certificate", ErrorCategory::Signature),
        ("certificado", ErrorCategory::Signature),
        ("cufe", ErrorCategory::CufeMismatch),
        ("cude", ErrorCategory::CufeMismatch),
        ("fingerprint", ErrorCategory::CufeMismatch),
        ("huella", ErrorCategory::CufeMismatch),
        ("nit", ErrorCategory::Identification),
        ("identification", ErrorCategory::Identification),
        ("identificaci", ErrorCategory::Identification),
        ("tax id", ErrorCategory::Identification),
        ("resolution", ErrorCategory::Numbering),
        ("resoluci", ErrorCategory::Numbering),
        ("numbering", ErrorCategory::Numbering),
        ("numeraci", ErrorCategory::Numbering),
        ("consecutive", ErrorCategory::Numbering),
        ("consecutivo", ErrorCategory::Numbering),
        ("tax", ErrorCategory::TaxCalculation),
        ("impuesto", ErrorCategory::TaxCalculation),
        ("iva", ErrorCategory::TaxCalculation),
        ("total", ErrorCategory::TaxCalculation),
        ("date", ErrorCategory::DateTime),
        ("fecha", ErrorCategory::DateTime),
        ("time", ErrorCategory::DateTime),
        ("hora", ErrorCategory::DateTime),
        ("duplicate", ErrorCategory::Duplicate),
        ("duplicado", ErrorCategory::Duplicate),
        ("already", ErrorCategory::Duplicate),
        ("ya existe", ErrorCategory::Duplicate),
        ("unauthorized", ErrorCategory::Authorization),
        ("no autorizado", ErrorCategory::Authorization),
        ("technical key", ErrorCategory::Authorization),
        ("clave t", ErrorCategory::Authorization),
        ("credentials", ErrorCategory::Authorization),
        ("credenciales", ErrorCategory::Authorization),
        ("internal error", ErrorCategory::DianServiceError),
        ("error interno", ErrorCategory::DianServiceError),
        ("service unavailable", ErrorCategory::DianServiceError),
        ("servicio no disponible", ErrorCategory::DianServiceError),
    ];
    for (pattern, category) in PATTERNS {
        if lower.contains(pattern) {
            return *category;
        }
    }
    ErrorCategory::Unknown
}

/// Classify a DIAN `(error_code, error_message)` pair into §4.11's closed
/// category set. `error_code` is tried first against the known DIAN code
/// table; if it's absent or unrecognized, `error_message` is searched for
/// a recognizable substring.
pub fn classify(error_code: Option<&str>, error_message: &str) -> ErrorCategory {
    error_code
        .and_then(classify_by_code)
        .unwrap_or_else(|| classify_by_message(error_message))
}
