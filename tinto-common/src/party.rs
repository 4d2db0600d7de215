//! Commercial parties: issuers (who hold the signing credential) and
//! customers (who never do).

use serde::{Deserialize, Serialize};

use crate::ids::{CustomerId, IssuerId};
use crate::EncryptedBlob;

/// DIAN's identification-type catalog, restricted to the codes §4.4's CUFE
/// mapping and §4.5's UBL `schemeID` attribute both need.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum IdType {
    Nit,
    Cc,
    Ce,
    Passport,
    ForeignDoc,
    ForeignNit,
}

impl IdType {
    /// DIAN's two-digit identification-type code, used both as CUFE input
    /// field 8 and as the `schemeID` attribute on `cac:PartyIdentification`
    /// in the UBL builder (§4.4, §4.5). Kept as one inherent method so the
    /// two call sites can never drift out of sync with each other.
    ///
    /// Unmapped/unknown identification types fall back to NIT (`31`) per
    /// §4.4's explicit "unknown → 31" rule.
    pub fn dian_scheme_code(self) -> &'static str {
        match self {
            Self::Nit => "31",
            Self::Cc => "13",
            Self::Ce => "22",
            Self::Passport => "41",
            Self::ForeignDoc => "42",
            Self::ForeignNit => "50",
        }
    }
}

/// The party issuing invoices: holds the signing credential.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Issuer {
    pub id: IssuerId,
    pub id_type: IdType,
    pub id_number: String,
    pub legal_name: String,
    pub address_line: Option<String>,
    pub locality: Option<String>,
    pub contact_email: Option<String>,
    /// PKCS#12 keystore + private key, encrypted at rest (§4.10).
    pub certificate_blob: EncryptedBlob,
    pub certificate_expires_at: chrono::DateTime<chrono::Utc>,
}

/// The party an invoice is billed to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub id_type: IdType,
    pub id_number: String,
    pub legal_name: String,
    pub address_line: Option<String>,
    pub locality: Option<String>,
    pub contact_email: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dian_scheme_code_matches_4_4_mapping() {
        assert_eq!(IdType::Nit.dian_scheme_code(), "31");
        assert_eq!(IdType::Cc.dian_scheme_code(), "13");
        assert_eq!(IdType::Ce.dian_scheme_code(), "22");
        assert_eq!(IdType::Passport.dian_scheme_code(), "41");
        assert_eq!(IdType::ForeignDoc.dian_scheme_code(), "42");
        assert_eq!(IdType::ForeignNit.dian_scheme_code(), "50");
    }
}
