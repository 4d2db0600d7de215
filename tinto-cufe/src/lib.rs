//! CUFE/CUDE fingerprint computation (§4.4).
//!
//! Deterministic and order-sensitive: the same [`FingerprintInput`] always
//! produces the same fingerprint, and every field enumerated below
//! participates in the hash, in this exact order, with no delimiters.

use chrono::{NaiveDate, NaiveTime};
use tinto_common::money::MinorUnits;
use tinto_common::party::IdType;

/// Which of DIAN's three supported taxes a [`TaxLine`] represents, in the
/// fixed order CUFE input field 5 requires (IVA, INC, ICA).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TaxKind {
    Iva,
    Inc,
    Ica,
}

impl TaxKind {
    pub fn dian_code(self) -> &'static str {
        match self {
            Self::Iva => "01",
            Self::Inc => "04",
            Self::Ica => "03",
        }
    }

    /// Fixed order for CUFE input field 5 (§4.4): IVA, then INC, then ICA.
    pub const ORDER: [TaxKind; 3] = [TaxKind::Iva, TaxKind::Inc, TaxKind::Ica];
}

#[derive(Copy, Clone, Debug)]
pub struct TaxLine {
    pub kind: TaxKind,
    pub tax_amount: MinorUnits,
    pub taxable_base: MinorUnits,
}

/// Every field the CUFE/CUDE input string is built from (§4.4 fields 1–11).
#[derive(Clone, Debug)]
pub struct FingerprintInput {
    /// Field 1: `{prefix}{number}`, no separator.
    pub document_number: String,
    /// Field 2.
    pub issue_date: NaiveDate,
    /// Field 3: local −05:00 wall clock.
    pub issue_time: NaiveTime,
    /// Field 4: invoice-level pre-tax subtotal.
    pub subtotal: MinorUnits,
    /// Field 5: present taxes, any subset of [`TaxKind::ORDER`]; absent
    /// kinds emit no fields at all (not zero-valued fields).
    pub taxes: Vec<TaxLine>,
    /// Field 6.
    pub grand_total: MinorUnits,
    /// Field 7: digits only, no check digit, no punctuation.
    pub issuer_tax_id_digits: String,
    /// Field 8.
    pub customer_id_type: IdType,
    /// Field 9.
    pub customer_id_number: String,
    /// Field 10: environment-scoped constant from configuration.
    pub technical_key: String,
    /// Field 11: `"1"` in production, `"2"` otherwise.
    pub is_production: bool,
}

impl FingerprintInput {
    /// Build the exact, delimiter-free concatenation CUFE/CUDE hashes.
    fn to_input_string(&self) -> String {
        let mut s = String::new();
        s.push_str(&self.document_number);
        s.push_str(&self.issue_date.format("%Y%m%d").to_string());
        s.push_str(&self.issue_time.format("%H%M%S").to_string());
        s.push_str(&self.subtotal.format_dian());

        for kind in TaxKind::ORDER {
            if let Some(line) = self.taxes.iter().find(|t| t.kind == kind) {
                s.push_str(kind.dian_code());
                s.push_str(&line.tax_amount.format_dian());
                s.push_str(&line.taxable_base.format_dian());
            }
        }

        s.push_str(&self.grand_total.format_dian());
        s.push_str(&self.issuer_tax_id_digits);
        s.push_str(self.customer_id_type.dian_scheme_code());
        s.push_str(&self.customer_id_number);
        s.push_str(&self.technical_key);
        s.push_str(if self.is_production { "1" } else { "2" });
        s
    }
}

/// `^[0-9a-f]{96}$`, per §4.4.
pub fn is_valid_fingerprint(candidate: &str) -> bool {
    candidate.len() == 96 && candidate.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}

/// Compute the CUFE (sales invoice) or CUDE (credit/debit note) — the spec
/// calls these the same function under two names; this crate only knows
/// one, `fingerprint`, and the caller picks CUFE vs CUDE semantics by
/// choosing which document's fields it feeds in (§3 DocumentType).
pub fn fingerprint(input: &FingerprintInput) -> String {
    tinto_crypto::digest::sha384_hex(input.to_input_string().as_bytes())
}

/// `verify_cufe(I, candidate, ...)`: recompute and compare.
pub fn verify(input: &FingerprintInput, candidate: &str) -> bool {
    fingerprint(input) == candidate
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_input() -> FingerprintInput {
        FingerprintInput {
            document_number: "SETT1".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            issue_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            subtotal: MinorUnits(100_000_000),
            taxes: vec![TaxLine {
                kind: TaxKind::Iva,
                tax_amount: MinorUnits(19_000_000),
                taxable_base: MinorUnits(100_000_000),
            }],
            grand_total: MinorUnits(119_000_000),
            issuer_tax_id_digits: "900123456".to_string(),
            customer_id_type: IdType::Cc,
            customer_id_number: "1234567890".to_string(),
            technical_key: "fc8eac422eba16e22ffd8c6f94b3f40a6e38162c".to_string(),
            is_production: false,
        }
    }

    #[test]
    fn fingerprint_has_expected_shape() {
        let fp = fingerprint(&sample_input());
        assert_eq!(fp.len(), 96);
        assert!(is_valid_fingerprint(&fp));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let input = sample_input();
        assert_eq!(fingerprint(&input), fingerprint(&input));
    }

    #[test]
    fn verify_roundtrips() {
        let input = sample_input();
        let fp = fingerprint(&input);
        assert!(verify(&input, &fp));
    }

    #[test]
    fn mutating_any_field_flips_the_fingerprint() {
        let input = sample_input();
        let fp = fingerprint(&input);

        let mut date_mutated = input.clone();
        date_mutated.issue_date = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
        assert!(!verify(&date_mutated, &fp));

        let mut total_mutated = input.clone();
        total_mutated.grand_total = MinorUnits(120_000_000);
        assert!(!verify(&total_mutated, &fp));

        let mut env_mutated = input.clone();
        env_mutated.is_production = true;
        assert!(!verify(&env_mutated, &fp));
    }

    #[test]
    fn absent_tax_lines_emit_no_fields() {
        let mut no_tax = sample_input();
        no_tax.taxes.clear();
        let with_tax = sample_input();
        assert_ne!(fingerprint(&no_tax), fingerprint(&with_tax));
    }
}
