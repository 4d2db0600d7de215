//! The document being issued, and the line items that make it up.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CustomerId, EnvironmentId, InvoiceId, IssuerId};
use crate::money::{Currency, MinorUnits};
use crate::EncryptedBlob;

/// Which of the three DIAN document shapes an invoice is; identical pipeline
/// shape throughout, only the CUFE-vs-CUDE fingerprint function and the DIAN
/// type code (and ZIP archive `doc_code`, §4.7) differ (spec.md Non-goals).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DocumentType {
    SalesInvoice,
    CreditNote,
    DebitNote,
}

impl DocumentType {
    pub fn dian_type_code(self) -> &'static str {
        match self {
            Self::SalesInvoice => "01",
            Self::CreditNote => "91",
            Self::DebitNote => "92",
        }
    }

    /// Used as CUFE vs CUDE selector: only the sales invoice gets a CUFE,
    /// credit/debit notes get the CUDE variant of the same fingerprint
    /// function (§4.4).
    pub fn uses_cufe(self) -> bool {
        matches!(self, Self::SalesInvoice)
    }
}

/// The invoice lifecycle state machine (§4.9).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Draft,
    PendingSignature,
    Signed,
    SubmittedToDian,
    AcceptedByDian,
    RejectedByDian,
    Cancelled,
}

impl InvoiceStatus {
    /// Whether `self -> next` is a legal edge in §4.9's invoice state
    /// machine. `Cancelled` is reachable from any pre-submission state.
    pub fn can_advance_to(self, next: Self) -> bool {
        use InvoiceStatus::*;
        match (self, next) {
            (Draft, PendingSignature) => true,
            (PendingSignature, Signed) => true,
            (Signed, SubmittedToDian) => true,
            (SubmittedToDian, AcceptedByDian) => true,
            (SubmittedToDian, RejectedByDian) => true,
            (Draft | PendingSignature | Signed, Cancelled) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::AcceptedByDian | Self::RejectedByDian | Self::Cancelled
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub document_type: DocumentType,
    pub issuer_id: IssuerId,
    pub customer_id: CustomerId,
    pub environment_id: EnvironmentId,
    pub prefix: Option<String>,
    pub number: i64,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub currency: Currency,
    pub subtotal: MinorUnits,
    pub tax_amount: MinorUnits,
    pub total: MinorUnits,
    /// Hex CUFE/CUDE, length 96 once computed; empty string before §4.4 has
    /// run (I3: non-empty once `status >= Signed`).
    pub fingerprint: String,
    pub status: InvoiceStatus,
    pub ubl_blob: Option<EncryptedBlob>,
    pub signed_xml_blob: Option<EncryptedBlob>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator_key_id: Option<crate::ids::ApiKeyId>,
}

impl Invoice {
    /// `{prefix}{number}` with no separator when prefix is absent, per the
    /// CUFE input field 1 rule (§4.4) — also used verbatim as UBL `cbc:ID`
    /// (§4.5 item 3).
    pub fn document_number(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{}", self.number),
            None => self.number.to_string(),
        }
    }

    /// I5: `due_date > issue_date` when both present.
    pub fn due_date_is_valid(&self) -> bool {
        match self.due_date {
            Some(due) => due > self.issue_date,
            None => true,
        }
    }
}

/// A single billed good or service (§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineItem {
    pub invoice_id: InvoiceId,
    /// 1-based, contiguous within an invoice.
    pub line_number: u32,
    pub description: String,
    pub quantity: f64,
    pub unit_price: MinorUnits,
    pub line_total: MinorUnits,
    pub tax_rate_percent: Option<f64>,
    pub tax_amount: Option<MinorUnits>,
}

impl LineItem {
    /// `line_total == round_half_up(quantity * unit_price)` (§3 invariant).
    pub fn compute_line_total(quantity: f64, unit_price: MinorUnits) -> MinorUnits {
        MinorUnits::round_half_up(quantity * unit_price.0 as f64)
    }

    /// `tax_amount == round_half_up(line_total * rate / 100)` when a rate is
    /// present (§3 invariant).
    pub fn compute_tax_amount(line_total: MinorUnits, rate_percent: f64) -> MinorUnits {
        MinorUnits::round_half_up(line_total.0 as f64 * rate_percent / 100.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn invoice_state_machine_matches_4_9() {
        use InvoiceStatus::*;
        assert!(Draft.can_advance_to(PendingSignature));
        assert!(PendingSignature.can_advance_to(Signed));
        assert!(Signed.can_advance_to(SubmittedToDian));
        assert!(SubmittedToDian.can_advance_to(AcceptedByDian));
        assert!(SubmittedToDian.can_advance_to(RejectedByDian));
        assert!(Draft.can_advance_to(Cancelled));
        assert!(Signed.can_advance_to(Cancelled));
        assert!(!SubmittedToDian.can_advance_to(Cancelled));
        assert!(!Draft.can_advance_to(Signed));
        assert!(!AcceptedByDian.can_advance_to(SubmittedToDian));
    }

    #[test]
    fn document_number_has_no_separator() {
        assert_eq!(
            Invoice {
                prefix: Some("SETT".to_string()),
                number: 1,
                ..sample()
            }
            .document_number(),
            "SETT1"
        );
        assert_eq!(
            Invoice {
                prefix: None,
                number: 42,
                ..sample()
            }
            .document_number(),
            "42"
        );
    }

    #[test]
    fn line_item_totals_round_half_up() {
        let total = LineItem::compute_line_total(2.0, MinorUnits(150));
        assert_eq!(total, MinorUnits(300));
        let tax = LineItem::compute_tax_amount(total, 19.0);
        assert_eq!(tax, MinorUnits::round_half_up(300.0 * 19.0 / 100.0));
    }

    fn sample() -> Invoice {
        Invoice {
            id: InvoiceId::new_v4(),
            document_type: DocumentType::SalesInvoice,
            issuer_id: IssuerId::new_v4(),
            customer_id: CustomerId::new_v4(),
            environment_id: EnvironmentId::new_v4(),
            prefix: None,
            number: 0,
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            due_date: None,
            currency: Currency(Currency::COP.to_string()),
            subtotal: MinorUnits::ZERO,
            tax_amount: MinorUnits::ZERO,
            total: MinorUnits::ZERO,
            fingerprint: String::new(),
            status: InvoiceStatus::Draft,
            ubl_blob: None,
            signed_xml_blob: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            creator_key_id: None,
        }
    }
}
