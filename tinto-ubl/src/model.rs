//! Input to the UBL builder: everything needed to produce §4.5's child
//! order, already resolved from the domain model — this crate has no
//! knowledge of `Invoice`/`LineItem` beyond what's passed in here.

use chrono::{NaiveDate, NaiveTime};

use crate::namespaces;

/// Which of the three DIAN document shapes this build targets. Identical
/// pipeline end to end (§4.5 Non-goals) — only the root element name, its
/// namespace, and the per-line element names differ.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DocumentKind {
    Invoice,
    CreditNote,
    DebitNote,
}

impl DocumentKind {
    pub fn root_element_name(self) -> &'static str {
        match self {
            Self::Invoice => "Invoice",
            Self::CreditNote => "CreditNote",
            Self::DebitNote => "DebitNote",
        }
    }

    pub fn root_namespace(self) -> &'static str {
        match self {
            Self::Invoice => namespaces::INVOICE_ROOT,
            Self::CreditNote => namespaces::CREDIT_NOTE_ROOT,
            Self::DebitNote => namespaces::DEBIT_NOTE_ROOT,
        }
    }

    pub fn line_element_name(self) -> &'static str {
        match self {
            Self::Invoice => "cac:InvoiceLine",
            Self::CreditNote => "cac:CreditNoteLine",
            Self::DebitNote => "cac:DebitNoteLine",
        }
    }

    pub fn quantity_element_name(self) -> &'static str {
        match self {
            Self::Invoice => "cbc:InvoicedQuantity",
            Self::CreditNote => "cbc:CreditedQuantity",
            Self::DebitNote => "cbc:DebitedQuantity",
        }
    }
}

/// Software identity DIAN requires in the `sts:DianExtensions` block
/// (§4.5 item 1b), sourced from configuration.
#[derive(Clone, Debug)]
pub struct SoftwareIdentity {
    pub software_provider_id: String,
    pub software_id: String,
}

#[derive(Clone, Debug)]
pub struct UblParty {
    pub id_scheme: &'static str,
    pub id_number: String,
    pub legal_name: String,
    pub address_line: Option<String>,
    pub locality: Option<String>,
}

#[derive(Clone, Debug)]
pub struct UblTaxSubtotal {
    pub taxable_amount_minor: i64,
    pub tax_amount_minor: i64,
    pub percent: f64,
    pub scheme_id: &'static str,
    pub scheme_name: &'static str,
}

#[derive(Clone, Debug)]
pub struct UblTaxTotal {
    pub tax_amount_minor: i64,
    pub subtotals: Vec<UblTaxSubtotal>,
}

#[derive(Clone, Debug)]
pub struct UblMonetaryTotal {
    pub line_extension_amount_minor: i64,
    pub tax_exclusive_amount_minor: i64,
    pub tax_inclusive_amount_minor: i64,
    pub payable_amount_minor: i64,
}

#[derive(Clone, Debug)]
pub struct UblLineItem {
    /// 1-based, matches §3's `LineItem::line_number`.
    pub line_number: u32,
    pub description: String,
    pub quantity: f64,
    pub line_extension_amount_minor: i64,
    /// `cac:StandardItemIdentification/cbc:ID`; defaults to `"999"` when
    /// unspecified (§4.5 item 16).
    pub item_id: Option<String>,
    pub price_amount_minor: i64,
}

#[derive(Clone, Debug)]
pub struct UblBuildInput {
    pub document_kind: DocumentKind,
    pub software: SoftwareIdentity,
    /// `{prefix}{number}`, no separator (§4.5 item 3).
    pub document_number: String,
    /// CUFE/CUDE, 96 hex chars.
    pub fingerprint: String,
    pub issue_date: NaiveDate,
    pub issue_time: NaiveTime,
    pub due_date: Option<NaiveDate>,
    /// DIAN document type code, e.g. `"01"` sales invoice (§4.5 item 8).
    pub invoice_type_code: &'static str,
    pub currency: String,
    pub supplier: UblParty,
    pub customer: UblParty,
    pub tax_total: UblTaxTotal,
    pub monetary_total: UblMonetaryTotal,
    pub line_items: Vec<UblLineItem>,
}
