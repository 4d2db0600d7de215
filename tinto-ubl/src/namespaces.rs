//! DIAN's required UBL 2.1 namespace bindings, bound at the root `Invoice`
//! element (§4.5).

pub const INVOICE_ROOT: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
pub const CREDIT_NOTE_ROOT: &str = "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2";
pub const DEBIT_NOTE_ROOT: &str = "urn:oasis:names:specification:ubl:schema:xsd:DebitNote-2";

pub const CAC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
pub const EXT: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonExtensionComponents-2";
pub const STS: &str = "dian:gov:co:facturaelectronica:Structures-2-1";
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
