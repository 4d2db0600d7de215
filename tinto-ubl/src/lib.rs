//! UBL 2.1 invoice document construction (§4.5).

pub mod builder;
pub mod error;
pub mod model;
pub mod namespaces;

pub use builder::build_invoice_xml;
pub use error::UblError;
pub use model::{
    DocumentKind, SoftwareIdentity, UblBuildInput, UblLineItem, UblMonetaryTotal, UblParty,
    UblTaxSubtotal, UblTaxTotal,
};

#[cfg(test)]
mod test {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    fn sample_input(line_count: usize) -> UblBuildInput {
        let line_items = (1..=line_count)
            .map(|n| UblLineItem {
                line_number: n as u32,
                description: format!("Item {n}"),
                quantity: 1.0,
                line_extension_amount_minor: 100_000_00,
                item_id: None,
                price_amount_minor: 100_000_00,
            })
            .collect();

        UblBuildInput {
            document_kind: DocumentKind::Invoice,
            software: SoftwareIdentity {
                software_provider_id: "900123456".to_string(),
                software_id: "abcdefg-1234".to_string(),
            },
            document_number: "SETT1".to_string(),
            fingerprint: "a".repeat(96),
            issue_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            issue_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            due_date: None,
            invoice_type_code: "01",
            currency: "COP".to_string(),
            supplier: UblParty {
                id_scheme: "31",
                id_number: "900123456".to_string(),
                legal_name: "Acme SAS".to_string(),
                address_line: None,
                locality: None,
            },
            customer: UblParty {
                id_scheme: "13",
                id_number: "1234567890".to_string(),
                legal_name: "Jane Doe".to_string(),
                address_line: None,
                locality: None,
            },
            tax_total: UblTaxTotal {
                tax_amount_minor: 19_000_00 * line_count as i64,
                subtotals: vec![UblTaxSubtotal {
                    taxable_amount_minor: 100_000_00 * line_count as i64,
                    tax_amount_minor: 19_000_00 * line_count as i64,
                    percent: 19.0,
                    scheme_id: "01",
                    scheme_name: "IVA",
                }],
            },
            monetary_total: UblMonetaryTotal {
                line_extension_amount_minor: 100_000_00 * line_count as i64,
                tax_exclusive_amount_minor: 100_000_00 * line_count as i64,
                tax_inclusive_amount_minor: 119_000_00 * line_count as i64,
                payable_amount_minor: 119_000_00 * line_count as i64,
            },
            line_items,
        }
    }

    #[test]
    fn emits_exactly_one_invoice_line_per_line_item_in_order() {
        let input = sample_input(3);
        let xml = build_invoice_xml(&input).unwrap();
        let count = xml.matches("<cac:InvoiceLine>").count();
        assert_eq!(count, 3);
        // Lines appear in order 1, 2, 3.
        let pos1 = xml.find("<cbc:ID>1</cbc:ID>").unwrap();
        let pos2 = xml.find("<cbc:ID>2</cbc:ID>").unwrap();
        let pos3 = xml.find("<cbc:ID>3</cbc:ID>").unwrap();
        assert!(pos1 < pos2 && pos2 < pos3);
    }

    #[test]
    fn root_carries_all_required_namespaces() {
        let xml = build_invoice_xml(&sample_input(1)).unwrap();
        assert!(xml.contains(namespaces::INVOICE_ROOT));
        assert!(xml.contains("xmlns:cac="));
        assert!(xml.contains("xmlns:cbc="));
        assert!(xml.contains("xmlns:ext="));
        assert!(xml.contains("xmlns:sts="));
        assert!(xml.contains("xmlns:xsi="));
    }

    #[test]
    fn reserved_extension_content_slot_is_present_and_empty() {
        let xml = build_invoice_xml(&sample_input(1)).unwrap();
        assert!(xml.contains("<ext:ExtensionContent/>") || xml.contains("<ext:ExtensionContent />"));
    }

    #[test]
    fn cufe_embedded_with_scheme_name_attribute() {
        let xml = build_invoice_xml(&sample_input(1)).unwrap();
        assert!(xml.contains(r#"schemeName="CUFE-SHA384""#));
        assert!(xml.contains(&"a".repeat(96)));
    }

    #[test]
    fn monetary_fields_use_two_decimal_dian_formatting() {
        let xml = build_invoice_xml(&sample_input(1)).unwrap();
        assert!(xml.contains("100000.00"));
        assert!(xml.contains("119000.00"));
    }

    #[test]
    fn credit_note_swaps_root_element_namespace_and_line_tags() {
        let mut input = sample_input(1);
        input.document_kind = DocumentKind::CreditNote;
        let xml = build_invoice_xml(&input).unwrap();
        assert!(xml.contains("<CreditNote"));
        assert!(xml.contains(namespaces::CREDIT_NOTE_ROOT));
        assert!(xml.contains("<cac:CreditNoteLine>"));
        assert!(xml.contains("cbc:CreditedQuantity"));
        assert!(xml.contains("</CreditNote>"));
        assert!(!xml.contains("InvoiceLine"));
    }

    #[test]
    fn debit_note_swaps_root_element_namespace_and_line_tags() {
        let mut input = sample_input(1);
        input.document_kind = DocumentKind::DebitNote;
        let xml = build_invoice_xml(&input).unwrap();
        assert!(xml.contains("<DebitNote"));
        assert!(xml.contains(namespaces::DEBIT_NOTE_ROOT));
        assert!(xml.contains("<cac:DebitNoteLine>"));
        assert!(xml.contains("cbc:DebitedQuantity"));
        assert!(xml.contains("</DebitNote>"));
    }
}
