//! Deterministic filename conventions for DIAN transport (§4.7).

/// The archive filename DIAN itself sees:
/// `z{nit_digits}{doc_code}{year}{seq}.zip`, where `nit_digits` is the
/// issuer tax id stripped to digits only, `doc_code` is DIAN's two-digit
/// document type code ("01" invoice, "91" credit note, "92" debit note),
/// `year` renders as four digits, and `seq` is left-padded with `0` to ten
/// digits.
pub fn archive_filename(issuer_tax_id: &str, doc_code: &str, year: i32, sequence: i64) -> String {
    let nit_digits: String = issuer_tax_id.chars().filter(char::is_ascii_digit).collect();
    format!("z{nit_digits}{doc_code}{year:04}{sequence:010}.zip")
}

/// The inner XML entry name: `face_f{prefix}{number}.xml`, where
/// `document_number` is already the `{prefix}{number}` concatenation used
/// throughout (§4.5 item 3, §4.4 field 1).
pub fn inner_xml_filename(document_number: &str) -> String {
    format!("face_f{document_number}.xml")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn archive_filename_strips_non_digits_from_nit() {
        let name = archive_filename("900.123.456-7", "01", 2026, 1);
        assert!(name.starts_with("z9001234567011"));
    }

    #[test]
    fn archive_filename_pads_sequence_to_ten_digits() {
        let name = archive_filename("900123456", "01", 2026, 1);
        assert_eq!(name, "z9001234560120260000000001.zip");
    }

    #[test]
    fn inner_xml_filename_has_no_separator_before_document_number() {
        assert_eq!(inner_xml_filename("SETT1"), "face_fSETT1.xml");
    }
}
