//! ZIP packaging for DIAN transport (§4.7): a single deflate-compressed
//! entry, base64-encoded for embedding in the SOAP request body, plus the
//! inverse operation DIAN's `GetStatusZip` response needs.

pub mod error;
pub mod filenames;

use std::io::{Cursor, Read, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Datelike, Timelike, Utc};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub use error::ZipFailure;
pub use filenames::{archive_filename, inner_xml_filename};

/// Package `xml` as the sole entry `inner_filename` in a deflate-compressed
/// ZIP, stamped with `mtime`, then base64-encode the archive bytes
/// (standard alphabet, padded) for SOAP transport.
pub fn package_to_zip_base64(
    xml: &str,
    inner_filename: &str,
    mtime: DateTime<Utc>,
) -> Result<String, ZipFailure> {
    let mut buffer = Vec::new();
    {
        let cursor = Cursor::new(&mut buffer);
        let mut writer = ZipWriter::new(cursor);
        let options: FileOptions = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(to_zip_datetime(mtime));

        writer.start_file(inner_filename, options)?;
        writer.write_all(xml.as_bytes())?;
        writer.finish()?;
    }
    Ok(BASE64.encode(buffer))
}

/// Inverse of [`package_to_zip_base64`]'s transport half: decode `base64_zip`
/// and return the contents of the first entry whose filename ends in `.xml`
/// (case-insensitive) — used to peel DIAN's `ApplicationResponse` payload out
/// of a `GetStatusZip` reply.
pub fn extract_xml_from_zip(base64_zip: &str) -> Result<String, ZipFailure> {
    let bytes = BASE64.decode(base64_zip.trim())?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.name().to_ascii_lowercase().ends_with(".xml") {
            let mut contents = String::new();
            entry.read_to_string(&mut contents)?;
            return Ok(contents);
        }
    }
    Err(ZipFailure::NoXmlEntry)
}

/// DOS time format only represents 1980–2107 with two-second resolution;
/// anything outside that range (which should never happen for a
/// process-generated "now" timestamp) falls back to the format's epoch
/// rather than failing the whole packaging step over a cosmetic field.
fn to_zip_datetime(mtime: DateTime<Utc>) -> zip::DateTime {
    zip::DateTime::from_date_and_time(
        mtime.year().clamp(1980, 2107) as u16,
        mtime.month() as u8,
        mtime.day() as u8,
        mtime.hour() as u8,
        mtime.minute() as u8,
        mtime.second() as u8,
    )
    .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zip_round_trip_recovers_original_xml() {
        let xml = "<Invoice><cbc:ID>SETT1</cbc:ID></Invoice>";
        let packaged = package_to_zip_base64(xml, "face_fSETT1.xml", Utc::now()).unwrap();
        let recovered = extract_xml_from_zip(&packaged).unwrap();
        assert_eq!(recovered, xml);
    }

    #[test]
    fn round_trip_holds_for_non_trivial_xml() {
        let xml = "<Invoice xmlns:cac=\"x\">\n  <cac:InvoiceLine/>\n</Invoice>";
        let packaged = package_to_zip_base64(xml, "face_fABC1.xml", Utc::now()).unwrap();
        assert_eq!(extract_xml_from_zip(&packaged).unwrap(), xml);
    }

    #[test]
    fn output_is_valid_base64() {
        let packaged = package_to_zip_base64("<a/>", "face_f1.xml", Utc::now()).unwrap();
        assert!(BASE64.decode(&packaged).is_ok());
    }

    #[test]
    fn extract_fails_on_archive_with_no_xml_entry() {
        let mut buffer = Vec::new();
        {
            let cursor = Cursor::new(&mut buffer);
            let mut writer = ZipWriter::new(cursor);
            writer
                .start_file("readme.txt", FileOptions::default())
                .unwrap();
            writer.write_all(b"not xml").unwrap();
            writer.finish().unwrap();
        }
        let encoded = BASE64.encode(buffer);
        let err = extract_xml_from_zip(&encoded).unwrap_err();
        assert!(matches!(err, ZipFailure::NoXmlEntry));
    }

    #[test]
    fn extract_finds_xml_entry_case_insensitively() {
        let mut buffer = Vec::new();
        {
            let cursor = Cursor::new(&mut buffer);
            let mut writer = ZipWriter::new(cursor);
            writer
                .start_file("RESPONSE.XML", FileOptions::default())
                .unwrap();
            writer.write_all(b"<ApplicationResponse/>").unwrap();
            writer.finish().unwrap();
        }
        let encoded = BASE64.encode(buffer);
        assert_eq!(
            extract_xml_from_zip(&encoded).unwrap(),
            "<ApplicationResponse/>"
        );
    }
}
