//! SOAP 1.2 envelope assembly and response parsing for DIAN's two
//! operations (§4.8).
//!
//! Built with the same `quick-xml` writer style `tinto-ubl` uses for UBL —
//! explicit element-by-element writes, since the envelope shape here is
//! small and fixed and a generic SOAP framework crate doesn't exist in the
//! teacher's stack.

use std::io::Cursor;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::wsse::UsernameToken;

pub const SOAP_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
pub const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
pub const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
/// The operation namespace DIAN's `WcfDianCustomerServices.svc` WSDL binds
/// `SendBillAsync`/`GetStatusZip` under.
pub const DIAN_NS: &str = "http://wcf.dian.colombia/ws";

fn write_security_header(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    token: &UsernameToken,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new("soap:Header")))?;

    let mut security = BytesStart::new("wsse:Security");
    security.push_attribute(("xmlns:wsse", WSSE_NS));
    security.push_attribute(("soap:mustUnderstand", "1"));
    writer.write_event(Event::Start(security))?;

    writer.write_event(Event::Start(BytesStart::new("wsse:UsernameToken")))?;
    write_text(writer, "wsse:Username", &token.username)?;

    let mut password = BytesStart::new("wsse:Password");
    password.push_attribute((
        "Type",
        "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest",
    ));
    writer.write_event(Event::Start(password))?;
    writer.write_event(Event::Text(BytesText::new(&token.password_digest_hex)))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "wsse:Password",
    )))?;

    let mut nonce = BytesStart::new("wsse:Nonce");
    nonce.push_attribute((
        "EncodingType",
        "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary",
    ));
    writer.write_event(Event::Start(nonce))?;
    writer.write_event(Event::Text(BytesText::new(&token.nonce_b64)))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "wsse:Nonce",
    )))?;

    {
        let mut created = BytesStart::new("wsu:Created");
        created.push_attribute(("xmlns:wsu", WSU_NS));
        writer.write_event(Event::Start(created))?;
        writer.write_event(Event::Text(BytesText::new(&token.created_iso8601())))?;
        writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
            "wsu:Created",
        )))?;
    }

    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "wsse:UsernameToken",
    )))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "wsse:Security",
    )))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "soap:Header",
    )))?;
    Ok(())
}

fn write_text(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(name)))?;
    Ok(())
}

fn envelope_root() -> BytesStart<'static> {
    let mut root = BytesStart::new("soap:Envelope");
    root.push_attribute(("xmlns:soap", SOAP_NS));
    root.push_attribute(("xmlns:wcf", DIAN_NS));
    root
}

/// Build the `SendBillAsync(fileName, contentFile)` request envelope.
pub fn build_send_bill_request(
    filename: &str,
    zip_base64: &str,
    token: &UsernameToken,
) -> Result<String, quick_xml::Error> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Start(envelope_root()))?;
    write_security_header(&mut writer, token)?;

    writer.write_event(Event::Start(BytesStart::new("soap:Body")))?;
    writer.write_event(Event::Start(BytesStart::new("wcf:SendBillAsync")))?;
    write_text(&mut writer, "wcf:fileName", filename)?;
    write_text(&mut writer, "wcf:contentFile", zip_base64)?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "wcf:SendBillAsync",
    )))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new("soap:Body")))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "soap:Envelope",
    )))?;

    Ok(String::from_utf8(writer.into_inner().into_inner()).expect("writer only emits utf-8"))
}

/// Build the `GetStatusZip(trackId)` request envelope.
pub fn build_get_status_request(
    track_id: &str,
    token: &UsernameToken,
) -> Result<String, quick_xml::Error> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Start(envelope_root()))?;
    write_security_header(&mut writer, token)?;

    writer.write_event(Event::Start(BytesStart::new("soap:Body")))?;
    writer.write_event(Event::Start(BytesStart::new("wcf:GetStatusZip")))?;
    write_text(&mut writer, "wcf:trackId", track_id)?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "wcf:GetStatusZip",
    )))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new("soap:Body")))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "soap:Envelope",
    )))?;

    Ok(String::from_utf8(writer.into_inner().into_inner()).expect("writer only emits utf-8"))
}

/// Find the text content of the first element named `local_name`,
/// regardless of its namespace prefix. Tolerant parsing is enough here: this
/// crate only ever parses its own request envelopes back in tests, or
/// DIAN's fixed, small response shapes.
pub fn find_element_text(xml: &str, local_name: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut capturing = false;
    let mut out = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == local_name.as_bytes() {
                    capturing = true;
                    out.clear();
                }
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == local_name.as_bytes() {
                    return Some(String::new());
                }
            }
            Ok(Event::Text(t)) if capturing => {
                out.push_str(&t.unescape().ok()?.into_owned());
            }
            Ok(Event::End(e)) => {
                if capturing && e.local_name().as_ref() == local_name.as_bytes() {
                    return Some(out);
                }
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

/// Whether `xml` contains a SOAP `Fault` element, regardless of namespace
/// prefix.
pub fn is_soap_fault(xml: &str) -> bool {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"Fault" => return true,
            Ok(Event::Eof) | Err(_) => return false,
            _ => {}
        }
        buf.clear();
    }
}
