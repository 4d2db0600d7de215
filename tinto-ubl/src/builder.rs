//! The UBL 2.1 document builder (§4.5).

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tinto_common::money::MinorUnits;

use crate::error::UblError;
use crate::model::UblBuildInput;
use crate::namespaces;

fn fmt_minor(value: i64) -> String {
    MinorUnits(value).format_dian()
}

/// Build the full UBL 2.1 document for `input`, following the exact child
/// order of §4.5. `input.document_kind` selects the root element, its
/// namespace, and the per-line element names; sales invoice, credit note,
/// and debit note otherwise share this one pipeline (§4.5 Non-goals).
///
/// The first child of the root is always `ext:UBLExtensions` with a
/// reserved, empty `ext:ExtensionContent` slot (§4.5 item 1a) — the XAdES
/// signer (`tinto-xmlsign`) locates this slot and fills it in later. This
/// function never touches signing.
pub fn build_invoice_xml(input: &UblBuildInput) -> Result<String, UblError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let root_name = input.document_kind.root_element_name();
    let mut root = BytesStart::new(root_name);
    root.push_attribute(("xmlns", input.document_kind.root_namespace()));
    root.push_attribute(("xmlns:cac", namespaces::CAC));
    root.push_attribute(("xmlns:cbc", namespaces::CBC));
    root.push_attribute(("xmlns:ext", namespaces::EXT));
    root.push_attribute(("xmlns:sts", namespaces::STS));
    root.push_attribute(("xmlns:xsi", namespaces::XSI));
    writer.write_event(Event::Start(root))?;

    write_ubl_extensions(&mut writer, input)?;

    write_text_element(&mut writer, "cbc:UBLVersionID", "UBL 2.1")?;
    write_text_element(&mut writer, "cbc:CustomizationID", "10")?;
    write_text_element(&mut writer, "cbc:ProfileID", "DIAN 2.1")?;
    write_text_element(&mut writer, "cbc:ProfileExecutionID", "1")?;
    write_text_element(&mut writer, "cbc:ID", &input.document_number)?;

    {
        let mut uuid_start = BytesStart::new("cbc:UUID");
        uuid_start.push_attribute(("schemeName", "CUFE-SHA384"));
        writer.write_event(Event::Start(uuid_start))?;
        writer.write_event(Event::Text(BytesText::new(&input.fingerprint)))?;
        writer.write_event(Event::End(quick_xml::events::BytesEnd::new("cbc:UUID")))?;
    }

    write_text_element(
        &mut writer,
        "cbc:IssueDate",
        &input.issue_date.format("%Y-%m-%d").to_string(),
    )?;
    write_text_element(
        &mut writer,
        "cbc:IssueTime",
        &format!("{}-05:00", input.issue_time.format("%H:%M:%S")),
    )?;
    if let Some(due) = input.due_date {
        write_text_element(&mut writer, "cbc:DueDate", &due.format("%Y-%m-%d").to_string())?;
    }
    write_text_element(&mut writer, "cbc:InvoiceTypeCode", input.invoice_type_code)?;
    write_text_element(&mut writer, "cbc:DocumentCurrencyCode", &input.currency)?;
    write_text_element(
        &mut writer,
        "cbc:LineCountNumeric",
        &input.line_items.len().to_string(),
    )?;

    write_supplier_party(&mut writer, input)?;
    write_customer_party(&mut writer, input)?;
    write_payment_means(&mut writer)?;
    write_tax_total(&mut writer, input)?;
    write_monetary_total(&mut writer, input)?;

    for line in &input.line_items {
        write_invoice_line(&mut writer, input, line)?;
    }

    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(root_name)))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

fn write_ubl_extensions(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    input: &UblBuildInput,
) -> Result<(), UblError> {
    writer.write_event(Event::Start(BytesStart::new("ext:UBLExtensions")))?;

    // Reserved slot for the signer (§4.5 item 1a / §4.6).
    writer.write_event(Event::Start(BytesStart::new("ext:UBLExtension")))?;
    writer.write_event(Event::Empty(BytesStart::new("ext:ExtensionContent")))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "ext:UBLExtension",
    )))?;

    // DIAN software identity extension (§4.5 item 1b).
    writer.write_event(Event::Start(BytesStart::new("ext:UBLExtension")))?;
    writer.write_event(Event::Start(BytesStart::new("ext:ExtensionContent")))?;
    writer.write_event(Event::Start(BytesStart::new("sts:DianExtensions")))?;
    write_text_element(writer, "sts:SoftwareProviderID", &input.software.software_provider_id)?;
    write_text_element(writer, "sts:SoftwareID", &input.software.software_id)?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "sts:DianExtensions",
    )))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "ext:ExtensionContent",
    )))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "ext:UBLExtension",
    )))?;

    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "ext:UBLExtensions",
    )))?;
    Ok(())
}

fn write_supplier_party(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    input: &UblBuildInput,
) -> Result<(), UblError> {
    writer.write_event(Event::Start(BytesStart::new(
        "cac:AccountingSupplierParty",
    )))?;
    writer.write_event(Event::Start(BytesStart::new("cac:Party")))?;

    write_party_identification(writer, &input.supplier)?;

    if let Some(address_line) = &input.supplier.address_line {
        writer.write_event(Event::Start(BytesStart::new("cac:PostalAddress")))?;
        write_text_element(writer, "cbc:StreetName", address_line)?;
        if let Some(locality) = &input.supplier.locality {
            write_text_element(writer, "cbc:CityName", locality)?;
        }
        writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
            "cac:PostalAddress",
        )))?;
    }

    writer.write_event(Event::Start(BytesStart::new("cac:PartyTaxScheme")))?;
    write_text_element(writer, "cbc:RegistrationName", &input.supplier.legal_name)?;
    writer.write_event(Event::Start(BytesStart::new("cac:TaxScheme")))?;
    write_text_element(writer, "cbc:ID", "01")?;
    write_text_element(writer, "cbc:Name", "IVA")?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:TaxScheme",
    )))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:PartyTaxScheme",
    )))?;

    writer.write_event(Event::Start(BytesStart::new("cac:PartyLegalEntity")))?;
    write_text_element(writer, "cbc:RegistrationName", &input.supplier.legal_name)?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:PartyLegalEntity",
    )))?;

    writer.write_event(Event::End(quick_xml::events::BytesEnd::new("cac:Party")))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:AccountingSupplierParty",
    )))?;
    Ok(())
}

fn write_customer_party(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    input: &UblBuildInput,
) -> Result<(), UblError> {
    writer.write_event(Event::Start(BytesStart::new(
        "cac:AccountingCustomerParty",
    )))?;
    writer.write_event(Event::Start(BytesStart::new("cac:Party")))?;

    write_party_identification(writer, &input.customer)?;

    writer.write_event(Event::Start(BytesStart::new("cac:PartyTaxScheme")))?;
    write_text_element(writer, "cbc:RegistrationName", &input.customer.legal_name)?;
    writer.write_event(Event::Start(BytesStart::new("cac:TaxScheme")))?;
    write_text_element(writer, "cbc:ID", "01")?;
    write_text_element(writer, "cbc:Name", "IVA")?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:TaxScheme",
    )))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:PartyTaxScheme",
    )))?;

    writer.write_event(Event::Start(BytesStart::new("cac:PartyLegalEntity")))?;
    write_text_element(writer, "cbc:RegistrationName", &input.customer.legal_name)?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:PartyLegalEntity",
    )))?;

    writer.write_event(Event::End(quick_xml::events::BytesEnd::new("cac:Party")))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:AccountingCustomerParty",
    )))?;
    Ok(())
}

fn write_party_identification(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    party: &crate::model::UblParty,
) -> Result<(), UblError> {
    writer.write_event(Event::Start(BytesStart::new(
        "cac:PartyIdentification",
    )))?;
    {
        let mut id = BytesStart::new("cbc:ID");
        id.push_attribute(("schemeID", party.id_scheme));
        writer.write_event(Event::Start(id))?;
        writer.write_event(Event::Text(BytesText::new(&party.id_number)))?;
        writer.write_event(Event::End(quick_xml::events::BytesEnd::new("cbc:ID")))?;
    }
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:PartyIdentification",
    )))?;

    writer.write_event(Event::Start(BytesStart::new("cac:PartyName")))?;
    write_text_element(writer, "cbc:Name", &party.legal_name)?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:PartyName",
    )))?;
    Ok(())
}

fn write_payment_means(writer: &mut Writer<Cursor<Vec<u8>>>) -> Result<(), UblError> {
    writer.write_event(Event::Start(BytesStart::new("cac:PaymentMeans")))?;
    write_text_element(writer, "cbc:ID", "1")?;
    write_text_element(writer, "cbc:PaymentMeansCode", "10")?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:PaymentMeans",
    )))?;
    Ok(())
}

fn write_tax_total(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    input: &UblBuildInput,
) -> Result<(), UblError> {
    writer.write_event(Event::Start(BytesStart::new("cac:TaxTotal")))?;
    write_amount_element(
        writer,
        "cbc:TaxAmount",
        input.tax_total.tax_amount_minor,
        &input.currency,
    )?;

    for subtotal in &input.tax_total.subtotals {
        writer.write_event(Event::Start(BytesStart::new("cac:TaxSubtotal")))?;
        write_amount_element(
            writer,
            "cbc:TaxableAmount",
            subtotal.taxable_amount_minor,
            &input.currency,
        )?;
        write_amount_element(
            writer,
            "cbc:TaxAmount",
            subtotal.tax_amount_minor,
            &input.currency,
        )?;
        writer.write_event(Event::Start(BytesStart::new("cac:TaxCategory")))?;
        write_text_element(writer, "cbc:Percent", &format!("{:.2}", subtotal.percent))?;
        writer.write_event(Event::Start(BytesStart::new("cac:TaxScheme")))?;
        write_text_element(writer, "cbc:ID", subtotal.scheme_id)?;
        write_text_element(writer, "cbc:Name", subtotal.scheme_name)?;
        writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
            "cac:TaxScheme",
        )))?;
        writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
            "cac:TaxCategory",
        )))?;
        writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
            "cac:TaxSubtotal",
        )))?;
    }

    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:TaxTotal",
    )))?;
    Ok(())
}

fn write_monetary_total(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    input: &UblBuildInput,
) -> Result<(), UblError> {
    writer.write_event(Event::Start(BytesStart::new("cac:LegalMonetaryTotal")))?;
    write_amount_element(
        writer,
        "cbc:LineExtensionAmount",
        input.monetary_total.line_extension_amount_minor,
        &input.currency,
    )?;
    write_amount_element(
        writer,
        "cbc:TaxExclusiveAmount",
        input.monetary_total.tax_exclusive_amount_minor,
        &input.currency,
    )?;
    write_amount_element(
        writer,
        "cbc:TaxInclusiveAmount",
        input.monetary_total.tax_inclusive_amount_minor,
        &input.currency,
    )?;
    write_amount_element(
        writer,
        "cbc:PayableAmount",
        input.monetary_total.payable_amount_minor,
        &input.currency,
    )?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:LegalMonetaryTotal",
    )))?;
    Ok(())
}

fn write_invoice_line(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    input: &UblBuildInput,
    line: &crate::model::UblLineItem,
) -> Result<(), UblError> {
    let line_element = input.document_kind.line_element_name();
    let quantity_element = input.document_kind.quantity_element_name();

    writer.write_event(Event::Start(BytesStart::new(line_element)))?;
    write_text_element(writer, "cbc:ID", &line.line_number.to_string())?;

    {
        let mut qty = BytesStart::new(quantity_element);
        qty.push_attribute(("unitCode", "EA"));
        writer.write_event(Event::Start(qty))?;
        writer.write_event(Event::Text(BytesText::new(&line.quantity.to_string())))?;
        writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
            quantity_element,
        )))?;
    }

    write_amount_element(
        writer,
        "cbc:LineExtensionAmount",
        line.line_extension_amount_minor,
        &input.currency,
    )?;

    writer.write_event(Event::Start(BytesStart::new("cac:Item")))?;
    write_text_element(writer, "cbc:Description", &line.description)?;
    writer.write_event(Event::Start(BytesStart::new(
        "cac:StandardItemIdentification",
    )))?;
    write_text_element(writer, "cbc:ID", line.item_id.as_deref().unwrap_or("999"))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        "cac:StandardItemIdentification",
    )))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new("cac:Item")))?;

    writer.write_event(Event::Start(BytesStart::new("cac:Price")))?;
    write_amount_element(
        writer,
        "cbc:PriceAmount",
        line.price_amount_minor,
        &input.currency,
    )?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new("cac:Price")))?;

    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
        line_element,
    )))?;
    Ok(())
}

fn write_amount_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    minor_units: i64,
    currency: &str,
) -> Result<(), UblError> {
    let mut start = BytesStart::new(name);
    start.push_attribute(("currencyID", currency));
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(&fmt_minor(minor_units))))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(name)))?;
    Ok(())
}

fn write_text_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    text: &str,
) -> Result<(), UblError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(name)))?;
    Ok(())
}
