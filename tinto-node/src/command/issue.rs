//! `tinto-node issue REQUEST_FILE`: read a request file describing an
//! issuer, a customer, and a set of line items, build and submit the
//! invoice, and print the resulting submission.

use anyhow::Context as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tinto_common::{
    Currency, Customer, CustomerId, DocumentType, Issuer, IssuerId, LineItem, MinorUnits,
};
use tinto_crypto::rng::SysRng;
use tinto_store::Store as _;

use crate::cli::IssueCommand;
use crate::context::{self, AppContext};

// `run` is the entry point `cli::Args::run` dispatches to; `run_with_request`
// takes the request path directly so tests can call it without a real
// `IssueCommand`.

/// The on-disk shape an `issue` request file must have. Kept deliberately
/// flat: this CLI is a provisioning tool, not the REST intake layer §1
/// scopes out, so it asks for everything up front rather than looking
/// anything up by id.
#[derive(Deserialize)]
struct IssueRequest {
    document_type: String,
    prefix: Option<String>,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    currency: String,
    issuer: IssuerRequest,
    customer: PartyRequest,
    line_items: Vec<LineItemRequest>,
}

#[derive(Deserialize)]
struct IssuerRequest {
    #[serde(flatten)]
    party: PartyRequest,
    private_key_pkcs8_pem: String,
    certificate_der_b64: String,
}

#[derive(Deserialize)]
struct PartyRequest {
    id_type: String,
    id_number: String,
    legal_name: String,
    address_line: Option<String>,
    locality: Option<String>,
    contact_email: Option<String>,
}

#[derive(Deserialize)]
struct LineItemRequest {
    description: String,
    quantity: f64,
    unit_price_minor: i64,
    tax_rate_percent: Option<f64>,
}

fn parse_document_type(raw: &str) -> anyhow::Result<DocumentType> {
    match raw {
        "sales_invoice" => Ok(DocumentType::SalesInvoice),
        "credit_note" => Ok(DocumentType::CreditNote),
        "debit_note" => Ok(DocumentType::DebitNote),
        other => anyhow::bail!("unrecognized document_type '{other}'"),
    }
}

fn parse_id_type(raw: &str) -> anyhow::Result<tinto_common::IdType> {
    use tinto_common::IdType::*;
    match raw {
        "nit" => Ok(Nit),
        "cc" => Ok(Cc),
        "ce" => Ok(Ce),
        "passport" => Ok(Passport),
        "foreign_doc" => Ok(ForeignDoc),
        "foreign_nit" => Ok(ForeignNit),
        other => anyhow::bail!("unrecognized id_type '{other}'"),
    }
}

impl PartyRequest {
    fn into_customer(self, id: CustomerId, id_type: tinto_common::IdType) -> Customer {
        Customer {
            id,
            id_type,
            id_number: self.id_number,
            legal_name: self.legal_name,
            address_line: self.address_line,
            locality: self.locality,
            contact_email: self.contact_email,
        }
    }
}

pub async fn run(ctx: &AppContext, args: &IssueCommand) -> anyhow::Result<()> {
    run_with_request(ctx, &args.request_file, Utc::now()).await
}

async fn run_with_request(
    ctx: &AppContext,
    request_file: &str,
    now: chrono::DateTime<Utc>,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(request_file)
        .with_context(|| format!("failed to read request file '{request_file}'"))?;
    let request: IssueRequest =
        serde_json::from_str(&raw).context("failed to parse issue request")?;

    let document_type = parse_document_type(&request.document_type)?;
    let currency = Currency::parse(&request.currency)?;

    let issuer_id_type = parse_id_type(&request.issuer.party.id_type)?;
    let issuer_id = IssuerId::new_v4();
    let mut rng = SysRng::new();
    let certificate_der = BASE64
        .decode(request.issuer.certificate_der_b64.as_bytes())
        .context("malformed certificate_der_b64")?;
    let certificate_blob = context::encrypt_issuer_keystore(
        ctx,
        issuer_id,
        &request.issuer.private_key_pkcs8_pem,
        &certificate_der,
        &mut rng,
    );

    let issuer_party = request.issuer.party;
    let issuer = Issuer {
        id: issuer_id,
        id_type: issuer_id_type,
        id_number: issuer_party.id_number,
        legal_name: issuer_party.legal_name,
        address_line: issuer_party.address_line,
        locality: issuer_party.locality,
        contact_email: issuer_party.contact_email,
        certificate_blob,
        certificate_expires_at: now + chrono::Duration::days(365),
    };

    let customer_id_type = parse_id_type(&request.customer.id_type)?;
    let customer = request
        .customer
        .into_customer(CustomerId::new_v4(), customer_id_type);

    let number = ctx
        .store
        .next_sequence(issuer.id, request.prefix.as_deref())
        .await
        .context("failed to allocate invoice number")?;

    let invoice_id = tinto_common::InvoiceId::new_v4();
    let line_items: Vec<LineItem> = request
        .line_items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let unit_price = MinorUnits(item.unit_price_minor);
            let line_total = LineItem::compute_line_total(item.quantity, unit_price);
            let tax_amount = item
                .tax_rate_percent
                .map(|rate| LineItem::compute_tax_amount(line_total, rate));
            LineItem {
                invoice_id,
                line_number: (index + 1) as u32,
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price,
                line_total,
                tax_rate_percent: item.tax_rate_percent,
                tax_amount,
            }
        })
        .collect();

    let subtotal: MinorUnits = line_items.iter().map(|item| item.line_total).sum();
    let tax_amount: MinorUnits = line_items
        .iter()
        .filter_map(|item| item.tax_amount)
        .sum();
    let total = subtotal + tax_amount;

    let invoice = tinto_common::Invoice {
        id: invoice_id,
        document_type,
        issuer_id: issuer.id,
        customer_id: customer.id,
        environment_id: ctx.environment_id,
        prefix: request.prefix.clone(),
        number,
        issue_date: request.issue_date,
        due_date: request.due_date,
        currency,
        subtotal,
        tax_amount,
        total,
        fingerprint: String::new(),
        status: tinto_common::InvoiceStatus::Draft,
        ubl_blob: None,
        signed_xml_blob: None,
        created_at: now,
        updated_at: now,
        creator_key_id: None,
    };

    anyhow::ensure!(invoice.due_date_is_valid(), "due_date must be after issue_date");

    ctx.store.upsert_invoice(invoice.clone()).await?;
    for item in &line_items {
        ctx.store.insert_line_item(item.clone()).await?;
    }
    ctx.store
        .insert_audit_event(tinto_common::AuditEvent::new(
            tinto_common::AuditEventKind::InvoiceCreated,
            Some(invoice.id),
            None,
            None,
            format!("invoice {} created via issue command", invoice.document_number()),
            now,
        ))
        .await?;

    let issuer_credential = context::resolve_issuer_credential(ctx, &issuer)?;

    let submission = tinto_orchestrator::submit(
        &ctx.orchestrator,
        &issuer_credential,
        invoice,
        &line_items,
        &issuer,
        &customer,
        ctx.is_production(),
        &mut rng,
        now,
    )
    .await
    .context("submission failed")?;

    println!("submission {} status {:?}", submission.id, submission.status);
    if let Some(track_id) = &submission.track_id {
        println!("track id: {track_id}");
    }
    if let Some(message) = &submission.dian_error_message {
        println!("dian error: {message}");
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_unknown_document_type() {
        let err = parse_document_type("something_else").unwrap_err();
        assert!(err.to_string().contains("something_else"));
    }

    #[test]
    fn rejects_unknown_id_type() {
        let err = parse_id_type("bogus").unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }
}
