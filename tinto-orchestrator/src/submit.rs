//! `submit(invoice)`, §4.9's nine-step algorithm.

use chrono::{DateTime, Datelike, NaiveTime, Utc};
use tinto_common::{
    Currency, Customer, Invoice, InvoiceStatus, Issuer, LineItem, Submission, SubmissionStatus,
};
use tinto_crypto::rng::Crng;
use tinto_cufe::{FingerprintInput, TaxKind, TaxLine};
use tinto_store::SubmissionUpdate;
use tinto_ubl::{
    DocumentKind, SoftwareIdentity, UblBuildInput, UblMonetaryTotal, UblParty, UblTaxSubtotal,
    UblTaxTotal,
};

use crate::context::{IssuerCredential, OrchestratorContext};
use crate::error::OrchestratorFailure;

fn document_kind(document_type: tinto_common::DocumentType) -> DocumentKind {
    use tinto_common::DocumentType::*;
    match document_type {
        SalesInvoice => DocumentKind::Invoice,
        CreditNote => DocumentKind::CreditNote,
        DebitNote => DocumentKind::DebitNote,
    }
}

fn ubl_party(id_type: tinto_common::IdType, id_number: &str, legal_name: &str, address_line: &Option<String>, locality: &Option<String>) -> UblParty {
    UblParty {
        id_scheme: id_type.dian_scheme_code(),
        id_number: id_number.to_string(),
        legal_name: legal_name.to_string(),
        address_line: address_line.clone(),
        locality: locality.clone(),
    }
}

/// All the line-item tax amounts collapsed into a single IVA entry (§4.4):
/// the domain model carries one combined `tax_amount` per line rather than a
/// per-kind breakdown, so CUFE/UBL tax totals treat the invoice's aggregate
/// tax as IVA — the overwhelmingly common case for DIAN invoices and the
/// only one the data model can currently express (see DESIGN.md).
fn aggregate_tax_lines(invoice: &Invoice) -> Vec<TaxLine> {
    if invoice.tax_amount.0 == 0 {
        return Vec::new();
    }
    vec![TaxLine {
        kind: TaxKind::Iva,
        tax_amount: invoice.tax_amount,
        taxable_base: invoice.subtotal,
    }]
}

fn build_fingerprint_input(
    invoice: &Invoice,
    issuer: &Issuer,
    customer: &Customer,
    issuer_credential: &IssuerCredential,
    is_production: bool,
    issue_time: NaiveTime,
) -> FingerprintInput {
    FingerprintInput {
        document_number: invoice.document_number(),
        issue_date: invoice.issue_date,
        issue_time,
        subtotal: invoice.subtotal,
        taxes: aggregate_tax_lines(invoice),
        grand_total: invoice.total,
        issuer_tax_id_digits: issuer.id_number.chars().filter(char::is_ascii_digit).collect(),
        customer_id_type: customer.id_type,
        customer_id_number: customer.id_number.clone(),
        technical_key: issuer_credential.technical_key.clone(),
        is_production,
    }
}

fn build_ubl_input(
    invoice: &Invoice,
    issuer: &Issuer,
    customer: &Customer,
    line_items: &[LineItem],
    software: &SoftwareIdentity,
    issue_time: NaiveTime,
) -> UblBuildInput {
    let tax_lines = aggregate_tax_lines(invoice);
    let subtotals = tax_lines
        .iter()
        .map(|line| UblTaxSubtotal {
            taxable_amount_minor: line.taxable_base.0,
            tax_amount_minor: line.tax_amount.0,
            percent: if line.taxable_base.0 == 0 {
                0.0
            } else {
                (line.tax_amount.0 as f64 / line.taxable_base.0 as f64) * 100.0
            },
            scheme_id: line.kind.dian_code(),
            scheme_name: match line.kind {
                TaxKind::Iva => "IVA",
                TaxKind::Inc => "INC",
                TaxKind::Ica => "ICA",
            },
        })
        .collect();

    UblBuildInput {
        document_kind: document_kind(invoice.document_type),
        software: SoftwareIdentity {
            software_provider_id: software.software_provider_id.clone(),
            software_id: software.software_id.clone(),
        },
        document_number: invoice.document_number(),
        fingerprint: invoice.fingerprint.clone(),
        issue_date: invoice.issue_date,
        issue_time,
        due_date: invoice.due_date,
        invoice_type_code: invoice.document_type.dian_type_code(),
        currency: currency_code(&invoice.currency),
        supplier: ubl_party(
            issuer.id_type,
            &issuer.id_number,
            &issuer.legal_name,
            &issuer.address_line,
            &issuer.locality,
        ),
        customer: ubl_party(
            customer.id_type,
            &customer.id_number,
            &customer.legal_name,
            &customer.address_line,
            &customer.locality,
        ),
        tax_total: UblTaxTotal {
            tax_amount_minor: invoice.tax_amount.0,
            subtotals,
        },
        monetary_total: UblMonetaryTotal {
            line_extension_amount_minor: invoice.subtotal.0,
            tax_exclusive_amount_minor: invoice.subtotal.0,
            tax_inclusive_amount_minor: invoice.total.0,
            payable_amount_minor: invoice.total.0,
        },
        line_items: line_items
            .iter()
            .map(|item| tinto_ubl::UblLineItem {
                line_number: item.line_number,
                description: item.description.clone(),
                quantity: item.quantity,
                line_extension_amount_minor: item.line_total.0,
                item_id: None,
                price_amount_minor: item.unit_price.0,
            })
            .collect(),
    }
}

fn currency_code(currency: &Currency) -> String {
    currency.0.clone()
}

/// `submit(invoice)` per §4.9. `invoice` must currently be `SIGNED` or
/// earlier in the happy path (steps 2–6 advance it to `SIGNED` themselves);
/// `line_items`, `issuer`, `customer` are the already-resolved parent
/// records the REST layer would normally look up. `issuer_credential` is the
/// signing material for `issuer`, resolved once by the caller from its
/// encrypted keystore blob.
#[allow(clippy::too_many_arguments)]
pub async fn submit(
    ctx: &OrchestratorContext,
    issuer_credential: &IssuerCredential,
    mut invoice: Invoice,
    line_items: &[LineItem],
    issuer: &Issuer,
    customer: &Customer,
    is_production: bool,
    rng: &mut impl Crng,
    now: DateTime<Utc>,
) -> Result<Submission, OrchestratorFailure> {
    // Step 1: idempotency — a non-terminal submission already exists.
    if let Some(existing) = ctx.store.latest_submission_for_invoice(invoice.id).await? {
        if !existing.status.is_terminal() {
            return Ok(existing);
        }
    }

    // Step 2: create a fresh PENDING submission.
    let environment_id = invoice.environment_id;
    let mut submission = Submission::new_pending(invoice.id, environment_id, now);
    ctx.store.insert_submission(submission.clone()).await?;

    let issue_time = now.time();

    // Step 3: compute the CUFE/CUDE fingerprint.
    let fingerprint_input =
        build_fingerprint_input(&invoice, issuer, customer, issuer_credential, is_production, issue_time);
    let fingerprint = tinto_cufe::fingerprint(&fingerprint_input);

    // Step 4: build the UBL document; encrypt and persist it.
    let ubl_input = build_ubl_input(&invoice, issuer, customer, line_items, &issuer_credential.software, issue_time);
    let ubl_xml = tinto_ubl::build_invoice_xml(&ubl_input)?;
    let ubl_blob = tinto_common::EncryptedBlob::from_ciphertext(ctx.blob_key.encrypt(
        rng,
        format!("invoice:{}:ubl_blob", invoice.id).as_bytes(),
        ubl_xml.as_bytes(),
    ));

    let advanced = ctx
        .store
        .compare_and_set_invoice_status(
            invoice.id,
            invoice.status,
            InvoiceStatus::PendingSignature,
            None,
            Some(ubl_blob),
            None,
            now,
        )
        .await?;
    if !advanced {
        return Err(OrchestratorFailure::IllegalState(
            "invoice status changed concurrently before signing".to_string(),
        ));
    }
    invoice.status = InvoiceStatus::PendingSignature;

    // Step 5: sign with the issuer's credential.
    let signed_xml = tinto_xmlsign::sign_xml(
        &ubl_xml,
        &issuer_credential.credential.private_key,
        &issuer_credential.credential.certificate_der,
    )?;
    let signed_xml_blob = tinto_common::EncryptedBlob::from_ciphertext(ctx.blob_key.encrypt(
        rng,
        format!("invoice:{}:signed_xml_blob", invoice.id).as_bytes(),
        signed_xml.as_bytes(),
    ));

    let advanced = ctx
        .store
        .compare_and_set_invoice_status(
            invoice.id,
            invoice.status,
            InvoiceStatus::Signed,
            Some(fingerprint.clone()),
            None,
            Some(signed_xml_blob),
            now,
        )
        .await?;
    if !advanced {
        return Err(OrchestratorFailure::IllegalState(
            "invoice status changed concurrently after signing".to_string(),
        ));
    }
    invoice.status = InvoiceStatus::Signed;
    invoice.fingerprint = fingerprint;

    // Step 6: package into a ZIP; encrypt and persist the request blob.
    let archive_filename = tinto_zip::archive_filename(
        &issuer.id_number,
        invoice.document_type.dian_type_code(),
        invoice.issue_date.year(),
        invoice.number,
    );
    let inner_filename = tinto_zip::inner_xml_filename(&invoice.document_number());
    let zip_base64 = tinto_zip::package_to_zip_base64(&signed_xml, &inner_filename, now)?;
    let request_zip_blob = tinto_common::EncryptedBlob::from_ciphertext(ctx.blob_key.encrypt(
        rng,
        format!("submission:{}:request_zip_blob", submission.id).as_bytes(),
        zip_base64.as_bytes(),
    ));

    ctx.store
        .compare_and_set_submission(
            submission.id,
            submission.status,
            submission.status,
            SubmissionUpdate {
                request_zip_blob: Some(request_zip_blob),
                ..Default::default()
            },
            now,
        )
        .await?;

    // Step 7: call SendBillAsync.
    let response = ctx.transport.send_bill_async(&archive_filename, &zip_base64).await;

    // Steps 8–9: `Ok` always carries a track id (§4.8: a response missing
    // one is itself a non-retryable `SoapFailure`); any `Err` — a SOAP
    // fault with a structured error list, an HTTP failure, or a transport
    // error that exhausted its retries — is step 9's "known or uncaught
    // failure", handled uniformly since the submission row already exists.
    match response {
        Ok(async_response) => {
            let track_id = async_response
                .track_id
                .expect("DianTransport::send_bill_async never returns Ok without a track id");
            let advanced = ctx
                .store
                .compare_and_set_submission(
                    submission.id,
                    SubmissionStatus::Pending,
                    SubmissionStatus::Submitted,
                    SubmissionUpdate {
                        track_id: Some(track_id.clone()),
                        submitted_at: Some(now),
                        ..Default::default()
                    },
                    now,
                )
                .await?;
            if !advanced {
                return Err(OrchestratorFailure::IllegalState(
                    "submission status changed concurrently after SendBillAsync".to_string(),
                ));
            }
            submission.status = SubmissionStatus::Submitted;
            submission.track_id = Some(track_id);
            submission.submitted_at = Some(now);

            ctx.store
                .compare_and_set_invoice_status(
                    invoice.id,
                    InvoiceStatus::Signed,
                    InvoiceStatus::SubmittedToDian,
                    None,
                    None,
                    None,
                    now,
                )
                .await?;

            Ok(submission)
        }
        Err(failure) => {
            let code = match &failure {
                tinto_soap::SoapFailure::Fault { code, .. } => code.clone(),
                _ => None,
            };
            mark_submission_errored(ctx, &mut submission, code, failure.to_string(), now).await?;
            Ok(submission)
        }
    }
}

async fn mark_submission_errored(
    ctx: &OrchestratorContext,
    submission: &mut Submission,
    dian_error_code: Option<String>,
    dian_error_message: String,
    now: DateTime<Utc>,
) -> Result<(), OrchestratorFailure> {
    ctx.store
        .compare_and_set_submission(
            submission.id,
            submission.status,
            SubmissionStatus::Error,
            SubmissionUpdate {
                dian_error_code: dian_error_code.clone(),
                dian_error_message: Some(dian_error_message.clone()),
                processed_at: Some(now),
                ..Default::default()
            },
            now,
        )
        .await?;
    submission.status = SubmissionStatus::Error;
    submission.dian_error_code = dian_error_code;
    submission.dian_error_message = Some(dian_error_message);
    submission.processed_at = Some(now);
    Ok(())
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use chrono::{NaiveDate, TimeZone};
    use tinto_common::{
        Currency, Customer, CustomerId, DocumentType, EnvironmentId, IdType, Invoice, InvoiceId,
        IssuerId, MinorUnits,
    };
    use tinto_crypto::rng::SysRng;
    use tinto_soap::fake::FakeTransport;
    use tinto_store::memory::MemoryStore;
    use tinto_store::Store as _;

    use super::*;

    fn sample_issuer() -> Issuer {
        Issuer {
            id: IssuerId::new_v4(),
            id_type: IdType::Nit,
            id_number: "900123456".to_string(),
            legal_name: "Acme Colombia SAS".to_string(),
            address_line: Some("Calle 1 #2-3".to_string()),
            locality: Some("Bogota".to_string()),
            contact_email: None,
            certificate_blob: tinto_common::EncryptedBlob::from_ciphertext("unused".to_string()),
            certificate_expires_at: Utc::now(),
        }
    }

    fn sample_customer() -> Customer {
        Customer {
            id: CustomerId::new_v4(),
            id_type: IdType::Cc,
            id_number: "1234567890".to_string(),
            legal_name: "Jane Buyer".to_string(),
            address_line: None,
            locality: None,
            contact_email: None,
        }
    }

    fn sample_invoice() -> Invoice {
        Invoice {
            id: InvoiceId::new_v4(),
            document_type: DocumentType::SalesInvoice,
            issuer_id: IssuerId::new_v4(),
            customer_id: CustomerId::new_v4(),
            environment_id: EnvironmentId::new_v4(),
            prefix: Some("SETT".to_string()),
            number: 1,
            issue_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            due_date: None,
            currency: Currency(Currency::COP.to_string()),
            subtotal: MinorUnits(100_000_00),
            tax_amount: MinorUnits(19_000_00),
            total: MinorUnits(119_000_00),
            fingerprint: String::new(),
            status: InvoiceStatus::Draft,
            ubl_blob: None,
            signed_xml_blob: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            creator_key_id: None,
        }
    }

    fn sample_line_items(invoice_id: InvoiceId) -> Vec<LineItem> {
        vec![LineItem {
            invoice_id,
            line_number: 1,
            description: "Consulting services".to_string(),
            quantity: 1.0,
            unit_price: MinorUnits(100_000_00),
            line_total: MinorUnits(100_000_00),
            tax_rate_percent: Some(19.0),
            tax_amount: Some(MinorUnits(19_000_00)),
        }]
    }

    fn sample_credential() -> IssuerCredential {
        let mut rng = rsa::rand_core::OsRng;
        let private_key = rsa::RsaPrivateKey::new(&mut rng, 2048).unwrap();
        IssuerCredential {
            credential: tinto_xmlsign::Credential {
                private_key,
                certificate_der: b"not-a-real-cert-der-just-bytes".to_vec(),
            },
            software: SoftwareIdentity {
                software_provider_id: "900123456".to_string(),
                software_id: "f2c0b2a4-1111-2222-3333-444455556666".to_string(),
            },
            technical_key: "fc8eac422eba16e22ffd8c6f94b3f40a6e38162c".to_string(),
        }
    }

    #[tokio::test]
    async fn successful_submission_transitions_to_submitted() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(FakeTransport::new());

        let ctx = OrchestratorContext::new(store.clone(), transport.clone(), tinto_crypto::aes::AesKey::new(&[1u8; 32]));
        let issuer_credential = sample_credential();
        let issuer = sample_issuer();
        let customer = sample_customer();
        let invoice = sample_invoice();
        let line_items = sample_line_items(invoice.id);
        let mut rng = SysRng::new();
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();

        let submission = submit(
            &ctx,
            &issuer_credential,
            invoice,
            &line_items,
            &issuer,
            &customer,
            false,
            &mut rng,
            now,
        )
        .await
        .unwrap();

        assert_eq!(submission.status, SubmissionStatus::Submitted);
        assert_eq!(submission.track_id.as_deref(), Some("FAKE-TRACK-1"));
    }

    #[tokio::test]
    async fn repeated_submit_is_idempotent_while_non_terminal() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(FakeTransport::new());

        let ctx = OrchestratorContext::new(store.clone(), transport.clone(), tinto_crypto::aes::AesKey::new(&[2u8; 32]));
        let issuer_credential = sample_credential();
        let issuer = sample_issuer();
        let customer = sample_customer();
        let invoice = sample_invoice();
        let line_items = sample_line_items(invoice.id);
        let mut rng = SysRng::new();
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();

        let first = submit(
            &ctx,
            &issuer_credential,
            invoice.clone(),
            &line_items,
            &issuer,
            &customer,
            false,
            &mut rng,
            now,
        )
        .await
        .unwrap();

        let second = submit(
            &ctx,
            &issuer_credential,
            invoice,
            &line_items,
            &issuer,
            &customer,
            false,
            &mut rng,
            now,
        )
        .await
        .unwrap();

        assert_eq!(first.id, second.id, "second call should return the first, non-terminal submission");
    }

    #[tokio::test]
    async fn dian_error_response_marks_submission_errored_and_invoice_stays_signed() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(FakeTransport::new());
        transport
            .queue_send_bill_failure(tinto_soap::SoapFailure::Fault {
                code: Some("99".to_string()),
                message: Some("internal error".to_string()),
            })
            .await;

        let ctx = OrchestratorContext::new(store.clone(), transport.clone(), tinto_crypto::aes::AesKey::new(&[3u8; 32]));
        let issuer_credential = sample_credential();
        let issuer = sample_issuer();
        let customer = sample_customer();
        let invoice = sample_invoice();
        let line_items = sample_line_items(invoice.id);
        let mut rng = SysRng::new();
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();

        let submission = submit(
            &ctx,
            &issuer_credential,
            invoice.clone(),
            &line_items,
            &issuer,
            &customer,
            false,
            &mut rng,
            now,
        )
        .await
        .unwrap();

        assert_eq!(submission.status, SubmissionStatus::Error);
        let stored_invoice = store.get_invoice(invoice.id).await.unwrap().unwrap();
        assert_eq!(stored_invoice.status, InvoiceStatus::Signed);
    }
}
