//! End-to-end coverage for the subcommand handlers, grounded on the
//! teacher's `node/src/command/test/` harness: every test composes
//! [`AppContext::dummy`] (an in-memory store plus [`FakeTransport`]) so the
//! real orchestrator, CUFE, UBL, and store code runs with no network
//! involved.

use std::sync::Arc;

use chrono::Utc;
use tinto_common::{
    AuditEvent, AuditEventKind, Currency, Customer, CustomerId, DocumentType, EnvironmentId,
    IdType, Invoice, InvoiceId, InvoiceStatus, Issuer, IssuerId, MinorUnits, Submission,
    SubmissionStatus,
};
use tinto_soap::fake::FakeTransport;
use tinto_soap::{DianTransport, StatusZipResponse};
use tinto_store::Store as _;

use crate::cli::{InspectCommand, PollCommand};
use crate::command;
use crate::config::Config;
use crate::context::AppContext;

fn sample_config() -> Config {
    Config {
        console_discriminator: None,
        master_key_file: "/dev/null".into(),
        system_key_b64: String::new(),
        environment_name: tinto_common::EnvironmentName::Habilitacion,
        software_provider_id: "900123456".to_string(),
        software_id: "software-id".to_string(),
        software_pin: "1234".to_string(),
        technical_key: "fake-technical-key".to_string(),
    }
}

fn dummy_ctx(transport: Arc<dyn DianTransport>) -> AppContext {
    AppContext::dummy(sample_config(), transport)
}

fn sample_issuer() -> Issuer {
    Issuer {
        id: IssuerId::new_v4(),
        id_type: IdType::Nit,
        id_number: "900123456".to_string(),
        legal_name: "Acme Colombia SAS".to_string(),
        address_line: None,
        locality: None,
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
        legal_name: "Jane Doe".to_string(),
        address_line: None,
        locality: None,
        contact_email: None,
    }
}

fn sample_invoice(environment_id: EnvironmentId, status: InvoiceStatus) -> Invoice {
    Invoice {
        id: InvoiceId::new_v4(),
        document_type: DocumentType::SalesInvoice,
        issuer_id: sample_issuer().id,
        customer_id: sample_customer().id,
        environment_id,
        prefix: Some("SETP".to_string()),
        number: 1,
        issue_date: chrono::NaiveDate::from_ymd_opt(2026, 7, 20).unwrap(),
        due_date: None,
        currency: Currency::parse(Currency::COP).unwrap(),
        subtotal: MinorUnits(100_000_00),
        tax_amount: MinorUnits(19_000_00),
        total: MinorUnits(119_000_00),
        fingerprint: "a".repeat(96),
        status,
        ubl_blob: None,
        signed_xml_blob: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        creator_key_id: None,
    }
}

#[tokio::test]
async fn poll_reports_already_terminal_submission_without_advancing_it() {
    let transport = Arc::new(FakeTransport::new());
    let ctx = dummy_ctx(transport);

    let invoice = sample_invoice(ctx.environment_id, InvoiceStatus::AcceptedByDian);
    ctx.store.upsert_invoice(invoice.clone()).await.unwrap();

    let mut submission = Submission::new_pending(invoice.id, ctx.environment_id, Utc::now());
    submission.status = SubmissionStatus::Accepted;
    submission.track_id = Some("FAKE-TRACK-1".to_string());
    ctx.store.insert_submission(submission.clone()).await.unwrap();

    let args = PollCommand {
        invoice_id: invoice.id.to_string(),
        max_attempts: 3,
        delay_secs: 0,
    };
    command::poll::run(&ctx, &args).await.unwrap();

    let stored = ctx
        .store
        .latest_submission_for_invoice(invoice.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, SubmissionStatus::Accepted);
}

#[tokio::test]
async fn poll_drives_submitted_invoice_to_accepted_via_fake_transport() {
    let transport = Arc::new(FakeTransport::new());

    let invoice = sample_invoice(EnvironmentId::new_v4(), InvoiceStatus::SubmittedToDian);
    let mut submission = Submission::new_pending(invoice.id, invoice.environment_id, Utc::now());
    submission.status = SubmissionStatus::Submitted;
    submission.track_id = Some("FAKE-TRACK-POLL".to_string());

    transport
        .queue_status(
            "FAKE-TRACK-POLL",
            StatusZipResponse {
                track_id: "FAKE-TRACK-POLL".to_string(),
                status_code: "02".to_string(),
                status_message: None,
                zip_base64: "Zg==".to_string(),
            },
        )
        .await;

    let ctx = dummy_ctx(transport);
    ctx.store.upsert_invoice(invoice.clone()).await.unwrap();
    ctx.store.insert_submission(submission.clone()).await.unwrap();

    let args = PollCommand {
        invoice_id: invoice.id.to_string(),
        max_attempts: 3,
        delay_secs: 0,
    };
    command::poll::run(&ctx, &args).await.unwrap();

    let stored_submission = ctx
        .store
        .latest_submission_for_invoice(invoice.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_submission.status, SubmissionStatus::Accepted);

    let stored_invoice = ctx.store.get_invoice(invoice.id).await.unwrap().unwrap();
    assert_eq!(stored_invoice.status, InvoiceStatus::AcceptedByDian);
}

#[tokio::test]
async fn poll_rejects_an_unknown_invoice_id() {
    let transport = Arc::new(FakeTransport::new());
    let ctx = dummy_ctx(transport);

    let args = PollCommand {
        invoice_id: InvoiceId::new_v4().to_string(),
        max_attempts: 1,
        delay_secs: 0,
    };
    let err = command::poll::run(&ctx, &args).await.unwrap_err();
    assert!(err.to_string().contains("no invoice"));
}

#[tokio::test]
async fn inspect_prints_invoice_submission_and_audit_trail() {
    let transport = Arc::new(FakeTransport::new());
    let ctx = dummy_ctx(transport);

    let invoice = sample_invoice(ctx.environment_id, InvoiceStatus::Signed);
    ctx.store.upsert_invoice(invoice.clone()).await.unwrap();
    ctx.store
        .insert_audit_event(AuditEvent::new(
            AuditEventKind::InvoiceCreated,
            Some(invoice.id),
            None,
            None,
            "seeded for test",
            Utc::now(),
        ))
        .await
        .unwrap();

    let args = InspectCommand {
        invoice_id: invoice.id.to_string(),
    };
    command::inspect::run(&ctx, &args).await.unwrap();
}

#[tokio::test]
async fn inspect_rejects_a_malformed_invoice_id() {
    let transport = Arc::new(FakeTransport::new());
    let ctx = dummy_ctx(transport);

    let args = InspectCommand {
        invoice_id: "not-a-uuid".to_string(),
    };
    let err = command::inspect::run(&ctx, &args).await.unwrap_err();
    assert!(err.to_string().contains("not a valid invoice id"));
}
