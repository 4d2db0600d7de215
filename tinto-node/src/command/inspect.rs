//! `tinto-node inspect INVOICE_ID`: print an invoice's current state, its
//! latest submission, and its audit trail.

use anyhow::Context as _;
use tinto_common::InvoiceId;
use tinto_store::Store as _;
use uuid::Uuid;

use crate::cli::InspectCommand;
use crate::context::AppContext;

pub async fn run(ctx: &AppContext, args: &InspectCommand) -> anyhow::Result<()> {
    let invoice_id = InvoiceId(
        Uuid::parse_str(&args.invoice_id)
            .with_context(|| format!("'{}' is not a valid invoice id", args.invoice_id))?,
    );

    let invoice = ctx
        .store
        .get_invoice(invoice_id)
        .await?
        .with_context(|| format!("no invoice with id {invoice_id}"))?;

    println!("invoice {}", invoice.document_number());
    println!("  status: {:?}", invoice.status);
    println!("  fingerprint: {}", invoice.fingerprint);
    println!(
        "  subtotal {} tax {} total {}",
        invoice.subtotal, invoice.tax_amount, invoice.total
    );

    match ctx.store.latest_submission_for_invoice(invoice_id).await? {
        Some(submission) => {
            println!("  submission: {} ({:?})", submission.id, submission.status);
            if let Some(track_id) = &submission.track_id {
                println!("    track id: {track_id}");
            }
            if let Some(message) = &submission.dian_error_message {
                println!("    dian error: {message}");
            }
        }
        None => println!("  submission: none yet"),
    }

    let events = ctx.store.list_audit_events(Some(invoice_id), None).await?;
    println!("  audit trail ({} events):", events.len());
    for event in &events {
        println!("    [{}] {:?}: {}", event.recorded_at, event.kind, event.detail);
    }

    Ok(())
}
