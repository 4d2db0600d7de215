//! `tinto-node poll INVOICE_ID`: poll a submitted invoice's submission
//! until a terminal verdict or `max_attempts` is exhausted.

use std::time::Duration;

use anyhow::Context as _;
use chrono::Utc;
use tinto_common::InvoiceId;
use tinto_orchestrator::CancellationToken;
use tinto_store::Store as _;
use uuid::Uuid;

use crate::cli::PollCommand;
use crate::context::AppContext;

pub async fn run(ctx: &AppContext, args: &PollCommand) -> anyhow::Result<()> {
    let invoice_id = InvoiceId(
        Uuid::parse_str(&args.invoice_id)
            .with_context(|| format!("'{}' is not a valid invoice id", args.invoice_id))?,
    );

    let invoice = ctx
        .store
        .get_invoice(invoice_id)
        .await?
        .with_context(|| format!("no invoice with id {invoice_id}"))?;

    let submission = ctx
        .store
        .latest_submission_for_invoice(invoice_id)
        .await?
        .with_context(|| format!("invoice {invoice_id} has no submission yet"))?;

    if submission.status.is_terminal() {
        println!("submission {} already terminal: {:?}", submission.id, submission.status);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let final_submission = tinto_orchestrator::poll_until_final(
        &ctx.orchestrator,
        submission,
        invoice_id,
        args.max_attempts,
        Duration::from_secs(args.delay_secs),
        &cancel,
        Utc::now,
    )
    .await
    .context("polling failed")?;

    println!(
        "invoice {} submission {} status {:?}",
        invoice.document_number(),
        final_submission.id,
        final_submission.status
    );
    if let Some(message) = &final_submission.dian_error_message {
        println!("dian error: {message}");
    }

    Ok(())
}
