//! `check_status(submission)` and `poll_until_final`, §4.9's second half.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tinto_common::{InvoiceId, InvoiceStatus, Submission, SubmissionStatus};
use tinto_store::SubmissionUpdate;
use tracing::warn;

use crate::cancel::CancellationToken;
use crate::context::OrchestratorContext;
use crate::error::OrchestratorFailure;

/// Call `GetStatusZip` for `submission` and interpret DIAN's status code
/// per §4.9. A no-op (returns `submission` unchanged) if the submission has
/// no track id yet or is already terminal.
pub async fn check_status(
    ctx: &OrchestratorContext,
    mut submission: Submission,
    invoice_id: InvoiceId,
    now: DateTime<Utc>,
) -> Result<Submission, OrchestratorFailure> {
    let Some(track_id) = submission.track_id.clone() else {
        warn!(submission_id = %submission.id, "check_status called with no track id, skipping");
        return Ok(submission);
    };
    if submission.status.is_terminal() {
        return Ok(submission);
    }

    let response = ctx.transport.get_status_zip(&track_id).await?;

    match response.status_code.as_str() {
        "00" => {
            // Idempotent if already PROCESSING.
            if submission.status != SubmissionStatus::Processing {
                let advanced = ctx
                    .store
                    .compare_and_set_submission(
                        submission.id,
                        submission.status,
                        SubmissionStatus::Processing,
                        SubmissionUpdate::default(),
                        now,
                    )
                    .await?;
                if advanced {
                    submission.status = SubmissionStatus::Processing;
                }
            }
        }
        "02" => {
            let response_blob = tinto_common::EncryptedBlob::from_ciphertext(ctx.blob_key.encrypt(
                &mut tinto_crypto::rng::SysRng::new(),
                format!("submission:{}:response_blob", submission.id).as_bytes(),
                response.zip_base64.as_bytes(),
            ));
            let advanced = ctx
                .store
                .compare_and_set_submission(
                    submission.id,
                    submission.status,
                    SubmissionStatus::Accepted,
                    SubmissionUpdate {
                        response_blob: Some(response_blob),
                        processed_at: Some(now),
                        ..Default::default()
                    },
                    now,
                )
                .await?;
            if advanced {
                submission.status = SubmissionStatus::Accepted;
                submission.processed_at = Some(now);
                ctx.store
                    .compare_and_set_invoice_status(
                        invoice_id,
                        InvoiceStatus::SubmittedToDian,
                        InvoiceStatus::AcceptedByDian,
                        None,
                        None,
                        None,
                        now,
                    )
                    .await?;
            }
        }
        "04" => {
            let response_blob = tinto_common::EncryptedBlob::from_ciphertext(ctx.blob_key.encrypt(
                &mut tinto_crypto::rng::SysRng::new(),
                format!("submission:{}:response_blob", submission.id).as_bytes(),
                response.zip_base64.as_bytes(),
            ));
            let category = crate::error_map::classify(None, response.status_message.as_deref().unwrap_or(""));
            let advanced = ctx
                .store
                .compare_and_set_submission(
                    submission.id,
                    submission.status,
                    SubmissionStatus::Rejected,
                    SubmissionUpdate {
                        response_blob: Some(response_blob),
                        dian_error_message: response.status_message.clone(),
                        processed_at: Some(now),
                        ..Default::default()
                    },
                    now,
                )
                .await?;
            if advanced {
                submission.status = SubmissionStatus::Rejected;
                submission.dian_error_message = response.status_message;
                submission.processed_at = Some(now);
                tracing::info!(?category, "submission rejected by dian");
                ctx.store
                    .compare_and_set_invoice_status(
                        invoice_id,
                        InvoiceStatus::SubmittedToDian,
                        InvoiceStatus::RejectedByDian,
                        None,
                        None,
                        None,
                        now,
                    )
                    .await?;
            }
        }
        other => {
            let advanced = ctx
                .store
                .compare_and_set_submission(
                    submission.id,
                    submission.status,
                    SubmissionStatus::Error,
                    SubmissionUpdate {
                        dian_error_code: Some(other.to_string()),
                        dian_error_message: response.status_message.clone(),
                        processed_at: Some(now),
                        ..Default::default()
                    },
                    now,
                )
                .await?;
            if advanced {
                submission.status = SubmissionStatus::Error;
                submission.dian_error_code = Some(other.to_string());
                submission.dian_error_message = response.status_message;
                submission.processed_at = Some(now);
            }
        }
    }

    Ok(submission)
}

/// Poll `check_status` until `submission` reaches a terminal state, up to
/// `max_attempts`, sleeping `delay` between attempts. Cooperative: observes
/// `cancel` at each delay boundary and returns the current, already-persisted
/// submission without rolling anything back (§5).
pub async fn poll_until_final(
    ctx: &OrchestratorContext,
    mut submission: Submission,
    invoice_id: InvoiceId,
    max_attempts: u32,
    delay: Duration,
    cancel: &CancellationToken,
    now: impl Fn() -> DateTime<Utc>,
) -> Result<Submission, OrchestratorFailure> {
    for attempt in 0..max_attempts {
        submission = check_status(ctx, submission, invoice_id, now()).await?;
        if submission.status.is_terminal() {
            return Ok(submission);
        }
        if attempt + 1 == max_attempts {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => {
                warn!(submission_id = %submission.id, "poll_until_final cancelled");
                return Ok(submission);
            }
        }
    }
    Ok(submission)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use tinto_common::{EnvironmentId, InvoiceId};
    use tinto_soap::fake::FakeTransport;
    use tinto_soap::StatusZipResponse;
    use tinto_store::memory::MemoryStore;

    use super::*;

    fn ctx(transport: Arc<FakeTransport>) -> OrchestratorContext {
        OrchestratorContext::new(
            Arc::new(MemoryStore::new()),
            transport,
            tinto_crypto::aes::AesKey::new(&[4u8; 32]),
        )
    }

    fn pending_submission(invoice_id: InvoiceId, track_id: &str) -> Submission {
        let mut submission = Submission::new_pending(invoice_id, EnvironmentId::new_v4(), Utc::now());
        submission.status = SubmissionStatus::Submitted;
        submission.track_id = Some(track_id.to_string());
        submission
    }

    #[tokio::test]
    async fn no_track_id_is_a_no_op() {
        let transport = Arc::new(FakeTransport::new());
        let ctx = ctx(transport);
        let invoice_id = InvoiceId::new_v4();
        let submission = Submission::new_pending(invoice_id, EnvironmentId::new_v4(), Utc::now());
        let result = check_status(&ctx, submission.clone(), invoice_id, Utc::now()).await.unwrap();
        assert_eq!(result.status, submission.status);
    }

    #[tokio::test]
    async fn code_00_advances_to_processing() {
        let transport = Arc::new(FakeTransport::new());
        let invoice_id = InvoiceId::new_v4();
        let submission = pending_submission(invoice_id, "TRACK-1");
        transport
            .queue_status(
                "TRACK-1",
                StatusZipResponse {
                    track_id: "TRACK-1".to_string(),
                    status_code: "00".to_string(),
                    status_message: None,
                    zip_base64: String::new(),
                },
            )
            .await;
        let ctx = ctx(transport);
        let result = check_status(&ctx, submission, invoice_id, Utc::now()).await.unwrap();
        assert_eq!(result.status, SubmissionStatus::Processing);
    }

    #[tokio::test]
    async fn code_02_advances_to_accepted() {
        let transport = Arc::new(FakeTransport::new());
        let invoice_id = InvoiceId::new_v4();
        let submission = pending_submission(invoice_id, "TRACK-1");
        transport
            .queue_status(
                "TRACK-1",
                StatusZipResponse {
                    track_id: "TRACK-1".to_string(),
                    status_code: "02".to_string(),
                    status_message: None,
                    zip_base64: "Zg==".to_string(),
                },
            )
            .await;
        let ctx = ctx(transport);
        let result = check_status(&ctx, submission, invoice_id, Utc::now()).await.unwrap();
        assert_eq!(result.status, SubmissionStatus::Accepted);
    }

    #[tokio::test]
    async fn code_04_advances_to_rejected() {
        let transport = Arc::new(FakeTransport::new());
        let invoice_id = InvoiceId::new_v4();
        let submission = pending_submission(invoice_id, "TRACK-1");
        transport
            .queue_status(
                "TRACK-1",
                StatusZipResponse {
                    track_id: "TRACK-1".to_string(),
                    status_code: "04".to_string(),
                    status_message: Some("the xml signature could not be validated".to_string()),
                    zip_base64: "Zg==".to_string(),
                },
            )
            .await;
        let ctx = ctx(transport);
        let result = check_status(&ctx, submission, invoice_id, Utc::now()).await.unwrap();
        assert_eq!(result.status, SubmissionStatus::Rejected);
    }

    #[tokio::test]
    async fn unrecognized_code_becomes_error_preserving_message() {
        let transport = Arc::new(FakeTransport::new());
        let invoice_id = InvoiceId::new_v4();
        let submission = pending_submission(invoice_id, "TRACK-1");
        transport
            .queue_status(
                "TRACK-1",
                StatusZipResponse {
                    track_id: "TRACK-1".to_string(),
                    status_code: "66".to_string(),
                    status_message: Some("unexpected".to_string()),
                    zip_base64: String::new(),
                },
            )
            .await;
        let ctx = ctx(transport);
        let result = check_status(&ctx, submission, invoice_id, Utc::now()).await.unwrap();
        assert_eq!(result.status, SubmissionStatus::Error);
        assert_eq!(result.dian_error_code.as_deref(), Some("66"));
        assert_eq!(result.dian_error_message.as_deref(), Some("unexpected"));
    }

    #[tokio::test]
    async fn poll_until_final_stops_on_first_terminal_response() {
        let transport = Arc::new(FakeTransport::new());
        let invoice_id = InvoiceId::new_v4();
        let submission = pending_submission(invoice_id, "TRACK-1");
        transport
            .queue_status(
                "TRACK-1",
                StatusZipResponse {
                    track_id: "TRACK-1".to_string(),
                    status_code: "02".to_string(),
                    status_message: None,
                    zip_base64: "Zg==".to_string(),
                },
            )
            .await;
        let ctx = ctx(transport);
        let cancel = CancellationToken::new();
        let result = poll_until_final(
            &ctx,
            submission,
            invoice_id,
            5,
            Duration::from_millis(1),
            &cancel,
            Utc::now,
        )
        .await
        .unwrap();
        assert_eq!(result.status, SubmissionStatus::Accepted);
    }

    #[tokio::test]
    async fn poll_until_final_returns_current_state_on_cancellation() {
        let transport = Arc::new(FakeTransport::new());
        let invoice_id = InvoiceId::new_v4();
        let submission = pending_submission(invoice_id, "TRACK-1");
        transport
            .queue_status(
                "TRACK-1",
                StatusZipResponse {
                    track_id: "TRACK-1".to_string(),
                    status_code: "00".to_string(),
                    status_message: None,
                    zip_base64: String::new(),
                },
            )
            .await;
        let ctx = ctx(transport);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = poll_until_final(
            &ctx,
            submission,
            invoice_id,
            5,
            Duration::from_secs(3600),
            &cancel,
            Utc::now,
        )
        .await
        .unwrap();
        assert_eq!(result.status, SubmissionStatus::Processing);
    }
}
