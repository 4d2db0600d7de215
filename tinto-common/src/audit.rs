//! Durable audit trail entries. Not named in the distilled data model, but
//! §7's propagation policy requires "guaranteeing durable audit trail" for
//! every `Upstream` failure inside `submit`, and §4.9's state machine
//! transitions are exactly the events worth recording — so each transition
//! gets one `AuditEvent` row, in the same spirit as the teacher's
//! `TestEvent` enum of named, structured occurrences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ApiKeyId, InvoiceId, SubmissionId};

/// A single notable occurrence in an invoice's or submission's lifecycle,
/// recorded for operators and auditors (the AUDITOR role, §4.3) to
/// reconstruct what happened without re-deriving it from raw state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum AuditEventKind {
    InvoiceCreated,
    InvoiceSigned,
    InvoiceSubmitted,
    InvoiceAccepted,
    InvoiceRejected,
    InvoiceCancelled,
    SubmissionRetried,
    SubmissionErrored,
    ApiKeyCreated,
    ApiKeyRevoked,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEvent {
    pub kind: AuditEventKind,
    pub invoice_id: Option<InvoiceId>,
    pub submission_id: Option<SubmissionId>,
    pub actor_key_id: Option<ApiKeyId>,
    pub detail: String,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        kind: AuditEventKind,
        invoice_id: Option<InvoiceId>,
        submission_id: Option<SubmissionId>,
        actor_key_id: Option<ApiKeyId>,
        detail: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            invoice_id,
            submission_id,
            actor_key_id,
            detail: detail.into(),
            recorded_at,
        }
    }
}
