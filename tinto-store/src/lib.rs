//! The persistence port (§4.10): typed operations per entity, an optimistic
//! compare-and-set on the two state machines, and an in-memory reference
//! implementation.
//!
//! `Store` is `async_trait`-based, matching the teacher's universal use of
//! `#[async_trait]` on every port-like trait (`ApiClient`, `Persister`).
//! No real database driver appears anywhere in the teacher's or the wider
//! corpus's dependency stack, so — unlike `ApiClient`, which the teacher
//! backs with both a real HTTP client and `MockApiClient` — this port has
//! exactly one implementation in this crate: [`memory::MemoryStore`]. It
//! plays the same role `node/src/command/test/mock_backend.rs` plays for the
//! teacher: the one fake every higher-level test composes against.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tinto_common::{
    AuditEvent, EncryptedBlob, Invoice, InvoiceId, InvoiceStatus, IssuerId, LineItem,
    RequestSignature, Submission, SubmissionId, SubmissionStatus,
};

/// The fields a `check_status`/`submit` transition may advance on a
/// submission, alongside its status. `None` means "leave unchanged" — a
/// partial update applied atomically with the status CAS, mirroring a SQL
/// `UPDATE ... SET status = ?, track_id = COALESCE(?, track_id), ...`.
#[derive(Clone, Debug, Default)]
pub struct SubmissionUpdate {
    pub track_id: Option<String>,
    pub request_zip_blob: Option<EncryptedBlob>,
    pub response_blob: Option<EncryptedBlob>,
    pub dian_error_code: Option<String>,
    pub dian_error_message: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a brand-new invoice (DRAFT) or overwrite an existing row
    /// wholesale. Only ever called once per invoice in practice — later
    /// mutation goes through [`Store::compare_and_set_invoice_status`] (§5:
    /// invoice status transitions are serialized via compare-and-set).
    async fn upsert_invoice(&self, invoice: Invoice) -> anyhow::Result<()>;

    async fn get_invoice(&self, id: InvoiceId) -> anyhow::Result<Option<Invoice>>;

    /// Atomically advance `id`'s status from `expected` to `next` if and
    /// only if its current status is still `expected`; `fingerprint`, when
    /// given, is written in the same step (I3: fingerprint non-empty once
    /// `status >= SIGNED`). Returns `false` on a stale-status conflict —
    /// the caller lost the race, not an error.
    async fn compare_and_set_invoice_status(
        &self,
        id: InvoiceId,
        expected: InvoiceStatus,
        next: InvoiceStatus,
        fingerprint: Option<String>,
        ubl_blob: Option<EncryptedBlob>,
        signed_xml_blob: Option<EncryptedBlob>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool>;

    async fn insert_line_item(&self, item: LineItem) -> anyhow::Result<()>;

    async fn list_line_items(&self, invoice_id: InvoiceId) -> anyhow::Result<Vec<LineItem>>;

    /// `max(number) + 1` scoped by `(issuer, prefix)`, atomic (§3 I1, §4.10).
    async fn next_sequence(
        &self,
        issuer_id: IssuerId,
        prefix: Option<&str>,
    ) -> anyhow::Result<i64>;

    async fn insert_submission(&self, submission: Submission) -> anyhow::Result<()>;

    async fn get_submission(&self, id: SubmissionId) -> anyhow::Result<Option<Submission>>;

    /// The most recent submission for an invoice, terminal or not — used by
    /// `submit`'s idempotency check (step 1) and by S3 ("at most one
    /// non-terminal submission exists per invoice").
    async fn latest_submission_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> anyhow::Result<Option<Submission>>;

    /// Atomically advance `id`'s status from `expected` to `update.next_status`,
    /// applying the rest of `update`'s `Some` fields, if and only if the
    /// current status is still `expected` (§4.10, §5). Returns `false` on a
    /// stale-status conflict.
    async fn compare_and_set_submission(
        &self,
        id: SubmissionId,
        expected: SubmissionStatus,
        next_status: SubmissionStatus,
        update: SubmissionUpdate,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool>;

    /// Insert a replay-protection record if and only if
    /// `(signature_digest, request_timestamp)` isn't already present.
    /// Returns `true` if newly inserted, `false` if this exact pair was a
    /// replay (§4.3 V3, §5).
    async fn insert_request_signature(&self, record: RequestSignature) -> anyhow::Result<bool>;

    async fn insert_audit_event(&self, event: AuditEvent) -> anyhow::Result<()>;

    async fn list_audit_events(
        &self,
        invoice_id: Option<InvoiceId>,
        submission_id: Option<SubmissionId>,
    ) -> anyhow::Result<Vec<AuditEvent>>;
}
