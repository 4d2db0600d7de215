//! An in-memory [`Store`], grounded on the teacher's
//! `node/src/command/test/mock_backend.rs`: one `Mutex`-guarded map per
//! entity, no actual I/O.
//!
//! Also implements the two narrower ports other crates define —
//! [`tinto_keys::ApiKeyRepo`] and [`tinto_auth::ReplayGuard`] — so a single
//! `MemoryStore` instance is the one fake `tinto-orchestrator`, `tinto-auth`,
//! and `tinto-node`'s test suites all compose against, the same way the
//! teacher's `MockApiClient`/`MockBackend` stand in for every external
//! dependency at once.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tinto_auth::ReplayGuard;
use tinto_common::{
    ApiKeyFingerprint, AuditEvent, EncryptedBlob, Invoice, InvoiceId, InvoiceStatus, IssuerId,
    LineItem, RequestSignature, Submission, SubmissionId, SubmissionStatus,
};
use tinto_keys::{ApiKey, ApiKeyRepo};
use tokio::sync::Mutex;

use crate::{Store, SubmissionUpdate};

#[derive(Default)]
struct MemoryState {
    invoices: HashMap<InvoiceId, Invoice>,
    line_items: HashMap<InvoiceId, Vec<LineItem>>,
    sequences: HashMap<(IssuerId, Option<String>), i64>,
    submissions: HashMap<SubmissionId, Submission>,
    replay_keys: HashSet<(String, DateTime<Utc>)>,
    audit_events: Vec<AuditEvent>,
    api_keys: HashMap<ApiKeyFingerprint, ApiKey>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_invoice(&self, invoice: Invoice) -> anyhow::Result<()> {
        self.state.lock().await.invoices.insert(invoice.id, invoice);
        Ok(())
    }

    async fn get_invoice(&self, id: InvoiceId) -> anyhow::Result<Option<Invoice>> {
        Ok(self.state.lock().await.invoices.get(&id).cloned())
    }

    async fn compare_and_set_invoice_status(
        &self,
        id: InvoiceId,
        expected: InvoiceStatus,
        next: InvoiceStatus,
        fingerprint: Option<String>,
        ubl_blob: Option<EncryptedBlob>,
        signed_xml_blob: Option<EncryptedBlob>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let mut state = self.state.lock().await;
        let Some(invoice) = state.invoices.get_mut(&id) else {
            anyhow::bail!("invoice {id} not found");
        };
        if invoice.status != expected {
            return Ok(false);
        }
        invoice.status = next;
        if let Some(fp) = fingerprint {
            invoice.fingerprint = fp;
        }
        if let Some(blob) = ubl_blob {
            invoice.ubl_blob = Some(blob);
        }
        if let Some(blob) = signed_xml_blob {
            invoice.signed_xml_blob = Some(blob);
        }
        invoice.updated_at = now;
        Ok(true)
    }

    async fn insert_line_item(&self, item: LineItem) -> anyhow::Result<()> {
        self.state
            .lock()
            .await
            .line_items
            .entry(item.invoice_id)
            .or_default()
            .push(item);
        Ok(())
    }

    async fn list_line_items(&self, invoice_id: InvoiceId) -> anyhow::Result<Vec<LineItem>> {
        Ok(self
            .state
            .lock()
            .await
            .line_items
            .get(&invoice_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn next_sequence(
        &self,
        issuer_id: IssuerId,
        prefix: Option<&str>,
    ) -> anyhow::Result<i64> {
        let mut state = self.state.lock().await;
        let key = (issuer_id, prefix.map(str::to_string));
        let next = state.sequences.get(&key).copied().unwrap_or(0) + 1;
        state.sequences.insert(key, next);
        Ok(next)
    }

    async fn insert_submission(&self, submission: Submission) -> anyhow::Result<()> {
        self.state
            .lock()
            .await
            .submissions
            .insert(submission.id, submission);
        Ok(())
    }

    async fn get_submission(&self, id: SubmissionId) -> anyhow::Result<Option<Submission>> {
        Ok(self.state.lock().await.submissions.get(&id).cloned())
    }

    async fn latest_submission_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> anyhow::Result<Option<Submission>> {
        Ok(self
            .state
            .lock()
            .await
            .submissions
            .values()
            .filter(|s| s.invoice_id == invoice_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn compare_and_set_submission(
        &self,
        id: SubmissionId,
        expected: SubmissionStatus,
        next_status: SubmissionStatus,
        update: SubmissionUpdate,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let mut state = self.state.lock().await;
        let Some(submission) = state.submissions.get_mut(&id) else {
            anyhow::bail!("submission {id} not found");
        };
        if submission.status != expected {
            return Ok(false);
        }
        submission.status = next_status;
        if let Some(track_id) = update.track_id {
            submission.track_id = Some(track_id);
        }
        if let Some(blob) = update.request_zip_blob {
            submission.request_zip_blob = Some(blob);
        }
        if let Some(blob) = update.response_blob {
            submission.response_blob = Some(blob);
        }
        if let Some(code) = update.dian_error_code {
            submission.dian_error_code = Some(code);
        }
        if let Some(message) = update.dian_error_message {
            submission.dian_error_message = Some(message);
        }
        if let Some(submitted_at) = update.submitted_at {
            submission.submitted_at = Some(submitted_at);
        }
        if let Some(processed_at) = update.processed_at {
            submission.processed_at = Some(processed_at);
        }
        submission.updated_at = now;
        Ok(true)
    }

    async fn insert_request_signature(&self, record: RequestSignature) -> anyhow::Result<bool> {
        let key = (record.signature_digest, record.request_timestamp);
        Ok(self.state.lock().await.replay_keys.insert(key))
    }

    async fn insert_audit_event(&self, event: AuditEvent) -> anyhow::Result<()> {
        self.state.lock().await.audit_events.push(event);
        Ok(())
    }

    async fn list_audit_events(
        &self,
        invoice_id: Option<InvoiceId>,
        submission_id: Option<SubmissionId>,
    ) -> anyhow::Result<Vec<AuditEvent>> {
        Ok(self
            .state
            .lock()
            .await
            .audit_events
            .iter()
            .filter(|e| invoice_id.map_or(true, |id| e.invoice_id == Some(id)))
            .filter(|e| submission_id.map_or(true, |id| e.submission_id == Some(id)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReplayGuard for MemoryStore {
    async fn insert_if_absent(&self, record: RequestSignature) -> anyhow::Result<bool> {
        Store::insert_request_signature(self, record).await
    }
}

#[async_trait]
impl ApiKeyRepo for MemoryStore {
    async fn find_by_fingerprint(
        &self,
        fingerprint: &ApiKeyFingerprint,
    ) -> anyhow::Result<Option<ApiKey>> {
        Ok(self.state.lock().await.api_keys.get(fingerprint).cloned())
    }

    async fn insert(&self, key: ApiKey) -> anyhow::Result<()> {
        self.state
            .lock()
            .await
            .api_keys
            .insert(key.fingerprint.clone(), key);
        Ok(())
    }

    async fn mark_last_used(&self, fingerprint: &ApiKeyFingerprint) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        if let Some(key) = state.api_keys.get_mut(fingerprint) {
            key.last_used_at = Some(Utc::now());
        }
        Ok(())
    }
}
