//! One attempt to deliver an invoice to DIAN, and its status lattice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{EnvironmentId, InvoiceId, SubmissionId};
use crate::EncryptedBlob;

/// The submission lifecycle state machine (§4.9). Ordered so that
/// `#[derive(PartialOrd)]` gives a lattice consistent with P8 (status
/// monotonicity) for the common case; `ERROR` is handled separately since it
/// can both be terminal and (via `can_retry`) give rise to a fresh
/// submission rather than advancing in place.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Pending,
    Submitted,
    Processing,
    Accepted,
    Rejected,
    Error,
}

impl SubmissionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Error)
    }

    /// Whether `self -> next` is a legal edge in §4.9's submission state
    /// machine, including the `PROCESSING` self-loop (idempotent re-poll)
    /// and `ERROR`'s bidirectional link with `PENDING` for retried
    /// submissions.
    pub fn can_advance_to(self, next: Self) -> bool {
        use SubmissionStatus::*;
        match (self, next) {
            (Pending, Submitted) => true,
            (Submitted, Processing) => true,
            (Processing, Processing) => true,
            (Processing, Accepted) => true,
            (Processing, Rejected) => true,
            (Pending | Submitted | Processing, Error) => true,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub invoice_id: InvoiceId,
    pub environment_id: EnvironmentId,
    /// Opaque tracking id issued by DIAN; absent until `SUBMITTED`.
    pub track_id: Option<String>,
    pub status: SubmissionStatus,
    pub request_zip_blob: Option<EncryptedBlob>,
    pub response_blob: Option<EncryptedBlob>,
    pub dian_error_code: Option<String>,
    pub dian_error_message: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    pub fn new_pending(
        invoice_id: InvoiceId,
        environment_id: EnvironmentId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SubmissionId::new_v4(),
            invoice_id,
            environment_id,
            track_id: None,
            status: SubmissionStatus::Pending,
            request_zip_blob: None,
            response_blob: None,
            dian_error_code: None,
            dian_error_message: None,
            submitted_at: None,
            processed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn submission_state_machine_matches_4_9() {
        use SubmissionStatus::*;
        assert!(Pending.can_advance_to(Submitted));
        assert!(Submitted.can_advance_to(Processing));
        assert!(Processing.can_advance_to(Processing));
        assert!(Processing.can_advance_to(Accepted));
        assert!(Processing.can_advance_to(Rejected));
        assert!(Pending.can_advance_to(Error));
        assert!(Submitted.can_advance_to(Error));
        assert!(Processing.can_advance_to(Error));
        assert!(!Accepted.can_advance_to(Processing));
        assert!(!Pending.can_advance_to(Accepted));
    }

    #[test]
    fn terminal_states_are_accepted_rejected_error() {
        assert!(SubmissionStatus::Accepted.is_terminal());
        assert!(SubmissionStatus::Rejected.is_terminal());
        assert!(SubmissionStatus::Error.is_terminal());
        assert!(!SubmissionStatus::Processing.is_terminal());
        assert!(!SubmissionStatus::Pending.is_terminal());
    }
}
