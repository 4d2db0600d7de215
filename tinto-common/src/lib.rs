//! Shared domain model and error taxonomy for the Tinto issuance pipeline.
//!
//! A single place for the value types every other Tinto crate needs, plus
//! the closed error enum that crosses every component boundary. It carries
//! no business logic of its own beyond small invariant-preserving
//! constructors.

pub mod audit;
pub mod blob;
pub mod environment;
pub mod error;
pub mod ids;
pub mod invoice;
pub mod money;
pub mod party;
pub mod replay;
pub mod submission;

pub use audit::{AuditEvent, AuditEventKind};
pub use blob::EncryptedBlob;
pub use environment::{Environment, EnvironmentName};
pub use error::{ErrorCategory, ErrorResponse, TintoError};
pub use ids::{
    ApiKeyFingerprint, ApiKeyId, CustomerId, EnvironmentId, InvoiceId, IssuerId, SubmissionId,
};
pub use invoice::{DocumentType, Invoice, InvoiceStatus, LineItem};
pub use money::{Currency, MinorUnits};
pub use party::{Customer, IdType, Issuer};
pub use replay::RequestSignature;
pub use submission::{Submission, SubmissionStatus};
