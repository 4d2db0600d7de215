//! The submission orchestrator (§4.9): invoice/submission state machines,
//! DIAN error classification (§4.11), and cooperative-cancellation polling.
//!
//! This crate is the one place every other Tinto crate comes together:
//! `tinto-cufe` for fingerprinting, `tinto-ubl` for document construction,
//! `tinto-xmlsign` for signing, `tinto-zip` for packaging, `tinto-soap` for
//! transport, and `tinto-store` for persistence. Grounded on the teacher's
//! `node/src/command` modules, which play the analogous "wire the building
//! blocks together into one business operation" role.

pub mod cancel;
pub mod context;
pub mod error;
pub mod error_map;
pub mod status;
pub mod submit;

pub use cancel::CancellationToken;
pub use context::{IssuerCredential, OrchestratorContext};
pub use error::OrchestratorFailure;
pub use status::{check_status, poll_until_final};
pub use submit::submit;
