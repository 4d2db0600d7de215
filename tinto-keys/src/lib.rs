//! Master-key custody and API-key derivation (§4.2).
//!
//! This crate owns the only two pieces of long-lived secret material in the
//! whole pipeline: the process-wide master key, and the derived API keys
//! that gate external access. Plays the role the teacher's `root_seed` +
//! `password` modules play for node enrollment secrets, adapted to a single
//! process-wide key rather than a per-user seed.

pub mod api_key;
pub mod error;
pub mod master_key;
pub mod repo;

pub use api_key::{ApiKey, ApiKeyRole, NewApiKeySecret};
pub use error::KeyCustodyFailure;
pub use master_key::MasterKey;
pub use repo::ApiKeyRepo;
