//! Request signature authentication and replay protection (§4.3).

pub mod failure;
pub mod replay_guard;
pub mod validate;

pub use failure::AuthFailure;
pub use replay_guard::ReplayGuard;
pub use validate::{authenticate, expected_signature, IncomingRequest};
