//! Dependency bundles shared by [`crate::submit`] and [`crate::status`].
//!
//! A handful of long-lived collaborators (an API client, a persistence
//! port, a root key) threaded explicitly through command handlers rather
//! than reached for as a global — `OrchestratorContext` plays that role
//! here, and `IssuerCredential` groups the one-per-issuer signing material
//! that's resolved by the caller before `submit` runs.

use std::sync::Arc;

use tinto_crypto::aes::AesKey;
use tinto_soap::DianTransport;
use tinto_store::Store;
use tinto_ubl::SoftwareIdentity;
use tinto_xmlsign::Credential;

/// Collaborators shared across every invoice and submission the orchestrator
/// handles: the persistence port, the DIAN transport, and the key used to
/// encrypt/decrypt blob columns at rest (§4.10).
pub struct OrchestratorContext {
    pub store: Arc<dyn Store>,
    pub transport: Arc<dyn DianTransport>,
    pub blob_key: AesKey,
}

impl OrchestratorContext {
    pub fn new(store: Arc<dyn Store>, transport: Arc<dyn DianTransport>, blob_key: AesKey) -> Self {
        Self {
            store,
            transport,
            blob_key,
        }
    }
}

/// The signing material and DIAN-registered identity for one issuer,
/// resolved once (by decrypting `Issuer::certificate_blob`, out of this
/// crate's scope) and reused across every invoice that issuer submits.
pub struct IssuerCredential {
    pub credential: Credential,
    pub software: SoftwareIdentity,
    /// CUFE/CUDE input field 10 (§4.4): environment-scoped constant DIAN
    /// assigns per technical registration.
    pub technical_key: String,
}
