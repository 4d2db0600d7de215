//! The composition root (§9: "service locator → explicit composition root in
//! `tinto_node::context`"). Every collaborator the CLI subcommands need is
//! built once, here, and threaded through explicitly — grounded on the
//! teacher's `node::context::MegaContext`: one `init` that does real I/O, one
//! `#[cfg(test)] dummy` that wires the same shape against in-memory fakes.

use std::sync::Arc;

use anyhow::Context as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tinto_common::{EncryptedBlob, EnvironmentId, EnvironmentName, Issuer};
use tinto_orchestrator::{IssuerCredential, OrchestratorContext};
use tinto_soap::{DianCredentials, DianSoapClient, DianTransport};
use tinto_store::Store;
use tinto_ubl::SoftwareIdentity;

use crate::config::Config;

/// Everything a subcommand handler needs. Built once in [`AppContext::init`]
/// and passed by reference into each `command::*` function.
pub struct AppContext {
    pub config: Config,
    pub environment_id: EnvironmentId,
    pub orchestrator: OrchestratorContext,
    pub store: Arc<dyn Store>,
}

impl AppContext {
    /// Wire real collaborators: load the master key per §4.2, build the AES
    /// blob key, the real DIAN SOAP transport, and the in-memory store (the
    /// only `Store` implementation this workspace carries — see DESIGN.md).
    pub fn init(config: Config) -> anyhow::Result<Self> {
        let master_key = tinto_keys::MasterKey::load(
            config.console_discriminator.as_deref(),
            &config.master_key_file,
            &config.system_key_b64,
        )
        .context("failed to load master key")?;
        let blob_key = master_key.aes_key();

        let store: Arc<dyn Store> = Arc::new(tinto_store::memory::MemoryStore::new());

        let transport: Arc<dyn DianTransport> = Arc::new(DianSoapClient::new(
            config.environment_name.soap_endpoint().to_string(),
            DianCredentials {
                software_id: config.software_id.clone(),
                software_pin: config.software_pin.clone(),
            },
        ));

        let orchestrator = OrchestratorContext::new(store.clone(), transport, blob_key);

        Ok(Self {
            config,
            environment_id: EnvironmentId::new_v4(),
            orchestrator,
            store,
        })
    }

    /// Wire the same shape against a caller-supplied fake transport and a
    /// fresh in-memory store, for tests (`tinto_soap::fake::FakeTransport`
    /// per §8 / `node/src/command/test/mock_api.rs`'s role).
    #[cfg(test)]
    pub fn dummy(config: Config, transport: Arc<dyn DianTransport>) -> Self {
        let store: Arc<dyn Store> = Arc::new(tinto_store::memory::MemoryStore::new());
        let blob_key = tinto_crypto::aes::AesKey::new(&[7u8; 32]);
        let orchestrator = OrchestratorContext::new(store.clone(), transport, blob_key);
        Self {
            config,
            environment_id: EnvironmentId::new_v4(),
            orchestrator,
            store,
        }
    }

    pub fn is_production(&self) -> bool {
        self.config.environment_name.is_production()
    }
}

/// The JSON shape an issuer's encrypted `certificate_blob` decrypts to: a
/// PKCS#8 PEM private key plus its DER certificate, base64-wrapped so the
/// blob stays one opaque string end to end (§4.10: the store never sees any
/// of this in plaintext). PKCS#12 container *parsing* is out of scope for
/// this crate (see DESIGN.md) — an operator provisioning an issuer is
/// expected to have already split the container into these two parts.
#[derive(Serialize, Deserialize)]
struct IssuerKeystoreBlob {
    private_key_pkcs8_pem: String,
    certificate_der_b64: String,
}

/// Decrypt `issuer.certificate_blob` and build the [`IssuerCredential`]
/// `tinto_orchestrator::submit` needs. Resolved once per invoice by the
/// caller, matching `tinto-orchestrator`'s documented contract for
/// `IssuerCredential`.
pub fn resolve_issuer_credential(
    ctx: &AppContext,
    issuer: &Issuer,
) -> anyhow::Result<IssuerCredential> {
    let aad = format!("issuer:{}:certificate_blob", issuer.id);
    let plaintext = ctx
        .orchestrator
        .blob_key
        .decrypt(aad.as_bytes(), issuer.certificate_blob.as_str())
        .context("failed to decrypt issuer certificate blob")?;

    let keystore: IssuerKeystoreBlob =
        serde_json::from_slice(&plaintext).context("malformed issuer keystore blob")?;
    let certificate_der = BASE64
        .decode(keystore.certificate_der_b64.as_bytes())
        .context("malformed certificate_der_b64")?;

    let credential = tinto_xmlsign::load_credential(&keystore.private_key_pkcs8_pem, certificate_der)
        .context("failed to load issuer signing credential")?;

    Ok(IssuerCredential {
        credential,
        software: SoftwareIdentity {
            software_provider_id: ctx.config.software_provider_id.clone(),
            software_id: ctx.config.software_id.clone(),
        },
        technical_key: ctx.config.technical_key.clone(),
    })
}

/// Build the blob a fresh issuer's `certificate_blob` column should hold,
/// encrypted under this process's master key — used by test fixtures and by
/// an eventual (out-of-scope) issuer-provisioning REST handler.
pub fn encrypt_issuer_keystore(
    ctx: &AppContext,
    issuer_id: tinto_common::IssuerId,
    private_key_pkcs8_pem: &str,
    certificate_der: &[u8],
    rng: &mut impl tinto_crypto::rng::Crng,
) -> EncryptedBlob {
    let blob = IssuerKeystoreBlob {
        private_key_pkcs8_pem: private_key_pkcs8_pem.to_string(),
        certificate_der_b64: BASE64.encode(certificate_der),
    };
    let plaintext = serde_json::to_vec(&blob).expect("serializing IssuerKeystoreBlob never fails");
    let aad = format!("issuer:{issuer_id}:certificate_blob");
    let ciphertext = ctx
        .orchestrator
        .blob_key
        .encrypt(rng, aad.as_bytes(), &plaintext);
    EncryptedBlob::from_ciphertext(ciphertext)
}

/// Whether `environment_name` is the production catalog entry, reused by
/// `command::issue` to fill CUFE input field 11 and UBL's technical
/// environment flag consistently.
pub fn is_production_environment(environment_name: EnvironmentName) -> bool {
    environment_name.is_production()
}
