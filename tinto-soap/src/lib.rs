//! SOAP 1.2 transport for DIAN's two asynchronous invoicing operations
//! (§4.8): `SendBillAsync` and `GetStatusZip`.
//!
//! Grounded directly on the teacher's `node/src/api/client.rs` shape — a
//! `reqwest::Client` built once with a fixed timeout, a typed request/retry
//! pair, and an explicit backoff iterator — adapted from JSON-over-HTTP to
//! SOAP-over-HTTPS, and from the teacher's exponential formula to DIAN's
//! fixed retry schedule (§4.8, [`backoff`]).

pub mod backoff;
pub mod envelope;
pub mod error;
pub mod wsse;

#[cfg(feature = "test-utils")]
pub mod fake;

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

pub use error::SoapFailure;
use wsse::UsernameToken;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const RECEIVE_TIMEOUT: Duration = Duration::from_secs(60);

/// DIAN's `SendBillAsync` response shape (§4.8).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AsyncResponse {
    pub success: bool,
    pub track_id: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

/// DIAN's `GetStatusZip` response shape (§4.8).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusZipResponse {
    pub track_id: String,
    pub status_code: String,
    pub status_message: Option<String>,
    pub zip_base64: String,
}

/// The two DIAN operations the submission orchestrator calls, abstracted so
/// tests can substitute [`fake::FakeTransport`] without touching the
/// network (§5: "all cryptographic and XML work is purely CPU-bound and must
/// never touch the network" — conversely, only this trait's implementors
/// may).
#[async_trait]
pub trait DianTransport: Send + Sync {
    async fn send_bill_async(
        &self,
        filename: &str,
        zip_base64: &str,
    ) -> Result<AsyncResponse, SoapFailure>;

    async fn get_status_zip(&self, track_id: &str) -> Result<StatusZipResponse, SoapFailure>;
}

/// Per-call credentials and endpoint the real client needs; threaded in per
/// call (rather than baked into the client at construction) since the
/// technical-key-scoped `SoftwareID`/`SoftwarePIN` pair can differ per
/// environment or per issuer (§6 configuration surface).
#[derive(Clone, Debug)]
pub struct DianCredentials {
    pub software_id: String,
    pub software_pin: String,
}

pub struct DianSoapClient {
    http: reqwest::Client,
    endpoint: String,
    credentials: DianCredentials,
}

impl DianSoapClient {
    pub fn new(endpoint: String, credentials: DianCredentials) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(RECEIVE_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");
        Self {
            http,
            endpoint,
            credentials,
        }
    }

    fn fresh_token(&self) -> UsernameToken {
        let mut rng = tinto_crypto::rng::SysRng::new();
        UsernameToken::new(
            &self.credentials.software_id,
            &self.credentials.software_pin,
            &mut rng,
            chrono::Utc::now(),
        )
    }

    async fn post_envelope(&self, soap_action: &str, body: String) -> Result<String, SoapFailure> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/soap+xml; charset=utf-8")
            .header("SOAPAction", soap_action)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if envelope::is_soap_fault(&text) {
            return Err(SoapFailure::Fault {
                code: envelope::find_element_text(&text, "Value"),
                message: envelope::find_element_text(&text, "Text"),
            });
        }
        if !status.is_success() {
            return Err(SoapFailure::Http {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    /// Run `attempt` up to [`backoff::MAX_ATTEMPTS`] times, sleeping the
    /// fixed §4.8 schedule between retryable failures.
    async fn with_retries<F, Fut, T>(&self, mut attempt: F) -> Result<T, SoapFailure>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, SoapFailure>>,
    {
        let mut delays = backoff::get_backoff_iter();
        let mut last_error = None;

        for attempt_number in 0..backoff::MAX_ATTEMPTS {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() => {
                    warn!(attempt_number, %err, "soap call failed, retrying");
                    last_error = Some(err);
                    if attempt_number + 1 < backoff::MAX_ATTEMPTS {
                        if let Some(delay) = delays.next() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_error.expect("loop runs at least once"))
    }
}

#[async_trait]
impl DianTransport for DianSoapClient {
    async fn send_bill_async(
        &self,
        filename: &str,
        zip_base64: &str,
    ) -> Result<AsyncResponse, SoapFailure> {
        self.with_retries(|| async {
            let body =
                envelope::build_send_bill_request(filename, zip_base64, &self.fresh_token())
                    .map_err(|e| SoapFailure::Malformed(e.to_string()))?;
            let response_xml = self
                .post_envelope(
                    "http://wcf.dian.colombia/ws/IWcfDianCustomerServices/SendBillAsync",
                    body,
                )
                .await?;

            let track_id = envelope::find_element_text(&response_xml, "trackId")
                .or_else(|| envelope::find_element_text(&response_xml, "TrackId"));
            if track_id.is_none() {
                return Err(SoapFailure::MissingTrackId);
            }

            Ok(AsyncResponse {
                success: true,
                track_id,
                error_code: envelope::find_element_text(&response_xml, "errorCode"),
                error_message: envelope::find_element_text(&response_xml, "errorMessage"),
            })
        })
        .await
    }

    async fn get_status_zip(&self, track_id: &str) -> Result<StatusZipResponse, SoapFailure> {
        self.with_retries(|| async {
            let body = envelope::build_get_status_request(track_id, &self.fresh_token())
                .map_err(|e| SoapFailure::Malformed(e.to_string()))?;
            let response_xml = self
                .post_envelope(
                    "http://wcf.dian.colombia/ws/IWcfDianCustomerServices/GetStatusZip",
                    body,
                )
                .await?;

            let status_code = envelope::find_element_text(&response_xml, "statusCode")
                .ok_or_else(|| SoapFailure::Malformed("missing statusCode".to_string()))?;
            let zip_base64 = envelope::find_element_text(&response_xml, "zipBase64")
                .unwrap_or_default();

            Ok(StatusZipResponse {
                track_id: track_id.to_string(),
                status_code,
                status_message: envelope::find_element_text(&response_xml, "statusMessage"),
                zip_base64,
            })
        })
        .await
    }
}
