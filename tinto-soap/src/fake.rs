//! An in-memory [`DianTransport`] stand-in for tests, grounded on the
//! teacher's `node/src/command/test/mock_api.rs`: a `tokio::sync::Mutex`
//! guarding an in-process map, implementing the same trait the real client
//! does, with no network involved.
//!
//! Unlike the teacher's `MockApiClient` (which answers JSON requests
//! directly), this fake still round-trips every call through the real SOAP
//! envelope builder and the real namespace-agnostic parser in [`envelope`] —
//! it only skips the socket. That way a test exercising retries or fault
//! handling is exercising the same XML code the production client runs.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::envelope;
use crate::wsse::UsernameToken;
use crate::{AsyncResponse, DianTransport, SoapFailure, StatusZipResponse};

/// A single queued reply to the next `send_bill_async` or `get_status_zip`
/// call. Queues let a test script a retry: e.g. two `Error`s followed by an
/// `Ok`.
enum Scripted<T> {
    Ok(T),
    Err(SoapFailure),
}

struct FakeState {
    next_track_id: u64,
    send_bill_script: VecDeque<Scripted<()>>,
    status_script: HashMap<String, VecDeque<Scripted<StatusZipResponse>>>,
    submitted: HashMap<String, (String, String)>,
}

/// A configurable fake transport. By default every call succeeds:
/// `send_bill_async` mints a fresh track id, and `get_status_zip` answers
/// DIAN's "still processing" code (`"00"`, §4.9) until a canned terminal
/// response is queued with [`FakeTransport::queue_status`].
pub struct FakeTransport {
    state: Mutex<FakeState>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_track_id: 1,
                send_bill_script: VecDeque::new(),
                status_script: HashMap::new(),
                submitted: HashMap::new(),
            }),
        }
    }

    /// Make the next `send_bill_async` call fail with `failure` instead of
    /// succeeding.
    pub async fn queue_send_bill_failure(&self, failure: SoapFailure) {
        self.state
            .lock()
            .await
            .send_bill_script
            .push_back(Scripted::Err(failure));
    }

    /// Queue the next `get_status_zip(track_id)` response: either a terminal
    /// result or a failure a retry loop should recover from.
    pub async fn queue_status(&self, track_id: &str, response: StatusZipResponse) {
        self.state
            .lock()
            .await
            .status_script
            .entry(track_id.to_string())
            .or_default()
            .push_back(Scripted::Ok(response));
    }

    pub async fn queue_status_failure(&self, track_id: &str, failure: SoapFailure) {
        self.state
            .lock()
            .await
            .status_script
            .entry(track_id.to_string())
            .or_default()
            .push_back(Scripted::Err(failure));
    }

    /// The `(filename, zip_base64)` pair most recently accepted for
    /// `track_id`, for test assertions.
    pub async fn submitted_payload(&self, track_id: &str) -> Option<(String, String)> {
        self.state.lock().await.submitted.get(track_id).cloned()
    }
}

fn dummy_token() -> UsernameToken {
    UsernameToken {
        username: "FAKE".to_string(),
        password_digest_hex: String::new(),
        nonce_b64: String::new(),
        created: Utc::now(),
    }
}

#[async_trait]
impl DianTransport for FakeTransport {
    async fn send_bill_async(
        &self,
        filename: &str,
        zip_base64: &str,
    ) -> Result<AsyncResponse, SoapFailure> {
        // Exercise the real request serialization even though nothing is
        // sent anywhere.
        let request_xml = envelope::build_send_bill_request(filename, zip_base64, &dummy_token())
            .map_err(|e| SoapFailure::Malformed(e.to_string()))?;
        if envelope::find_element_text(&request_xml, "fileName").as_deref() != Some(filename) {
            return Err(SoapFailure::Malformed(
                "fake transport: serialized request lost the filename".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        if let Some(Scripted::Err(failure)) = state.send_bill_script.pop_front() {
            return Err(failure);
        }

        let track_id = format!("FAKE-TRACK-{}", state.next_track_id);
        state.next_track_id += 1;
        state
            .submitted
            .insert(track_id.clone(), (filename.to_string(), zip_base64.to_string()));

        // Round-trip through a synthetic response envelope so the real
        // parser runs, not just a struct literal.
        let response_xml = format!(
            "<soap:Envelope xmlns:soap=\"{}\"><soap:Body><wcf:SendBillAsyncResponse xmlns:wcf=\"{}\"><wcf:trackId>{}</wcf:trackId></wcf:SendBillAsyncResponse></soap:Body></soap:Envelope>",
            envelope::SOAP_NS,
            envelope::DIAN_NS,
            track_id,
        );
        let parsed_track_id = envelope::find_element_text(&response_xml, "trackId")
            .ok_or(SoapFailure::MissingTrackId)?;

        Ok(AsyncResponse {
            success: true,
            track_id: Some(parsed_track_id),
            error_code: None,
            error_message: None,
        })
    }

    async fn get_status_zip(&self, track_id: &str) -> Result<StatusZipResponse, SoapFailure> {
        let request_xml = envelope::build_get_status_request(track_id, &dummy_token())
            .map_err(|e| SoapFailure::Malformed(e.to_string()))?;
        if envelope::find_element_text(&request_xml, "trackId").as_deref() != Some(track_id) {
            return Err(SoapFailure::Malformed(
                "fake transport: serialized request lost the track id".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        let queue = state.status_script.entry(track_id.to_string()).or_default();
        match queue.pop_front() {
            Some(Scripted::Ok(response)) => Ok(response),
            Some(Scripted::Err(failure)) => Err(failure),
            None => Ok(StatusZipResponse {
                track_id: track_id.to_string(),
                status_code: "00".to_string(),
                status_message: None,
                zip_base64: String::new(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn send_bill_async_mints_distinct_track_ids() {
        let fake = FakeTransport::new();
        let first = fake.send_bill_async("a.xml", "QQ==").await.unwrap();
        let second = fake.send_bill_async("b.xml", "Qg==").await.unwrap();
        assert_ne!(first.track_id, second.track_id);
    }

    #[tokio::test]
    async fn queued_failure_is_returned_once() {
        let fake = FakeTransport::new();
        fake.queue_send_bill_failure(SoapFailure::MissingTrackId)
            .await;
        let err = fake.send_bill_async("a.xml", "QQ==").await.unwrap_err();
        assert!(matches!(err, SoapFailure::MissingTrackId));

        let ok = fake.send_bill_async("a.xml", "QQ==").await.unwrap();
        assert!(ok.track_id.is_some());
    }

    #[tokio::test]
    async fn status_defaults_to_still_processing_until_queued() {
        let fake = FakeTransport::new();
        let submitted = fake.send_bill_async("a.xml", "QQ==").await.unwrap();
        let track_id = submitted.track_id.unwrap();

        let pending = fake.get_status_zip(&track_id).await.unwrap();
        assert_eq!(pending.status_code, "00");

        fake.queue_status(
            &track_id,
            StatusZipResponse {
                track_id: track_id.clone(),
                status_code: "02".to_string(),
                status_message: None,
                zip_base64: "Zg==".to_string(),
            },
        )
        .await;
        let done = fake.get_status_zip(&track_id).await.unwrap();
        assert_eq!(done.status_code, "02");
    }
}
