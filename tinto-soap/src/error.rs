//! SOAP transport failure modes (§4.8).

#[derive(Debug, thiserror::Error)]
pub enum SoapFailure {
    /// Connection-level failure (DNS, TLS, connect/receive timeout).
    /// Retryable.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// HTTP-level failure. 5xx is retryable, 4xx is not (§4.8).
    #[error("http {status} response: {body}")]
    Http { status: u16, body: String },

    /// A SOAP fault carrying a structured DIAN error list (e.g. a
    /// code-catalog hit like `FAD06`). Never retryable.
    #[error("soap fault {code:?}: {message:?}")]
    Fault {
        code: Option<String>,
        message: Option<String>,
    },

    /// `SendBillAsync` succeeded at the transport level but the response
    /// carries no track id — treated as non-retryable per §4.8.
    #[error("SendBillAsync response carried no track id")]
    MissingTrackId,

    /// The response body didn't parse as the expected SOAP shape.
    #[error("malformed soap response: {0}")]
    Malformed(String),
}

impl SoapFailure {
    /// Whether a fresh attempt of the *same* call could plausibly succeed.
    /// Connection errors and 5xx retry; 4xx, faults, and a missing track id
    /// do not (§4.8).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(err) => !err.is_builder() && !err.is_decode(),
            Self::Http { status, .. } => (500..600).contains(status),
            Self::Fault { .. } | Self::MissingTrackId | Self::Malformed(_) => false,
        }
    }
}
