//! Failure modes for [`crate::submit::submit`] and
//! [`crate::status::check_status`].

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorFailure {
    /// `submit` was asked to run on an invoice outside the states it's
    /// defined for, or a CAS lost a race against a concurrent caller (§5).
    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("ubl build failed: {0}")]
    Ubl(#[from] tinto_ubl::UblError),

    #[error("signing failed: {0}")]
    Sign(#[from] tinto_xmlsign::SignFailure),

    #[error("zip packaging failed: {0}")]
    Zip(#[from] tinto_zip::ZipFailure),

    #[error("dian transport failed: {0}")]
    Transport(#[from] tinto_soap::SoapFailure),

    #[error("storage failure: {0}")]
    Store(#[source] anyhow::Error),
}

impl From<anyhow::Error> for OrchestratorFailure {
    fn from(err: anyhow::Error) -> Self {
        Self::Store(err)
    }
}
