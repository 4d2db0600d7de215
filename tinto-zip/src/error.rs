//! ZIP packaging/unpackaging failure modes.

#[derive(Debug, thiserror::Error)]
pub enum ZipFailure {
    #[error("base64 decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("io error building or reading the archive: {0}")]
    Io(#[from] std::io::Error),

    #[error("decoded xml entry is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("archive has no entry whose name ends in .xml")]
    NoXmlEntry,
}
