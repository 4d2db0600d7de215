#[derive(Debug, thiserror::Error)]
pub enum UblError {
    #[error("xml writer failure: {0}")]
    Writer(#[from] quick_xml::Error),

    #[error("invalid utf-8 produced while building xml: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
