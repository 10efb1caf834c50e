use thiserror::Error;

/// Errors that can occur when decoding, querying or fetching VAST documents
#[derive(Error, Debug)]
pub enum VastError {
    #[error("Failed to parse XML: {0}")]
    XmlParseError(#[from] quick_xml::Error),

    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("invalid offset: {0}")]
    InvalidOffset(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("VAST document contains no ads")]
    NoAds,

    #[error("ad contains no InLine element")]
    NoInline,

    #[error("InLine contains no creatives")]
    NoCreatives,

    #[error("creative contains no Linear element")]
    NoLinear,

    #[error("Linear contains no media files")]
    NoMediaFiles,

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Failed to fetch VAST: {0}")]
    FetchError(String),

    #[error("Unknown error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, VastError>;
