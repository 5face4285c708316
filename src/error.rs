use thiserror::Error;

#[derive(Error, Debug)]
pub enum Id3Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a supported ID3v2 tag: {0}")]
    Format(String),

    #[error("unsupported ID3v2 feature: {0}")]
    Unsupported(&'static str),

    #[error("malformed frame payload: {0}")]
    Payload(String),
}

pub type Result<T> = std::result::Result<T, Id3Error>;
