use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not fetch {locator}: {source}")]
    Fetch {
        locator: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not read {locator}: {source}")]
    Io {
        locator: String,
        #[source]
        source: std::io::Error,
    },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("decoded audio contains no samples")]
    EmptyAudio,
    #[error("invalid analysis config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// True for every failure to turn a resource into samples.
    pub fn is_decode_failure(&self) -> bool {
        !matches!(self, Error::InvalidConfig(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
