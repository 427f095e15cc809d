use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Where an encoded clip comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
    Url(String),
}

impl AudioSource {
    /// `http://` and `https://` locators are URLs; anything else is a path.
    pub fn parse(locator: &str) -> Self {
        let lower = locator.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            AudioSource::Url(locator.to_string())
        } else {
            AudioSource::Path(PathBuf::from(locator))
        }
    }

    /// Read or fetch the encoded bytes. No retries; a failure surfaces as is.
    pub async fn load(&self, client: &reqwest::Client) -> Result<Vec<u8>> {
        match self {
            AudioSource::Bytes(bytes) => Ok(bytes.clone()),
            AudioSource::Path(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|source| Error::Io {
                    locator: path.display().to_string(),
                    source,
                })?;
                log::info!("read {} bytes from {}", bytes.len(), path.display());
                Ok(bytes)
            }
            AudioSource::Url(url) => {
                let fetch_err = |source| Error::Fetch {
                    locator: url.clone(),
                    source,
                };
                let response = client
                    .get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(fetch_err)?;
                let bytes = response.bytes().await.map_err(fetch_err)?;
                log::info!("fetched {} bytes from {}", bytes.len(), url);
                Ok(bytes.to_vec())
            }
        }
    }
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioSource::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            AudioSource::Path(path) => write!(f, "{}", path.display()),
            AudioSource::Url(url) => f.write_str(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            AudioSource::parse("https://example.org/dog.flac"),
            AudioSource::Url("https://example.org/dog.flac".into())
        );
        assert_eq!(
            AudioSource::parse("HTTP://example.org/a.wav"),
            AudioSource::Url("HTTP://example.org/a.wav".into())
        );
        assert_eq!(
            AudioSource::parse("sounds/crunch.wav"),
            AudioSource::Path(PathBuf::from("sounds/crunch.wav"))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(AudioSource::Bytes(vec![0; 3]).to_string(), "<3 bytes>");
        assert_eq!(AudioSource::parse("a/b.wav").to_string(), "a/b.wav");
    }

    #[tokio::test]
    async fn test_load_bytes_and_path() {
        let client = reqwest::Client::new();
        let data = vec![1u8, 2, 3, 4];
        assert_eq!(AudioSource::Bytes(data.clone()).load(&client).await.unwrap(), data);

        let path = std::env::temp_dir().join(format!("foley-pitch-source-{}.bin", std::process::id()));
        std::fs::write(&path, &data).unwrap();
        let loaded = AudioSource::Path(path.clone()).load(&client).await.unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, data);
    }

    #[tokio::test]
    async fn test_missing_path_is_decode_failure() {
        let client = reqwest::Client::new();
        let err = AudioSource::parse("/nonexistent/foley-pitch/none.wav")
            .load(&client)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.is_decode_failure());
    }

    #[tokio::test]
    async fn test_unreachable_url_is_decode_failure() {
        let client = reqwest::Client::new();
        let err = AudioSource::parse("http://127.0.0.1:9/none.wav")
            .load(&client)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
        assert!(err.is_decode_failure());
    }
}
