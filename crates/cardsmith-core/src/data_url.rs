//! `data:` URL encoding and decoding.

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

/// Marker produced for a canvas that has nothing to encode.
pub const EMPTY_DATA_URL: &str = "data:,";

#[derive(Debug, Error, PartialEq)]
pub enum DataUrlError {
    #[error("Empty data URL")]
    Empty,
    #[error("Not a data URL")]
    NotDataUrl,
    #[error("Data URL is not base64 encoded")]
    NotBase64,
    #[error("Invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),
}

/// A decoded `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Media type, empty when the URL omits it.
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl DataUrl {
    pub fn parse(url: &str) -> Result<Self, DataUrlError> {
        let url = url.trim();
        if url.is_empty() || url == EMPTY_DATA_URL {
            return Err(DataUrlError::Empty);
        }
        let rest = url.strip_prefix("data:").ok_or(DataUrlError::NotDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUrlError::NotDataUrl)?;
        let mime_type = header.strip_suffix(";base64").ok_or(DataUrlError::NotBase64)?;
        if payload.is_empty() {
            return Err(DataUrlError::Empty);
        }
        let data = STANDARD.decode(payload)?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            data,
        })
    }

    /// Format bytes as a base64 data URL.
    pub fn encode(mime_type: &str, data: &[u8]) -> String {
        format!("data:{mime_type};base64,{}", STANDARD.encode(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_png_url() {
        let url = DataUrl::encode("image/png", b"\x89PNG");
        let parsed = DataUrl::parse(&url).expect("parse");
        assert_eq!(parsed.mime_type, "image/png");
        assert_eq!(parsed.data, b"\x89PNG");
    }

    #[test]
    fn test_empty_marker() {
        assert_eq!(DataUrl::parse(EMPTY_DATA_URL), Err(DataUrlError::Empty));
        assert_eq!(DataUrl::parse(""), Err(DataUrlError::Empty));
        assert_eq!(DataUrl::parse("data:image/png;base64,"), Err(DataUrlError::Empty));
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(DataUrl::parse("https://x/y.png"), Err(DataUrlError::NotDataUrl));
        assert_eq!(DataUrl::parse("data:text/plain,hello"), Err(DataUrlError::NotBase64));
        assert!(matches!(DataUrl::parse("data:image/png;base64,@@@"), Err(DataUrlError::Payload(_))));
    }
}
