//! Fetch utilities for linked stylesheets.
//!
//! The inliner core never performs I/O itself. The stylesheet loader in
//! `koala-inline` uses these helpers as its default collaborator: `data:` URLs
//! are decoded in memory and everything else goes through a blocking HTTP GET.

use std::time::Duration;

use base64::Engine;
use thiserror::Error;

/// User-Agent header sent with all requests.
const USER_AGENT: &str = concat!("koala-inline/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Failure to fetch or decode a resource.
#[derive(Debug, Error)]
pub enum NetError {
    /// The `data:` URL has no comma separating metadata from payload.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),
    /// The base64 payload could not be decoded.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The payload is not valid UTF-8.
    #[error("resource is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// The HTTP client failed (connection, timeout, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("HTTP error: {0}")]
    Status(u16),
}

/// A parsed `data:` URL.
///
/// [RFC 2397](https://www.rfc-editor.org/rfc/rfc2397)
///
/// `data:[<mediatype>][;base64],<data>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Media type and parameters, without the `;base64` marker.
    pub media_type: String,
    /// Whether the payload is base64 encoded.
    pub base64: bool,
    /// Raw payload after the comma.
    pub payload: String,
}

impl DataUrl {
    /// Parse a raw `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::InvalidDataUrl`] if the scheme is missing or there
    /// is no comma.
    pub fn parse(raw: &str) -> Result<Self, NetError> {
        let rest = raw
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| NetError::InvalidDataUrl(raw.to_string()))?;
        let (metadata, payload) = rest
            .split_once(',')
            .ok_or_else(|| NetError::InvalidDataUrl(raw.to_string()))?;
        let (media_type, base64) = metadata
            .strip_suffix(";base64")
            .map_or((metadata, false), |m| (m, true));
        Ok(Self {
            media_type: media_type.to_string(),
            base64,
            payload: payload.to_string(),
        })
    }

    /// Decode the payload into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Base64`] if a base64 payload is malformed.
    pub fn decode(&self) -> Result<Vec<u8>, NetError> {
        if self.base64 {
            return Ok(base64::engine::general_purpose::STANDARD.decode(self.payload.trim())?);
        }
        Ok(percent_decode(&self.payload))
    }

    /// Decode the payload as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails or the bytes are not UTF-8.
    pub fn decode_text(&self) -> Result<String, NetError> {
        Ok(String::from_utf8(self.decode()?)?)
    }
}

fn percent_decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(hex) = input.get(i + 1..i + 3)
            && hex.bytes().all(|b| b.is_ascii_hexdigit())
            && let Ok(byte) = u8::from_str_radix(hex, 16)
        {
            out.push(byte);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

/// Fetch a URL and return its body as text.
///
/// `data:` URLs are decoded locally without touching the network.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created, the request
/// fails, the response has a non-success status, or the body cannot be decoded.
pub fn fetch_text(url: &str) -> Result<String, NetError> {
    if url.trim_start().starts_with("data:") {
        return DataUrl::parse(url)?.decode_text();
    }

    tracing::debug!(url, "fetching stylesheet");
    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;

    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(NetError::Status(status.as_u16()));
    }
    Ok(response.text()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_data_url() {
        let url = DataUrl::parse("data:text/css;base64,aDF7Y29sb3I6cmVkfQ==").unwrap();
        assert!(url.base64);
        assert_eq!(url.media_type, "text/css");
        assert_eq!(url.decode_text().unwrap(), "h1{color:red}");
    }

    #[test]
    fn test_percent_encoded_data_url() {
        let url = DataUrl::parse("data:text/css,p%7Bmargin%3A0%7D").unwrap();
        assert!(!url.base64);
        assert_eq!(url.decode_text().unwrap(), "p{margin:0}");
    }

    #[test]
    fn test_percent_decode_needs_two_hex_digits() {
        assert_eq!(percent_decode("%+f%2"), b"%+f%2");
        assert_eq!(percent_decode("%-1%zz%41"), b"%-1%zzA");
    }

    #[test]
    fn test_data_url_without_comma_is_error() {
        assert!(matches!(
            DataUrl::parse("data:text/css"),
            Err(NetError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn test_fetch_text_decodes_data_url_locally() {
        assert_eq!(fetch_text("data:,a%20b").unwrap(), "a b");
    }
}
