use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::{ApiError, Result};

/// Successful (2xx) response.
///
/// The body is kept as the raw bytes received; decoding is left to the caller.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// Attempts made, including the successful one.
    pub attempts: usize,
    /// Total time slept in backoff before the successful attempt.
    pub total_backoff: Duration,
}

impl ApiResponse {
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|err| ApiError::Decode(format!("response body is not valid UTF-8: {err}")))
    }

    /// Decodes the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|err| {
            ApiError::Decode(format!(
                "invalid response JSON: {err}; body: {}",
                String::from_utf8_lossy(&self.body)
            ))
        })
    }

    pub fn json_value(&self) -> Result<serde_json::Value> {
        self.json()
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Target of the `rel="next"` entry in the `Link` header.
    pub fn next_page_url(&self) -> Option<String> {
        parse_next_link(self.header("link")?)
    }
}

fn parse_next_link(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|value| value.strip_suffix('>'))
            .map(str::to_owned)
    })
}
