/*
 *  http.rs
 *
 *  smart-display - weather & clock panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Shared HTTP client for the time and forecast feeds
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use flate2::read::GzDecoder;
use log::{debug, warn};
use reqwest::{Client, StatusCode, header};
use std::io::Read;
use std::time::Duration;

use crate::error::FeedError;

const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

/// Thin wrapper over a reqwest client with our headers, timeouts and
/// a bounded number of attempts per request.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    attempts: u8,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, attempts: u8) -> Result<Self, FeedError> {
        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));
        headers.insert("Accept-Encoding", header::HeaderValue::from_static("gzip"));
        headers.insert("Connection", header::HeaderValue::from_static("close"));

        let client = Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(2)))
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, attempts: attempts.max(1) })
    }

    /// GET `url` with `query`, returning the (decompressed) body bytes.
    ///
    /// Anything but 200 OK is a `NetworkUnavailable`. Transport errors are
    /// retried up to the configured number of attempts, status errors are not.
    pub async fn get_bytes(&self, url: &str, query: &[(&str, String)]) -> Result<Vec<u8>, FeedError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).query(query).send().await {
                Ok(response) => {
                    check_status(response.status())?;
                    let raw = response.bytes().await?;
                    debug!("GET {} -> {} bytes", url, raw.len());
                    return Ok(maybe_gunzip(&raw));
                }
                Err(e) => {
                    if attempt >= self.attempts {
                        return Err(e.into());
                    }
                    warn!("GET {} failed (attempt {}/{}): {}", url, attempt, self.attempts, e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

/// Only a plain 200 carries a usable document.
pub fn check_status(status: StatusCode) -> Result<(), FeedError> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(FeedError::NetworkUnavailable(format!("HTTP status {}", status)))
    }
}

/// Gzip bodies are decoded, anything else is passed through verbatim.
pub fn maybe_gunzip(raw: &[u8]) -> Vec<u8> {
    if raw.len() < 2 || raw[0] != 0x1f || raw[1] != 0x8b {
        return raw.to_vec();
    }
    let mut decoder = GzDecoder::new(raw);
    let mut decoded = Vec::new();
    match decoder.read_to_end(&mut decoded) {
        Ok(_) => decoded,
        Err(_) => raw.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    #[test]
    fn test_plain_body_passes_through() {
        let body = br#"{"time": 1766526829}"#;
        assert_eq!(maybe_gunzip(body), body.to_vec());
    }

    #[test]
    fn test_gzip_body_is_decoded() {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"{\"time\": 42}").unwrap();
        let packed = enc.finish().unwrap();
        assert_eq!(maybe_gunzip(&packed), b"{\"time\": 42}".to_vec());
    }

    #[test]
    fn test_only_200_is_accepted() {
        assert!(check_status(StatusCode::OK).is_ok());
        for status in [StatusCode::NO_CONTENT, StatusCode::PARTIAL_CONTENT, StatusCode::NOT_FOUND] {
            let err = check_status(status).unwrap_err();
            assert!(matches!(err, FeedError::NetworkUnavailable(_)));
            assert_eq!(err.kind(), "network");
        }
    }

    #[test]
    fn test_fetcher_builds() {
        let fetcher = HttpFetcher::new(Duration::from_millis(500), 0).unwrap();
        assert_eq!(fetcher.attempts, 1);
    }
}
