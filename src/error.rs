/*
 *  error.rs
 *
 *  smart-display - weather & clock panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Recoverable failures of the time and forecast feeds
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

use thiserror::Error;

/// Failure of a single fetch or of the processing of its payload.
///
/// None of these are fatal. The caller skips the update and keeps whatever
/// the display is currently showing.
#[derive(Debug, Error)]
pub enum FeedError {
    /// No connectivity, timeout, or a non-success HTTP status
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Malformed document or missing/invalid fields
    #[error("parse error: {0}")]
    Parse(String),

    /// Series shorter than one complete day window
    #[error("insufficient data: need {needed} hourly samples, got {available}")]
    InsufficientData { needed: usize, available: usize },
}

impl FeedError {
    /// Short tag used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::NetworkUnavailable(_) => "network",
            FeedError::Parse(_) => "parse",
            FeedError::InsufficientData { .. } => "data",
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FeedError::NetworkUnavailable(format!("HTTP status {}", status)),
            None => FeedError::NetworkUnavailable(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_maps_to_parse() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let feed: FeedError = err.into();
        assert!(matches!(feed, FeedError::Parse(_)));
        assert_eq!(feed.kind(), "parse");
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = FeedError::InsufficientData { needed: 24, available: 10 };
        assert_eq!(err.to_string(), "insufficient data: need 24 hourly samples, got 10");
    }
}
