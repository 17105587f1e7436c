//! Error taxonomy for the feed engine.
//!
//! Only two kinds of failure exist at the type level:
//!
//! * [`SourceError`] — one source's fetch went wrong.  The orchestrator
//!   contains it and treats that source as having returned nothing.
//! * [`FeedError`] — a whole cycle failed.  Its `Display` text is what ends
//!   up in [`FeedState::error`](crate::state::FeedState::error).
//!
//! Malformed upstream items are not errors at all; the normaliser coerces
//! them to safe defaults.

use std::time::Duration;

use thiserror::Error;

use crate::source::SourceType;

/// Failure of a single source call.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("request rejected: {0}")]
    Unsuccessful(String),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(err.to_string())
    }
}

/// Failure of a whole fetch cycle.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("all sources failed on page {page}: {}", summarize(.failures))]
    AllSourcesFailed {
        page: u32,
        failures: Vec<(SourceType, SourceError)>,
    },
}

fn summarize(failures: &[(SourceType, SourceError)]) -> String {
    failures
        .iter()
        .map(|(source, err)| format!("{source}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_failure_message_names_every_source() {
        let err = FeedError::AllSourcesFailed {
            page: 2,
            failures: vec![
                (SourceType::JobPickup, SourceError::Network("refused".into())),
                (SourceType::Campaign, SourceError::Timeout(Duration::from_secs(10))),
                (
                    SourceType::Post,
                    SourceError::Api {
                        status: 503,
                        message: "down".into(),
                    },
                ),
            ],
        };

        let msg = err.to_string();
        assert!(msg.starts_with("all sources failed on page 2"));
        assert!(msg.contains("job pickups: network error: refused"));
        assert!(msg.contains("campaigns: timed out after 10s"));
        assert!(msg.contains("posts: API error (status 503): down"));
    }
}
