//! Error types for the requeue tool.

use serde_json::Value;
use thiserror::Error;

/// Errors raised while talking to the broker or resolving a destination.
#[derive(Debug, Error)]
pub enum RequeueError {
    /// The management API answered with a non-200 status.
    #[error("broker returned {status}: {body}")]
    BrokerResponse {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The request never produced a response (connect failure, timeout, bad URL).
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The message carries no usable `NServiceBus.FailedQ` header and no
    /// explicit destination queue was given.
    #[error("the source queue could not be determined")]
    SourceQueueUndetermined,
}

/// A requeue run that stopped before publishing every fetched message.
///
/// The fetch step removes messages from the source queue without requeueing
/// them at the broker, so everything in `unpublished` (the failing message
/// and all messages after it) exists only in this process once the run
/// aborts. Callers are expected to surface that list rather than drop it.
#[derive(Debug, Error)]
#[error("requeue stopped after {processed} of {total} messages: {source}")]
pub struct RequeueAborted {
    /// Messages successfully republished before the failure.
    pub processed: usize,
    /// Messages fetched for this run.
    pub total: usize,
    /// Messages that were dequeued but never made it back to the broker.
    pub unpublished: Vec<Value>,
    /// The failure that stopped the run.
    #[source]
    pub source: RequeueError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_broker_response_shows_status_and_body() {
        let err = RequeueError::BrokerResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "{\"error\":\"not_authorised\"}".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("not_authorised"));
    }

    #[test]
    fn test_aborted_reports_progress() {
        let aborted = RequeueAborted {
            processed: 1,
            total: 3,
            unpublished: vec![Value::Null, Value::Null],
            source: RequeueError::SourceQueueUndetermined,
        };
        let message = aborted.to_string();
        assert!(message.contains("after 1 of 3"));
        assert!(message.contains("source queue could not be determined"));
    }
}
