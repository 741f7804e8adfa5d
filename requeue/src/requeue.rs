//! The requeue driver: resolve destination, scrub, republish, fail fast.

use serde_json::Value;
use tracing::{info, warn};

use crate::broker::Broker;
use crate::error::{RequeueAborted, RequeueError};
use crate::scrub::{resolve_source_queue, scrub_all};

/// Republish every fetched message, in input order, one publish at a time.
///
/// The destination is the explicit queue when given, otherwise it is resolved
/// per message from the `NServiceBus.FailedQ` header, so a mixed batch from
/// different origins routes each message back to its own source queue.
///
/// The first failure (undeterminable destination or non-200 publish) stops
/// the run. The returned `RequeueAborted` carries the count of messages
/// already republished and every message that was not, the failing one
/// included; those messages were removed from the source queue by the fetch
/// step and exist nowhere else.
pub async fn requeue_messages<B: Broker>(
    broker: &B,
    messages: Vec<Value>,
    destination_queue: Option<&str>,
) -> Result<usize, RequeueAborted> {
    let total = messages.len();

    for (index, message) in messages.iter().enumerate() {
        let result = requeue_one(broker, message, destination_queue, index, total).await;

        if let Err(source) = result {
            let unpublished: Vec<Value> = messages[index..].to_vec();
            warn!(
                processed = index,
                total = total,
                unpublished = unpublished.len(),
                error = %source,
                "requeue_aborted_messages_not_republished"
            );
            return Err(RequeueAborted {
                processed: index,
                total,
                unpublished,
                source,
            });
        }
    }

    info!(processed = total, "requeue_complete");
    Ok(total)
}

async fn requeue_one<B: Broker>(
    broker: &B,
    message: &Value,
    destination_queue: Option<&str>,
    index: usize,
    total: usize,
) -> Result<(), RequeueError> {
    let destination = match destination_queue {
        Some(queue) => queue.to_string(),
        None => resolve_source_queue(message)?,
    };

    println!(
        "{} of {} - Requeueing message to {}",
        index + 1,
        total,
        destination
    );

    // The FailedQ header feeds resolution above and is itself scrubbed here.
    let mut message = message.clone();
    scrub_all(&mut message);

    broker.publish(&destination, &message).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequeueError;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records publishes and fails the nth publish attempt on demand.
    struct FakeBroker {
        published: Mutex<Vec<(String, Value)>>,
        fail_on_publish: Option<usize>,
    }

    impl FakeBroker {
        fn new() -> Self {
            Self {
                published: Mutex::new(Vec::new()),
                fail_on_publish: None,
            }
        }

        fn failing_on(attempt: usize) -> Self {
            Self {
                fail_on_publish: Some(attempt),
                ..Self::new()
            }
        }

        fn published(&self) -> Vec<(String, Value)> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Broker for FakeBroker {
        async fn fetch_messages(
            &self,
            _queue: &str,
            _count: u32,
        ) -> Result<Vec<Value>, RequeueError> {
            Ok(Vec::new())
        }

        async fn publish(&self, destination: &str, message: &Value) -> Result<(), RequeueError> {
            let mut published = self.published.lock().unwrap();
            if self.fail_on_publish == Some(published.len() + 1) {
                return Err(RequeueError::BrokerResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "publish refused".to_string(),
                });
            }
            published.push((destination.to_string(), message.clone()));
            Ok(())
        }
    }

    fn message_from(failed_q: &str) -> Value {
        json!({
            "payload": "body",
            "properties": {
                "headers": {
                    "NServiceBus.FailedQ": failed_q,
                    "NServiceBus.Retries": 2,
                    "CorrId": "corr-1"
                }
            }
        })
    }

    #[tokio::test]
    async fn test_explicit_destination_routes_every_message() {
        let broker = FakeBroker::new();
        let messages = vec![
            message_from("Orders.Error@M1"),
            message_from("Billing.Error@M2"),
            message_from("Shipping.Error@M3"),
        ];

        let processed = requeue_messages(&broker, messages, Some("Retry"))
            .await
            .unwrap();

        assert_eq!(processed, 3);
        let published = broker.published();
        assert_eq!(published.len(), 3);
        assert!(published.iter().all(|(dest, _)| dest == "Retry"));
    }

    #[tokio::test]
    async fn test_destination_resolved_per_message() {
        let broker = FakeBroker::new();
        let messages = vec![
            message_from("Orders.Error@M1"),
            message_from("Billing.Error@M2"),
        ];

        let processed = requeue_messages(&broker, messages, None).await.unwrap();

        assert_eq!(processed, 2);
        let destinations: Vec<String> = broker
            .published()
            .into_iter()
            .map(|(dest, _)| dest)
            .collect();
        assert_eq!(destinations, vec!["Orders.Error", "Billing.Error"]);
    }

    #[tokio::test]
    async fn test_published_messages_are_scrubbed() {
        let broker = FakeBroker::new();
        let messages = vec![message_from("Orders.Error@M1")];

        requeue_messages(&broker, messages, None).await.unwrap();

        let (_, message) = &broker.published()[0];
        let headers = message["properties"]["headers"].as_object().unwrap();
        assert!(!headers.contains_key("NServiceBus.FailedQ"));
        assert!(!headers.contains_key("NServiceBus.Retries"));
        assert_eq!(headers["CorrId"], "corr-1");
    }

    #[tokio::test]
    async fn test_publish_failure_aborts_and_reports_unpublished() {
        let broker = FakeBroker::failing_on(2);
        let messages = vec![
            message_from("Orders.Error@M1"),
            message_from("Billing.Error@M2"),
            message_from("Shipping.Error@M3"),
        ];

        let aborted = requeue_messages(&broker, messages, Some("Retry"))
            .await
            .unwrap_err();

        assert_eq!(aborted.processed, 1);
        assert_eq!(aborted.total, 3);
        assert_eq!(aborted.unpublished.len(), 2);
        assert_eq!(broker.published().len(), 1);
        assert!(matches!(
            aborted.source,
            RequeueError::BrokerResponse { status, .. }
                if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn test_unresolvable_message_aborts_before_publishing() {
        let broker = FakeBroker::new();
        let messages = vec![json!({"payload": "no headers"})];

        let aborted = requeue_messages(&broker, messages, None).await.unwrap_err();

        assert_eq!(aborted.processed, 0);
        assert_eq!(aborted.unpublished.len(), 1);
        assert!(broker.published().is_empty());
        assert!(matches!(
            aborted.source,
            RequeueError::SourceQueueUndetermined
        ));
    }

    #[tokio::test]
    async fn test_empty_fetch_is_a_successful_run() {
        let broker = FakeBroker::new();
        let processed = requeue_messages(&broker, Vec::new(), None).await.unwrap();
        assert_eq!(processed, 0);
        assert!(broker.published().is_empty());
    }
}
