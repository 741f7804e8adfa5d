//! Header scrubbing and source-queue resolution.
//!
//! Messages come off the management API as arbitrary JSON, so everything here
//! works on `serde_json::Value` and pattern-matches on the object variant
//! instead of assuming a fixed envelope shape.

use serde_json::Value;

use crate::error::RequeueError;
use crate::headers::{FAILED_QUEUE_HEADER, SCRUB_PASSES};

/// Remove every key in `keys` from `message`, then recurse into each
/// remaining object value.
///
/// Absent keys are not an error. Non-object values (including arrays) are
/// left untouched.
pub fn scrub_message(message: &mut Value, keys: &[&str]) {
    if let Value::Object(map) = message {
        for key in keys {
            map.remove(*key);
        }
        for value in map.values_mut() {
            if value.is_object() {
                scrub_message(value, keys);
            }
        }
    }
}

/// Apply all four fixed scrub passes to a message before republishing.
pub fn scrub_all(message: &mut Value) {
    for keys in SCRUB_PASSES {
        scrub_message(message, keys);
    }
}

/// Determine the queue a failed message should be replayed to.
///
/// Reads `properties.headers["NServiceBus.FailedQ"]`, whose value has the
/// form `queueName@machineName`, and returns the part before the first `@`.
pub fn resolve_source_queue(message: &Value) -> Result<String, RequeueError> {
    let failed_q = message
        .get("properties")
        .and_then(|properties| properties.get("headers"))
        .and_then(|headers| headers.get(FAILED_QUEUE_HEADER))
        .and_then(Value::as_str)
        .ok_or(RequeueError::SourceQueueUndetermined)?;

    let queue = failed_q
        .split_once('@')
        .map(|(queue, _machine)| queue)
        .unwrap_or(failed_q);

    Ok(queue.to_string())
}
