//! rabbit-requeue - replays messages from a RabbitMQ error queue.
//!
//! The tool drains a fixed number of messages from an error queue via the
//! RabbitMQ HTTP management API, strips the NServiceBus envelope headers
//! that would confuse a replay (retry counters, diagnostics, audit trail,
//! error-queue bookkeeping), and republishes each message to either an
//! explicit destination queue or the queue it originally failed in.
//!
//! ## Flow
//!
//! ```text
//! error queue → fetch (/api/queues/../get) → scrub headers → publish (/api/exchanges/../publish)
//! ```
//!
//! The fetch disables broker-side requeue, so an aborted run reports the
//! messages it could not republish instead of silently dropping them.

pub mod broker;
pub mod config;
pub mod error;
pub mod headers;
pub mod requeue;
pub mod scrub;

// Re-export commonly used types
pub use broker::{Broker, ConnectionOptions, HttpBroker};
pub use config::Args;
pub use error::{RequeueAborted, RequeueError};
pub use requeue::requeue_messages;
pub use scrub::{resolve_source_queue, scrub_all, scrub_message};
