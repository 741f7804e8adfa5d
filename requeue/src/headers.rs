//! Fixed sets of NServiceBus envelope headers to strip before replaying a message.
//!
//! These lists are static configuration. A message carrying none of them is
//! perfectly valid; scrubbing silently skips absent keys.

/// Header recording the queue a failed message originally came from.
///
/// The value has the form `queueName@machineName`.
pub const FAILED_QUEUE_HEADER: &str = "NServiceBus.FailedQ";

/// Retry counters maintained by the NServiceBus runtime.
pub const RUNTIME_RETRY_HEADERS: &[&str] = &["NServiceBus.FLRetries", "NServiceBus.Retries"];

/// Host diagnostics injected by the NServiceBus runtime.
pub const DIAGNOSTIC_HEADERS: &[&str] = &[
    "$.diagnostics.originating.hostid",
    "$.diagnostics.hostdisplayname",
    "$.diagnostics.hostid",
    "$.diagnostics.license.expired",
];

/// Audit metadata recorded while the message was being processed.
pub const AUDIT_HEADERS: &[&str] = &[
    "NServiceBus.Version",
    "NServiceBus.TimeSent",
    "NServiceBus.EnclosedMessageTypes",
    "NServiceBus.ProcessingStarted",
    "NServiceBus.ProcessingEnded",
    "NServiceBus.OriginatingAddress",
    "NServiceBus.ProcessingEndpoint",
    "NServiceBus.ProcessingMachine",
];

/// Error-queue bookkeeping headers.
pub const ERROR_HEADERS: &[&str] = &[FAILED_QUEUE_HEADER];

/// All scrub passes, in the order they are applied before republishing.
///
/// The sets are disjoint, so the order has no observable effect on the final
/// message, but all four passes run before every publish.
pub const SCRUB_PASSES: &[&[&str]] = &[
    RUNTIME_RETRY_HEADERS,
    DIAGNOSTIC_HEADERS,
    AUDIT_HEADERS,
    ERROR_HEADERS,
];
