//! Command-line argument surface.
//!
//! Everything the tool needs comes in on the command line; there is no config
//! file and no environment variables beyond `RUST_LOG` for the log filter.

use clap::Parser;

use crate::broker::ConnectionOptions;

/// Requeues messages from a RabbitMQ error queue.
#[derive(Parser, Debug, Clone)]
#[command(name = "rabbit-requeue")]
pub struct Args {
    /// Name of the RabbitMQ source queue to get the messages from
    pub rabbit_source_queue: String,

    /// Number of messages to requeue
    pub message_count: u32,

    /// Name of the RabbitMQ destination queue; defaults to each message's
    /// originating queue from its NServiceBus.FailedQ header
    #[arg(short = 'd', long = "rabbit_destination_queue")]
    pub rabbit_destination_queue: Option<String>,

    /// RabbitMQ host URL
    #[arg(short = 'r', long = "rabbit_host_url", default_value = "http://localhost")]
    pub rabbit_host_url: String,

    /// RabbitMQ management API port
    #[arg(short = 'p', long = "rabbit_port", default_value_t = 15672)]
    pub rabbit_port: u16,

    /// RabbitMQ vhost name, URL-encoded
    #[arg(short = 's', long = "rabbit_vhost", default_value = "%2F")]
    pub rabbit_vhost: String,

    /// Authorization header value sent verbatim (guest/guest by default)
    #[arg(
        short = 'z',
        long = "rabbit_authorization_string",
        default_value = "Basic Z3Vlc3Q6Z3Vlc3Q="
    )]
    pub rabbit_authorization_string: String,

    /// Log at debug level, including the constructed broker URLs
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    /// Broker connection parameters for this run.
    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            host_url: self.rabbit_host_url.clone(),
            port: self.rabbit_port,
            vhost: self.rabbit_vhost.clone(),
            authorization: self.rabbit_authorization_string.clone(),
        }
    }
}
