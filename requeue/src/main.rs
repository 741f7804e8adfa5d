//! rabbit-requeue binary - drains and replays a RabbitMQ error queue.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use requeue::{Args, Broker, HttpBroker};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    tracing::info!(
        source_queue = %args.rabbit_source_queue,
        message_count = args.message_count,
        destination_queue = ?args.rabbit_destination_queue,
        vhost = %args.rabbit_vhost,
        "requeue_starting"
    );

    let broker = HttpBroker::new(args.connection_options());

    println!("Getting messages from {}...", args.rabbit_source_queue);

    let messages = broker
        .fetch_messages(&args.rabbit_source_queue, args.message_count)
        .await
        .context("Failed to fetch messages from the broker")?;

    let processed = requeue::requeue_messages(
        &broker,
        messages,
        args.rabbit_destination_queue.as_deref(),
    )
    .await?;

    tracing::info!(processed = processed, "requeue_finished");

    Ok(())
}
