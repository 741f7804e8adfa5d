//! RabbitMQ HTTP management API client.
//!
//! The broker is consumed as a black box over two endpoints:
//! `POST /api/queues/{vhost}/{queue}/get` and
//! `POST /api/exchanges/{vhost}/{name}/publish`. The `Broker` trait is the
//! seam between the driver and the wire so the driver can run against an
//! in-memory fake in tests.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::RequeueError;

/// Connection parameters for one run against the management API.
///
/// The vhost is caller-pre-encoded (e.g. `%2F` for `/`) and the authorization
/// string is passed on the wire verbatim; pre-encoding credentials is the
/// caller's job.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    pub host_url: String,
    pub port: u16,
    pub vhost: String,
    pub authorization: String,
}

impl ConnectionOptions {
    /// URL for draining messages from a queue.
    pub fn fetch_url(&self, queue: &str) -> String {
        let url = format!(
            "{}:{}/api/queues/{}/{}/get",
            self.host_url, self.port, self.vhost, queue
        );
        debug!(url = %url, "fetch_url_built");
        url
    }

    /// URL for publishing to an exchange (or, via the default exchange
    /// semantics the management API applies, a queue).
    pub fn publish_url(&self, name: &str) -> String {
        let url = format!(
            "{}:{}/api/exchanges/{}/{}/publish",
            self.host_url, self.port, self.vhost, name
        );
        debug!(url = %url, "publish_url_built");
        url
    }
}

/// Body of the `/get` call. `requeue: false` removes the fetched messages
/// from the source queue at the broker.
#[derive(Debug, Serialize)]
struct FetchRequest {
    count: u32,
    requeue: bool,
    encoding: &'static str,
}

/// Operations the requeue driver needs from the broker.
#[async_trait]
pub trait Broker {
    /// Drain up to `count` messages from `queue` without broker-side requeue.
    async fn fetch_messages(&self, queue: &str, count: u32) -> Result<Vec<Value>, RequeueError>;

    /// Republish one message to `destination`.
    async fn publish(&self, destination: &str, message: &Value) -> Result<(), RequeueError>;
}

/// reqwest-backed broker client.
pub struct HttpBroker {
    client: Client,
    options: ConnectionOptions,
}

impl HttpBroker {
    pub fn new(options: ConnectionOptions) -> Self {
        Self {
            client: Client::new(),
            options,
        }
    }

    /// Turn a response into its JSON body, or a `BrokerResponse` error
    /// carrying the status code and raw body on anything but 200.
    async fn expect_ok(response: reqwest::Response) -> Result<reqwest::Response, RequeueError> {
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(RequeueError::BrokerResponse { status, body });
        }
        Ok(response)
    }
}

#[async_trait]
impl Broker for HttpBroker {
    async fn fetch_messages(&self, queue: &str, count: u32) -> Result<Vec<Value>, RequeueError> {
        let url = self.options.fetch_url(queue);
        let body = FetchRequest {
            count,
            requeue: false,
            encoding: "auto",
        };

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, &self.options.authorization)
            .json(&body)
            .send()
            .await?;

        let response = Self::expect_ok(response).await?;
        let messages = response.json::<Vec<Value>>().await?;

        debug!(queue = queue, fetched = messages.len(), "messages_fetched");
        Ok(messages)
    }

    async fn publish(&self, destination: &str, message: &Value) -> Result<(), RequeueError> {
        let url = self.options.publish_url(destination);

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, &self.options.authorization)
            .json(message)
            .send()
            .await?;

        Self::expect_ok(response).await?;
        Ok(())
    }
}
