/**
 * Poll Transport
 *
 * One long-poll request per call. `PollTransport` is the seam between the
 * client state machine and the network; `HttpTransport` is the reqwest
 * implementation.
 *
 * # Status mapping
 *
 * - 200 -> `PollResponse::Event` (body decoded as a `PollEnvelope`)
 * - 204 -> `PollResponse::Empty`
 * - 401 / 403 -> `PollError::AuthorizationDenied`
 * - anything else -> `PollError::UnexpectedResponse`
 *
 * The request timeout is the server deadline plus a grace period, so a
 * healthy server always answers before the client gives up.
 */

use std::future::Future;

use reqwest::{Client, StatusCode};

use crate::client::config::Config;
use crate::client::error::PollError;
use crate::shared::{ChannelKey, PollEnvelope};

/// Outcome of one successful poll request
#[derive(Debug, Clone, PartialEq)]
pub enum PollResponse {
    /// Something changed on the channel
    Event(PollEnvelope),
    /// The deadline passed without a change
    Empty,
}

/// Issues one poll request for a channel
pub trait PollTransport: Send + Sync + 'static {
    fn poll(&self, channel: &ChannelKey) -> impl Future<Output = Result<PollResponse, PollError>> + Send;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Config,
}

impl HttpTransport {
    pub fn new(config: Config) -> Result<Self, PollError> {
        let client = Client::builder()
            .timeout(config.app().request_timeout())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl PollTransport for HttpTransport {
    async fn poll(&self, channel: &ChannelKey) -> Result<PollResponse, PollError> {
        let url = self
            .config
            .poll_url(channel)
            .ok_or_else(|| PollError::UnsupportedChannel(channel.to_string()))?;

        let mut request = self.client.get(&url);
        if let Some(token) = self.config.get_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::OK => {
                let bytes = response.bytes().await?;
                let envelope: PollEnvelope = serde_json::from_slice(&bytes)?;
                Ok(PollResponse::Event(envelope))
            }
            StatusCode::NO_CONTENT => Ok(PollResponse::Empty),
            status => {
                tracing::warn!("[Client] Poll on {} returned {}", channel, status);
                Err(PollError::from_status(status.as_u16()))
            }
        }
    }
}
