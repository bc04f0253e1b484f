//! HTTP client for the JSON call gateway.

use factfund_client::ClientConfig;
use factfund_types::{FundError, TaggedResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::wire::{call_url, decode, CallRequest};

/// Sends method calls to one gateway endpoint.
///
/// Wraps `reqwest::Client` with the endpoint URL. Every failure below the
/// method's own result (connect, timeout, HTTP status, decoding) is
/// [`FundError::Transport`].
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    url: String,
}

impl GatewayClient {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, FundError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| FundError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: call_url(base_url),
        })
    }

    /// Clients for the backend and the ledger index gateways.
    pub fn pair_from_config(config: &ClientConfig) -> Result<(Self, Self), FundError> {
        let backend = Self::new(
            &config.backend_url,
            config.request_timeout(),
            config.connect_timeout(),
        )?;
        let ledger = Self::new(
            &config.ledger_url,
            config.request_timeout(),
            config.connect_timeout(),
        )?;
        Ok((backend, ledger))
    }

    /// The full `/call` URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` and decode its plain return value.
    pub async fn call<A, T>(&self, method: &str, args: &A) -> Result<T, FundError>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(method, url = %self.url, "gateway call");
        let response = self
            .http
            .post(&self.url)
            .json(&CallRequest { method, args })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FundError::Transport(format!("{method}: request timed out: {e}"))
                } else if e.is_connect() {
                    FundError::Transport(format!("{method}: connection failed: {e}"))
                } else {
                    FundError::Transport(format!("{method}: request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FundError::Transport(format!(
                "{method}: gateway returned HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FundError::Transport(format!("{method}: failed to read body: {e}")))?;
        decode(method, &body)
    }

    /// Call a method that returns a tagged result and unwrap it.
    pub async fn call_result<A, T>(&self, method: &str, args: &A) -> Result<T, FundError>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let tagged: TaggedResult<T> = self.call(method, args).await?;
        tagged.into_result().inspect_err(|e| {
            tracing::debug!(method, error = %e, "gateway call returned an error");
        })
    }
}
