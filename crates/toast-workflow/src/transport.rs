//! Outbound HTTP seam: the workflow only ever talks to an injected
//! [`HttpClientFactory`].

use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;
use toast_core::{Headers, HttpMethod, WorkflowError};

pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl OutboundResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Failure before any response arrived (DNS, TLS, refused, timed out).
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct TransportError {
    pub timeout: bool,
    #[source]
    pub source: BoxError,
}

impl TransportError {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            timeout: false,
            source: source.into(),
        }
    }

    pub fn timed_out(source: impl Into<BoxError>) -> Self {
        Self {
            timeout: true,
            source: source.into(),
        }
    }
}

impl From<TransportError> for WorkflowError {
    fn from(err: TransportError) -> Self {
        WorkflowError::Transport {
            timeout: err.timeout,
            source: err.source,
        }
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Single attempt; no retries.
    async fn send(&self, request: OutboundRequest) -> Result<OutboundResponse, TransportError>;
}

/// Hands out named clients. Connection lifecycle belongs to the factory.
pub trait HttpClientFactory: Send + Sync {
    fn create_client(&self, name: &str) -> Arc<dyn HttpClient>;
}

#[cfg(feature = "reqwest")]
pub use reqwest_client::{ReqwestClientFactory, ReqwestClientFactoryBuilder};

#[cfg(feature = "reqwest")]
mod reqwest_client {
    use std::time::Duration;

    use super::*;

    #[derive(Debug, Clone, Default)]
    pub struct ReqwestClientFactoryBuilder {
        timeout: Option<Duration>,
        user_agent: Option<String>,
    }

    impl ReqwestClientFactoryBuilder {
        /// Applied to the entire request.
        pub fn timeout(mut self, timeout: Duration) -> Self {
            self.timeout = Some(timeout);
            self
        }

        pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
            self.user_agent = Some(user_agent.into());
            self
        }

        pub fn build(self) -> Result<ReqwestClientFactory, TransportError> {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(user_agent) = self.user_agent {
                builder = builder.user_agent(user_agent);
            }
            let client = builder.build().map_err(TransportError::new)?;
            Ok(ReqwestClientFactory { client })
        }
    }

    /// Shares one pooled `reqwest::Client` across every named client.
    #[derive(Debug, Clone)]
    pub struct ReqwestClientFactory {
        client: reqwest::Client,
    }

    impl ReqwestClientFactory {
        pub fn new() -> Self {
            Self {
                client: reqwest::Client::new(),
            }
        }

        pub fn builder() -> ReqwestClientFactoryBuilder {
            ReqwestClientFactoryBuilder::default()
        }
    }

    impl Default for ReqwestClientFactory {
        fn default() -> Self {
            Self::new()
        }
    }

    impl HttpClientFactory for ReqwestClientFactory {
        fn create_client(&self, name: &str) -> Arc<dyn HttpClient> {
            tracing::trace!(client = name, "creating reqwest client handle");
            Arc::new(ReqwestHttpClient {
                client: self.client.clone(),
            })
        }
    }

    #[derive(Debug, Clone)]
    struct ReqwestHttpClient {
        client: reqwest::Client,
    }

    #[async_trait]
    impl HttpClient for ReqwestHttpClient {
        async fn send(
            &self,
            request: OutboundRequest,
        ) -> Result<OutboundResponse, TransportError> {
            let method = match request.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
                HttpMethod::Put => reqwest::Method::PUT,
                HttpMethod::Patch => reqwest::Method::PATCH,
                HttpMethod::Delete => reqwest::Method::DELETE,
            };
            let mut builder = self.client.request(method, request.url.as_str());
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(classify)?;
            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(classify)?.to_vec();
            Ok(OutboundResponse { status, body })
        }
    }

    fn classify(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::timed_out(err)
        } else {
            TransportError::new(err)
        }
    }
}
