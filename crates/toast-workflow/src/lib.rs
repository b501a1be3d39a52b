//! # Toast Workflow
//!
//! Framework-agnostic processing of one inbound request in front of the
//! Toast SMS API:
//!
//! 1. decode and check the Basic credential ([`codec`]),
//! 2. validate query parameters and body against pluggable [`Validator`]s,
//! 3. resolve the outbound URL ([`RequestUrlBuilder`]),
//! 4. dispatch once through an injected [`HttpClientFactory`] and unwrap the
//!    typed [`ResponseEnvelope`].
//!
//! Hosting adapters implement [`RequestConverter`] / [`ResponseConverter`]
//! and call [`respond`] to turn the outcome into a [`TriggerResponse`].
//!
//! [`Validator`]: toast_core::Validator

pub mod codec;
pub mod formatter;
pub mod transport;
pub mod url;
mod workflow;

pub use formatter::{FormatError, JsonFormatter, MediaFormatter};
#[cfg(feature = "reqwest")]
pub use transport::{ReqwestClientFactory, ReqwestClientFactoryBuilder};
pub use transport::{
    HttpClient, HttpClientFactory, OutboundRequest, OutboundResponse, TransportError,
};
pub use url::RequestUrlBuilder;
pub use workflow::{
    CredentialHeaderNames, HttpTriggerWorkflow, TriggerContext, DEFAULT_CLIENT_NAME,
};

use serde::Serialize;
use toast_core::{InboundRequest, ResponseEnvelope, TriggerResponse, WorkflowError};
use tracing::warn;

/// Map a workflow outcome onto a framework-agnostic response.
pub fn respond<T: Serialize>(result: Result<ResponseEnvelope<T>, WorkflowError>) -> TriggerResponse {
    match result {
        Ok(envelope) => TriggerResponse::from_envelope(&envelope),
        Err(err) => {
            warn!(kind = err.kind(), status = err.status().as_u16(), "request failed: {}", err);
            TriggerResponse::from_error(&err)
        }
    }
}

/// Helper trait for framework adapters to build an [`InboundRequest`]
pub trait RequestConverter {
    type RequestType;

    fn to_inbound(request: Self::RequestType) -> InboundRequest;
}

/// Helper trait for framework adapters to convert responses
pub trait ResponseConverter {
    type ResponseType;

    fn from_trigger_response(response: TriggerResponse) -> Self::ResponseType;
}
