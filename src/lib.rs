//! # Toastkit
//!
//! Authenticated request validation and dispatch in front of the NHN Toast
//! SMS cloud API.
//!
//! ## Features
//!
//! - **Basic-auth credentials**: app key / secret key decoded from `Authorization`
//! - **Pluggable validation**: query and body schema checks per endpoint
//! - **URL templating**: `{version}` / `{appKey}` resolved from settings
//! - **Typed dispatch**: one outbound call, unwrapped into `ResponseEnvelope<T>`
//! - **Precise failures**: every rejection maps to a distinct error and status
//! - **Layered configuration** and **structured logging**
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use toastkit::prelude::*;
//!
//! let config = AppConfig::load()?;
//! let settings = ConfiguredSettings::from(&config);
//! let context = TriggerContext::new(Arc::new(ReqwestClientFactory::new()));
//!
//! let mut workflow = context.workflow();
//! let envelope = workflow
//!     .validate_header(&request)?
//!     .validate_body(&request, &SendSmsValidator)?
//!     .build_request_url("sender/sms", settings.endpoint_settings())?
//!     .invoke::<SendSmsResult>(HttpMethod::Post)
//!     .await?;
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! use toastkit::config::AppConfig;
//!
//! // TOASTKIT__ENDPOINT__BASE_URL=https://api-sms.cloud.toast.com/sms/{version}/appKeys/{appKey}
//! // TOASTKIT__ENDPOINT__VERSION=v3.0
//! let config = AppConfig::load()?;
//! ```

pub mod config;
pub mod telemetry;

use std::sync::Arc;

pub use self::config::*;
use toast_workflow::{HttpClientFactory, ReqwestClientFactory, TransportError, TriggerContext};

/// Build a [`TriggerContext`] backed by reqwest from the loaded configuration.
pub fn trigger_context(config: &AppConfig) -> Result<TriggerContext, TransportError> {
    let mut builder = ReqwestClientFactory::builder();
    if let Some(timeout) = config.http.timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(user_agent) = config.http.user_agent.as_deref() {
        builder = builder.user_agent(user_agent);
    }
    let factory = builder.build()?;

    Ok(trigger_context_with(config, Arc::new(factory)))
}

/// Like [`trigger_context`], over a caller-supplied client factory.
pub fn trigger_context_with(
    config: &AppConfig,
    factory: Arc<dyn HttpClientFactory>,
) -> TriggerContext {
    TriggerContext::new(factory)
        .with_header_names(config.credential_header_names())
        .with_client_name(config.http.client_name.clone())
}

/// Common imports for toastkit usage
pub mod prelude {
    pub use crate::config::{
        AppConfig, ConfiguredSettings, CredentialHeadersConfig, EndpointConfig,
        HttpClientConfig, LoggingConfig, ServerConfig,
    };
    pub use crate::telemetry::init_tracing;
    pub use crate::{trigger_context, trigger_context_with};
    pub use toast_core::*;
    pub use toast_web_axum::{read_inbound, AppState, AxumTriggerResponse};
    pub use toast_workflow::{
        respond, CredentialHeaderNames, HttpClient, HttpClientFactory, HttpTriggerWorkflow,
        JsonFormatter, MediaFormatter, OutboundRequest, OutboundResponse, ReqwestClientFactory,
        RequestUrlBuilder, TransportError, TriggerContext,
    };
}
