use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use toast_core::{
    Credentials, EndpointSettings, HttpMethod, InboundRequest, ResponseEnvelope,
    ValidationErrors, Validator, WorkflowError,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::codec::{decode_basic_auth, validate_credentials};
use crate::formatter::{JsonFormatter, MediaFormatter};
use crate::transport::{HttpClientFactory, OutboundRequest, OutboundResponse};
use crate::url::RequestUrlBuilder;

pub const DEFAULT_CLIENT_NAME: &str = "toast";

/// Outbound header names carrying the credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialHeaderNames {
    pub app_key: String,
    pub secret_key: String,
}

impl Default for CredentialHeaderNames {
    fn default() -> Self {
        Self {
            app_key: "X-App-Key".to_string(),
            secret_key: "X-Secret-Key".to_string(),
        }
    }
}

/// Process-wide collaborators; mints one [`HttpTriggerWorkflow`] per request.
#[derive(Clone)]
pub struct TriggerContext {
    factory: Arc<dyn HttpClientFactory>,
    formatter: Arc<dyn MediaFormatter>,
    header_names: CredentialHeaderNames,
    client_name: String,
}

impl TriggerContext {
    pub fn new(factory: Arc<dyn HttpClientFactory>) -> Self {
        Self {
            factory,
            formatter: Arc::new(JsonFormatter),
            header_names: CredentialHeaderNames::default(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
        }
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn MediaFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_header_names(mut self, header_names: CredentialHeaderNames) -> Self {
        self.header_names = header_names;
        self
    }

    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = client_name.into();
        self
    }

    pub fn workflow(&self) -> HttpTriggerWorkflow {
        HttpTriggerWorkflow {
            header_names: self.header_names.clone(),
            client_name: self.client_name.clone(),
            ..HttpTriggerWorkflow::new(self.factory.clone(), self.formatter.clone())
        }
    }
}

/// One inbound request, validated step by step and dispatched once.
///
/// Steps must run in order: header, then queries/body, then URL, then
/// [`invoke`](Self::invoke). Every step returns `&mut Self` so calls chain
/// with `?`:
///
/// ```rust,ignore
/// let envelope = workflow
///     .validate_header(&request)?
///     .validate_body(&request, &SendSmsValidator)?
///     .build_request_url("sender/sms", settings.endpoint_settings())?
///     .invoke::<SendSmsResult>(HttpMethod::Post)
///     .await?;
/// ```
pub struct HttpTriggerWorkflow {
    request_id: Uuid,
    factory: Arc<dyn HttpClientFactory>,
    formatter: Arc<dyn MediaFormatter>,
    header_names: CredentialHeaderNames,
    client_name: String,
    credentials: Option<Credentials>,
    queries: Option<Value>,
    query_string: Option<String>,
    payload: Option<Value>,
    request_url: Option<String>,
}

impl HttpTriggerWorkflow {
    pub fn new(factory: Arc<dyn HttpClientFactory>, formatter: Arc<dyn MediaFormatter>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            factory,
            formatter,
            header_names: CredentialHeaderNames::default(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            credentials: None,
            queries: None,
            query_string: None,
            payload: None,
            request_url: None,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn request_url(&self) -> Option<&str> {
        self.request_url.as_deref()
    }

    /// Validated query parameters as `Q`; `Ok(None)` until validated.
    pub fn queries<Q: DeserializeOwned>(&self) -> Result<Option<Q>, serde_json::Error> {
        self.queries.clone().map(serde_json::from_value).transpose()
    }

    /// Validated payload as `B`; `Ok(None)` until validated.
    pub fn payload<B: DeserializeOwned>(&self) -> Result<Option<B>, serde_json::Error> {
        self.payload.clone().map(serde_json::from_value).transpose()
    }

    /// Runs once per workflow, before any other step.
    pub fn validate_header(&mut self, request: &InboundRequest) -> Result<&mut Self, WorkflowError> {
        if self.credentials.is_some() || self.request_url.is_some() {
            return Err(WorkflowError::WorkflowState("header has already been validated"));
        }
        let credentials = decode_basic_auth(request.headers.as_ref())
            .and_then(|credentials| validate_credentials(&credentials).map(|_| credentials))
            .map_err(|err| {
                warn!(request_id = %self.request_id, kind = err.kind(), "header rejected: {}", err);
                err
            })?;

        debug!(request_id = %self.request_id, app_key = %credentials.app_key, "header validated");
        self.credentials = Some(credentials);
        Ok(self)
    }

    /// Parses the query string as `Q` and runs `validator` over it.
    ///
    /// An absent query string is an empty parameter set. Any failure is fatal.
    pub fn validate_queries<Q, V>(
        &mut self,
        request: &InboundRequest,
        validator: &V,
    ) -> Result<&mut Self, WorkflowError>
    where
        Q: DeserializeOwned + Serialize,
        V: Validator<Q> + ?Sized,
    {
        self.ensure_parameters_allowed()?;

        let raw = request
            .query
            .as_deref()
            .unwrap_or_default()
            .trim_start_matches('?');
        let queries: Q = serde_urlencoded::from_str(raw)
            .map_err(|err| self.query_rejected(ValidationErrors::single("query", err.to_string())))?;
        validator
            .validate(&queries)
            .map_err(|errors| self.query_rejected(errors))?;

        let value = serde_json::to_value(&queries)
            .map_err(|err| self.query_rejected(ValidationErrors::single("query", err.to_string())))?;
        let encoded = serde_urlencoded::to_string(&queries)
            .map_err(|err| self.query_rejected(ValidationErrors::single("query", err.to_string())))?;

        debug!(request_id = %self.request_id, query = %encoded, "queries validated");
        self.queries = Some(value);
        self.query_string = Some(encoded);
        Ok(self)
    }

    /// Decodes the body as `B` with the configured formatter and runs
    /// `validator` over it. The result becomes the outbound payload.
    pub fn validate_body<B, V>(
        &mut self,
        request: &InboundRequest,
        validator: &V,
    ) -> Result<&mut Self, WorkflowError>
    where
        B: DeserializeOwned + Serialize,
        V: Validator<B> + ?Sized,
    {
        self.ensure_parameters_allowed()?;

        let bytes = match request.body.as_deref() {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Err(self.body_rejected(ValidationErrors::single("body", "required"))),
        };
        let value = self
            .formatter
            .decode(bytes)
            .map_err(|err| self.body_rejected(ValidationErrors::single("body", err.to_string())))?;
        let body: B = serde_json::from_value(value)
            .map_err(|err| self.body_rejected(ValidationErrors::single("body", err.to_string())))?;
        validator
            .validate(&body)
            .map_err(|errors| self.body_rejected(errors))?;

        let payload = serde_json::to_value(&body)
            .map_err(|err| self.body_rejected(ValidationErrors::single("body", err.to_string())))?;

        debug!(request_id = %self.request_id, "body validated");
        self.payload = Some(payload);
        Ok(self)
    }

    /// Resolves the outbound URL from `settings`, the validated app key and
    /// `operation`. Validated queries are appended when non-empty.
    pub fn build_request_url(
        &mut self,
        operation: &str,
        settings: Option<&EndpointSettings>,
    ) -> Result<&mut Self, WorkflowError> {
        if self.request_url.is_some() {
            return Err(WorkflowError::WorkflowState("request URL has already been built"));
        }
        let mut builder = RequestUrlBuilder::new().with_settings(settings)?;
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(WorkflowError::CredentialsNotSet)?;
        builder = builder
            .with_credentials(credentials)
            .with_operation(operation);
        if let Some(query) = self.query_string.as_deref() {
            builder = builder.with_query(query);
        }

        let url = builder.build()?;
        debug!(request_id = %self.request_id, url = %url, "request URL resolved");
        self.request_url = Some(url);
        Ok(self)
    }

    /// Sends the request once and unwraps the response envelope.
    ///
    /// Non-2xx responses still yield an envelope: the server's own when the
    /// body parses, otherwise a synthesized failure carrying the status.
    /// Dropping the returned future abandons the outbound call.
    pub async fn invoke<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
    ) -> Result<ResponseEnvelope<T>, WorkflowError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(WorkflowError::WorkflowState("header has not been validated"))?;
        let url = self
            .request_url
            .as_deref()
            .ok_or(WorkflowError::WorkflowState("request URL has not been built"))?;

        let media_type = self.formatter.media_type().to_string();
        let mut headers = vec![
            ("Accept".to_string(), media_type.clone()),
            (self.header_names.app_key.clone(), credentials.app_key.clone()),
            (self.header_names.secret_key.clone(), credentials.secret_key.clone()),
        ];
        let body = if method.carries_payload() {
            let payload = self
                .payload
                .as_ref()
                .ok_or(WorkflowError::WorkflowState("payload has not been validated"))?;
            let bytes = self.formatter.encode(payload).map_err(|err| {
                warn!(request_id = %self.request_id, "validated payload failed to encode: {}", err);
                WorkflowError::WorkflowState("validated payload could not be encoded")
            })?;
            headers.push(("Content-Type".to_string(), media_type));
            Some(bytes)
        } else {
            None
        };

        let request = OutboundRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        };

        info!(
            request_id = %self.request_id,
            method = %method,
            url = %url,
            app_key = %credentials.app_key,
            "dispatching outbound request"
        );
        let client = self.factory.create_client(&self.client_name);
        let response = client.send(request).await.map_err(|err| {
            warn!(request_id = %self.request_id, timeout = err.timeout, "outbound call failed: {}", err);
            WorkflowError::from(err)
        })?;

        let envelope = self.unwrap_envelope(response)?;
        info!(
            request_id = %self.request_id,
            successful = envelope.header.is_successful,
            result_code = envelope.header.result_code,
            "outbound request completed"
        );
        Ok(envelope)
    }

    fn unwrap_envelope<T: DeserializeOwned>(
        &self,
        response: OutboundResponse,
    ) -> Result<ResponseEnvelope<T>, WorkflowError> {
        let parsed = self
            .formatter
            .decode(&response.body)
            .map_err(|err| err.to_string())
            .and_then(|value| {
                serde_json::from_value::<ResponseEnvelope<T>>(value).map_err(|err| err.to_string())
            });

        match parsed {
            Ok(envelope) => Ok(envelope),
            Err(message) if response.is_success() => {
                warn!(request_id = %self.request_id, status = response.status, "malformed envelope: {}", message);
                Err(WorkflowError::MalformedResponse {
                    status: response.status,
                    message,
                })
            }
            Err(_) => {
                debug!(request_id = %self.request_id, status = response.status, "synthesizing failure envelope");
                let raw = String::from_utf8_lossy(&response.body);
                let message = if raw.trim().is_empty() {
                    format!("HTTP {}", response.status)
                } else {
                    raw.trim().to_string()
                };
                Ok(ResponseEnvelope::failure(i32::from(response.status), message))
            }
        }
    }

    fn ensure_parameters_allowed(&self) -> Result<(), WorkflowError> {
        if self.credentials.is_none() {
            return Err(WorkflowError::WorkflowState(
                "header must be validated before parameters",
            ));
        }
        if self.request_url.is_some() {
            return Err(WorkflowError::WorkflowState(
                "parameters must be validated before the request URL is built",
            ));
        }
        Ok(())
    }

    fn query_rejected(&self, errors: ValidationErrors) -> WorkflowError {
        warn!(request_id = %self.request_id, "queries rejected: {}", errors);
        WorkflowError::QueryInvalid(errors)
    }

    fn body_rejected(&self, errors: ValidationErrors) -> WorkflowError {
        warn!(request_id = %self.request_id, "body rejected: {}", errors);
        WorkflowError::BodyInvalid(errors)
    }
}
