//! # Toast Core
//!
//! Core types for the toastkit request workflow.
//!
//! This crate provides the building blocks shared by the workflow and the
//! hosting adapters:
//! - [`InboundRequest`] as a framework-neutral view of the incoming call
//! - [`Credentials`] decoded from a Basic `Authorization` header
//! - [`EndpointSettings`] and the [`SettingsProvider`] collaborator
//! - [`ResponseEnvelope`] returned by the external SMS API for every call
//! - [`Validator`] for pluggable query/body schema checks
//! - [`WorkflowError`] covering every way a request can be rejected
//!
//! ## Example
//!
//! ```rust
//! use toast_core::{ResponseEnvelope, ResponseHeader};
//!
//! let envelope: ResponseEnvelope<String> = serde_json::from_str(
//!     r#"{"header":{"isSuccessful":true,"resultCode":0,"resultMessage":"SUCCESS"},"body":"ok"}"#,
//! ).unwrap();
//! assert!(envelope.header.is_successful);
//! assert_eq!(envelope.body.as_deref(), Some("ok"));
//! ```

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Lightweight header representation to avoid tying the core to any HTTP framework.
pub type Headers = Vec<(String, String)>;

/// Case-insensitive lookup of the first header named `name`.
pub fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Framework-neutral inbound request.
///
/// `headers` is `None` when the hosting layer could not supply a header
/// collection at all; that is a caller bug, not an authentication failure.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub headers: Option<Headers>,
    pub query: Option<String>,
    pub body: Option<Vec<u8>>,
}

impl InboundRequest {
    pub fn new(headers: Headers) -> Self {
        Self {
            headers: Some(headers),
            query: None,
            body: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// App key / secret key pair taken from a Basic `Authorization` header.
///
/// Values are kept verbatim; blank checks happen in the header validator.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub app_key: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(app_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_key", &self.app_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Environment-specific endpoint settings.
///
/// `base_url` carries the literal placeholders `{version}` and `{appKey}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSettings {
    pub base_url: String,
    pub version: String,
}

impl EndpointSettings {
    pub fn new(base_url: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            version: version.into(),
        }
    }
}

/// Supplies endpoint settings to the workflow.
pub trait SettingsProvider: Send + Sync {
    fn endpoint_settings(&self) -> Option<&EndpointSettings>;
}

impl SettingsProvider for EndpointSettings {
    fn endpoint_settings(&self) -> Option<&EndpointSettings> {
        Some(self)
    }
}

impl SettingsProvider for Option<EndpointSettings> {
    fn endpoint_settings(&self) -> Option<&EndpointSettings> {
        self.as_ref()
    }
}

/// Fixed header part of every response from the external API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHeader {
    pub is_successful: bool,
    pub result_code: i32,
    pub result_message: String,
}

/// Header/body wrapper returned by the external API.
///
/// `body` is parametric per call site and usually absent on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub header: ResponseHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<T>,
}

impl<T> ResponseEnvelope<T> {
    pub fn success(result_code: i32, result_message: impl Into<String>, body: T) -> Self {
        Self {
            header: ResponseHeader {
                is_successful: true,
                result_code,
                result_message: result_message.into(),
            },
            body: Some(body),
        }
    }

    pub fn failure(result_code: i32, result_message: impl Into<String>) -> Self {
        Self {
            header: ResponseHeader {
                is_successful: false,
                result_code,
                result_message: result_message.into(),
            },
            body: None,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.header.is_successful
    }
}

/// Outbound HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry the validated payload.
    pub fn carries_payload(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP status code for hosting-layer responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Ok = 200,
    BadRequest = 400,
    Unauthorized = 401,
    InternalServerError = 500,
    BadGateway = 502,
    GatewayTimeout = 504,
}

impl HttpStatus {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// A single field-level rejection from a schema check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Field-level messages collected by a [`Validator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(FieldError::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Schema check for a request part of type `T`.
pub trait Validator<T>: Send + Sync {
    fn validate(&self, value: &T) -> Result<(), ValidationErrors>;
}

impl<T, F> Validator<T> for F
where
    F: Fn(&T) -> Result<(), ValidationErrors> + Send + Sync,
{
    fn validate(&self, value: &T) -> Result<(), ValidationErrors> {
        self(value)
    }
}

/// Accepts every value; useful for endpoints without query parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<T> Validator<T> for AcceptAll {
    fn validate(&self, _value: &T) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// Errors that can occur while processing one inbound request
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The request has no header collection at all
    #[error("request header collection is missing")]
    MissingHeader,
    /// `Authorization` is absent or is not a Basic `key:secret` credential
    #[error("unsupported authorization: {0}")]
    UnsupportedScheme(String),
    /// Decoded credential has a blank app key or secret key
    #[error("invalid credential: {field} must not be blank")]
    CredentialInvalid { field: &'static str },
    /// Endpoint settings or the base URL template were not supplied
    #[error("endpoint settings missing: {0}")]
    SettingsMissing(String),
    /// URL building attempted before the header was validated
    #[error("credentials have not been validated yet")]
    CredentialsNotSet,
    /// Query parameters failed their schema check
    #[error("invalid query parameters: {0}")]
    QueryInvalid(ValidationErrors),
    /// Request body failed its schema check
    #[error("invalid request body: {0}")]
    BodyInvalid(ValidationErrors),
    /// A workflow step was called out of order
    #[error("workflow state error: {0}")]
    WorkflowState(&'static str),
    /// Outbound call failed before a response arrived
    #[error("transport error: {source}")]
    Transport {
        timeout: bool,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// 2xx response whose body is not a valid envelope
    #[error("malformed response (HTTP {status}): {message}")]
    MalformedResponse { status: u16, message: String },
}

impl WorkflowError {
    /// Stable identifier for logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::UnsupportedScheme(_) => "unsupported_scheme",
            Self::CredentialInvalid { .. } => "credential_invalid",
            Self::SettingsMissing(_) => "settings_missing",
            Self::CredentialsNotSet => "credentials_not_set",
            Self::QueryInvalid(_) => "query_invalid",
            Self::BodyInvalid(_) => "body_invalid",
            Self::WorkflowState(_) => "workflow_state",
            Self::Transport { .. } => "transport",
            Self::MalformedResponse { .. } => "malformed_response",
        }
    }

    /// Status the hosting layer should answer with.
    pub fn status(&self) -> HttpStatus {
        match self {
            Self::MissingHeader | Self::CredentialInvalid { .. } => HttpStatus::Unauthorized,
            Self::UnsupportedScheme(_) | Self::QueryInvalid(_) | Self::BodyInvalid(_) => {
                HttpStatus::BadRequest
            }
            Self::SettingsMissing(_) | Self::CredentialsNotSet | Self::WorkflowState(_) => {
                HttpStatus::InternalServerError
            }
            Self::Transport { timeout: true, .. } => HttpStatus::GatewayTimeout,
            Self::Transport { .. } | Self::MalformedResponse { .. } => HttpStatus::BadGateway,
        }
    }
}

/// Generic trigger response that can be converted to any framework's response type
#[derive(Debug, Clone)]
pub struct TriggerResponse {
    pub status: HttpStatus,
    pub body: String,
    pub content_type: String,
}

impl TriggerResponse {
    pub fn from_envelope<T: Serialize>(envelope: &ResponseEnvelope<T>) -> Self {
        match serde_json::to_string(envelope) {
            Ok(body) => Self {
                status: HttpStatus::Ok,
                body,
                content_type: "application/json".to_string(),
            },
            Err(err) => Self::error(
                HttpStatus::InternalServerError,
                "serialization",
                &err.to_string(),
            ),
        }
    }

    pub fn from_error(error: &WorkflowError) -> Self {
        Self::error(error.status(), error.kind(), &error.to_string())
    }

    pub fn error(status: HttpStatus, kind: &str, message: &str) -> Self {
        let body = serde_json::json!({ "error": kind, "message": message });
        Self {
            status,
            body: body.to_string(),
            content_type: "application/json".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct MessageBody {
        request_id: String,
        count: u32,
    }

    #[test]
    fn envelope_round_trips_header_and_body() {
        let original = ResponseEnvelope::success(
            0,
            "SUCCESS",
            MessageBody {
                request_id: "20240101-abc".into(),
                count: 2,
            },
        );
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains("\"isSuccessful\":true"));
        assert!(json.contains("\"resultCode\":0"));

        let decoded: ResponseEnvelope<MessageBody> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn envelope_without_body_deserializes() {
        let json = r#"{"header":{"isSuccessful":false,"resultCode":-1000,"resultMessage":"Invalid appKey"}}"#;
        let decoded: ResponseEnvelope<MessageBody> = serde_json::from_str(json).unwrap();
        assert!(!decoded.is_successful());
        assert_eq!(decoded.header.result_code, -1000);
        assert!(decoded.body.is_none());
    }

    #[test]
    fn credentials_debug_hides_secret() {
        let creds = Credentials::new("hello", "world");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("hello"));
        assert!(!debug.contains("world"));
    }

    #[test]
    fn find_header_is_case_insensitive() {
        let headers: Headers = vec![("authorization".into(), "Basic abc".into())];
        assert_eq!(find_header(&headers, "Authorization"), Some("Basic abc"));
        assert_eq!(find_header(&headers, "x-other"), None);
    }

    #[test]
    fn error_status_mapping_distinguishes_kinds() {
        assert_eq!(WorkflowError::MissingHeader.status().as_u16(), 401);
        assert_eq!(
            WorkflowError::UnsupportedScheme("no scheme".into())
                .status()
                .as_u16(),
            400
        );
        assert_eq!(
            WorkflowError::CredentialInvalid { field: "appKey" }
                .status()
                .as_u16(),
            401
        );
        assert_eq!(WorkflowError::CredentialsNotSet.status().as_u16(), 500);
        let timeout = WorkflowError::Transport {
            timeout: true,
            source: "timed out".into(),
        };
        assert_eq!(timeout.status().as_u16(), 504);
        let refused = WorkflowError::Transport {
            timeout: false,
            source: "connection refused".into(),
        };
        assert_eq!(refused.status().as_u16(), 502);
    }

    #[test]
    fn error_response_carries_kind_and_message() {
        let err = WorkflowError::BodyInvalid(ValidationErrors::single("body", "required"));
        let response = TriggerResponse::from_error(&err);
        assert_eq!(response.status, HttpStatus::BadRequest);
        let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(json["error"], "body_invalid");
        assert_eq!(json["message"], "invalid request body: body: required");
    }

    #[test]
    fn closures_are_validators() {
        let validator = |value: &u32| {
            if *value > 10 {
                Err(ValidationErrors::single("value", "must be at most 10"))
            } else {
                Ok(())
            }
        };
        assert!(validator.validate(&3).is_ok());
        let err = validator.validate(&11).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.to_string(), "value: must be at most 10");
    }
}
