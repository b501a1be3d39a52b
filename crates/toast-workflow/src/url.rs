//! Request URL templating.

use toast_core::{Credentials, EndpointSettings, WorkflowError};
use url::form_urlencoded::byte_serialize;

pub const VERSION_PLACEHOLDER: &str = "{version}";
pub const APP_KEY_PLACEHOLDER: &str = "{appKey}";

/// Builds `{base_url with version, appKey}/{operation}[?query]`.
///
/// Pure string construction: identical inputs always give identical output.
/// The app key is percent-encoded as a single path segment.
#[derive(Debug, Clone, Default)]
pub struct RequestUrlBuilder {
    settings: Option<EndpointSettings>,
    app_key: Option<String>,
    operation: Option<String>,
    query: Option<String>,
}

impl RequestUrlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`WorkflowError::SettingsMissing`] when no settings or an
    /// empty base URL template is supplied.
    pub fn with_settings(
        mut self,
        settings: Option<&EndpointSettings>,
    ) -> Result<Self, WorkflowError> {
        let settings = settings.ok_or_else(|| {
            WorkflowError::SettingsMissing("no endpoint settings supplied".into())
        })?;
        if settings.base_url.trim().is_empty() {
            return Err(WorkflowError::SettingsMissing(
                "base URL template is empty".into(),
            ));
        }
        self.settings = Some(settings.clone());
        Ok(self)
    }

    pub fn with_credentials(mut self, credentials: &Credentials) -> Self {
        self.app_key = Some(credentials.app_key.clone());
        self
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Already-encoded query string, without the leading `?`.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn build(&self) -> Result<String, WorkflowError> {
        let settings = self.settings.as_ref().ok_or_else(|| {
            WorkflowError::SettingsMissing("no endpoint settings supplied".into())
        })?;
        let app_key = self
            .app_key
            .as_deref()
            .ok_or(WorkflowError::CredentialsNotSet)?;

        let base = settings
            .base_url
            .replace(VERSION_PLACEHOLDER, &settings.version)
            .replace(APP_KEY_PLACEHOLDER, &encode_path_segment(app_key)?);
        let mut url = base.trim_end_matches('/').to_string();

        if let Some(operation) = self.operation.as_deref() {
            let operation = operation.trim_start_matches('/');
            if !operation.is_empty() {
                url.push('/');
                url.push_str(operation);
            }
        }
        if let Some(query) = self.query.as_deref() {
            let query = query.trim_start_matches('?');
            if !query.is_empty() {
                url.push('?');
                url.push_str(query);
            }
        }
        Ok(url)
    }
}

/// `.` and `..` would be resolved away by the upstream, so they are refused.
fn encode_path_segment(segment: &str) -> Result<String, WorkflowError> {
    if segment == "." || segment == ".." {
        return Err(WorkflowError::CredentialInvalid { field: "appKey" });
    }
    // form encoding writes spaces as `+`; a literal `+` is already `%2B`
    Ok(byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20"))
}
