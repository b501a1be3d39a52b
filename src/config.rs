use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use toast_core::{EndpointSettings, SettingsProvider};
use toast_workflow::{CredentialHeaderNames, DEFAULT_CLIENT_NAME};

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Toast SMS endpoint; absent until configured
    pub endpoint: Option<EndpointConfig>,
    /// Outbound HTTP client configuration
    pub http: HttpClientConfig,
    /// Outbound credential header names
    pub credential_headers: CredentialHeadersConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Server host (default: 0.0.0.0)
    pub host: String,
    /// Server port (default: 7071)
    pub port: u16,
    /// Maximum request body size in bytes (default: 1MB)
    pub max_body_size: usize,
}

/// Toast SMS endpoint configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EndpointConfig {
    /// Base URL template with `{version}` and `{appKey}` placeholders
    pub base_url: String,
    /// API version substituted for `{version}` (default: v3.0)
    pub version: String,
}

/// Outbound HTTP client configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpClientConfig {
    /// Name handed to the client factory (default: toast)
    pub client_name: String,
    /// Whole-request timeout in seconds; none when unset
    pub timeout_seconds: Option<u64>,
    /// User-Agent header override
    pub user_agent: Option<String>,
}

/// Names of the outbound headers carrying the credential pair
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CredentialHeadersConfig {
    pub app_key: String,
    pub secret_key: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: json or pretty (default: json)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7071,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            timeout_seconds: None,
            user_agent: None,
        }
    }
}

impl HttpClientConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Default for CredentialHeadersConfig {
    fn default() -> Self {
        let names = CredentialHeaderNames::default();
        Self {
            app_key: names.app_key,
            secret_key: names.secret_key,
        }
    }
}

impl From<&CredentialHeadersConfig> for CredentialHeaderNames {
    fn from(config: &CredentialHeadersConfig) -> Self {
        Self {
            app_key: config.app_key.clone(),
            secret_key: config.secret_key.clone(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(Config::try_from(&AppConfig::default())?)
            // Add configuration file based on environment
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local configuration file (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with TOASTKIT_)
            .add_source(Environment::with_prefix("TOASTKIT").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.normalized()
    }

    /// Resolved endpoint settings, if configured.
    pub fn endpoint_settings(&self) -> Option<EndpointSettings> {
        self.endpoint
            .as_ref()
            .map(|endpoint| EndpointSettings::new(&endpoint.base_url, &endpoint.version))
    }

    pub fn credential_header_names(&self) -> CredentialHeaderNames {
        CredentialHeaderNames::from(&self.credential_headers)
    }

    fn normalized(self) -> Result<Self, ConfigError> {
        if self.credential_headers.app_key.trim().is_empty()
            || self.credential_headers.secret_key.trim().is_empty()
        {
            return Err(ConfigError::Message(
                "credential header names must not be blank".into(),
            ));
        }
        Ok(self)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            endpoint: None,
            http: HttpClientConfig::default(),
            credential_headers: CredentialHeadersConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Settings resolved once from [`AppConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfiguredSettings {
    endpoint: Option<EndpointSettings>,
}

impl From<&AppConfig> for ConfiguredSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            endpoint: config.endpoint_settings(),
        }
    }
}

impl SettingsProvider for ConfiguredSettings {
    fn endpoint_settings(&self) -> Option<&EndpointSettings> {
        self.endpoint.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_endpoint() {
        let config = AppConfig::default();
        assert!(config.endpoint_settings().is_none());
        assert!(ConfiguredSettings::from(&config).endpoint_settings().is_none());
        assert_eq!(config.http.client_name, "toast");
        assert_eq!(config.http.timeout(), None);
        assert_eq!(config.credential_header_names().secret_key, "X-Secret-Key");
    }

    #[test]
    fn layered_sources_override_defaults() {
        let built = Config::builder()
            .add_source(Config::try_from(&AppConfig::default()).unwrap())
            .set_override(
                "endpoint.base_url",
                "https://api-sms.cloud.toast.com/sms/{version}/appKeys/{appKey}",
            )
            .unwrap()
            .set_override("endpoint.version", "v3.0")
            .unwrap()
            .set_override("http.timeout_seconds", 10)
            .unwrap()
            .build()
            .unwrap();
        let config: AppConfig = built.try_deserialize().unwrap();

        let settings = ConfiguredSettings::from(&config);
        let endpoint = settings.endpoint_settings().unwrap();
        assert_eq!(endpoint.version, "v3.0");
        assert!(endpoint.base_url.contains("{appKey}"));
        assert_eq!(config.http.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn blank_header_names_are_rejected() {
        let mut config = AppConfig::default();
        config.credential_headers.secret_key = " ".into();
        assert!(config.normalized().is_err());
    }
}
