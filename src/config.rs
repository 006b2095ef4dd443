//! Configuration types for the Nmbrs client.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::session::{PRODUCTION_BASE_URL, SANDBOX_BASE_URL};

/// The config format version this crate reads.
pub const CONFIG_VERSION: &str = "1";

/// Main configuration for the Nmbrs client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NmbrsConfig {
    /// Config format version; only `CONFIG_VERSION` is accepted
    pub version: String,

    /// API credentials
    pub credentials: Credentials,

    /// Route all services to the sandbox environment
    pub sandbox: bool,

    /// Base URLs for both environments
    pub endpoints: EndpointsConfig,

    /// HTTP transport settings
    pub http: HttpConfig,

    /// Absence insert settings
    pub absence: AbsenceConfig,
}

impl Default for NmbrsConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            credentials: Credentials::default(),
            sandbox: false,
            endpoints: EndpointsConfig::default(),
            http: HttpConfig::default(),
            absence: AbsenceConfig::default(),
        }
    }
}

impl NmbrsConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Check the settings a session cannot be opened without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {:?}, expected {:?}",
                self.version, CONFIG_VERSION
            )));
        }
        if self.credentials.username.trim().is_empty() {
            return Err(ConfigError::Invalid("credentials.username is empty".to_string()));
        }
        if self.credentials.token.trim().is_empty() {
            return Err(ConfigError::Invalid("credentials.token is empty".to_string()));
        }
        for (name, url) in [
            ("endpoints.production", &self.endpoints.production),
            ("endpoints.sandbox", &self.endpoints.sandbox),
        ] {
            if !url.ends_with('/') {
                return Err(ConfigError::Invalid(format!("{} must end with '/'", name)));
            }
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid("http.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Username, API token and domain shared by every service session.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Account username (usually an e-mail address)
    pub username: String,

    /// API token
    pub token: String,

    /// Nmbrs domain (the subdomain of the environment)
    pub domain: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        token: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
            domain: domain.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

/// Base URLs. Service names are appended directly, so both end with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub production: String,
    pub sandbox: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            production: PRODUCTION_BASE_URL.to_string(),
            sandbox: SANDBOX_BASE_URL.to_string(),
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds, applied to WSDL checks and calls
    pub timeout_secs: u64,

    /// User-Agent header value
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("nmbrs-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Absence insert settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbsenceConfig {
    /// Remote operation used for absence inserts
    pub operation: AbsenceOperation,

    /// Case number rule for new absence cases
    pub new_case_number: CaseNumberRule,

    /// Case number rule for reopened absence cases
    pub reopen_case_number: CaseNumberRule,
}

impl Default for AbsenceConfig {
    fn default() -> Self {
        Self {
            operation: AbsenceOperation::Absence,
            new_case_number: CaseNumberRule::Direct,
            reopen_case_number: CaseNumberRule::FrequencySuffixed,
        }
    }
}

/// Absence insert operation version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AbsenceOperation {
    /// `Absence_Insert`
    #[default]
    Absence,
    /// `Absence2_Insert`
    Absence2,
}

impl AbsenceOperation {
    /// Remote operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absence => "Absence_Insert",
            Self::Absence2 => "Absence2_Insert",
        }
    }
}

/// Built-in case number rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseNumberRule {
    /// The case id itself
    Direct,
    /// Case id, `00`, then the reopen frequency
    FrequencySuffixed,
}
