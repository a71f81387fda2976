//! Registry client configuration.
//!
//! The stage picks default endpoints; `VCN_API_URL` overrides the registry
//! base URL for any stage.

use crate::endpoint::RegistryEndpoint;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("vcn-registry-client/", env!("CARGO_PKG_VERSION"));

/// Deployment the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Production,
    Staging,
    Test,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Production, Stage::Staging, Stage::Test];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Production => "PRODUCTION",
            Stage::Staging => "STAGING",
            Stage::Test => "TEST",
        }
    }

    pub fn api_url(self) -> &'static str {
        match self {
            Stage::Production => "https://api.codenotary.io/foundation",
            Stage::Staging => "https://api.staging.codenotary.io/foundation",
            Stage::Test => "http://localhost:3000/foundation",
        }
    }

    pub fn dashboard_url(self) -> &'static str {
        match self {
            Stage::Production => "https://dashboard.codenotary.io",
            Stage::Staging => "https://dashboard.staging.codenotary.io",
            Stage::Test => "http://localhost:3001",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = ConfigError;

    /// Case-insensitive, so `VCN_STAGE=staging` works.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownStage(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub stage: Stage,
    pub endpoint: RegistryEndpoint,
    /// Per-request timeout. There is no retry.
    pub timeout: Duration,
    /// Sent as `User-Agent` on every request.
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration pointing at `base_url`, e.g. a local mock server.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            stage: Stage::Test,
            endpoint: parse_endpoint("base URL", base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `VCN_STAGE` (default: `production`)
    /// - `VCN_API_URL` (default: the stage's registry URL)
    /// - `VCN_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let stage = match var("VCN_STAGE") {
            Some(s) => s.parse()?,
            None => Stage::default(),
        };
        let endpoint = match var("VCN_API_URL") {
            Some(url) => parse_endpoint("VCN_API_URL", &url)?,
            None => parse_endpoint("VCN_STAGE", stage.api_url())?,
        };
        let timeout_secs = match var("VCN_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            stage,
            endpoint,
            timeout: Duration::from_secs(timeout_secs),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }
}

fn parse_endpoint(var: &str, raw: &str) -> Result<RegistryEndpoint, ConfigError> {
    RegistryEndpoint::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(var.to_string(), format!("{e:#}")))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown stage '{0}' (expected production, staging or test)")]
    UnknownStage(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid VCN_TIMEOUT_SECS '{0}' (expected a positive number of seconds)")]
    InvalidTimeout(String),
}
