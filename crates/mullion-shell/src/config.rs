//! Host configuration.

use std::time::Duration;

use mullion_core::policy::VersionPolicy;
use url::Url;

use crate::communicator::ShellConfig;

/// Environment variable naming the account app's base URL.
pub const ENV_ACCOUNT_APP_URL: &str = "ACCOUNT_APP_URL";

/// Environment variable gating frame mode.
pub const ENV_ACCOUNT_FRAME_MODE: &str = "ACCOUNT_FRAME_MODE";

/// Configuration failures at bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable was absent.
    #[error("environment variable `{0}` is not set")]
    MissingVar(&'static str),

    /// A URL-valued variable did not parse.
    #[error("`{var}` is not a valid URL: {source}")]
    InvalidUrl {
        /// Variable that failed.
        var: &'static str,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },

    /// A boolean-valued variable held something unrecognizable.
    #[error("`{var}` must be a boolean flag (got `{value}`)")]
    InvalidFlag {
        /// Variable that failed.
        var: &'static str,
        /// Offending value.
        value: String,
    },

    /// The account app URL has no usable web origin.
    #[error("account app URL `{0}` has no web origin")]
    OpaqueOrigin(Url),
}

/// Frame-host configuration.
///
/// The communicator's origin discipline is derived from
/// [`HostConfig::account_app_url`]: its origin becomes both the outbound
/// target origin and the single allowed inbound origin.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Base URL the account frame is served from.
    pub account_app_url: Url,

    /// Whether the host actually embeds the account frame. When false,
    /// mounting the frame host is a logged no-op.
    pub frame_mode: bool,

    /// How long an inbound request may stay unanswered before the
    /// communicator answers it with a timeout error.
    pub response_timeout: Duration,

    /// Version-mismatch policy for inbound messages.
    pub version_policy: VersionPolicy,
}

impl HostConfig {
    /// Defaults for a base URL: frame mode on, 30 second response
    /// deadline, lenient version policy.
    pub fn new(account_app_url: Url) -> Self {
        Self {
            account_app_url,
            frame_mode: true,
            response_timeout: Duration::from_secs(30),
            version_policy: VersionPolicy::default(),
        }
    }

    /// Load from the environment: [`ENV_ACCOUNT_APP_URL`] (required) and
    /// [`ENV_ACCOUNT_FRAME_MODE`] (optional, defaults on).
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var(ENV_ACCOUNT_APP_URL)
            .map_err(|_| ConfigError::MissingVar(ENV_ACCOUNT_APP_URL))?;
        let account_app_url = Url::parse(&raw)
            .map_err(|source| ConfigError::InvalidUrl { var: ENV_ACCOUNT_APP_URL, source })?;

        let mut config = Self::new(account_app_url);
        if let Ok(value) = std::env::var(ENV_ACCOUNT_FRAME_MODE) {
            config.frame_mode = parse_flag(ENV_ACCOUNT_FRAME_MODE, &value)?;
        }
        Ok(config)
    }

    /// The communicator configuration this host implies.
    pub fn shell_config(&self) -> Result<ShellConfig, ConfigError> {
        let origin = self.account_app_url.origin();
        if !origin.is_tuple() {
            return Err(ConfigError::OpaqueOrigin(self.account_app_url.clone()));
        }
        let mut config = ShellConfig::for_origin(origin.ascii_serialization());
        config.response_timeout = self.response_timeout;
        config.version_policy = self.version_policy;
        Ok(config)
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { var, value: value.to_string() }),
    }
}
