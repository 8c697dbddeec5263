//! Deployment configuration resolved once at cold start.
//!
//! # Environment Variables
//!
//! - `CATALYST_EVENT_SHAPE`: `custom-path` (default), `simple-proxy` or `resource-template`
//! - `CATALYST_ROUTE_PREFIX`: API surface prefix (default: `catalyst/features`)
//! - `CATALYST_EXTENSION_SEPARATOR`: `hyphen` (default) or `underscore`
//! - `CATALYST_BODY_ENCODING`: `object` (default) or `text`
//! - `CATALYST_BASE_URL`: deployment base URL, required for `resource-template`

use serde::{Deserialize, Serialize};

use crate::envelope::BodyEncoding;
use crate::error::ConfigError;
use crate::events::EventShape;
use crate::router::Separator;

pub const ENV_EVENT_SHAPE: &str = "CATALYST_EVENT_SHAPE";
pub const ENV_ROUTE_PREFIX: &str = "CATALYST_ROUTE_PREFIX";
pub const ENV_EXTENSION_SEPARATOR: &str = "CATALYST_EXTENSION_SEPARATOR";
pub const ENV_BODY_ENCODING: &str = "CATALYST_BODY_ENCODING";
pub const ENV_BASE_URL: &str = "CATALYST_BASE_URL";

/// Default API surface prefix stripped by the router.
pub const DEFAULT_ROUTE_PREFIX: &str = "catalyst/features";

/// Settings fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub shape: EventShape,
    pub route_prefix: String,
    pub separator: Separator,
    pub body_encoding: BodyEncoding,
    pub base_url: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            shape: EventShape::default(),
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
            separator: Separator::default(),
            body_encoding: BodyEncoding::default(),
            base_url: None,
        }
    }
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            shape: get(ENV_EVENT_SHAPE)
                .map(|v| v.parse::<EventShape>())
                .transpose()?
                .unwrap_or(defaults.shape),
            route_prefix: get(ENV_ROUTE_PREFIX).unwrap_or(defaults.route_prefix),
            separator: get(ENV_EXTENSION_SEPARATOR)
                .map(|v| v.parse::<Separator>())
                .transpose()?
                .unwrap_or(defaults.separator),
            body_encoding: get(ENV_BODY_ENCODING)
                .map(|v| v.parse::<BodyEncoding>())
                .transpose()?
                .unwrap_or(defaults.body_encoding),
            base_url: get(ENV_BASE_URL),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field requirements.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_base_url = self
            .base_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty());
        if self.shape == EventShape::ResourceTemplate && !has_base_url {
            return Err(ConfigError::MissingBaseUrl);
        }
        Ok(())
    }
}
