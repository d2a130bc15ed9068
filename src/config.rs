//! Gateway configuration.
//!
//! All values are externally supplied constants. Build a [`GatewayConfig`]
//! with [`GatewayConfig::new`] and the `with_*` overrides, or load one from
//! the process environment with [`GatewayConfig::from_env`].
//!
//! # Environment variables
//!
//! | Variable                         | Default            |
//! |----------------------------------|--------------------|
//! | `TRIBUTE_BASE_URL`               | required           |
//! | `TRIBUTE_NAMESPACE`              | `tributestream/v1` |
//! | `TRIBUTE_AUTH_NAMESPACE`         | `jwt-auth/v1`      |
//! | `TRIBUTE_LOGIN_PATH`             | `/login`           |
//! | `TRIBUTE_COOKIE_KEYS`            | `auth_token,jwt`   |
//! | `TRIBUTE_UPSTREAM_TIMEOUT_SECS`  | `10`               |
//! | `TRIBUTE_NETWORK_FAILURE_STATUS` | `500`              |
//! | `TRIBUTE_LISTEN_PORT`            | `8080`             |

use std::time::Duration;

use crate::credential::DEFAULT_TOKEN_COOKIES;
use crate::error::ConfigError;

const DEFAULT_NAMESPACE: &str = "tributestream/v1";
const DEFAULT_AUTH_NAMESPACE: &str = "jwt-auth/v1";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_NETWORK_FAILURE_STATUS: u16 = 500;
const DEFAULT_LISTEN_PORT: u16 = 8080;

/// Configuration consumed by the gateway and the HTTP binding.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    base_url: String,
    namespace: String,
    auth_namespace: String,
    login_path: String,
    cookie_keys: Vec<String>,
    upstream_timeout: Duration,
    network_failure_status: u16,
    listen_port: u16,
}

impl GatewayConfig {
    /// Creates a config for the given upstream base URL with defaults for
    /// everything else.
    ///
    /// The base URL is typically the WordPress REST root, e.g.
    /// `https://example.com/wp-json`. A trailing `/` is removed.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_slashes(&base_url.into(), false),
            namespace: DEFAULT_NAMESPACE.to_string(),
            auth_namespace: DEFAULT_AUTH_NAMESPACE.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            cookie_keys: DEFAULT_TOKEN_COOKIES.iter().map(|k| k.to_string()).collect(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            network_failure_status: DEFAULT_NETWORK_FAILURE_STATUS,
            listen_port: DEFAULT_LISTEN_PORT,
        }
    }

    /// Loads the config from process environment variables and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `TRIBUTE_BASE_URL` is missing or any value
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the config through an arbitrary key lookup.
    ///
    /// [`from_env`](Self::from_env) delegates here; tests pass a closure over
    /// a map instead of touching the real environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("TRIBUTE_BASE_URL").ok_or(ConfigError::Missing("TRIBUTE_BASE_URL"))?;
        let mut config = Self::new(base_url);

        if let Some(ns) = lookup("TRIBUTE_NAMESPACE") {
            config = config.with_namespace(ns);
        }
        if let Some(ns) = lookup("TRIBUTE_AUTH_NAMESPACE") {
            config = config.with_auth_namespace(ns);
        }
        if let Some(path) = lookup("TRIBUTE_LOGIN_PATH") {
            config = config.with_login_path(path);
        }
        if let Some(keys) = lookup("TRIBUTE_COOKIE_KEYS") {
            config = config.with_cookie_keys(
                keys.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        }
        if let Some(secs) = lookup("TRIBUTE_UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = parse(&secs, "TRIBUTE_UPSTREAM_TIMEOUT_SECS")?;
            config = config.with_upstream_timeout(Duration::from_secs(secs));
        }
        if let Some(status) = lookup("TRIBUTE_NETWORK_FAILURE_STATUS") {
            config = config.with_network_failure_status(parse(&status, "TRIBUTE_NETWORK_FAILURE_STATUS")?);
        }
        if let Some(port) = lookup("TRIBUTE_LISTEN_PORT") {
            config = config.with_listen_port(parse(&port, "TRIBUTE_LISTEN_PORT")?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Override the namespace for tribute endpoints.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = trim_slashes(&namespace.into(), true);
        self
    }

    /// Override the namespace for JWT endpoints.
    pub fn with_auth_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.auth_namespace = trim_slashes(&namespace.into(), true);
        self
    }

    /// Override where unauthenticated requests are redirected.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Override the cookie keys searched for a session token, in order.
    pub fn with_cookie_keys(mut self, keys: Vec<String>) -> Self {
        self.cookie_keys = keys;
        self
    }

    /// Override the upstream call timeout.
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Override the status reported when the upstream is unreachable.
    pub fn with_network_failure_status(mut self, status: u16) -> Self {
        self.network_failure_status = status;
        self
    }

    /// Override the port the HTTP binding listens on.
    pub fn with_listen_port(mut self, port: u16) -> Self {
        self.listen_port = port;
        self
    }

    /// Checks the config for values the gateway cannot work with.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "TRIBUTE_BASE_URL",
                "must start with http:// or https://",
            ));
        }
        if self.namespace.is_empty() {
            return Err(ConfigError::invalid("TRIBUTE_NAMESPACE", "must not be empty"));
        }
        if self.auth_namespace.is_empty() {
            return Err(ConfigError::invalid("TRIBUTE_AUTH_NAMESPACE", "must not be empty"));
        }
        if !self.login_path.starts_with('/') {
            return Err(ConfigError::invalid("TRIBUTE_LOGIN_PATH", "must start with '/'"));
        }
        if self.cookie_keys.is_empty() {
            return Err(ConfigError::invalid("TRIBUTE_COOKIE_KEYS", "at least one key is required"));
        }
        if self.upstream_timeout.is_zero() {
            return Err(ConfigError::invalid("TRIBUTE_UPSTREAM_TIMEOUT_SECS", "must be greater than 0"));
        }
        if !(400..=599).contains(&self.network_failure_status) {
            return Err(ConfigError::invalid(
                "TRIBUTE_NETWORK_FAILURE_STATUS",
                "must be an HTTP error status (400-599)",
            ));
        }
        Ok(())
    }

    /// Upstream base URL, without a trailing `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Namespace for tribute endpoints.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Namespace for JWT endpoints.
    pub fn auth_namespace(&self) -> &str {
        &self.auth_namespace
    }

    /// Login redirect path.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Cookie keys searched for a session token.
    pub fn cookie_keys(&self) -> &[String] {
        &self.cookie_keys
    }

    /// Upstream call timeout.
    pub fn upstream_timeout(&self) -> Duration {
        self.upstream_timeout
    }

    /// Status reported when the upstream is unreachable.
    pub fn network_failure_status(&self) -> u16 {
        self.network_failure_status
    }

    /// HTTP listen port.
    pub fn listen_port(&self) -> u16 {
        self.listen_port
    }
}

fn trim_slashes(value: &str, leading: bool) -> String {
    let value = value.trim().trim_end_matches('/');
    if leading {
        value.trim_start_matches('/').to_string()
    } else {
        value.to_string()
    }
}

fn parse<T: std::str::FromStr>(value: &str, key: &'static str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string()))
}
