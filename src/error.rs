//! Error taxonomy for the gateway boundary.
//!
//! Every failure the gateway can encounter is one of these kinds. None of them
//! escape [`Gateway`](crate::Gateway): they are converted into an
//! [`Envelope`](crate::Envelope) (or an [`AccessDecision`](crate::AccessDecision)
//! in the guard path) before reaching the caller.

use thiserror::Error;

/// Message carried by [`GatewayError::MalformedResponse`].
pub const MALFORMED_RESPONSE: &str = "malformed response";

/// Failure kinds produced while authorizing or forwarding a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No credential where one is required.
    #[error("authentication required")]
    AuthMissing,

    /// A credential is present but its role or claims do not satisfy the route.
    #[error("forbidden: {0}")]
    AuthInvalid(String),

    /// A caller-supplied value (e.g. a route slug) failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The upstream could not be reached (DNS, connect, TLS, reset).
    #[error("upstream unreachable: {message}")]
    UpstreamUnreachable {
        /// Status reported to the caller.
        status: u16,
        /// Transport error description.
        message: String,
    },

    /// The upstream did not answer within the configured timeout.
    #[error("upstream timed out")]
    UpstreamTimeout,

    /// The upstream answered with a non-2xx status.
    #[error("{message}")]
    Upstream {
        /// Status mirrored from the upstream response.
        status: u16,
        /// Message derived from the upstream body.
        message: String,
    },

    /// The upstream body was not valid JSON, or did not match the endpoint's record.
    #[error("malformed response")]
    MalformedResponse,
}

impl GatewayError {
    /// HTTP status reported for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::AuthMissing => 401,
            Self::AuthInvalid(_) => 403,
            Self::InvalidInput(_) => 400,
            Self::UpstreamUnreachable { status, .. } => *status,
            Self::UpstreamTimeout => 504,
            Self::Upstream { status, .. } => *status,
            Self::MalformedResponse => 500,
        }
    }
}

/// Errors raised while loading or validating [`GatewayConfig`](crate::GatewayConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required setting was not supplied.
    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    /// A setting was supplied but could not be used.
    #[error("invalid value for `{key}`: {reason}")]
    Invalid {
        /// Name of the offending setting.
        key: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}
