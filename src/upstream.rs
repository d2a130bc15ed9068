//! Upstream request description and URL construction.
//!
//! Paths are never taken from raw caller text: every request names an
//! [`Endpoint`], and the only caller-controlled segment (a tribute slug) must
//! arrive as [`Verified<String>`].

use std::fmt;

use serde_json::Value;

use crate::config::GatewayConfig;
use crate::Verified;

/// HTTP method for an upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Patch => write!(f, "PATCH"),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
        }
    }
}

/// Known upstream endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `{namespace}/tribute/{slug}`
    Tribute(Verified<String>),
    /// `{namespace}/all-tributes`
    AllTributes,
    /// `{namespace}/tribute`
    CreateTribute,
    /// `{auth_namespace}/token`
    Token,
    /// `{auth_namespace}/token/validate`
    ValidateToken,
}

impl Endpoint {
    /// Path below the namespace.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Tribute(slug) => format!("tribute/{}", slug.as_ref()),
            Endpoint::AllTributes => "all-tributes".to_string(),
            Endpoint::CreateTribute => "tribute".to_string(),
            Endpoint::Token => "token".to_string(),
            Endpoint::ValidateToken => "token/validate".to_string(),
        }
    }

    /// Namespace this endpoint lives under.
    pub fn namespace<'a>(&self, config: &'a GatewayConfig) -> &'a str {
        match self {
            Endpoint::Token | Endpoint::ValidateToken => config.auth_namespace(),
            _ => config.namespace(),
        }
    }

    /// Full URL: `base_url/namespace/path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tribute_gateway::{Endpoint, GatewayConfig};
    ///
    /// let config = GatewayConfig::new("https://example.com/wp-json/");
    /// assert_eq!(
    ///     Endpoint::AllTributes.url(&config),
    ///     "https://example.com/wp-json/tributestream/v1/all-tributes",
    /// );
    /// assert_eq!(
    ///     Endpoint::Token.url(&config),
    ///     "https://example.com/wp-json/jwt-auth/v1/token",
    /// );
    /// ```
    pub fn url(&self, config: &GatewayConfig) -> String {
        format!(
            "{}/{}/{}",
            config.base_url(),
            self.namespace(config),
            self.path()
        )
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Whether a call carries the session credential upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Never send `Authorization`.
    None,
    /// Send `Authorization` when a credential is present.
    IfPresent,
    /// Send `Authorization`; fail locally with 401 when no credential is present.
    Required,
}

/// One call to the upstream API.
///
/// # Examples
///
/// ```
/// use tribute_gateway::{AuthMode, Endpoint, Method, UpstreamRequest};
/// use serde_json::json;
///
/// let req = UpstreamRequest::post(Endpoint::CreateTribute, json!({"loved_one_name": "Jane"}))
///     .with_auth(AuthMode::Required);
/// assert_eq!(req.method(), Method::Post);
/// assert!(req.body().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    endpoint: Endpoint,
    method: Method,
    body: Option<Value>,
    auth: AuthMode,
}

impl UpstreamRequest {
    /// Creates a request with no body and [`AuthMode::IfPresent`].
    pub fn new(method: Method, endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            method,
            body: None,
            auth: AuthMode::IfPresent,
        }
    }

    /// GET request.
    pub fn get(endpoint: Endpoint) -> Self {
        Self::new(Method::Get, endpoint)
    }

    /// POST request with a JSON body.
    pub fn post(endpoint: Endpoint, body: Value) -> Self {
        Self::new(Method::Post, endpoint).with_body(body)
    }

    /// Attaches a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Overrides the auth mode.
    pub fn with_auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    /// Target endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// JSON body, if any.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Auth mode.
    pub fn auth(&self) -> AuthMode {
        self.auth
    }
}
