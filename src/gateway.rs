//! The upstream gateway.
//!
//! Composes credential resolution, the access gate, and the upstream HTTP
//! call into one per-request flow:
//!
//! ```text
//! Start -> authorize -> Allowed    -> call upstream -> Success  -> Respond(ok envelope)
//!                                                   -> Failure  -> Respond(error envelope)
//!                    -> Redirected -> Redirect(login path)
//!                    -> Rejected   -> Respond(error envelope)
//! ```
//!
//! Every path terminates; there is no retry loop. The upstream call is the
//! only await point and is bounded by the configured timeout.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;

use crate::config::GatewayConfig;
use crate::credential::{Credential, CredentialResolver};
use crate::envelope::Envelope;
use crate::error::{ConfigError, GatewayError};
use crate::gate::AccessGate;
use crate::policy::{AccessDecision, RouteRequirement};
use crate::request::RequestContext;
use crate::upstream::{AuthMode, UpstreamRequest};

const JSON: &str = "application/json";
const MAX_ERROR_MESSAGE_LEN: usize = 512;

/// What the route layer should do with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Navigate the client to this path. No upstream call was made.
    Redirect(String),
    /// Reply with this envelope.
    Respond(Envelope),
}

impl Outcome {
    /// The envelope, if this outcome carries one.
    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            Outcome::Respond(envelope) => Some(envelope),
            Outcome::Redirect(_) => None,
        }
    }
}

/// Authenticated proxy to the upstream WordPress API.
///
/// `Gateway` is cheap to clone: the underlying `reqwest::Client` shares its
/// connection pool. It holds no per-request state.
#[derive(Debug, Clone)]
pub struct Gateway {
    config: GatewayConfig,
    resolver: CredentialResolver,
    gate: AccessGate,
    client: Client,
}

impl Gateway {
    /// Creates a gateway with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.upstream_timeout())
            .build()
            .map_err(|e| ConfigError::invalid("http_client", e.to_string()))?;
        Self::with_client(config, client)
    }

    /// Creates a gateway around an existing HTTP client.
    ///
    /// The configured upstream timeout is still applied to every request.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config is invalid.
    pub fn with_client(config: GatewayConfig, client: Client) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            resolver: CredentialResolver::new(config.cookie_keys().to_vec()),
            gate: AccessGate::new(config.login_path()),
            config,
            client,
        })
    }

    /// The gateway's configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Resolves the credential carried by `ctx`.
    pub fn resolve(&self, ctx: &RequestContext) -> Credential {
        self.resolver.resolve(ctx)
    }

    /// Authorizes `credential` against `requirement`.
    pub fn authorize(&self, credential: &Credential, requirement: &RouteRequirement) -> AccessDecision {
        self.gate.authorize(credential, requirement)
    }

    /// Runs the full per-request flow: resolve, authorize, and forward.
    ///
    /// Redirects never reach the upstream. A reject becomes a failed
    /// envelope with the reject status.
    pub async fn handle(
        &self,
        ctx: &RequestContext,
        requirement: &RouteRequirement,
        request: UpstreamRequest,
    ) -> Outcome {
        let span = tracing::info_span!("request", request_id = %ctx.request_id());
        async {
            match self.guard(ctx, requirement) {
                Ok(credential) => Outcome::Respond(self.call(&credential, &request).await),
                Err(outcome) => outcome,
            }
        }
        .instrument(span)
        .await
    }

    /// Resolves and authorizes without calling the upstream.
    ///
    /// Returns the credential when the request is allowed, otherwise the
    /// outcome the route layer should produce instead.
    pub fn guard(&self, ctx: &RequestContext, requirement: &RouteRequirement) -> Result<Credential, Outcome> {
        let credential = self.resolve(ctx);
        match self.authorize(&credential, requirement) {
            AccessDecision::Allow => Ok(credential),
            AccessDecision::RedirectTo(path) => Err(Outcome::Redirect(path)),
            AccessDecision::Reject(status) => Err(Outcome::Respond(Envelope::failure(status, "forbidden"))),
        }
    }

    /// Issues one upstream call and normalizes the result.
    ///
    /// Never panics and never returns an error: every failure becomes a
    /// failed [`Envelope`].
    pub async fn call(&self, credential: &Credential, request: &UpstreamRequest) -> Envelope {
        match self.fetch(credential, request).await {
            Ok((status, data)) => Envelope::success(status, data),
            Err(err) => err.into(),
        }
    }

    /// Issues one upstream call and decodes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedResponse`] if the body does not match
    /// `T`, and the other [`GatewayError`] kinds for auth and transport
    /// failures.
    pub async fn call_typed<T>(
        &self,
        credential: &Credential,
        request: &UpstreamRequest,
    ) -> Result<(u16, T), GatewayError>
    where
        T: DeserializeOwned,
    {
        let (status, data) = self.fetch(credential, request).await?;
        let record = decode_record(request, &data)?;
        Ok((status, record))
    }

    /// Issues one upstream call, checks the body against `T`, and returns
    /// the body unchanged.
    ///
    /// Fields `T` does not know about are passed through.
    pub(crate) async fn call_checked<T>(
        &self,
        credential: &Credential,
        request: &UpstreamRequest,
    ) -> Result<(u16, Value), GatewayError>
    where
        T: DeserializeOwned,
    {
        let (status, data) = self.fetch(credential, request).await?;
        decode_record::<T>(request, &data)?;
        Ok((status, data))
    }

    async fn fetch(
        &self,
        credential: &Credential,
        request: &UpstreamRequest,
    ) -> Result<(u16, Value), GatewayError> {
        let url = request.endpoint().url(&self.config);
        let span = tracing::debug_span!(
            "upstream",
            method = %request.method(),
            endpoint = %request.endpoint(),
        );

        self.send(credential, request, &url).instrument(span).await
    }

    async fn send(
        &self,
        credential: &Credential,
        request: &UpstreamRequest,
        url: &str,
    ) -> Result<(u16, Value), GatewayError> {
        let mut builder = self
            .client
            .request(request.method().into(), url)
            .timeout(self.config.upstream_timeout())
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON);

        match (request.auth(), credential.raw()) {
            (AuthMode::None, _) => {}
            (AuthMode::Required, None) => {
                tracing::debug!("credential required for upstream call but absent");
                return Err(GatewayError::AuthMissing);
            }
            (AuthMode::Required | AuthMode::IfPresent, Some(token)) => {
                builder = builder.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
            }
            (AuthMode::IfPresent, None) => {}
        }

        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = error_message(status, &bytes);
            tracing::warn!(status = status.as_u16(), error = %message, "upstream returned an error");
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        if bytes.is_empty() && status == StatusCode::NO_CONTENT {
            return Ok((status.as_u16(), Value::Null));
        }

        let data = serde_json::from_slice::<Value>(&bytes).map_err(|e| {
            tracing::error!(status = status.as_u16(), error = %e, "upstream returned a non-JSON body");
            GatewayError::MalformedResponse
        })?;

        tracing::debug!(status = status.as_u16(), "upstream call succeeded");
        Ok((status.as_u16(), data))
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            tracing::warn!(error = %err, "upstream call timed out");
            GatewayError::UpstreamTimeout
        } else {
            tracing::warn!(error = %err, "upstream call failed");
            GatewayError::UpstreamUnreachable {
                status: self.config.network_failure_status(),
                message: "could not reach upstream".to_string(),
            }
        }
    }
}

fn decode_record<T>(request: &UpstreamRequest, data: &Value) -> Result<T, GatewayError>
where
    T: DeserializeOwned,
{
    <T as serde::Deserialize>::deserialize(data).map_err(|e| {
        tracing::error!(
            endpoint = %request.endpoint(),
            error = %e,
            "upstream response does not match the endpoint record"
        );
        GatewayError::MalformedResponse
    })
}

/// Builds a human-readable message from a non-2xx upstream body.
///
/// Prefers the WordPress error shape (`{"code", "message", "data"}`), then the
/// trimmed body text, then the status reason phrase.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        let message = ["message", "error"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|message| !message.is_empty());
        if let Some(message) = message {
            return truncate(message);
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return truncate(text);
    }

    status
        .canonical_reason()
        .unwrap_or("upstream error")
        .to_string()
}

fn truncate(message: &str) -> String {
    if message.len() <= MAX_ERROR_MESSAGE_LEN {
        return message.to_string();
    }
    let mut end = MAX_ERROR_MESSAGE_LEN;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &message[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_wordpress_message() {
        let body = br#"{"code":"rest_no_route","message":"No route was found","data":{"status":404}}"#;
        assert_eq!(error_message(StatusCode::NOT_FOUND, body), "No route was found");
    }

    #[test]
    fn error_message_accepts_error_field() {
        let body = br#"{"error":"Tribute not found"}"#;
        assert_eq!(error_message(StatusCode::NOT_FOUND, body), "Tribute not found");
    }

    #[test]
    fn error_message_skips_non_string_message() {
        let body = br#"{"message":null,"error":"Tribute not found"}"#;
        assert_eq!(error_message(StatusCode::NOT_FOUND, body), "Tribute not found");

        let body = br#"{"message":"   ","error":"Slug taken"}"#;
        assert_eq!(error_message(StatusCode::CONFLICT, body), "Slug taken");
    }

    #[test]
    fn error_message_falls_back_to_text() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, b"  upstream down \n"),
            "upstream down"
        );
    }

    #[test]
    fn error_message_falls_back_to_reason() {
        assert_eq!(error_message(StatusCode::NOT_FOUND, b""), "Not Found");
    }

    #[test]
    fn error_message_ignores_blank_json_message() {
        let body = br#"{"message":"  "}"#;
        assert_eq!(error_message(StatusCode::FORBIDDEN, body), r#"{"message":"  "}"#);
    }

    #[test]
    fn long_messages_are_truncated_on_char_boundary() {
        let long = "é".repeat(MAX_ERROR_MESSAGE_LEN);
        let out = truncate(&long);
        assert!(out.ends_with("..."));
        assert!(out.len() <= MAX_ERROR_MESSAGE_LEN + 3);
    }

    #[test]
    fn with_client_rejects_invalid_config() {
        let config = GatewayConfig::new("not-a-url");
        assert!(Gateway::with_client(config, Client::new()).is_err());
    }

    #[test]
    fn outcome_envelope_accessor() {
        let outcome = Outcome::Respond(Envelope::failure(403, "forbidden"));
        assert_eq!(outcome.envelope().unwrap().status(), 403);
        assert!(Outcome::Redirect("/login".into()).envelope().is_none());
    }
}
