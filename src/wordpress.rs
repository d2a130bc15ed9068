//! Typed records for the WordPress endpoints and the gateway helpers that
//! use them.
//!
//! Each helper validates the upstream JSON against its record before it
//! builds the envelope. A shape mismatch is reported as
//! [`GatewayError::MalformedResponse`]. A body that matches is passed on
//! as received, including fields the record does not name.

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::credential::Credential;
use crate::envelope::Envelope;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::sanitizer::{Sanitizer, SlugSanitizer};
use crate::upstream::{AuthMode, Endpoint, UpstreamRequest};
use crate::{Secret, Tainted};

/// A memorial page as stored upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tribute {
    /// Upstream row id.
    #[serde(
        default,
        deserialize_with = "optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,
    /// WordPress user that owns the tribute.
    #[serde(
        default,
        deserialize_with = "optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<i64>,
    /// Name of the person being remembered.
    pub loved_one_name: String,
    /// URL slug of the tribute page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Owner-supplied HTML shown on the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_html: Option<String>,
    /// Contact number for the family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Creation timestamp as reported upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp as reported upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Body for creating a tribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTribute {
    /// Name of the person being remembered.
    pub loved_one_name: String,
    /// Desired slug; upstream derives one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// WordPress user that will own the tribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Owner-supplied HTML.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_html: Option<String>,
    /// Contact number for the family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl NewTribute {
    fn validate(&self) -> Result<(), GatewayError> {
        if self.loved_one_name.trim().is_empty() {
            return Err(GatewayError::InvalidInput(
                "loved_one_name must not be empty".to_string(),
            ));
        }
        if let Some(slug) = &self.slug {
            SlugSanitizer::default().sanitize(Tainted::new(slug.clone()))?;
        }
        Ok(())
    }
}

/// Upstream acknowledgement of a created tribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTribute {
    /// Id assigned upstream.
    #[serde(deserialize_with = "id")]
    pub id: i64,
    /// Optional status text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// `$wpdb` rows carry numeric columns as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn parse<E: de::Error>(self) -> Result<i64, E> {
        match self {
            RawId::Number(n) => Ok(n),
            RawId::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id {s:?}"))),
        }
    }
}

fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer)?.parse()
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer)?
        .map(RawId::parse::<D::Error>)
        .transpose()
}

/// Username/password pair for the JWT token endpoint.
#[derive(Debug)]
pub struct LoginRequest {
    username: String,
    password: Secret<String>,
}

impl LoginRequest {
    /// Creates a login request.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password.into()),
        }
    }

    fn to_body(&self) -> Value {
        serde_json::json!({
            "username": self.username,
            "password": self.password.expose_secret(),
        })
    }
}

/// Public profile of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Display name.
    pub user_display_name: String,
    /// Email address.
    pub user_email: String,
    /// URL-safe username.
    pub user_nicename: String,
}

/// Response of the JWT token endpoint.
///
/// The token stays wrapped; only the profile is meant to reach the client.
#[derive(Debug)]
pub struct TokenResponse {
    /// Issued JWT.
    pub token: Secret<String>,
    /// Profile returned alongside the token.
    pub user: SessionUser,
}

#[derive(Deserialize)]
struct TokenPayload {
    token: String,
    user_display_name: String,
    user_email: String,
    user_nicename: String,
}

impl From<TokenPayload> for TokenResponse {
    fn from(p: TokenPayload) -> Self {
        Self {
            token: Secret::new(p.token),
            user: SessionUser {
                user_display_name: p.user_display_name,
                user_email: p.user_email,
                user_nicename: p.user_nicename,
            },
        }
    }
}

/// Response of the JWT validate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenValidation {
    /// Result code, e.g. `jwt_auth_valid_token`.
    pub code: String,
    /// Extra data reported upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Gateway {
    /// GET `tribute/{slug}`.
    ///
    /// The slug is sanitized first; an invalid slug yields a 400 envelope
    /// without contacting the upstream.
    pub async fn tribute(&self, credential: &Credential, slug: Tainted<String>) -> Envelope {
        let slug = match SlugSanitizer::default().sanitize(slug) {
            Ok(slug) => slug,
            Err(e) => return GatewayError::from(e).into(),
        };
        let request = UpstreamRequest::get(Endpoint::Tribute(slug));
        self.typed_envelope::<Tribute>(credential, &request).await
    }

    /// GET `all-tributes`.
    pub async fn all_tributes(&self, credential: &Credential) -> Envelope {
        let request = UpstreamRequest::get(Endpoint::AllTributes);
        self.typed_envelope::<Vec<Tribute>>(credential, &request).await
    }

    /// POST `tribute` with the session credential.
    pub async fn create_tribute(&self, credential: &Credential, tribute: &NewTribute) -> Envelope {
        if let Err(e) = tribute.validate() {
            return e.into();
        }
        let body = match serde_json::to_value(tribute) {
            Ok(body) => body,
            Err(e) => return GatewayError::InvalidInput(e.to_string()).into(),
        };
        let request =
            UpstreamRequest::post(Endpoint::CreateTribute, body).with_auth(AuthMode::Required);
        self.typed_envelope::<CreatedTribute>(credential, &request).await
    }

    /// POST the JWT token endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] for a blank username or password,
    /// the upstream status on rejected credentials, and
    /// [`GatewayError::MalformedResponse`] if the token payload is incomplete.
    pub async fn login(&self, login: &LoginRequest) -> Result<TokenResponse, GatewayError> {
        if login.username.trim().is_empty() || login.password.expose_secret().is_empty() {
            return Err(GatewayError::InvalidInput(
                "username and password are required".to_string(),
            ));
        }
        let request =
            UpstreamRequest::post(Endpoint::Token, login.to_body()).with_auth(AuthMode::None);
        let (_, payload) = self
            .call_typed::<TokenPayload>(&Credential::absent(), &request)
            .await?;
        if payload.token.trim().is_empty() {
            return Err(GatewayError::MalformedResponse);
        }
        tracing::info!(user = %payload.user_nicename, "login succeeded");
        Ok(payload.into())
    }

    /// POST the JWT validate endpoint with the session credential.
    pub async fn validate_token(&self, credential: &Credential) -> Envelope {
        let request = UpstreamRequest::new(crate::upstream::Method::Post, Endpoint::ValidateToken)
            .with_auth(AuthMode::Required);
        self.typed_envelope::<TokenValidation>(credential, &request).await
    }

    async fn typed_envelope<T>(&self, credential: &Credential, request: &UpstreamRequest) -> Envelope
    where
        T: DeserializeOwned,
    {
        match self.call_checked::<T>(credential, request).await {
            Ok((status, data)) => Envelope::success(status, data),
            Err(err) => err.into(),
        }
    }
}
