//! Credential resolution.
//!
//! The resolver is a pure lookup: it finds a session token under the
//! configured keys and reports whether one is present. It does not verify
//! signatures or expiry (see DESIGN.md, "presence-only validation").

use serde::Deserialize;

use crate::request::RequestContext;
use crate::Secret;

/// Default cookie keys searched for a session token, in order.
pub const DEFAULT_TOKEN_COOKIES: [&str; 2] = ["auth_token", "jwt"];

/// Default cookie holding a JSON-serialized session user.
pub const DEFAULT_USER_COOKIE: &str = "user";

const BEARER_PREFIX: &str = "Bearer ";

/// Per-request session credential.
///
/// Created once per request and dropped with it. The raw token is wrapped in
/// [`Secret`], so `Debug` output never contains it.
///
/// # Examples
///
/// ```
/// use tribute_gateway::Credential;
///
/// let cred = Credential::bearer("abc");
/// assert!(cred.is_present());
/// assert!(!format!("{:?}", cred).contains("abc"));
///
/// assert!(!Credential::bearer("   ").is_present());
/// ```
#[derive(Debug, Default)]
pub struct Credential {
    raw: Option<Secret<String>>,
    role: Option<String>,
    display_name: Option<String>,
}

impl Credential {
    /// A credential with no token.
    pub fn absent() -> Self {
        Self::default()
    }

    /// A credential carrying `token`. Blank tokens produce an absent credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            raw: non_blank(token.into()).map(Secret::new),
            role: None,
            display_name: None,
        }
    }

    /// Attaches a role claim.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = non_blank(role.into());
        self
    }

    /// Attaches a display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = non_blank(name.into());
        self
    }

    /// Whether a non-empty token was found.
    pub fn is_present(&self) -> bool {
        self.raw.is_some()
    }

    /// The raw token, still wrapped.
    pub fn raw(&self) -> Option<&Secret<String>> {
        self.raw.as_ref()
    }

    /// Role claim attached to the session, if any.
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Display name attached to the session, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

/// The JSON shape stored in the session user cookie.
#[derive(Debug, Deserialize)]
struct UserCookie {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default, alias = "user_display_name")]
    display_name: Option<String>,
}

impl UserCookie {
    fn role(&self) -> Option<String> {
        self.role
            .clone()
            .or_else(|| self.roles.first().cloned())
    }
}

/// Extracts a [`Credential`] from a [`RequestContext`].
///
/// Lookup order for the token:
/// 1. `SessionLocals::token` attached by earlier middleware
/// 2. each configured token cookie, in order
/// 3. the `token` field of the JSON user cookie
/// 4. an `Authorization: Bearer` header
///
/// The role comes from `SessionLocals::role`, then the user cookie. A user
/// cookie that fails to parse contributes nothing.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    token_cookies: Vec<String>,
    user_cookie: String,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_COOKIES.iter().map(|k| k.to_string()).collect())
    }
}

impl CredentialResolver {
    /// Creates a resolver searching the given cookie keys, in order.
    pub fn new(token_cookies: Vec<String>) -> Self {
        Self {
            token_cookies,
            user_cookie: DEFAULT_USER_COOKIE.to_string(),
        }
    }

    /// Resolves the credential for one request. Never fails, never panics.
    pub fn resolve(&self, ctx: &RequestContext) -> Credential {
        let locals = ctx.locals();
        let user = self.user_cookie(ctx);

        let token = locals
            .and_then(|l| l.token.clone())
            .and_then(non_blank)
            .or_else(|| {
                self.token_cookies
                    .iter()
                    .filter_map(|key| ctx.cookie(key))
                    .find_map(|v| non_blank(v.to_string()))
            })
            .or_else(|| user.as_ref().and_then(|u| u.token.clone()).and_then(non_blank))
            .or_else(|| {
                ctx.header("authorization")
                    .and_then(|h| h.strip_prefix(BEARER_PREFIX))
                    .and_then(|t| non_blank(t.to_string()))
            });

        let Some(token) = token else {
            tracing::debug!(request_id = %ctx.request_id(), "no credential on request");
            return Credential::absent();
        };

        let role = locals
            .and_then(|l| l.role.clone())
            .or_else(|| user.as_ref().and_then(UserCookie::role));
        let display_name = locals
            .and_then(|l| l.display_name.clone())
            .or_else(|| user.and_then(|u| u.display_name));

        let mut credential = Credential::bearer(token);
        if let Some(role) = role {
            credential = credential.with_role(role);
        }
        if let Some(name) = display_name {
            credential = credential.with_display_name(name);
        }
        credential
    }

    fn user_cookie(&self, ctx: &RequestContext) -> Option<UserCookie> {
        let raw = ctx.cookie(&self.user_cookie)?;
        let decoded = urlencoding::decode(raw).ok()?;
        match serde_json::from_str::<UserCookie>(&decoded) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    cookie = %self.user_cookie,
                    error = %e,
                    "ignoring malformed session user cookie"
                );
                None
            }
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}
