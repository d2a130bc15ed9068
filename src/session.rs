//! Session cookie issuing and clearing.

use serde_json::json;

use crate::envelope::Envelope;
use crate::Secret;

/// Lifetime of an issued session cookie (seven days, matching the upstream JWT default).
pub const SESSION_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

const COOKIE_ATTRIBUTES: &str = "HttpOnly; Secure; SameSite=Strict; Path=/";

/// Builds `Set-Cookie` header values for the configured session cookies.
///
/// # Examples
///
/// ```
/// use tribute_gateway::{Secret, SessionCookies};
///
/// let cookies = SessionCookies::new(vec!["auth_token".to_string(), "jwt".to_string()]);
///
/// let set = cookies.issue(&Secret::new("abc".to_string())).unwrap();
/// assert!(set.starts_with("auth_token=abc;"));
///
/// let cleared = cookies.clear();
/// assert_eq!(cleared.len(), 2);
/// assert!(cleared[1].starts_with("jwt=;"));
/// ```
#[derive(Debug, Clone)]
pub struct SessionCookies {
    keys: Vec<String>,
}

impl SessionCookies {
    /// Creates a builder for the given cookie keys. The first key is the one
    /// written on login; all keys are cleared on logout.
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// `Set-Cookie` value storing `token` under the primary key.
    ///
    /// Returns `None` when no keys are configured or the token contains
    /// characters that cannot appear in a cookie value.
    pub fn issue(&self, token: &Secret<String>) -> Option<String> {
        let key = self.keys.first()?;
        let value = token.expose_secret();
        if value.is_empty() || !value.chars().all(is_cookie_octet) {
            tracing::warn!(cookie = %key, "refusing to issue cookie with invalid token characters");
            return None;
        }
        Some(format!(
            "{}={}; {}; Max-Age={}",
            key, value, COOKIE_ATTRIBUTES, SESSION_MAX_AGE_SECS
        ))
    }

    /// `Set-Cookie` values expiring every configured key.
    pub fn clear(&self) -> Vec<String> {
        self.keys
            .iter()
            .map(|key| {
                format!(
                    "{}=; {}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
                    key, COOKIE_ATTRIBUTES
                )
            })
            .collect()
    }

    /// Logs the session out: clearing cookies plus a `{success: true}` envelope.
    pub fn logout(&self) -> (Vec<String>, Envelope) {
        tracing::info!(cookies = self.keys.len(), "clearing session cookies");
        (self.clear(), Envelope::success(200, json!({ "success": true })))
    }
}

// RFC 6265 cookie-octet.
fn is_cookie_octet(c: char) -> bool {
    matches!(c, '\x21' | '\x23'..='\x2B' | '\x2D'..='\x3A' | '\x3C'..='\x5B' | '\x5D'..='\x7E')
}
