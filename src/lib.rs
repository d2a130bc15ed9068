//! Session guard and authenticated upstream gateway for the Tributestream
//! WordPress API.
//!
//! The crate sits between browser requests and a WordPress REST backend:
//! - **Credential resolution**: finds the caller's bearer token in session
//!   locals, cookies, or the `Authorization` header
//! - **Route guarding**: decides whether a route proceeds, redirects to
//!   login, or is rejected
//! - **Upstream calls**: attaches the credential, enforces a timeout, and
//!   normalizes every result into an [`Envelope`]
//!
//! Untrusted path segments flow through [`Tainted<T>`] and must pass a
//! [`Sanitizer`] before they can be built into an upstream URL.
//!
//! # Core Types
//!
//! - [`Secret<T>`]: Wrapper that redacts tokens and passwords in logs
//! - [`Credential`]: Resolved bearer token plus optional role and display name
//! - [`AccessGate`]: Maps a credential and a [`RouteRequirement`] to an
//!   [`AccessDecision`]
//! - [`Gateway`]: Performs upstream calls and returns an [`Envelope`]
//!
//! # Examples
//!
//! ```
//! use tribute_gateway::{Credential, CredentialResolver, RequestContext, Secret};
//!
//! // Tokens are redacted in debug output
//! let token = Secret::new("eyJhbGciOi".to_string());
//! assert_eq!(format!("{:?}", token), "[REDACTED]");
//!
//! // Cookies are checked before the Authorization header
//! let mut ctx = RequestContext::new("req-1");
//! ctx.add_cookie("auth_token", "from-cookie");
//! ctx.add_header("Authorization", "Bearer from-header");
//!
//! let credential = CredentialResolver::default().resolve(&ctx);
//! assert_eq!(credential.raw().unwrap().expose_secret(), "from-cookie");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod credential;
mod envelope;
mod error;
mod gate;
mod gateway;
pub mod logging;
mod policy;
mod request;
mod sanitizer;
mod secret;
mod session;
mod tainted;
mod upstream;
mod verified;
pub mod web;
mod wordpress;

pub use config::GatewayConfig;
pub use credential::{Credential, CredentialResolver, DEFAULT_TOKEN_COOKIES, DEFAULT_USER_COOKIE};
pub use envelope::Envelope;
pub use error::{ConfigError, GatewayError, MALFORMED_RESPONSE};
pub use gate::AccessGate;
pub use gateway::{Gateway, Outcome};
pub use policy::{AccessDecision, RouteRequirement};
pub use request::{RequestContext, SessionLocals};
pub use sanitizer::{Sanitizer, SanitizationError, SanitizationErrorKind, SlugSanitizer, MAX_SLUG_LEN};
pub use secret::Secret;
pub use session::{SessionCookies, SESSION_MAX_AGE_SECS};
pub use tainted::Tainted;
pub use upstream::{AuthMode, Endpoint, Method, UpstreamRequest};
pub use verified::Verified;
pub use wordpress::{
    CreatedTribute, LoginRequest, NewTribute, SessionUser, TokenResponse, TokenValidation, Tribute,
};
