//! Per-request inputs handed to the gateway by the route-handling layer.

use std::collections::HashMap;

use crate::Tainted;

/// Session state attached to a request by earlier middleware.
///
/// This is the per-request replacement for a process-wide user store: whatever
/// a previous layer learned about the session travels with the request value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionLocals {
    /// Token already extracted by a previous layer.
    pub token: Option<String>,
    /// Role claim for the session user.
    pub role: Option<String>,
    /// Display name for the session user.
    pub display_name: Option<String>,
}

/// Framework-agnostic view of an incoming request.
///
/// Holds owned copies of the cookies, headers, and route parameters so the
/// credential resolver and gateway never depend on a particular web
/// framework. The axum binding in [`crate::web`] builds one from request
/// parts; tests build them directly.
///
/// Header names are stored lowercased.
///
/// # Examples
///
/// ```
/// use tribute_gateway::RequestContext;
///
/// let mut ctx = RequestContext::new("req-1");
/// ctx.add_cookie_header("theme=dark; auth_token=abc123");
/// ctx.add_path_param("slug", "john-doe");
///
/// assert_eq!(ctx.cookie("auth_token"), Some("abc123"));
/// assert!(ctx.path_param("slug").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    cookies: HashMap<String, String>,
    headers: HashMap<String, String>,
    path_params: HashMap<String, String>,
    locals: Option<SessionLocals>,
}

impl RequestContext {
    /// Creates an empty context with the given request ID.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            cookies: HashMap::new(),
            headers: HashMap::new(),
            path_params: HashMap::new(),
            locals: None,
        }
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Sets a single cookie.
    pub fn add_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    /// Parses a raw `Cookie` header value (`a=1; b=2`) and adds each pair.
    ///
    /// Segments without `=` are ignored. A later duplicate name overwrites
    /// an earlier one.
    pub fn add_cookie_header(&mut self, raw: &str) {
        for part in raw.split(';') {
            let part = part.trim();
            if let Some((name, value)) = part.split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    self.cookies
                        .insert(name.to_string(), value.trim().to_string());
                }
            }
        }
    }

    /// Sets a header. The name is stored lowercased.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Sets a route parameter.
    pub fn add_path_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.path_params.insert(name.into(), value.into());
    }

    /// Attaches session state produced by earlier middleware.
    pub fn set_locals(&mut self, locals: SessionLocals) {
        self.locals = Some(locals);
    }

    /// Returns a cookie value by name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Returns a header value by (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns a route parameter, tainted until sanitized.
    pub fn path_param(&self, name: &str) -> Option<Tainted<String>> {
        self.path_params.get(name).cloned().map(Tainted::new)
    }

    /// Returns attached session state, if any.
    pub fn locals(&self) -> Option<&SessionLocals> {
        self.locals.as_ref()
    }
}
