use std::fmt;

/// A wrapper that keeps session tokens out of logs and error messages.
///
/// Every bearer token the gateway handles (cookie values, `Authorization`
/// headers, tokens returned by the JWT endpoint) travels inside a `Secret`.
/// The wrapped value is only reachable through [`expose_secret`](Self::expose_secret).
///
/// # Security Properties
///
/// - Does NOT implement `Deref`, `AsRef`, `Borrow`, `Clone`, or `Copy`
/// - Debug and Display output is always `[REDACTED]`
/// - No type information is leaked in formatted output
///
/// # Examples
///
/// ```
/// use tribute_gateway::Secret;
///
/// let token = Secret::new("eyJhbGciOiJIUzI1NiJ9.payload.sig".to_string());
///
/// assert_eq!(format!("{:?}", token), "[REDACTED]");
/// assert_eq!(format!("{}", token), "[REDACTED]");
/// assert!(token.expose_secret().starts_with("eyJ"));
/// ```
// Do NOT add Clone, Copy, or Default derives. A token must not be duplicated
// outside the request that resolved it.
pub struct Secret<T> {
    // Must remain private (CWE-532).
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value in a `Secret`.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// Callers copy the value straight into an outgoing request or cookie:
    /// the `Authorization` header, the login body, and the session
    /// `Set-Cookie` value.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
