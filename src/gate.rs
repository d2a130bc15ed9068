use crate::credential::Credential;
use crate::policy::{AccessDecision, RouteRequirement};

/// Status returned when a credential is present but lacks the required role.
pub const FORBIDDEN: u16 = 403;

/// The access gate.
///
/// `AccessGate` is the single place where session presence and role checks
/// happen. Route handlers declare a [`RouteRequirement`] and act on the
/// returned [`AccessDecision`] instead of each re-implementing cookie checks
/// and redirects.
///
/// # Examples
///
/// ```
/// use tribute_gateway::{AccessGate, AccessDecision, Credential, RouteRequirement};
///
/// let gate = AccessGate::new("/login");
///
/// assert_eq!(
///     gate.authorize(&Credential::absent(), &RouteRequirement::RequiresAuth),
///     AccessDecision::RedirectTo("/login".to_string()),
/// );
/// assert_eq!(
///     gate.authorize(&Credential::bearer("abc"), &RouteRequirement::RequiresAuth),
///     AccessDecision::Allow,
/// );
/// ```
#[derive(Debug, Clone)]
pub struct AccessGate {
    login_path: String,
}

impl AccessGate {
    /// Creates a gate that redirects unauthenticated requests to `login_path`.
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
        }
    }

    /// Path unauthenticated requests are sent to.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Decides whether a request with `credential` may access a route with
    /// `requirement`.
    ///
    /// - `Public` always allows.
    /// - `RequiresAuth` allows when a credential is present, otherwise
    ///   redirects to the login path.
    /// - `RequiresRole(r)` redirects when no credential is present, allows
    ///   when the credential's role equals `r`, and rejects with 403 otherwise.
    pub fn authorize(&self, credential: &Credential, requirement: &RouteRequirement) -> AccessDecision {
        let decision = match requirement {
            RouteRequirement::Public => AccessDecision::Allow,
            RouteRequirement::RequiresAuth => {
                if credential.is_present() {
                    AccessDecision::Allow
                } else {
                    self.redirect()
                }
            }
            RouteRequirement::RequiresRole(required) => {
                if !credential.is_present() {
                    self.redirect()
                } else if credential.role() == Some(required.as_str()) {
                    AccessDecision::Allow
                } else {
                    AccessDecision::Reject(FORBIDDEN)
                }
            }
        };

        tracing::debug!(
            requirement = %requirement,
            credential_present = credential.is_present(),
            decision = ?decision,
            "access decision"
        );
        decision
    }

    fn redirect(&self) -> AccessDecision {
        AccessDecision::RedirectTo(self.login_path.clone())
    }
}
