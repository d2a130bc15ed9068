use std::fmt;

/// Declared access policy for an inbound route.
///
/// # Examples
///
/// ```
/// use tribute_gateway::RouteRequirement;
///
/// let admin = RouteRequirement::role("administrator");
/// assert_eq!(admin.to_string(), "requires role 'administrator'");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteRequirement {
    /// Anyone may access the route.
    Public,
    /// A session credential must be present.
    RequiresAuth,
    /// A session credential with this role claim must be present.
    RequiresRole(String),
}

impl RouteRequirement {
    /// Shorthand for [`RouteRequirement::RequiresRole`].
    pub fn role(role: impl Into<String>) -> Self {
        Self::RequiresRole(role.into())
    }
}

impl fmt::Display for RouteRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::RequiresAuth => write!(f, "requires auth"),
            Self::RequiresRole(role) => write!(f, "requires role '{}'", role),
        }
    }
}

/// Result of authorizing one request.
///
/// Produced once per request and consumed immediately; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Proceed with the request.
    Allow,
    /// Send the client to this path (usually the login page).
    RedirectTo(String),
    /// Refuse with this HTTP status.
    Reject(u16),
}

impl AccessDecision {
    /// Whether the request may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}
