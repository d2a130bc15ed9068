use serde::Serialize;
use serde_json::Value;

use crate::error::GatewayError;

/// Normalized result of an upstream call.
///
/// Exactly one of `data` and `error` is populated. When `ok` is `false`,
/// `error` always carries a human-readable message and `status` is the
/// upstream status (or a locally chosen one such as 500 or 504).
///
/// The fields are private and there is no `Deserialize` impl, so the
/// invariant cannot be broken after construction; use
/// [`Envelope::success`] and [`Envelope::failure`].
///
/// # Examples
///
/// ```
/// use tribute_gateway::Envelope;
/// use serde_json::json;
///
/// let ok = Envelope::success(200, json!({"loved_one_name": "John Doe"}));
/// assert!(ok.is_ok());
/// assert_eq!(ok.data(), Some(&json!({"loved_one_name": "John Doe"})));
///
/// let err = Envelope::failure(404, "Not Found");
/// assert!(!err.is_ok());
/// assert_eq!(err.error(), Some("Not Found"));
/// ```
///
/// An envelope cannot be read back from JSON:
///
/// ```compile_fail
/// use tribute_gateway::Envelope;
///
/// let _: Envelope = serde_json::from_str(r#"{"ok":true,"status":200,"error":"x"}"#).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    ok: bool,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Envelope {
    /// Successful envelope carrying upstream data.
    pub fn success(status: u16, data: Value) -> Self {
        Self {
            ok: true,
            status,
            data: Some(data),
            error: None,
        }
    }

    /// Failed envelope. An empty message is replaced so `error` is never blank.
    pub fn failure(status: u16, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "request failed".to_string();
        }
        Self {
            ok: false,
            status,
            data: None,
            error: Some(error),
        }
    }

    /// Whether the upstream call succeeded.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// HTTP status mirrored from the upstream, or chosen locally on failure.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// JSON payload on success.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Error message on failure.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl From<GatewayError> for Envelope {
    fn from(err: GatewayError) -> Self {
        Envelope::failure(err.status(), err.to_string())
    }
}
