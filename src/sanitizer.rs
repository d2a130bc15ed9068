use thiserror::Error;

use crate::error::GatewayError;
use crate::{Tainted, Verified};

/// Longest slug accepted as an upstream path segment.
pub const MAX_SLUG_LEN: usize = 200;

/// Error returned when sanitization fails.
///
/// The message never echoes the rejected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sanitization failed ({kind}): {message}")]
pub struct SanitizationError {
    kind: SanitizationErrorKind,
    message: String,
}

impl SanitizationError {
    /// Creates a new sanitization error.
    pub fn new(kind: SanitizationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> SanitizationErrorKind {
        self.kind
    }
}

impl From<SanitizationError> for GatewayError {
    fn from(err: SanitizationError) -> Self {
        GatewayError::InvalidInput(err.message)
    }
}

/// Kind of sanitization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SanitizationErrorKind {
    /// Input is empty or contains only whitespace.
    #[error("empty input")]
    Empty,
    /// Input exceeds maximum allowed length.
    #[error("input too long")]
    TooLong,
    /// Input contains control or non-printable characters.
    #[error("contains control characters")]
    ContainsControlChars,
    /// Input contains characters outside the allowed set.
    #[error("forbidden pattern")]
    ForbiddenPattern,
}

/// Converts tainted input into a verified value.
///
/// Implementations must only call `Verified::new_unchecked` after validation
/// succeeds.
pub trait Sanitizer<T> {
    /// Sanitizes a tainted value, returning a verified value on success.
    ///
    /// # Errors
    ///
    /// Returns `SanitizationError` if the input fails validation.
    fn sanitize(&self, input: Tainted<T>) -> Result<Verified<T>, SanitizationError>;
}

/// Validates WordPress post slugs taken from route parameters.
///
/// A slug is trimmed, then must be 1..=`max_len` characters drawn from
/// ASCII letters, digits, and `-`, without a leading or trailing `-`.
/// Letters are lowercased, matching how WordPress stores slugs.
///
/// # Examples
///
/// ```
/// use tribute_gateway::{Tainted, Sanitizer, SlugSanitizer};
///
/// let sanitizer = SlugSanitizer::default();
///
/// let verified = sanitizer.sanitize(Tainted::new("  John-Doe ".to_string())).unwrap();
/// assert_eq!(verified.as_ref(), "john-doe");
///
/// assert!(sanitizer.sanitize(Tainted::new("../wp-admin".to_string())).is_err());
/// assert!(sanitizer.sanitize(Tainted::new("a/b".to_string())).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SlugSanitizer {
    max_len: usize,
}

impl SlugSanitizer {
    /// Creates a slug sanitizer with a custom length limit.
    ///
    /// A limit of zero is raised to one.
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
        }
    }
}

impl Default for SlugSanitizer {
    fn default() -> Self {
        Self::new(MAX_SLUG_LEN)
    }
}

impl Sanitizer<String> for SlugSanitizer {
    fn sanitize(&self, input: Tainted<String>) -> Result<Verified<String>, SanitizationError> {
        let raw = input.into_inner();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(SanitizationError::new(
                SanitizationErrorKind::Empty,
                "slug is empty",
            ));
        }

        if trimmed.chars().any(|c| c.is_control()) {
            return Err(SanitizationError::new(
                SanitizationErrorKind::ContainsControlChars,
                "slug contains control characters",
            ));
        }

        if trimmed.len() > self.max_len {
            return Err(SanitizationError::new(
                SanitizationErrorKind::TooLong,
                format!("slug exceeds maximum length of {}", self.max_len),
            ));
        }

        let allowed = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !allowed || trimmed.starts_with('-') || trimmed.ends_with('-') {
            return Err(SanitizationError::new(
                SanitizationErrorKind::ForbiddenPattern,
                "slug may only contain letters, digits, and inner hyphens",
            ));
        }

        Ok(Verified::new_unchecked(trimmed.to_ascii_lowercase()))
    }
}
