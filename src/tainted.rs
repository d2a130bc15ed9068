use std::fmt;

/// A wrapper for caller-controlled data that must be sanitized before it can
/// reach an upstream path.
///
/// Route parameters (such as a tribute slug) arrive as `Tainted<String>`.
/// The only way to get the value back out is through a
/// [`Sanitizer`](crate::Sanitizer), which returns a [`Verified`](crate::Verified).
///
/// # Examples
///
/// ```
/// use tribute_gateway::Tainted;
///
/// let slug = Tainted::new("../../wp-admin".to_string());
/// println!("{:?}", slug); // Tainted { inner: "../../wp-admin" }
///
/// // Cannot be formatted into a path directly:
/// // let path = format!("tribute/{}", slug); // Won't compile!
/// ```
#[derive(Clone)]
pub struct Tainted<T> {
    // Must remain private. Sanitizers are the only readers.
    inner: T,
}

impl<T> Tainted<T> {
    /// Wraps an untrusted value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Extracts the inner value for sanitization.
    ///
    /// Only sanitizers inside this crate may call this.
    pub(crate) fn into_inner(self) -> T {
        self.inner
    }
}

// Do NOT add Deref, AsRef, Borrow, From<T>, or Into<T>.

impl<T: fmt::Debug> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tainted")
            .field("inner", &self.inner)
            .finish()
    }
}
