/// A value that has passed a [`Sanitizer`](crate::Sanitizer).
///
/// `Verified<T>` cannot be constructed outside this crate. Upstream paths that
/// embed caller-supplied segments (e.g. `tribute/{slug}`) only accept
/// `Verified<String>`, so unvalidated route parameters cannot reach the
/// upstream URL.
///
/// ```compile_fail
/// use tribute_gateway::Verified;
///
/// // No public constructor:
/// let verified = Verified::new("john-doe".to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified<T> {
    inner: T,
}

impl<T> Verified<T> {
    /// Wraps a value that the caller has already validated.
    pub(crate) fn new_unchecked(value: T) -> Self {
        Self { inner: value }
    }

    /// Consumes the wrapper and returns the inner value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> AsRef<T> for Verified<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}
