//! Tracing subscriber setup.
//!
//! Library code only emits `tracing` events and spans; the binary (or a test
//! that wants output) installs a subscriber here.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a formatted subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs a subscriber.
/// Returns `true` if this call installed it.
pub fn init() -> bool {
    init_with_default(DEFAULT_FILTER)
}

/// Like [`init`] but with a custom fallback filter.
pub fn init_with_default(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_noop() {
        let _ = init_with_default("debug");
        assert!(!init());
    }
}
