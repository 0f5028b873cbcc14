//! Logging macros and subscriber setup
//!
//! The store only emits `tracing` events. Installing a subscriber is left to the
//! embedding process; `init_logging` is a convenience for tests and tools.

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static SUBSCRIBER: OnceCell<()> = OnceCell::new();

/// Install a global fmt subscriber filtered by `filter` (`RUST_LOG` syntax).
///
/// Only the first call has an effect. A subscriber installed elsewhere is left
/// in place.
pub fn init_logging(filter: &str) {
    SUBSCRIBER.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
    });
}

/// Info level logging
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        tracing::info!($($arg)*);
    }};
}

/// Warning level logging
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        tracing::warn!($($arg)*);
    }};
}

/// Debug level logging
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        tracing::debug!($($arg)*);
    }};
}

/// Trace level logging, for per-element index maintenance
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        tracing::trace!($($arg)*);
    }};
}
