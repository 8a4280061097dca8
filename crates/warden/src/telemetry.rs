//! Logging setup.
//!
//! Warden logs through `tracing` and never installs a subscriber on its
//! own. Binaries call [`init_tracing`] once at startup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::WardenError;

/// Installs a global fmt subscriber filtered by `RUST_LOG`, or by
/// `default_directive` (e.g. `"info,warden=debug"`) when `RUST_LOG` is
/// unset or invalid.
///
/// # Errors
/// [`WardenError::Telemetry`] if a global subscriber is already set.
pub fn init_tracing(default_directive: &str) -> Result<(), WardenError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_returns_error() {
        // The first call may lose to another test's subscriber; either way
        // the second call must fail without panicking.
        let _ = init_tracing("warn");

        let second = init_tracing("warn");

        assert!(matches!(second, Err(WardenError::Telemetry(_))));
    }
}
