//! Verbosity-gated logging macros on top of `tracing`.
//!
//! Each macro checks the engine verbosity before forwarding to `tracing`, so
//! a silent engine (verbosity=0) skips formatting entirely.
//! - 0: SILENT (only degraded results, always emitted via `tracing::warn!`)
//! - 1: CHANGES (orderings produced, work assigned, cycles found)
//! - 2: CHECKS (per-node eligibility and skip reasons)
//! - 3: DEBUG (full algorithm internals)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1) as `tracing::info!`.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            ::tracing::info!($($arg)*);
        }
    };
}

/// Log at CHECKS level (verbosity >= 2) as `tracing::debug!`.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            ::tracing::debug!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3) as `tracing::trace!`.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            ::tracing::trace!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_ordering() {
        assert!(VERBOSITY_SILENT < VERBOSITY_CHANGES);
        assert!(VERBOSITY_CHANGES < VERBOSITY_CHECKS);
        assert!(VERBOSITY_CHECKS < VERBOSITY_DEBUG);
    }

    #[test]
    fn test_log_macros_at_every_level() {
        for verbosity in VERBOSITY_SILENT..=VERBOSITY_DEBUG {
            log_changes!(verbosity, "sorted {} nodes", 3);
            log_checks!(verbosity, "node {} ready", "a");
            log_debug!(verbosity, "in-degree of {} is {}", "b", 0);
        }
    }
}
