//! Process-wide tracing subscriber setup

use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::EnvFilter;

/// Install the JSON subscriber at `info` unless `RUST_LOG` says otherwise
pub fn init() {
    init_with_default("info");
}

/// Install the JSON subscriber, falling back to `directive` when
/// `RUST_LOG` is missing or does not parse
///
/// Only the first call in a process installs anything.
pub fn init_with_default(directive: &str) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(directive),
    };

    let installed = tracing_subscriber::fmt()
        .json()
        .with_current_span(false)
        .with_env_filter(filter)
        .with_timer(SystemTime)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(directive, "json subscriber installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_with_default("debug");
        init();
        tracing::info!(component = "telemetry", "subscriber installed");
    }
}
