//! Logging setup utilities for Shelftalk binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the server library crate and the binary itself.
/// `RUST_LOG` overrides the default when it is set.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "shelftalk_server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use shelftalk_shared::logger::setup_logger;
///
/// setup_logger("shelftalk_server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    tracing::debug!("Logger initialized for '{}'", binary_name);
}

/// Log target of the server library crate.
const SERVER_TARGET: &str = "shelftalk_server";

/// Build the default filter directive string.
fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");
    let mut directives = vec![format!("{SERVER_TARGET}={default_log_level}")];
    if binary_target != SERVER_TARGET {
        directives.push(format!("{binary_target}={default_log_level}"));
    }
    directives.push(format!("tower_http={default_log_level}"));
    directives.join(",")
}
