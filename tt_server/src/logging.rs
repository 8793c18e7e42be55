//! Structured logging configuration.
//!
//! `turn_table` logs through the `log` facade; the subscriber installed here
//! picks those records up alongside native tracing events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,tower_http=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use tt_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a connection lifecycle event
///
/// # Arguments
///
/// * `event` - What happened (`connected`, `disconnected`, ...)
/// * `connection_id` - Transport connection id
/// * `player_id` - Seat identity, once assigned
pub fn log_connection_event(event: &str, connection_id: &str, player_id: Option<&str>) {
    tracing::info!(
        event = event,
        connection_id = connection_id,
        player_id = player_id,
        "Connection {}",
        event
    );
}

/// Log a client frame that was dropped without reply
pub fn log_rejected_message(connection_id: &str, reason: &str, detail: &str) {
    tracing::debug!(
        connection_id = connection_id,
        reason = reason,
        detail = detail,
        "Dropping client message"
    );
}
