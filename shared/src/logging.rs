//! Shared logging utilities for consistent tracing across the engine and tools

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{error, info};

/// Crates whose events pass the filter at the requested level
const TRACED_TARGETS: [&str; 5] = ["tournament", "simulator", "shared", "kartcup", "kartcup_sim"];

/// Build the `EnvFilter` directive string for a base level
pub fn filter_directives(log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or("info");
    TRACED_TARGETS
        .iter()
        .map(|target| format!("{target}={base_level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with an optional log level.
///
/// `RUST_LOG` wins over the level when it is set.
pub fn init_tracing_with_level(log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(log_level)));

    // try_init: tests and embedding binaries may have installed one already
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Wall-clock stamp attached to every event, `HH:MM:SS.mmm`
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Emit an event at `$level` tagged with the tournament it concerns
#[macro_export]
macro_rules! tournament_event {
    ($level:ident, $tournament_id:expr, $($arg:tt)*) => {
        tracing::$level!(
            tournament = %$tournament_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        )
    };
}

#[macro_export]
macro_rules! tournament_info {
    ($tournament_id:expr, $($arg:tt)*) => { $crate::tournament_event!(info, $tournament_id, $($arg)*) };
}

#[macro_export]
macro_rules! tournament_warn {
    ($tournament_id:expr, $($arg:tt)*) => { $crate::tournament_event!(warn, $tournament_id, $($arg)*) };
}

#[macro_export]
macro_rules! tournament_debug {
    ($tournament_id:expr, $($arg:tt)*) => { $crate::tournament_event!(debug, $tournament_id, $($arg)*) };
}

fn component_info(component: &str, icon: &str, message: fmt::Arguments<'_>) {
    info!(component, timestamp = format_timestamp(), "{icon} {message}");
}

/// A binary is up and about to work on `details`
pub fn log_startup(component: &str, details: &str) {
    component_info(component, "🚀", format_args!("Starting {details}"));
}

pub fn log_shutdown(component: &str, reason: &str) {
    component_info(component, "🛑", format_args!("Shutting down: {reason}"));
}

/// A command failed; the error is also attached as a field
pub fn log_error(component: &str, context: &str, error: &dyn fmt::Display) {
    error!(
        component,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {context} failed: {error}"
    );
}

pub fn log_success(component: &str, message: &str) {
    component_info(component, "✅", format_args!("{message}"));
}

/// One step of a multi-step run, e.g. a simulator stage
pub fn log_progress(component: &str, action: &str, details: &str) {
    component_info(component, "🏁", format_args!("{action}: {details}"));
}
