//! Structured JSONL logging plus human-readable stderr output.
//!
//! This module provides dual-output logging:
//! - **JSONL to file** (~/.storybook/logs/storybook.jsonl) - structured, one event per line
//! - **Compact to stderr** - human-readable for developers
//!
//! # Usage
//!
//! ```rust,ignore
//! use storybook_core::logging;
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let _guard = logging::init();
//!
//! tracing::info!(event_type = "selection", story_id = "button--primary", "Story selected");
//! ```
//!
//! # JSONL Output Format
//!
//! ```json
//! {"timestamp":"2026-01-05T10:30:45.123Z","level":"INFO","target":"storybook_core::controller","fields":{"event_type":"selection_event","story_id":"button--primary","state":"resolved"}}
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the dual-output logging system.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// If the log file cannot be opened only the stderr layer is installed.
pub fn init() -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let path = log_path();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| eprintln!("[LOGGING] Failed to open log file: {}", e))
        .ok();

    // Environment filter - default to info, allow override via RUST_LOG
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    let (json_layer, file_guard) = match file {
        Some(file) => {
            // Non-blocking writer so logging never stalls the event loop
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // try_init: a second init (tests, embedding hosts) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Get the log directory path (~/.storybook/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".storybook").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("storybook-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join("storybook.jsonl")
}

// =============================================================================
// STRUCTURED LOGGING HELPERS
// =============================================================================

/// Log a selection state transition
pub fn log_selection_event(state: &str, story_id: Option<&str>, details: Option<&str>) {
    let msg = match (story_id, details) {
        (Some(id), Some(d)) => format!("{} {} - {}", state, id, d),
        (Some(id), None) => format!("{} {}", state, id),
        (None, Some(d)) => format!("{} - {}", state, d),
        (None, None) => state.to_string(),
    };
    tracing::info!(
        event_type = "selection_event",
        state = state,
        story_id = story_id,
        details = details,
        "{}", msg
    );
}

/// Log a channel emission or delivery
pub fn log_channel_event(event: &str, direction: &str, listeners: usize) {
    tracing::debug!(
        event_type = "channel_event",
        event = event,
        direction = direction,
        listeners = listeners,
        "Channel {} {}", direction, event
    );
}

/// Log a dispatched keyboard shortcut
pub fn log_shortcut_event(action: &str, chord: &str) {
    tracing::debug!(
        event_type = "shortcut_event",
        action = action,
        chord = chord,
        "Shortcut {} triggered", action
    );
}
