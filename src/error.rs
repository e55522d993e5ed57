use thiserror::Error;
use tracing::{error, warn};

/// Error severity for UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,     // informational
    Warning,  // recoverable, defaults applied
    Error,    // operation failed
    Critical, // configuration is unusable, abort
}

/// Domain-specific errors for the story workbench
#[derive(Error, Debug)]
pub enum StorybookError {
    #[error("Duplicate story id '{id}' (kind '{kind}', name '{name}')")]
    DuplicateStoryId {
        id: String,
        kind: String,
        name: String,
    },

    #[error("{consumer} found 0 stories")]
    NoStories { consumer: String },

    #[error("Invalid path '{path}', must start with '/story/'")]
    InvalidPath { path: String },

    #[error("Invalid {part} '{value}', must include alphanumeric characters")]
    InvalidStoryName { part: &'static str, value: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Failed to encode channel payload: {0}")]
    ChannelPayload(#[from] serde_json::Error),

    #[error("Channel transport closed while sending '{event}'")]
    ChannelClosed { event: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorybookError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DuplicateStoryId { .. } => ErrorSeverity::Critical,
            Self::NoStories { .. } => ErrorSeverity::Critical,
            Self::InvalidPath { .. } => ErrorSeverity::Error,
            Self::InvalidStoryName { .. } => ErrorSeverity::Critical,
            Self::Config(_) => ErrorSeverity::Warning,
            Self::Persistence(_) => ErrorSeverity::Warning,
            Self::ChannelPayload(_) => ErrorSeverity::Warning,
            Self::ChannelClosed { .. } => ErrorSeverity::Warning,
            Self::Io { .. } => ErrorSeverity::Error,
        }
    }

    /// Fatal errors abort startup; everything else degrades.
    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::DuplicateStoryId { id, .. } => {
                format!("Two stories share the id '{}'. Rename one of them.", id)
            }
            Self::NoStories { .. } => "No stories were found.".to_string(),
            Self::InvalidPath { path } => format!("The link '{}' is not a story link", path),
            Self::InvalidStoryName { part, value } => {
                format!("The story {} '{}' cannot be turned into an id", part, value)
            }
            Self::Config(msg) => format!("Configuration issue: {}", msg),
            Self::Persistence(msg) => format!("Could not save settings: {}", msg),
            Self::ChannelPayload(e) => format!("Invalid message format: {}", e),
            Self::ChannelClosed { .. } => "The preview is no longer connected".to_string(),
            Self::Io { path, .. } => format!("Could not read {}", path),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorybookError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use storybook_core::error::ResultExt;
///
/// // Keep the default shortcuts if the store can't be written
/// store.set(partial, Persistence::Permanent).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

/// Panic in debug mode, log error in release mode.
///
/// Use for states that should crash during development but degrade in
/// production builds.
///
/// ```ignore
/// debug_panic!("selection resolved to unknown story {}", id);
/// ```
#[macro_export]
macro_rules! debug_panic {
    ( $($fmt_arg:tt)* ) => {
        if cfg!(debug_assertions) {
            panic!( $($fmt_arg)* );
        } else {
            tracing::error!("IMPOSSIBLE STATE: {}", format_args!($($fmt_arg)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_fatal() {
        let dup = StorybookError::DuplicateStoryId {
            id: "a--b".into(),
            kind: "A".into(),
            name: "B".into(),
        };
        assert!(dup.is_fatal());
        assert!(StorybookError::NoStories {
            consumer: "storyshots".into()
        }
        .is_fatal());
        assert!(!StorybookError::Config("bad".into()).is_fatal());
    }

    #[test]
    fn test_invalid_path_message_names_value() {
        let err = StorybookError::InvalidPath {
            path: "/other/x".into(),
        };
        assert!(err.to_string().contains("Invalid path '/other/x'"));
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_no_stories_display() {
        let err = StorybookError::NoStories {
            consumer: "storyshots".into(),
        };
        assert_eq!(err.to_string(), "storyshots found 0 stories");
    }

    #[test]
    fn test_result_ext_passes_through_ok() {
        let ok: std::result::Result<u8, String> = Ok(3);
        assert_eq!(ok.log_err(), Some(3));
        let err: std::result::Result<u8, String> = Err("nope".into());
        assert_eq!(err.warn_on_err(), None);
    }
}
