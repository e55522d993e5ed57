//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Directory under the home directory holding config, logs and shortcuts
pub const STORYBOOK_DIR: &str = ".storybook";

/// Config file name inside `STORYBOOK_DIR`
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "STORYBOOK_CONFIG";

/// Persisted shortcut overrides file name inside `STORYBOOK_DIR`
pub const SHORTCUTS_FILE_NAME: &str = "shortcuts.json";

/// Story-list updates after which an unresolved selection becomes "not found"
pub const DEFAULT_MAX_STORY_LIST_UPDATES: u32 = 3;

/// Keyboard shortcuts are on unless disabled
pub const DEFAULT_ENABLE_SHORTCUTS: bool = true;

/// Top-level parameter keys merged deeply rather than replaced
pub const DEFAULT_DEEP_MERGE_PARAMETERS: &[&str] = &["docs"];
