//! Configuration module - workbench settings
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.storybook/config.json
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{
    DEFAULT_DEEP_MERGE_PARAMETERS, DEFAULT_ENABLE_SHORTCUTS, DEFAULT_MAX_STORY_LIST_UPDATES,
};
pub use loader::{config_path, load_config, load_config_from};
pub use types::{storybook_dir, SelectionConfig, StorybookConfig};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
