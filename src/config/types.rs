//! Configuration type definitions

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults::*;
use crate::registry::Params;
use crate::story_sort::SortConfig;

// ============================================
// SELECTION
// ============================================

/// Selection controller settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionConfig {
    /// Story-list updates to wait for before giving up on a story (default: 3)
    #[serde(default = "default_max_story_list_updates")]
    pub max_story_list_updates: u32,
}

fn default_max_story_list_updates() -> u32 {
    DEFAULT_MAX_STORY_LIST_UPDATES
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            max_story_list_updates: DEFAULT_MAX_STORY_LIST_UPDATES,
        }
    }
}

// ============================================
// MAIN CONFIG
// ============================================

/// Workbench configuration, read from `~/.storybook/config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorybookConfig {
    /// Sidebar story order
    #[serde(default)]
    pub story_sort: SortConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Parameters applied to every story
    #[serde(default)]
    pub parameters: Params,
    /// Parameter keys whose objects merge instead of replacing (default: ["docs"])
    #[serde(default = "default_deep_merge_parameters")]
    pub deep_merge_parameters: Vec<String>,
    /// Where shortcut overrides are persisted (default: ~/.storybook/shortcuts.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcuts_path: Option<String>,
    /// Master switch for keyboard shortcuts (default: true)
    #[serde(default = "default_enable_shortcuts")]
    pub enable_shortcuts: bool,
}

fn default_deep_merge_parameters() -> Vec<String> {
    DEFAULT_DEEP_MERGE_PARAMETERS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_enable_shortcuts() -> bool {
    DEFAULT_ENABLE_SHORTCUTS
}

impl Default for StorybookConfig {
    fn default() -> Self {
        StorybookConfig {
            story_sort: SortConfig::default(),
            selection: SelectionConfig::default(),
            parameters: Params::new(),
            deep_merge_parameters: default_deep_merge_parameters(),
            shortcuts_path: None,
            enable_shortcuts: DEFAULT_ENABLE_SHORTCUTS,
        }
    }
}

impl StorybookConfig {
    /// Resolved location of the shortcut overrides file.
    pub fn get_shortcuts_path(&self) -> PathBuf {
        match &self.shortcuts_path {
            Some(path) => expand_tilde(path),
            None => storybook_dir().join(SHORTCUTS_FILE_NAME),
        }
    }

    /// A registry builder carrying the global parameter layer.
    pub fn registry_builder(&self) -> crate::registry::RegistryBuilder {
        crate::registry::RegistryBuilder::new()
            .global_parameters(self.parameters.clone())
            .deep_merge_keys(self.deep_merge_parameters.clone())
    }
}

/// `~/.storybook`, or a relative `.storybook` when there is no home directory.
pub fn storybook_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(STORYBOOK_DIR))
        .unwrap_or_else(|| PathBuf::from(STORYBOOK_DIR))
}

pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
