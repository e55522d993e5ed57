//! Shortcuts contributed by addons.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::types::{KeyCollection, ShortcutId, Shortcuts};

/// Callback run when an addon shortcut fires.
pub type AddonAction = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct AddonShortcut {
    pub label: String,
    pub default_shortcut: KeyCollection,
    pub action_name: String,
    pub show_in_menu: bool,
    pub action: Option<AddonAction>,
}

impl AddonShortcut {
    pub fn new(action_name: &str, label: &str, default_shortcut: KeyCollection) -> Self {
        Self {
            label: label.to_string(),
            default_shortcut,
            action_name: action_name.to_string(),
            show_in_menu: false,
            action: None,
        }
    }

    pub fn with_action(mut self, action: impl Fn() + Send + Sync + 'static) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    pub fn shown_in_menu(mut self) -> Self {
        self.show_in_menu = true;
        self
    }
}

impl fmt::Debug for AddonShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddonShortcut")
            .field("label", &self.label)
            .field("default_shortcut", &self.default_shortcut)
            .field("action_name", &self.action_name)
            .field("show_in_menu", &self.show_in_menu)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

/// Addon shortcuts keyed by `<addonId>-<actionName>`, in registration order.
///
/// Owned by the host and handed to the shortcuts manager. Registering the
/// same key twice replaces the earlier shortcut.
#[derive(Clone, Debug, Default)]
pub struct AddonShortcuts {
    entries: Vec<(String, AddonShortcut)>,
}

impl AddonShortcuts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, addon: &str, shortcut: AddonShortcut) -> ShortcutId {
        let id = ShortcutId::addon(addon, &shortcut.action_name);
        let key = id.as_str().to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => {
                warn!(shortcut = %key, "Addon shortcut registered twice, replacing");
                *existing = shortcut;
            }
            None => {
                debug!(shortcut = %key, "Addon shortcut registered");
                self.entries.push((key, shortcut));
            }
        }
        id
    }

    pub fn get(&self, key: &str) -> Option<&AddonShortcut> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AddonShortcut)> {
        self.entries.iter().map(|(k, s)| (k.as_str(), s))
    }

    pub fn labels(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(key, shortcut)| (key.to_string(), shortcut.label.clone()))
            .collect()
    }

    pub fn defaults(&self) -> Shortcuts {
        self.iter()
            .map(|(key, shortcut)| {
                (
                    ShortcutId::Addon(key.to_string()),
                    shortcut.default_shortcut.clone(),
                )
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every registration, e.g. when the host shuts down.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
