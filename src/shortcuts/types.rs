//! Shortcut actions, chords and the default bindings.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use thiserror::Error;

/// An ordered chord: modifier tokens (`alt`, `control`, `meta`, `shift`)
/// followed by key names. Order is significant.
pub type KeyCollection = SmallVec<[String; 4]>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown shortcut action '{0}'")]
pub struct UnknownAction(pub String);

/// Built-in manager actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    FullScreen,
    TogglePanel,
    PanelPosition,
    ToggleNav,
    Toolbar,
    Search,
    FocusNav,
    FocusIframe,
    FocusPanel,
    PrevComponent,
    NextComponent,
    PrevStory,
    NextStory,
    ShortcutsPage,
    AboutPage,
    Escape,
    CollapseAll,
    ExpandAll,
}

impl Action {
    /// Every action, in default-binding order.
    pub const ALL: [Action; 18] = [
        Action::FullScreen,
        Action::TogglePanel,
        Action::PanelPosition,
        Action::ToggleNav,
        Action::Toolbar,
        Action::Search,
        Action::FocusNav,
        Action::FocusIframe,
        Action::FocusPanel,
        Action::PrevComponent,
        Action::NextComponent,
        Action::PrevStory,
        Action::NextStory,
        Action::ShortcutsPage,
        Action::AboutPage,
        Action::Escape,
        Action::CollapseAll,
        Action::ExpandAll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::FullScreen => "fullScreen",
            Action::TogglePanel => "togglePanel",
            Action::PanelPosition => "panelPosition",
            Action::ToggleNav => "toggleNav",
            Action::Toolbar => "toolbar",
            Action::Search => "search",
            Action::FocusNav => "focusNav",
            Action::FocusIframe => "focusIframe",
            Action::FocusPanel => "focusPanel",
            Action::PrevComponent => "prevComponent",
            Action::NextComponent => "nextComponent",
            Action::PrevStory => "prevStory",
            Action::NextStory => "nextStory",
            Action::ShortcutsPage => "shortcutsPage",
            Action::AboutPage => "aboutPage",
            Action::Escape => "escape",
            Action::CollapseAll => "collapseAll",
            Action::ExpandAll => "expandAll",
        }
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of the effective shortcut map: a built-in action or an addon
/// shortcut named `<addonId>-<actionName>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShortcutId {
    Builtin(Action),
    Addon(String),
}

impl ShortcutId {
    pub fn addon(addon: &str, action_name: &str) -> Self {
        ShortcutId::Addon(format!("{}-{}", addon, action_name))
    }

    /// Built-in names win; anything else is treated as an addon key.
    pub fn parse(s: &str) -> Self {
        match s.parse::<Action>() {
            Ok(action) => ShortcutId::Builtin(action),
            Err(_) => ShortcutId::Addon(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ShortcutId::Builtin(action) => action.as_str(),
            ShortcutId::Addon(name) => name,
        }
    }

    pub fn action(&self) -> Option<Action> {
        match self {
            ShortcutId::Builtin(action) => Some(*action),
            ShortcutId::Addon(_) => None,
        }
    }
}

impl From<Action> for ShortcutId {
    fn from(action: Action) -> Self {
        ShortcutId::Builtin(action)
    }
}

impl fmt::Display for ShortcutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered shortcut map. Matching walks entries in order, so built-in
/// actions are checked before addon shortcuts appended later.
///
/// Serialized as a JSON object keyed by action name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Shortcuts {
    entries: Vec<(ShortcutId, KeyCollection)>,
}

impl Shortcuts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ShortcutId) -> Option<&KeyCollection> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn get_action(&self, action: Action) -> Option<&KeyCollection> {
        self.get(&ShortcutId::Builtin(action))
    }

    /// Replace the chord for `id`, appending a new entry if it is unknown.
    pub fn set(&mut self, id: ShortcutId, keys: KeyCollection) {
        match self.entries.iter_mut().find(|(k, _)| *k == id) {
            Some((_, existing)) => *existing = keys,
            None => self.entries.push((id, keys)),
        }
    }

    /// `self` with every entry of `other` applied on top.
    pub fn merged(&self, other: &Shortcuts) -> Shortcuts {
        let mut merged = self.clone();
        for (id, keys) in other.iter() {
            merged.set(id.clone(), keys.clone());
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ShortcutId, &KeyCollection)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ShortcutId, KeyCollection)> for Shortcuts {
    fn from_iter<I: IntoIterator<Item = (ShortcutId, KeyCollection)>>(iter: I) -> Self {
        let mut shortcuts = Shortcuts::new();
        for (id, keys) in iter {
            shortcuts.set(id, keys);
        }
        shortcuts
    }
}

impl Serialize for Shortcuts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, keys) in &self.entries {
            map.serialize_entry(id.as_str(), keys)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Shortcuts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // preserve_order keeps the file's key order
        let raw = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, value)| {
                let keys: KeyCollection = serde_json::from_value(value)
                    .map_err(|e| de::Error::custom(format!("shortcut '{}': {}", key, e)))?;
                Ok((ShortcutId::parse(&key), keys))
            })
            .collect()
    }
}

/// Host platform, used once to pick the primary modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        {
            Platform::MacOS
        }
        #[cfg(target_os = "windows")]
        {
            Platform::Windows
        }
        #[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "windows")))]
        {
            Platform::Linux
        }
    }

    pub fn is_mac_like(&self) -> bool {
        matches!(self, Platform::MacOS)
    }

    /// `meta` on Apple platforms, `control` elsewhere.
    pub fn control_or_meta_key(&self) -> &'static str {
        if self.is_mac_like() {
            "meta"
        } else {
            "control"
        }
    }
}

fn chord(keys: &[&str]) -> KeyCollection {
    keys.iter().map(|k| k.to_string()).collect()
}

/// Default bindings with the platform's primary modifier substituted.
pub fn default_shortcuts_for(platform: Platform) -> Shortcuts {
    let primary = platform.control_or_meta_key();
    Action::ALL
        .iter()
        .map(|&action| {
            let keys: KeyCollection = match action {
                Action::FullScreen => chord(&["F"]),
                Action::TogglePanel => chord(&["A"]),
                Action::PanelPosition => chord(&["D"]),
                Action::ToggleNav => chord(&["S"]),
                Action::Toolbar => chord(&["T"]),
                Action::Search => chord(&["/"]),
                Action::FocusNav => chord(&["1"]),
                Action::FocusIframe => chord(&["2"]),
                Action::FocusPanel => chord(&["3"]),
                Action::PrevComponent => chord(&["alt", "ArrowUp"]),
                Action::NextComponent => chord(&["alt", "ArrowDown"]),
                Action::PrevStory => chord(&["alt", "ArrowLeft"]),
                Action::NextStory => chord(&["alt", "ArrowRight"]),
                Action::ShortcutsPage => chord(&[primary, "shift", ","]),
                Action::AboutPage => chord(&[","]),
                // Not customizable in the settings page
                Action::Escape => smallvec!["escape".to_string()],
                Action::CollapseAll => chord(&[primary, "shift", "ArrowUp"]),
                Action::ExpandAll => chord(&[primary, "shift", "ArrowDown"]),
            };
            (ShortcutId::Builtin(action), keys)
        })
        .collect()
}

static DEFAULT_SHORTCUTS: LazyLock<Shortcuts> =
    LazyLock::new(|| default_shortcuts_for(Platform::current()));

/// Default bindings for the host platform, computed once.
pub fn default_shortcuts() -> &'static Shortcuts {
    &DEFAULT_SHORTCUTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>(), Ok(action));
            assert_eq!(
                serde_json::to_value(action).unwrap(),
                serde_json::json!(action.as_str())
            );
        }
        assert!("toggleSidebar".parse::<Action>().is_err());
    }

    #[test]
    fn test_every_action_has_one_default_chord() {
        let defaults = default_shortcuts_for(Platform::Linux);
        assert_eq!(defaults.len(), Action::ALL.len());
        for action in Action::ALL {
            assert!(!defaults.get_action(action).unwrap().is_empty());
        }
    }

    #[test]
    fn test_primary_modifier_depends_on_platform() {
        let linux = default_shortcuts_for(Platform::Linux);
        let mac = default_shortcuts_for(Platform::MacOS);
        assert_eq!(
            linux.get_action(Action::ShortcutsPage).unwrap().as_slice(),
            ["control", "shift", ","]
        );
        assert_eq!(
            mac.get_action(Action::CollapseAll).unwrap().as_slice(),
            ["meta", "shift", "ArrowUp"]
        );
        assert_eq!(
            mac.get_action(Action::NextStory),
            linux.get_action(Action::NextStory)
        );
    }

    #[test]
    fn test_shortcut_id_parse() {
        assert_eq!(ShortcutId::parse("search"), ShortcutId::Builtin(Action::Search));
        assert_eq!(
            ShortcutId::parse("a11y-highlight"),
            ShortcutId::Addon("a11y-highlight".to_string())
        );
        assert_eq!(ShortcutId::addon("a11y", "highlight").as_str(), "a11y-highlight");
    }

    #[test]
    fn test_shortcuts_serialize_in_order() {
        let mut shortcuts = Shortcuts::new();
        shortcuts.set(Action::Toolbar.into(), chord(&["T"]));
        shortcuts.set(ShortcutId::addon("backgrounds", "toggle"), chord(&["B"]));
        shortcuts.set(Action::Toolbar.into(), chord(&["alt", "T"]));

        let json = serde_json::to_string(&shortcuts).unwrap();
        assert_eq!(json, r#"{"toolbar":["alt","T"],"backgrounds-toggle":["B"]}"#);

        let back: Shortcuts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shortcuts);
    }

    #[test]
    fn test_shortcuts_reject_non_array_chords() {
        let result: Result<Shortcuts, _> = serde_json::from_str(r#"{"toolbar":"T"}"#);
        assert!(result.unwrap_err().to_string().contains("toolbar"));
    }
}
