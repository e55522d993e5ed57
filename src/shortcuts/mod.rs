//! Keyboard shortcuts for the manager UI.
//!
//! Chords are ordered token lists (`["alt", "ArrowRight"]`). Each built-in
//! `Action` maps to one handler that updates the `LayoutState` and returns
//! the `UiCommand`s left for the UI. Addon shortcuts live in an
//! `AddonShortcuts` registry the host owns and passes in.
//!
//! # Example
//!
//! ```ignore
//! use storybook_core::shortcuts::{AddonShortcuts, KeyboardEvent, MemoryStore, ShortcutsManager};
//!
//! let mut shortcuts = ShortcutsManager::new(Box::new(MemoryStore::new()), AddonShortcuts::new(), true);
//! let commands = shortcuts.handle_keydown_event(&KeyboardEvent::key("ArrowRight").alt());
//! // [JumpToStory { delta: 1 }]
//! ```

mod addons;
mod keys;
mod layout;
mod manager;
mod persistence;
mod types;


pub use addons::{AddonAction, AddonShortcut, AddonShortcuts};
pub use keys::{
    chord_label, event_to_shortcut, focus_in_input, shortcut_matches_shortcut, EventChord,
    EventTarget, KeyInput, KeyboardEvent,
};
pub use layout::{FocusTarget, LayoutState, PanelPosition, UiCommand};
pub use manager::{
    apply_navigation, handler_for, install_preview_keydown, ActionHandler, ShortcutsManager,
    UiCommands,
};
pub use persistence::{JsonFileStore, MemoryStore, PersistedState, Persistence, StateStore};
pub use types::{
    default_shortcuts, default_shortcuts_for, Action, KeyCollection, Platform, ShortcutId,
    Shortcuts, UnknownAction,
};
