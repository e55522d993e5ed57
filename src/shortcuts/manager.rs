//! Shortcut state and dispatch for the manager UI.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use smallvec::{smallvec, SmallVec};
use tracing::{debug, info, warn};

use super::addons::{AddonShortcut, AddonShortcuts};
use super::keys::{chord_label, event_to_shortcut, focus_in_input, shortcut_matches_shortcut, KeyboardEvent};
use super::layout::{FocusTarget, LayoutState, UiCommand};
use super::persistence::{JsonFileStore, Persistence, PersistedState, StateStore};
use super::types::{default_shortcuts, Action, KeyCollection, ShortcutId, Shortcuts};
use crate::channel::{events, payload, Channel, ListenerId};
use crate::config::StorybookConfig;
use crate::controller::SelectionController;
use crate::error::{Result, ResultExt};
use crate::logging::log_shortcut_event;

pub type UiCommands = SmallVec<[UiCommand; 2]>;

/// A built-in action's effect on the layout plus the work it leaves the UI.
pub type ActionHandler = fn(&mut LayoutState) -> UiCommands;

/// Handler for each built-in action.
pub fn handler_for(action: Action) -> ActionHandler {
    match action {
        Action::Escape => escape,
        Action::FocusNav => focus_nav,
        Action::Search => search,
        Action::FocusIframe => focus_iframe,
        Action::FocusPanel => focus_panel,
        Action::NextStory => next_story,
        Action::PrevStory => prev_story,
        Action::NextComponent => next_component,
        Action::PrevComponent => prev_component,
        Action::FullScreen => full_screen,
        Action::TogglePanel => toggle_panel,
        Action::ToggleNav => toggle_nav,
        Action::Toolbar => toolbar,
        Action::PanelPosition => panel_position,
        Action::AboutPage => about_page,
        Action::ShortcutsPage => shortcuts_page,
        Action::CollapseAll => collapse_all,
        Action::ExpandAll => expand_all,
    }
}

fn navigate(path: &str) -> UiCommands {
    smallvec![UiCommand::Navigate {
        path: path.to_string()
    }]
}

fn about_page(_: &mut LayoutState) -> UiCommands {
    navigate("/settings/about")
}

fn shortcuts_page(_: &mut LayoutState) -> UiCommands {
    navigate("/settings/shortcuts")
}

fn next_story(_: &mut LayoutState) -> UiCommands {
    smallvec![UiCommand::JumpToStory { delta: 1 }]
}

fn prev_story(_: &mut LayoutState) -> UiCommands {
    smallvec![UiCommand::JumpToStory { delta: -1 }]
}

fn next_component(_: &mut LayoutState) -> UiCommands {
    smallvec![UiCommand::JumpToComponent { delta: 1 }]
}

fn prev_component(_: &mut LayoutState) -> UiCommands {
    smallvec![UiCommand::JumpToComponent { delta: -1 }]
}

fn collapse_all(_: &mut LayoutState) -> UiCommands {
    smallvec![UiCommand::CollapseAll]
}

fn expand_all(_: &mut LayoutState) -> UiCommands {
    smallvec![UiCommand::ExpandAll]
}

fn focus_iframe(_: &mut LayoutState) -> UiCommands {
    smallvec![UiCommand::FocusPreview]
}

fn full_screen(layout: &mut LayoutState) -> UiCommands {
    layout.toggle_fullscreen();
    UiCommands::new()
}

fn toolbar(layout: &mut LayoutState) -> UiCommands {
    layout.toggle_toolbar();
    UiCommands::new()
}

fn escape(layout: &mut LayoutState) -> UiCommands {
    if layout.is_fullscreen {
        layout.toggle_fullscreen();
    } else if !layout.show_nav {
        layout.toggle_nav();
    }
    UiCommands::new()
}

fn reveal_nav(layout: &mut LayoutState) {
    if layout.is_fullscreen {
        layout.toggle_fullscreen();
    }
    if !layout.show_nav {
        layout.toggle_nav();
    }
}

fn reveal_panel(layout: &mut LayoutState) {
    if layout.is_fullscreen {
        layout.toggle_fullscreen();
    }
    if !layout.show_panel {
        layout.toggle_panel();
    }
}

fn focus_nav(layout: &mut LayoutState) -> UiCommands {
    reveal_nav(layout);
    smallvec![UiCommand::Focus {
        target: FocusTarget::StoryListMenu,
        select: false,
    }]
}

fn search(layout: &mut LayoutState) -> UiCommands {
    reveal_nav(layout);
    smallvec![UiCommand::Focus {
        target: FocusTarget::StorySearchField,
        select: true,
    }]
}

fn focus_panel(layout: &mut LayoutState) -> UiCommands {
    reveal_panel(layout);
    smallvec![UiCommand::Focus {
        target: FocusTarget::StoryPanelRoot,
        select: false,
    }]
}

fn toggle_panel(layout: &mut LayoutState) -> UiCommands {
    if layout.is_fullscreen {
        layout.toggle_fullscreen();
        layout.reset();
    }
    layout.toggle_panel();
    UiCommands::new()
}

fn toggle_nav(layout: &mut LayoutState) -> UiCommands {
    if layout.is_fullscreen {
        layout.toggle_fullscreen();
        layout.reset();
    }
    layout.toggle_nav();
    UiCommands::new()
}

fn panel_position(layout: &mut LayoutState) -> UiCommands {
    reveal_panel(layout);
    layout.toggle_panel_position();
    UiCommands::new()
}

#[derive(Debug, Deserialize)]
struct PreviewKeydown {
    event: KeyboardEvent,
}

/// Effective shortcuts, addon registrations and the layout they act on.
pub struct ShortcutsManager {
    shortcuts: Shortcuts,
    addons: AddonShortcuts,
    layout: LayoutState,
    enable_shortcuts: bool,
    store: Box<dyn StateStore>,
}

impl std::fmt::Debug for ShortcutsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortcutsManager")
            .field("shortcuts", &self.shortcuts.len())
            .field("addons", &self.addons.len())
            .field("layout", &self.layout)
            .field("enable_shortcuts", &self.enable_shortcuts)
            .finish()
    }
}

impl ShortcutsManager {
    /// Start from the defaults (addons' included), keeping persisted chords
    /// only for shortcuts that still exist.
    pub fn new(store: Box<dyn StateStore>, addons: AddonShortcuts, enable_shortcuts: bool) -> Self {
        let persisted = store
            .get()
            .warn_on_err()
            .and_then(|state| state.shortcuts)
            .unwrap_or_default();

        let shortcuts: Shortcuts = default_shortcuts()
            .merged(&addons.defaults())
            .iter()
            .map(|(id, default)| {
                let keys = persisted.get(id).unwrap_or(default).clone();
                (id.clone(), keys)
            })
            .collect();

        let dropped = persisted
            .iter()
            .filter(|(id, _)| shortcuts.get(id).is_none())
            .count();
        if dropped > 0 {
            debug!(dropped, "Ignoring persisted shortcuts for unknown actions");
        }

        Self {
            shortcuts,
            addons,
            layout: LayoutState::default(),
            enable_shortcuts,
            store,
        }
    }

    pub fn from_config(config: &StorybookConfig, addons: AddonShortcuts) -> Self {
        let store = JsonFileStore::new(config.get_shortcuts_path());
        Self::new(Box::new(store), addons, config.enable_shortcuts)
    }

    pub fn shortcut_keys(&self) -> &Shortcuts {
        &self.shortcuts
    }

    /// Built-in defaults plus the addons' own defaults.
    pub fn default_shortcuts(&self) -> Shortcuts {
        default_shortcuts().merged(&self.addon_shortcut_defaults())
    }

    pub fn addon_shortcuts(&self) -> &AddonShortcuts {
        &self.addons
    }

    pub fn addon_shortcut_labels(&self) -> std::collections::BTreeMap<String, String> {
        self.addons.labels()
    }

    pub fn addon_shortcut_defaults(&self) -> Shortcuts {
        self.addons.defaults()
    }

    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut LayoutState {
        &mut self.layout
    }

    pub fn enable_shortcuts(&self) -> bool {
        self.enable_shortcuts
    }

    pub fn set_enable_shortcuts(&mut self, enabled: bool) {
        self.enable_shortcuts = enabled;
    }

    /// Replace every chord and persist. The in-memory set is updated even
    /// when the store fails.
    pub fn set_shortcuts(&mut self, shortcuts: Shortcuts) -> Result<&Shortcuts> {
        self.shortcuts = shortcuts;
        self.store.set(
            PersistedState {
                shortcuts: Some(self.shortcuts.clone()),
            },
            Persistence::Permanent,
        )?;
        Ok(&self.shortcuts)
    }

    /// Replace the chord of one shortcut.
    pub fn set_shortcut(&mut self, id: impl Into<ShortcutId>, keys: KeyCollection) -> Result<KeyCollection> {
        let mut shortcuts = self.shortcuts.clone();
        shortcuts.set(id.into(), keys.clone());
        self.set_shortcuts(shortcuts)?;
        Ok(keys)
    }

    /// Register an addon shortcut and bind its default chord.
    pub fn set_addon_shortcut(&mut self, addon: &str, shortcut: AddonShortcut) -> Result<ShortcutId> {
        let id = ShortcutId::addon(addon, &shortcut.action_name);
        let mut shortcuts = self.shortcuts.clone();
        shortcuts.set(id.clone(), shortcut.default_shortcut.clone());
        self.addons.register(addon, shortcut);
        self.set_shortcuts(shortcuts)?;
        Ok(id)
    }

    pub fn restore_all_default_shortcuts(&mut self) -> Result<&Shortcuts> {
        let defaults = self.default_shortcuts();
        self.set_shortcuts(defaults)
    }

    /// Restore one shortcut. `None` when it has no default to go back to.
    pub fn restore_default_shortcut(&mut self, id: impl Into<ShortcutId>) -> Result<Option<KeyCollection>> {
        let id = id.into();
        let Some(default) = self.default_shortcuts().get(&id).cloned() else {
            warn!(shortcut = %id, "No default shortcut to restore");
            return Ok(None);
        };
        self.set_shortcut(id, default).map(Some)
    }

    /// The shortcut a keydown event triggers, if any.
    pub fn match_event(&self, event: &KeyboardEvent) -> Option<ShortcutId> {
        let input = event_to_shortcut(event)?;
        self.shortcuts
            .iter()
            .find(|(_, keys)| shortcut_matches_shortcut(&input, keys))
            .map(|(id, _)| id.clone())
    }

    /// Handle a keydown. Ignored while an editable field has focus.
    pub fn handle_keydown_event(&mut self, event: &KeyboardEvent) -> UiCommands {
        if focus_in_input(event) {
            debug!(key = %event.key, "Keydown in editable field ignored");
            return UiCommands::new();
        }
        let Some(id) = self.match_event(event) else {
            return UiCommands::new();
        };
        if let Some(keys) = self.shortcuts.get(&id) {
            log_shortcut_event(id.as_str(), &chord_label(keys));
        }
        self.handle_shortcut_feature(&id)
    }

    /// Run the handler for `id`. Nothing happens while shortcuts are disabled.
    pub fn handle_shortcut_feature(&mut self, id: &ShortcutId) -> UiCommands {
        if !self.enable_shortcuts {
            debug!(shortcut = %id, "Shortcuts disabled");
            return UiCommands::new();
        }
        match id {
            ShortcutId::Builtin(action) => handler_for(*action)(&mut self.layout),
            ShortcutId::Addon(key) => match self.addons.get(key) {
                Some(shortcut) => {
                    if let Some(action) = &shortcut.action {
                        action();
                    }
                    smallvec![UiCommand::AddonAction { id: key.clone() }]
                }
                None => {
                    warn!(shortcut = %key, "Shortcut bound to unregistered addon");
                    UiCommands::new()
                }
            },
        }
    }
}

/// Carry out the commands the selection controller handles.
pub fn apply_navigation(commands: &[UiCommand], controller: &SelectionController) {
    for command in commands {
        match command {
            UiCommand::JumpToStory { delta } => controller.jump_to_story(*delta),
            UiCommand::JumpToComponent { delta } => controller.jump_to_component(*delta),
            _ => {}
        }
    }
}

/// Handle keydowns forwarded by the preview. Navigation commands go to
/// `controller`; the rest are passed to `on_commands`.
pub fn install_preview_keydown<F>(
    channel: &Channel,
    manager: Arc<Mutex<ShortcutsManager>>,
    controller: SelectionController,
    on_commands: F,
) -> ListenerId
where
    F: Fn(&[UiCommand]) + Send + Sync + 'static,
{
    info!("Listening for preview keydown events");
    channel.on(events::PREVIEW_KEYDOWN, move |args| {
        let PreviewKeydown { event } = payload(args, 0)?;
        // The manager lock is released before navigation emits on the channel
        let commands = manager.lock().handle_keydown_event(&event);
        if commands.is_empty() {
            return Ok(());
        }
        apply_navigation(&commands, &controller);
        on_commands(&commands);
        Ok(())
    })
}
