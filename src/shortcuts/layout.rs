//! Manager layout state and the commands shortcuts hand to the UI.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PanelPosition {
    #[default]
    Bottom,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    pub is_fullscreen: bool,
    pub show_nav: bool,
    pub show_panel: bool,
    pub show_toolbar: bool,
    pub panel_position: PanelPosition,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            is_fullscreen: false,
            show_nav: true,
            show_panel: true,
            show_toolbar: true,
            panel_position: PanelPosition::Bottom,
        }
    }
}

impl LayoutState {
    pub fn toggle_fullscreen(&mut self) {
        self.is_fullscreen = !self.is_fullscreen;
    }

    pub fn toggle_nav(&mut self) {
        self.show_nav = !self.show_nav;
    }

    pub fn toggle_panel(&mut self) {
        self.show_panel = !self.show_panel;
    }

    pub fn toggle_toolbar(&mut self) {
        self.show_toolbar = !self.show_toolbar;
    }

    pub fn toggle_panel_position(&mut self) {
        self.panel_position = match self.panel_position {
            PanelPosition::Bottom => PanelPosition::Right,
            PanelPosition::Right => PanelPosition::Bottom,
        };
    }

    /// Back to the default arrangement.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Focusable regions of the manager UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusTarget {
    StoryListMenu,
    StorySearchField,
    StoryPanelRoot,
}

impl FocusTarget {
    /// DOM id of the element.
    pub fn element_id(&self) -> &'static str {
        match self {
            FocusTarget::StoryListMenu => "storybook-explorer-menu",
            FocusTarget::StorySearchField => "storybook-explorer-searchfield",
            FocusTarget::StoryPanelRoot => "storybook-panel-root",
        }
    }
}

/// Work a shortcut leaves for the UI once the layout has been updated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiCommand {
    Focus { target: FocusTarget, select: bool },
    FocusPreview,
    Navigate { path: String },
    JumpToStory { delta: isize },
    JumpToComponent { delta: isize },
    CollapseAll,
    ExpandAll,
    AddonAction { id: String },
}
