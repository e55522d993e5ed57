//! Selection controller states.

use serde::Serialize;

use crate::selection::{Selection, SelectionSpecifier};

/// Where the controller is in resolving the URL's selection.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SelectionState {
    /// The URL names no story; the first story is selected once known.
    NoSelection,
    /// Waiting for the registry to contain the requested story.
    Resolving {
        specifier: SelectionSpecifier,
        generation: u64,
    },
    Resolved { selection: Selection },
    /// The registry is stable and has no matching story.
    NotFound { specifier: SelectionSpecifier },
}

impl SelectionState {
    pub fn name(&self) -> &'static str {
        match self {
            SelectionState::NoSelection => "no_selection",
            SelectionState::Resolving { .. } => "resolving",
            SelectionState::Resolved { .. } => "resolved",
            SelectionState::NotFound { .. } => "not_found",
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        match self {
            SelectionState::Resolved { selection } => Some(selection),
            _ => None,
        }
    }

    /// Whether the current or pending selection is in single-story mode.
    pub fn single_story(&self) -> bool {
        match self {
            SelectionState::NoSelection => false,
            SelectionState::Resolving { specifier, .. } | SelectionState::NotFound { specifier } => {
                specifier.single_story
            }
            SelectionState::Resolved { selection } => selection.single_story,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SelectionState::NotFound { .. })
    }

    /// Text for the "story not found" screen.
    pub fn user_message(&self) -> Option<String> {
        match self {
            SelectionState::NotFound { specifier } => Some(format!(
                "Couldn't find story matching '{}'",
                describe_specifier(specifier)
            )),
            _ => None,
        }
    }
}

pub(crate) fn describe_specifier(specifier: &SelectionSpecifier) -> String {
    use crate::selection::StorySpecifier;
    match &specifier.story_specifier {
        StorySpecifier::Id(id) => id.clone(),
        StorySpecifier::KindName { kind, name } => format!("{} / {}", kind, name),
    }
}
