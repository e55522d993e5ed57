//! Selection data types.

use serde::{Deserialize, Serialize};

use crate::registry::{Params, StoryId};

/// Story specifier value meaning "no particular story".
pub const WILDCARD_ID: &str = "*";

/// How the selected story is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Story,
    Docs,
}

impl ViewMode {
    /// Lenient parse: anything other than `docs` is `story`.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some("docs") => ViewMode::Docs,
            _ => ViewMode::Story,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Story => "story",
            ViewMode::Docs => "docs",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the URL asks for: an id (possibly `*`) or a legacy kind/name pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StorySpecifier {
    Id(StoryId),
    KindName { kind: String, name: String },
}

impl StorySpecifier {
    pub fn id(id: impl Into<String>) -> Self {
        StorySpecifier::Id(id.into())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, StorySpecifier::Id(id) if id == WILDCARD_ID)
    }
}

/// A decoded, not yet resolved, selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSpecifier {
    pub story_specifier: StorySpecifier,
    pub view_mode: ViewMode,
    pub single_story: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Params>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub globals: Option<Params>,
}

impl SelectionSpecifier {
    pub fn new(story_specifier: StorySpecifier) -> Self {
        Self {
            story_specifier,
            view_mode: ViewMode::Story,
            single_story: false,
            args: None,
            globals: None,
        }
    }

    pub fn with_view_mode(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = view_mode;
        self
    }
}

/// The current selection. The URL is canonical; this is its in-memory copy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub story_id: StoryId,
    pub view_mode: ViewMode,
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub args: Params,
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub globals: Params,
    #[serde(default)]
    pub single_story: bool,
}

impl Selection {
    pub fn new(story_id: impl Into<String>, view_mode: ViewMode) -> Self {
        Self {
            story_id: story_id.into(),
            view_mode,
            ..Default::default()
        }
    }

    /// Fill a selection from a specifier that resolved to `story_id`.
    pub fn resolved(story_id: impl Into<String>, specifier: &SelectionSpecifier) -> Self {
        Self {
            story_id: story_id.into(),
            view_mode: specifier.view_mode,
            args: specifier.args.clone().unwrap_or_default(),
            globals: specifier.globals.clone().unwrap_or_default(),
            single_story: specifier.single_story,
        }
    }

    /// The selection a specifier names directly, if it names a concrete id.
    pub fn from_specifier(specifier: &SelectionSpecifier) -> Option<Self> {
        match &specifier.story_specifier {
            StorySpecifier::Id(id) if id != WILDCARD_ID => Some(Self::resolved(id.clone(), specifier)),
            _ => None,
        }
    }
}
