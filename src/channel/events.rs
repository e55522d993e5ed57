//! Channel event names shared by the manager and the preview.

/// Payload: the new story id. Per-story decorations reset on this.
pub const STORY_CHANGED: &str = "storyChanged";
/// Payload: a `Selection`. Manager asks the preview to show a story.
pub const SET_CURRENT_STORY: &str = "setCurrentStory";
/// Payload: the preview's story list.
pub const SET_STORIES: &str = "setStories";
/// Payload: the specifier or id that matched nothing.
pub const STORY_MISSING: &str = "storyMissing";
/// Payload: `{ storyId }` or `{ kind, story }`. Navigation request.
pub const SELECT_STORY: &str = "selectStory";
/// Payload: the `Selection` now shown.
pub const CURRENT_STORY_WAS_SET: &str = "currentStoryWasSet";
/// Payload: a `KeyboardEventInfo` forwarded from the preview frame.
pub const PREVIEW_KEYDOWN: &str = "previewKeydown";
/// Payload: the story id.
pub const STORY_RENDERED: &str = "storyRendered";
/// Payload: `{ storyId, error }`.
pub const STORY_ERRORED: &str = "storyErrored";
/// Payload: `{ storyId, updatedArgs }`.
pub const UPDATE_STORY_ARGS: &str = "updateStoryArgs";
/// Payload: `{ storyId, args }` after the registry applied an update.
pub const STORY_ARGS_UPDATED: &str = "storyArgsUpdated";
/// Payload: `{ globals }`.
pub const UPDATE_GLOBALS: &str = "updateGlobals";
/// Payload: `{ globals }` after they were applied.
pub const GLOBALS_UPDATED: &str = "globalsUpdated";

/// a11y addon: outline the given selectors.
pub const A11Y_HIGHLIGHT: &str = "storybook/a11y/highlight";
/// Id of the style element the a11y highlight injects.
pub const HIGHLIGHT_STYLE_ID: &str = "storybookHighlight";
