//! The preview side of the channel.
//!
//! Owns the renderer and the preview's story registry. The manager drives it
//! with `setCurrentStory`; every outcome goes back over the channel.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::render::{render_isolated, RenderContext, RenderOutcome, Renderer};
use crate::channel::{events, payload, Channel, ListenerId};
use crate::error::ResultExt;
use crate::registry::{Params, SharedRegistry, StoryId, StoryIndex};
use crate::selection::Selection;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateArgs {
    story_id: StoryId,
    updated_args: Params,
}

#[derive(Debug, Deserialize)]
struct UpdateGlobals {
    globals: Params,
}

struct PreviewState {
    renderer: Box<dyn Renderer>,
    current: Option<Selection>,
    globals: Params,
    last_outcome: Option<RenderOutcome>,
}

/// Preview host bound to a channel.
#[derive(Clone)]
pub struct Preview {
    channel: Channel,
    registry: SharedRegistry,
    state: Arc<Mutex<PreviewState>>,
}

impl Preview {
    pub fn new(channel: Channel, registry: SharedRegistry, renderer: Box<dyn Renderer>) -> Self {
        Self {
            channel,
            registry,
            state: Arc::new(Mutex::new(PreviewState {
                renderer,
                current: None,
                globals: Params::new(),
                last_outcome: None,
            })),
        }
    }

    /// Subscribe to the manager's requests. Returns the listener ids.
    pub fn install(&self) -> Vec<ListenerId> {
        let on_set = {
            let preview = self.clone();
            self.channel.on(events::SET_CURRENT_STORY, move |args| {
                let selection: Selection = payload(args, 0)?;
                preview.set_current_story(selection);
                Ok(())
            })
        };
        let on_args = {
            let preview = self.clone();
            self.channel.on(events::UPDATE_STORY_ARGS, move |args| {
                let update: UpdateArgs = payload(args, 0)?;
                preview.update_args(&update.story_id, &update.updated_args);
                Ok(())
            })
        };
        let on_globals = {
            let preview = self.clone();
            self.channel.on(events::UPDATE_GLOBALS, move |args| {
                let update: UpdateGlobals = payload(args, 0)?;
                preview.update_globals(&update.globals);
                Ok(())
            })
        };
        vec![on_set, on_args, on_globals]
    }

    /// Send the story list to the manager.
    pub fn announce_stories(&self) {
        let index = StoryIndex::to_value(&self.registry.read());
        info!(
            stories = self.registry.read().len(),
            "Announcing stories to manager"
        );
        self.channel.emit(events::SET_STORIES, vec![index]);
    }

    pub fn current(&self) -> Option<Selection> {
        self.state.lock().current.clone()
    }

    pub fn last_outcome(&self) -> Option<RenderOutcome> {
        self.state.lock().last_outcome.clone()
    }

    pub fn globals(&self) -> Params {
        self.state.lock().globals.clone()
    }

    /// Show `selection`. Re-showing the current story is a forced render.
    pub fn set_current_story(&self, selection: Selection) {
        let story_id = selection.story_id.clone();
        if !self.registry.read().contains(&story_id) {
            warn!(story_id = %story_id, "Preview asked for unknown story");
            self.channel.emit(events::STORY_MISSING, vec![json!(story_id)]);
            return;
        }

        if !selection.args.is_empty() {
            self.registry.update_args(&story_id, &selection.args);
        }

        let changed = {
            let mut state = self.state.lock();
            for (key, value) in &selection.globals {
                state.globals.insert(key.clone(), value.clone());
            }
            let changed = state.current.as_ref().map(|s| &s.story_id) != Some(&story_id);
            state.current = Some(selection.clone());
            changed
        };

        // Decorations of the previous story are torn down before the next render
        if changed {
            self.channel.emit(events::STORY_CHANGED, vec![json!(story_id)]);
        }
        if let Some(value) = serde_json::to_value(&selection).log_err() {
            self.channel.emit(events::CURRENT_STORY_WAS_SET, vec![value]);
        }
        self.render(&story_id, !changed);
    }

    fn update_args(&self, story_id: &str, updated: &Params) {
        if !self.registry.update_args(story_id, updated) {
            warn!(story_id = %story_id, "Args update for unknown story");
            return;
        }
        if let Some(args) = self.registry.args_of(story_id) {
            self.channel.emit(
                events::STORY_ARGS_UPDATED,
                vec![json!({ "storyId": story_id, "args": args })],
            );
        }
        let is_current = self
            .state
            .lock()
            .current
            .as_ref()
            .is_some_and(|s| s.story_id == story_id);
        if is_current {
            self.render(story_id, true);
        }
    }

    fn update_globals(&self, updated: &Params) {
        let (globals, current) = {
            let mut state = self.state.lock();
            for (key, value) in updated {
                state.globals.insert(key.clone(), value.clone());
            }
            (
                state.globals.clone(),
                state.current.as_ref().map(|s| s.story_id.clone()),
            )
        };
        self.channel
            .emit(events::GLOBALS_UPDATED, vec![json!({ "globals": globals })]);
        if let Some(story_id) = current {
            self.render(&story_id, true);
        }
    }

    fn render(&self, story_id: &str, force_render: bool) {
        let outcome = {
            let registry = self.registry.read();
            let Some(story) = registry.get_by_id(story_id) else {
                return;
            };
            let mut state = self.state.lock();
            let state = &mut *state;
            if !force_render {
                state.renderer.teardown();
            }
            let view_mode = state
                .current
                .as_ref()
                .map(|s| s.view_mode)
                .unwrap_or_default();
            let context = RenderContext {
                story,
                args: &story.args,
                globals: &state.globals,
                view_mode,
                force_render,
            };
            let outcome = render_isolated(state.renderer.as_mut(), &context);
            state.last_outcome = Some(outcome.clone());
            outcome
        };

        match outcome {
            RenderOutcome::Rendered => {
                debug!(story_id = %story_id, "Render complete");
                self.channel.emit(events::STORY_RENDERED, vec![json!(story_id)]);
            }
            RenderOutcome::Errored(cause) => {
                self.channel.emit(
                    events::STORY_ERRORED,
                    vec![json!({ "storyId": story_id, "error": cause })],
                );
            }
        }
    }
}

impl std::fmt::Debug for Preview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preview")
            .field("current", &self.current().map(|s| s.story_id))
            .finish()
    }
}

/// Build the plain-data payload for an args update request.
pub fn update_args_payload(story_id: &str, updated_args: &Params) -> Value {
    json!({ "storyId": story_id, "updatedArgs": updated_args })
}
