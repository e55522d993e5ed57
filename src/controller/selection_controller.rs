//! Manager-side selection controller.
//!
//! Turns the URL (or any later navigation request) into a resolved selection,
//! waiting for the story registry when it isn't populated yet. Resolved
//! selections go to the preview as `setCurrentStory` and back into the URL.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::state::{describe_specifier, SelectionState};
use crate::channel::{events, payload, Channel, ListenerId};
use crate::config::StorybookConfig;
use crate::error::Result;
use crate::logging::log_selection_event;
use crate::registry::{RegistryBuilder, SharedRegistry, StoryIndex, StoryRecord, StoryRegistry};
use crate::selection::{
    History, Selection, SelectionCodec, SelectionSpecifier, StorySpecifier, ViewMode,
};
use crate::story_sort::SortConfig;

#[derive(Clone, Debug)]
pub struct ControllerOptions {
    pub sort: SortConfig,
    /// Story-list updates after which the registry counts as stable.
    pub max_story_list_updates: u32,
}

impl ControllerOptions {
    pub fn from_config(config: &StorybookConfig) -> Self {
        Self {
            sort: config.story_sort.clone(),
            max_story_list_updates: config.selection.max_story_list_updates,
        }
    }
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from_config(&StorybookConfig::default())
    }
}

/// Payload of `selectStory`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SelectStoryRequest {
    #[serde(rename_all = "camelCase")]
    Id {
        story_id: String,
        #[serde(default)]
        view_mode: Option<ViewMode>,
    },
    KindName {
        kind: String,
        story: String,
    },
}

/// Side effects decided under the lock and performed after it is released.
enum Effect {
    Show(Selection),
    Missing(SelectionSpecifier),
}

struct ControllerState {
    state: SelectionState,
    generation: u64,
    updates_seen: u32,
    stable: bool,
    history: Box<dyn History + Send>,
    options: ControllerOptions,
}

/// Selection state machine bound to a channel and a registry.
#[derive(Clone)]
pub struct SelectionController {
    channel: Channel,
    registry: SharedRegistry,
    codec: Arc<SelectionCodec>,
    inner: Arc<Mutex<ControllerState>>,
}

impl SelectionController {
    pub fn new(
        channel: Channel,
        registry: SharedRegistry,
        codec: Arc<SelectionCodec>,
        history: Box<dyn History + Send>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            channel,
            registry,
            codec,
            inner: Arc::new(Mutex::new(ControllerState {
                state: SelectionState::NoSelection,
                generation: 0,
                updates_seen: 0,
                stable: false,
                history,
                options,
            })),
        }
    }

    /// Subscribe to story-list and navigation events from the channel.
    pub fn install(&self) -> Vec<ListenerId> {
        let on_stories = {
            let controller = self.clone();
            self.channel.on(events::SET_STORIES, move |args| {
                let index = StoryIndex::from_value(payload::<Value>(args, 0)?)?;
                let registry = index.into_registry(RegistryBuilder::new())?;
                controller.registry.replace(registry);
                controller.on_registry_updated();
                Ok(())
            })
        };
        let on_select = {
            let controller = self.clone();
            self.channel.on(events::SELECT_STORY, move |args| {
                let specifier = match payload::<SelectStoryRequest>(args, 0)? {
                    SelectStoryRequest::Id { story_id, view_mode } => {
                        SelectionSpecifier::new(StorySpecifier::Id(story_id))
                            .with_view_mode(view_mode.unwrap_or_default())
                    }
                    SelectStoryRequest::KindName { kind, story } => {
                        SelectionSpecifier::new(StorySpecifier::KindName { kind, name: story })
                    }
                };
                controller.navigate(specifier);
                Ok(())
            })
        };
        let on_missing = {
            let controller = self.clone();
            self.channel.on(events::STORY_MISSING, move |args| {
                // Our own not-found emit loops back here too; it finds no
                // resolved selection for that id and is ignored
                if let Some(id) = payload::<Value>(args, 0)?.as_str() {
                    controller.on_story_missing(id);
                }
                Ok(())
            })
        };
        vec![on_stories, on_select, on_missing]
    }

    pub fn state(&self) -> SelectionState {
        self.inner.lock().state.clone()
    }

    pub fn current(&self) -> Option<Selection> {
        self.inner.lock().state.selection().cloned()
    }

    /// Generation of the newest navigation; older attempts are discarded.
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn is_registry_stable(&self) -> bool {
        self.inner.lock().stable
    }

    /// The current URL of the controller's history.
    pub fn location_href(&self) -> String {
        self.inner.lock().history.location().href()
    }

    /// Decode the URL and start resolving it.
    ///
    /// A malformed legacy `path` parameter is returned as an error.
    pub fn boot(&self) -> Result<SelectionState> {
        let specifier = {
            let state = self.inner.lock();
            self.codec
                .get_selection_specifier_from_path(state.history.as_ref())?
        };
        match specifier {
            Some(specifier) => self.navigate(specifier),
            None => {
                log_selection_event("no_selection", None, None);
                self.run(|state, registry| {
                    state.state = SelectionState::NoSelection;
                    select_default(state, registry)
                });
            }
        }
        Ok(self.state())
    }

    /// Start resolving `specifier`, superseding any pending resolution.
    ///
    /// Single-story mode sticks once the URL has turned it on.
    pub fn navigate(&self, mut specifier: SelectionSpecifier) {
        self.run(|state, registry| {
            specifier.single_story |= state.state.single_story();
            state.generation += 1;
            let generation = state.generation;
            log_selection_event("resolving", None, Some(&describe_specifier(&specifier)));
            state.state = SelectionState::Resolving {
                specifier,
                generation,
            };
            attempt(state, registry, generation)
        });
    }

    /// Retry a pending resolution attempt. Does nothing once a newer
    /// navigation has started.
    pub fn retry(&self, generation: u64) {
        self.run(|state, registry| attempt(state, registry, generation));
    }

    /// The registry was replaced; count the update and retry.
    pub fn on_registry_updated(&self) {
        self.run(|state, registry| {
            state.updates_seen += 1;
            if state.updates_seen >= state.options.max_story_list_updates && !state.stable {
                info!(updates = state.updates_seen, "Story list considered stable");
                state.stable = true;
            }
            resume(state, registry)
        });
    }

    /// Declare the story list complete, settling a pending resolution.
    pub fn settle(&self) {
        self.run(|state, registry| {
            state.stable = true;
            resume(state, registry)
        });
    }

    /// Select the story `delta` positions away in sidebar order.
    pub fn jump_to_story(&self, delta: isize) {
        self.jump(|registry, id, sort| registry.neighbor_story(id, delta, sort));
    }

    /// Select the first story of the component `delta` components away.
    pub fn jump_to_component(&self, delta: isize) {
        self.jump(|registry, id, sort| registry.neighbor_component(id, delta, sort));
    }

    fn jump<F>(&self, pick: F)
    where
        F: for<'a> Fn(&'a StoryRegistry, &str, &SortConfig) -> Option<&'a StoryRecord>,
    {
        let target = {
            let state = self.inner.lock();
            let Some(current) = state.state.selection() else {
                debug!("Jump without a resolved selection");
                return;
            };
            let registry = self.registry.read();
            pick(&*registry, &current.story_id, &state.options.sort)
                .map(|record| (record.id.clone(), current.view_mode))
        };
        if let Some((id, view_mode)) = target {
            self.navigate(SelectionSpecifier::new(StorySpecifier::Id(id)).with_view_mode(view_mode));
        }
    }

    fn on_story_missing(&self, id: &str) {
        self.run(|state, _registry| {
            let specifier = match &state.state {
                SelectionState::Resolved { selection } if selection.story_id == id => {
                    SelectionSpecifier::new(StorySpecifier::Id(id.to_string()))
                        .with_view_mode(selection.view_mode)
                }
                _ => return None,
            };
            warn!(story_id = %id, "Preview reported story missing");
            state.state = SelectionState::NotFound { specifier };
            None
        });
    }

    /// Run a transition under the lock, then perform its effect unlocked.
    fn run<F>(&self, transition: F)
    where
        F: FnOnce(&mut ControllerState, &SharedRegistry) -> Option<Effect>,
    {
        let effect = {
            let mut state = self.inner.lock();
            let effect = transition(&mut state, &self.registry);
            if let Some(Effect::Show(selection)) = &effect {
                self.codec
                    .set_path(Some(selection), state.history.as_mut());
            }
            effect
        };

        match effect {
            Some(Effect::Show(selection)) => {
                if let Err(e) = self.channel.emit_data(events::SET_CURRENT_STORY, &selection) {
                    warn!(error = %e, "Failed to send selection");
                }
            }
            Some(Effect::Missing(specifier)) => {
                let missing = match &specifier.story_specifier {
                    StorySpecifier::Id(id) => json!(id),
                    StorySpecifier::KindName { kind, name } => json!({"kind": kind, "name": name}),
                };
                self.channel.emit(events::STORY_MISSING, vec![missing]);
            }
            None => {}
        }
    }
}

impl std::fmt::Debug for SelectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionController")
            .field("state", &self.state().name())
            .finish()
    }
}

fn find(registry: &SharedRegistry, specifier: &SelectionSpecifier, sort: &SortConfig) -> Option<String> {
    let registry = registry.read();
    let record = match &specifier.story_specifier {
        spec if spec.is_wildcard() => registry.first_story(sort),
        StorySpecifier::Id(id) => registry.get_by_id(id),
        StorySpecifier::KindName { kind, name } => registry.find_by_kind_and_name(kind, name),
    };
    record.map(|r| r.id.clone())
}

/// One resolution attempt for `generation`.
fn attempt(state: &mut ControllerState, registry: &SharedRegistry, generation: u64) -> Option<Effect> {
    let specifier = match &state.state {
        SelectionState::Resolving {
            specifier,
            generation: current,
        } if *current == generation => specifier.clone(),
        _ => {
            debug!(generation, "Discarding stale resolution attempt");
            return None;
        }
    };

    if let Some(id) = find(registry, &specifier, &state.options.sort) {
        let selection = Selection::resolved(id, &specifier);
        log_selection_event("resolved", Some(&selection.story_id), None);
        state.state = SelectionState::Resolved {
            selection: selection.clone(),
        };
        return Some(Effect::Show(selection));
    }

    // An unpopulated registry is the cold-start race, not a miss
    if !state.stable {
        debug!(
            target_story = %describe_specifier(&specifier),
            updates = state.updates_seen,
            "Story not in registry yet, waiting for updates"
        );
        return None;
    }

    log_selection_event("not_found", None, Some(&describe_specifier(&specifier)));
    state.state = SelectionState::NotFound {
        specifier: specifier.clone(),
    };
    Some(Effect::Missing(specifier))
}

/// Continue whatever the current state is waiting for.
fn resume(state: &mut ControllerState, registry: &SharedRegistry) -> Option<Effect> {
    match state.state {
        SelectionState::Resolving { generation, .. } => attempt(state, registry, generation),
        SelectionState::NoSelection => select_default(state, registry),
        _ => None,
    }
}

/// With nothing selected, pick the first story once there is one.
fn select_default(state: &mut ControllerState, registry: &SharedRegistry) -> Option<Effect> {
    let first = registry.read().first_story(&state.options.sort)?.id.clone();
    state.generation += 1;
    let selection = Selection::new(first, ViewMode::Story);
    log_selection_event("default_selected", Some(&selection.story_id), None);
    state.state = SelectionState::Resolved {
        selection: selection.clone(),
    };
    Some(Effect::Show(selection))
}
