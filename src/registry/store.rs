//! The story registry.
//!
//! Uses Vec for deterministic (registration) order and HashMap for O(1) lookup.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::parameters::merge_parameters;
use super::record::{to_id, Params, StoryId, StoryInput, StoryRecord};
use crate::error::{Result, StorybookError};
use crate::story_sort::{compare, SortConfig};

/// All stories of one kind, in encounter order.
#[derive(Debug)]
pub struct KindGroup<'a> {
    pub kind: &'a str,
    pub stories: Vec<&'a StoryRecord>,
}

/// In-memory index of registered stories.
#[derive(Debug, Default)]
pub struct StoryRegistry {
    stories: Vec<StoryRecord>,
    id_to_index: HashMap<StoryId, usize>,
}

impl StoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from complete records.
    ///
    /// Fails on the first duplicate id; no partially built registry escapes.
    pub fn from_records(records: impl IntoIterator<Item = StoryRecord>) -> Result<Self> {
        let mut registry = Self::new();
        for record in records {
            registry.register(record)?;
        }
        Ok(registry)
    }

    /// Add a record. A duplicate id is a fatal configuration error.
    pub fn register(&mut self, record: StoryRecord) -> Result<()> {
        if let Some(&existing) = self.id_to_index.get(&record.id) {
            let first = &self.stories[existing];
            warn!(
                story_id = %record.id,
                first_kind = %first.kind,
                second_kind = %record.kind,
                "Duplicate story id"
            );
            return Err(StorybookError::DuplicateStoryId {
                id: record.id,
                kind: record.kind,
                name: record.name,
            });
        }
        debug!(story_id = %record.id, kind = %record.kind, "Registered story");
        self.id_to_index.insert(record.id.clone(), self.stories.len());
        self.stories.push(record);
        Ok(())
    }

    pub fn get_by_id(&self, id: &str) -> Option<&StoryRecord> {
        let &index = self.id_to_index.get(id)?;
        let record = self.stories.get(index);
        if record.is_none() {
            crate::debug_panic!("story index for '{}' points past the registry", id);
        }
        record
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// All records in registration order.
    pub fn all(&self) -> impl Iterator<Item = &StoryRecord> {
        self.stories.iter()
    }

    /// Records that `keep` accepts, in registration order.
    pub fn filter<'a, F>(&'a self, keep: F) -> impl Iterator<Item = &'a StoryRecord>
    where
        F: Fn(&StoryRecord) -> bool + 'a,
    {
        self.stories.iter().filter(move |r| keep(r))
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Group records by kind, preserving encounter order of kinds and of
    /// stories within a kind.
    pub fn grouped_by_kind(&self) -> Vec<KindGroup<'_>> {
        group_by_kind(self.stories.iter())
    }

    /// Records in story order (stable: ties keep registration order).
    pub fn sorted(&self, config: &SortConfig) -> Vec<&StoryRecord> {
        let mut records: Vec<&StoryRecord> = self.stories.iter().collect();
        records.sort_by(|a, b| compare(*a, *b, config));
        records
    }

    /// Resolve a legacy `{kind, name}` specifier.
    pub fn find_by_kind_and_name(&self, kind: &str, name: &str) -> Option<&StoryRecord> {
        self.stories
            .iter()
            .find(|r| r.kind == kind && r.name == name)
    }

    /// The default selection: the first story in story order.
    pub fn first_story(&self, config: &SortConfig) -> Option<&StoryRecord> {
        self.sorted(config).into_iter().next()
    }

    /// The story `delta` positions away from `id` in story order.
    pub fn neighbor_story(&self, id: &str, delta: isize, config: &SortConfig) -> Option<&StoryRecord> {
        let sorted = self.sorted(config);
        let current = sorted.iter().position(|r| r.id == id)?;
        let target = current.checked_add_signed(delta)?;
        sorted.get(target).copied()
    }

    /// The first story of the kind `delta` kinds away from the kind of `id`.
    pub fn neighbor_component(
        &self,
        id: &str,
        delta: isize,
        config: &SortConfig,
    ) -> Option<&StoryRecord> {
        let current_kind = self.get_by_id(id)?.kind.as_str();
        let groups = group_by_kind(self.sorted(config).into_iter());
        let current = groups.iter().position(|g| g.kind == current_kind)?;
        let target = current.checked_add_signed(delta)?;
        groups.get(target).and_then(|g| g.stories.first().copied())
    }

    /// Apply arg overrides from the controls panel or the URL.
    ///
    /// When the story declares arg types, undeclared keys are ignored.
    pub fn update_args(&mut self, id: &str, patch: &Params) -> bool {
        let Some(&index) = self.id_to_index.get(id) else {
            return false;
        };
        let record = &mut self.stories[index];
        for (key, value) in patch {
            if !record.arg_types.is_empty() && !record.arg_types.contains_key(key) {
                warn!(story_id = %id, arg = %key, "Ignoring undeclared arg");
                continue;
            }
            if value.is_null() {
                record.args.remove(key);
            } else {
                record.args.insert(key.clone(), value.clone());
            }
        }
        true
    }

    /// Restore a story's args to their registered values.
    pub fn reset_args(&mut self, id: &str) -> bool {
        let Some(&index) = self.id_to_index.get(id) else {
            return false;
        };
        let record = &mut self.stories[index];
        record.args = record.initial_args.clone();
        true
    }
}

fn group_by_kind<'a>(records: impl Iterator<Item = &'a StoryRecord>) -> Vec<KindGroup<'a>> {
    let mut groups: Vec<KindGroup<'a>> = Vec::new();
    let mut kind_to_group: HashMap<&'a str, usize> = HashMap::new();
    for record in records {
        match kind_to_group.get(record.kind.as_str()) {
            Some(&i) => groups[i].stories.push(record),
            None => {
                kind_to_group.insert(record.kind.as_str(), groups.len());
                groups.push(KindGroup {
                    kind: record.kind.as_str(),
                    stories: vec![record],
                });
            }
        }
    }
    groups
}

/// Builds a registry from story inputs, applying id generation and
/// global/component/story parameter layering.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    global_parameters: Params,
    component_parameters: HashMap<String, Params>,
    deep_merge_keys: Vec<String>,
    registry: StoryRegistry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global_parameters(mut self, parameters: Params) -> Self {
        self.global_parameters = parameters;
        self
    }

    pub fn deep_merge_keys(mut self, keys: Vec<String>) -> Self {
        self.deep_merge_keys = keys;
        self
    }

    /// Parameters shared by every story of `kind`.
    pub fn component(&mut self, kind: impl Into<String>, parameters: Params) -> &mut Self {
        self.component_parameters.insert(kind.into(), parameters);
        self
    }

    pub fn add(&mut self, input: StoryInput) -> Result<&mut Self> {
        let id = match input.id {
            Some(id) => id,
            None => to_id(&input.kind, &input.name)?,
        };
        let empty = Params::new();
        let component = self.component_parameters.get(&input.kind).unwrap_or(&empty);
        let parameters = merge_parameters(
            &[&self.global_parameters, component, &input.parameters],
            &self.deep_merge_keys,
        );

        let mut initial_args = Params::new();
        // Declared defaults from arg types come first, explicit args override them
        for (key, arg_type) in &input.arg_types {
            if let Some(default) = arg_type.get("defaultValue").filter(|v| !v.is_null()) {
                initial_args.insert(key.clone(), default.clone());
            }
        }
        initial_args.extend(input.args);

        self.registry.register(StoryRecord {
            id,
            kind: input.kind,
            name: input.name,
            parameters,
            args: initial_args.clone(),
            initial_args,
            arg_types: input.arg_types,
        })?;
        Ok(self)
    }

    pub fn add_all(&mut self, inputs: impl IntoIterator<Item = StoryInput>) -> Result<&mut Self> {
        for input in inputs {
            self.add(input)?;
        }
        Ok(self)
    }

    pub fn build(self) -> StoryRegistry {
        info!(stories = self.registry.len(), "Story registry built");
        self.registry
    }
}

/// A registry shared between the controller and channel handlers of one
/// execution context.
///
/// Hot reload builds a complete new registry and swaps it in under the write
/// lock, so readers only ever see a whole registry.
#[derive(Clone, Debug, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Versioned>>,
}

#[derive(Debug, Default)]
struct Versioned {
    registry: StoryRegistry,
    version: u64,
}

impl SharedRegistry {
    pub fn new(registry: StoryRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Versioned {
                registry,
                version: 1,
            })),
        }
    }

    pub fn read(&self) -> MappedRwLockReadGuard<'_, StoryRegistry> {
        RwLockReadGuard::map(self.inner.read(), |v| &v.registry)
    }

    /// Replace the whole registry, returning the new version.
    pub fn replace(&self, registry: StoryRegistry) -> u64 {
        let mut guard = self.inner.write();
        guard.registry = registry;
        guard.version += 1;
        info!(version = guard.version, stories = guard.registry.len(), "Story registry replaced");
        guard.version
    }

    /// Incremented on every replace; 0 means never populated.
    pub fn version(&self) -> u64 {
        self.inner.read().version
    }

    pub fn update_args(&self, id: &str, patch: &Params) -> bool {
        self.inner.write().registry.update_args(id, patch)
    }

    pub fn reset_args(&self, id: &str) -> bool {
        self.inner.write().registry.reset_args(id)
    }

    /// Clone of the current args of a story.
    pub fn args_of(&self, id: &str) -> Option<Params> {
        self.read().get_by_id(id).map(|r| r.args.clone())
    }

    pub fn parameter_of(&self, id: &str, key: &str) -> Option<Value> {
        self.read().get_by_id(id).and_then(|r| r.parameter(key).cloned())
    }
}
