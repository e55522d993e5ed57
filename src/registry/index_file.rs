//! Loading a `stories.json` story index.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::record::{Params, StoryInput};
use super::store::{RegistryBuilder, StoryRegistry};
use crate::error::{Result, StorybookError};

/// One entry of the `stories` map. `title` is the current spelling of `kind`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexEntry {
    id: Option<String>,
    #[serde(alias = "kind")]
    title: String,
    name: String,
    #[serde(default)]
    parameters: Params,
    #[serde(default)]
    args: Params,
    #[serde(default)]
    arg_types: Params,
}

#[derive(Debug, Deserialize)]
struct RawIndex {
    #[serde(default = "default_version")]
    v: u32,
    // Map keeps file order (serde_json preserve_order)
    stories: Map<String, Value>,
}

fn default_version() -> u32 {
    3
}

/// A parsed story index, in file order.
#[derive(Debug)]
pub struct StoryIndex {
    pub version: u32,
    pub stories: Vec<StoryInput>,
}

impl StoryIndex {
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawIndex = serde_json::from_str(json)
            .map_err(|e| StorybookError::Config(format!("invalid story index: {}", e)))?;
        Ok(Self::from_raw(raw))
    }

    /// Parse an index received as a channel payload.
    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawIndex = serde_json::from_value(value)
            .map_err(|e| StorybookError::Config(format!("invalid story index: {}", e)))?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawIndex) -> Self {
        let mut stories = Vec::with_capacity(raw.stories.len());
        for (key, value) in raw.stories {
            match serde_json::from_value::<IndexEntry>(value) {
                Ok(entry) => stories.push(StoryInput {
                    kind: entry.title,
                    name: entry.name,
                    id: Some(entry.id.unwrap_or(key)),
                    parameters: entry.parameters,
                    args: entry.args,
                    arg_types: entry.arg_types,
                }),
                Err(e) => {
                    warn!(story_key = %key, error = %e, "Skipping malformed story index entry");
                }
            }
        }
        Self {
            version: raw.v,
            stories,
        }
    }

    /// Index form of a registry, as sent with `setStories`.
    pub fn to_value(registry: &StoryRegistry) -> Value {
        let mut stories = Map::new();
        for record in registry.all() {
            stories.insert(
                record.id.clone(),
                json!({
                    "id": record.id,
                    "title": record.kind,
                    "name": record.name,
                    "parameters": record.parameters,
                    "args": record.initial_args,
                    "argTypes": record.arg_types,
                }),
            );
        }
        json!({ "v": 3, "stories": stories })
    }

    /// Register every story of the index through `builder`.
    pub fn into_registry(self, mut builder: RegistryBuilder) -> Result<StoryRegistry> {
        builder.add_all(self.stories)?;
        Ok(builder.build())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| StorybookError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let index = Self::parse(&content)?;
        info!(
            path = %path.display(),
            version = index.version,
            stories = index.stories.len(),
            "Loaded story index"
        );
        Ok(index)
    }
}
