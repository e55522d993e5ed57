//! Story registry.
//!
//! This module provides:
//! - `StoryRecord` / `StoryInput` - registered stories and their registration form
//! - `StoryRegistry` - id lookup, kind grouping and sorted traversal
//! - `RegistryBuilder` - id generation and parameter layering at registration
//! - `SharedRegistry` - whole-registry swaps for hot reload
//! - `StoryIndex` - `stories.json` loading
//! - `snapshot_suites` - per-kind suites for snapshot testing
//!
//! Registering two stories with the same id is a fatal configuration error.

mod index_file;
mod parameters;
mod record;
mod store;
mod suites;


pub use index_file::StoryIndex;
pub use parameters::merge_parameters;
pub use record::{is_disabled, sanitize, to_id, Params, StoryId, StoryInput, StoryRecord};
pub use store::{KindGroup, RegistryBuilder, SharedRegistry, StoryRegistry};
pub use suites::{snapshot_suites, SnapshotSuite, SuiteOptions, STORYSHOTS_PARAMETER};
