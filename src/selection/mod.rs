//! Selection codec.
//!
//! This module provides:
//! - `Selection` / `SelectionSpecifier` - resolved and requested selections
//! - `SelectionCodec` - URL query encode/decode, including legacy formats
//! - `parse_args_param` / `stringify_args` - the compact args URL syntax
//! - `History` / `MemoryHistory` - the location capability the codec writes to

mod args_param;
mod codec;
mod location;
mod query;
mod types;

#[cfg(test)]
#[path = "selection_tests.rs"]
mod selection_tests;

pub use args_param::{parse_args_param, stringify_args, ParsedArgs};
pub use codec::{
    parse_query_parameters, path_to_id, SelectionCodec, PARAM_ARGS, PARAM_GLOBALS, PARAM_ID,
    PARAM_PATH, PARAM_SELECTED_KIND, PARAM_SELECTED_STORY, PARAM_SINGLE_STORY, PARAM_VIEW_MODE,
};
pub use location::{History, Location, MemoryHistory};
pub use query::QueryParams;
pub use types::{Selection, SelectionSpecifier, StorySpecifier, ViewMode, WILDCARD_ID};
