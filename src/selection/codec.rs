//! Selection <-> URL codec.
//!
//! The URL is the canonical record of the current selection. Writing it never
//! adds a history entry, never touches the fragment, and leaves query
//! parameters it doesn't manage exactly as they were.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::args_param::{parse_args_param, stringify_args};
use super::location::{History, Location};
use super::query::QueryParams;
use super::types::{Selection, SelectionSpecifier, StorySpecifier, ViewMode};
use crate::error::{Result, StorybookError};
use crate::logging::log_selection_event;
use crate::registry::Params;

static STORY_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/story/(.+)").expect("valid regex"));

pub const PARAM_ID: &str = "id";
pub const PARAM_PATH: &str = "path";
pub const PARAM_VIEW_MODE: &str = "viewMode";
pub const PARAM_SINGLE_STORY: &str = "singleStory";
pub const PARAM_ARGS: &str = "args";
pub const PARAM_GLOBALS: &str = "globals";
pub const PARAM_SELECTED_KIND: &str = "selectedKind";
pub const PARAM_SELECTED_STORY: &str = "selectedStory";

const LEGACY_URL_NOTICE: &str = "URL formats with `selectedKind` and `selectedStory` query \
parameters are deprecated. Use `id=$storyId` instead.";

/// Extract the story id from a legacy `/story/<id>` path.
pub fn path_to_id(path: Option<&str>) -> Result<String> {
    let path = path.unwrap_or_default();
    STORY_PATH
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| StorybookError::InvalidPath {
            path: path.to_string(),
        })
}

/// The raw `id` query parameter, if present.
pub fn parse_query_parameters(search: &str) -> Option<String> {
    QueryParams::parse(search).first(PARAM_ID).map(str::to_string)
}

/// Encodes and decodes selections.
///
/// Deprecation and unsafe-args notices fire at most once per codec, which the
/// host creates once per session.
#[derive(Debug, Default)]
pub struct SelectionCodec {
    legacy_notice_sent: AtomicBool,
    unsafe_args_notice_sent: AtomicBool,
}

impl SelectionCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the legacy-URL deprecation notice has been emitted.
    pub fn legacy_notice_sent(&self) -> bool {
        self.legacy_notice_sent.load(Ordering::Relaxed)
    }

    /// Whether the unsafe-args notice has been emitted.
    pub fn unsafe_args_notice_sent(&self) -> bool {
        self.unsafe_args_notice_sent.load(Ordering::Relaxed)
    }

    fn notice_legacy_url(&self) {
        if !self.legacy_notice_sent.swap(true, Ordering::Relaxed) {
            warn!(category = "SELECTION", "{}", LEGACY_URL_NOTICE);
        }
    }

    fn parse_args(&self, value: Option<&str>) -> Option<Params> {
        let parsed = parse_args_param(value?);
        if parsed.omitted_unsafe && !self.unsafe_args_notice_sent.swap(true, Ordering::Relaxed) {
            warn!(category = "SELECTION", "Omitted potentially unsafe URL args");
        }
        Some(parsed.args)
    }

    /// Decode a search string into a selection specifier.
    ///
    /// `Ok(None)` means the URL names no story. Only a malformed `path`
    /// parameter is an error; every other parameter falls back to defaults.
    pub fn decode(&self, search: &str) -> Result<Option<SelectionSpecifier>> {
        let query = QueryParams::parse(search);

        let view_mode = ViewMode::parse_lenient(query.first(PARAM_VIEW_MODE));
        let single_story = query.first(PARAM_SINGLE_STORY) == Some("true");
        let args = self.parse_args(query.first(PARAM_ARGS));
        let globals = self.parse_args(query.first(PARAM_GLOBALS));

        let story_id = match query.first(PARAM_PATH).filter(|p| !p.is_empty()) {
            Some(path) => Some(path_to_id(Some(path))?),
            None => query
                .first(PARAM_ID)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        };

        let story_specifier = match story_id {
            Some(id) => StorySpecifier::Id(id),
            None => {
                let kind = query.first(PARAM_SELECTED_KIND).filter(|k| !k.is_empty());
                let name = query.first(PARAM_SELECTED_STORY).filter(|n| !n.is_empty());
                match (kind, name) {
                    (Some(kind), Some(name)) => {
                        self.notice_legacy_url();
                        StorySpecifier::KindName {
                            kind: kind.to_string(),
                            name: name.to_string(),
                        }
                    }
                    _ => {
                        debug!(search = %search, "URL names no story");
                        return Ok(None);
                    }
                }
            }
        };

        Ok(Some(SelectionSpecifier {
            story_specifier,
            view_mode,
            single_story,
            args,
            globals,
        }))
    }

    /// Decode the selection specifier from the history's current location.
    pub fn get_selection_specifier_from_path(
        &self,
        history: &dyn History,
    ) -> Result<Option<SelectionSpecifier>> {
        self.decode(&history.location().search)
    }

    /// The location that records `selection`, derived from `current`.
    pub fn encode(&self, selection: &Selection, current: &Location) -> Location {
        let mut query = QueryParams::parse(&current.search);
        query.remove(PARAM_PATH);
        query.remove(PARAM_SELECTED_KIND);
        query.remove(PARAM_SELECTED_STORY);

        query.set(PARAM_ID, &selection.story_id);
        query.set(PARAM_VIEW_MODE, selection.view_mode.as_str());

        let args = stringify_args(&selection.args);
        if args.is_empty() {
            query.remove(PARAM_ARGS);
        } else {
            query.set(PARAM_ARGS, &args);
        }
        let globals = stringify_args(&selection.globals);
        if globals.is_empty() {
            query.remove(PARAM_GLOBALS);
        } else {
            query.set(PARAM_GLOBALS, &globals);
        }

        if selection.single_story {
            query.set(PARAM_SINGLE_STORY, "true");
        } else {
            query.remove(PARAM_SINGLE_STORY);
        }

        Location {
            pathname: current.pathname.clone(),
            search: query.to_search(),
            hash: current.hash.clone(),
        }
    }

    /// Record `selection` in the URL with a history replace. `None` is a no-op.
    pub fn set_path(&self, selection: Option<&Selection>, history: &mut dyn History) {
        let Some(selection) = selection else {
            return;
        };
        let next = self.encode(selection, &history.location());
        log_selection_event("url_updated", Some(&selection.story_id), Some(&next.href()));
        history.replace_state(next);
    }
}
