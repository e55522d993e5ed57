//! Snapshot test suites derived from the registry.
//!
//! One suite per kind, one entry per story, skipping stories whose
//! `storyshots` parameter is disabled.

use regex::Regex;
use tracing::info;

use super::record::StoryRecord;
use super::store::StoryRegistry;
use crate::error::{Result, StorybookError};

/// Parameter key consulted for snapshot exclusion.
pub const STORYSHOTS_PARAMETER: &str = "storyshots";

#[derive(Debug, Default, Clone)]
pub struct SuiteOptions {
    pub story_name_regex: Option<Regex>,
    pub story_kind_regex: Option<Regex>,
}

#[derive(Debug)]
pub struct SnapshotSuite<'a> {
    pub kind: &'a str,
    pub stories: Vec<&'a StoryRecord>,
}

/// Group the snapshot-eligible stories of `registry` by kind.
///
/// Finding nothing to snapshot is a configuration error.
pub fn snapshot_suites<'a>(
    registry: &'a StoryRegistry,
    options: &SuiteOptions,
) -> Result<Vec<SnapshotSuite<'a>>> {
    let eligible = registry.all().filter(|record| {
        let name_ok = options
            .story_name_regex
            .as_ref()
            .map_or(true, |re| re.is_match(&record.name));
        let kind_ok = options
            .story_kind_regex
            .as_ref()
            .map_or(true, |re| re.is_match(&record.kind));
        name_ok && kind_ok && !record.is_disabled_for(STORYSHOTS_PARAMETER)
    });

    let mut suites: Vec<SnapshotSuite<'a>> = Vec::new();
    for record in eligible {
        match suites.iter_mut().find(|s| s.kind == record.kind) {
            Some(suite) => suite.stories.push(record),
            None => suites.push(SnapshotSuite {
                kind: &record.kind,
                stories: vec![record],
            }),
        }
    }

    if suites.is_empty() {
        return Err(StorybookError::NoStories {
            consumer: "storyshots".to_string(),
        });
    }
    info!(suites = suites.len(), "Built snapshot suites");
    Ok(suites)
}
