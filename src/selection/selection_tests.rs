use super::*;
use crate::error::StorybookError;
use serde_json::json;

#[test]
fn test_path_to_id_extracts_id() {
    assert_eq!(path_to_id(Some("/story/story--id")).unwrap(), "story--id");
}

#[test]
fn test_path_to_id_rejects_bad_paths() {
    for bad in [None, Some(""), Some("/whatever/story/story--id")] {
        match path_to_id(bad) {
            Err(StorybookError::InvalidPath { path }) => assert_eq!(path, bad.unwrap_or_default()),
            other => panic!("expected InvalidPath for {:?}, got {:?}", bad, other),
        }
    }
    let message = path_to_id(Some("/other/x")).unwrap_err().to_string();
    assert!(message.contains("/other/x"));
}

#[test]
fn test_set_path_rewrites_query_and_keeps_hash() {
    let codec = SelectionCodec::new();
    let mut history =
        MemoryHistory::new("pathname?foo=bar&selectedStory=selStory&selectedKind=selKind#foobar");
    codec.set_path(Some(&Selection::new("story--id", ViewMode::Story)), &mut history);
    assert_eq!(history.href(), "pathname?foo=bar&id=story--id&viewMode=story#foobar");
    assert_eq!(history.replacements(), 1);
}

#[test]
fn test_set_path_drops_path_param_and_replaces_in_place() {
    let codec = SelectionCodec::new();
    let mut history = MemoryHistory::new("iframe.html?path=/story/old--one&id=old--one&x=1");
    codec.set_path(Some(&Selection::new("new--two", ViewMode::Docs)), &mut history);
    assert_eq!(history.href(), "iframe.html?id=new--two&x=1&viewMode=docs");
}

#[test]
fn test_set_path_without_selection_is_noop() {
    let codec = SelectionCodec::new();
    let mut history = MemoryHistory::new("pathname?foo=bar");
    codec.set_path(None, &mut history);
    assert_eq!(history.href(), "pathname?foo=bar");
    assert_eq!(history.replacements(), 0);
}

#[test]
fn test_parse_query_parameters_returns_id() {
    assert_eq!(
        parse_query_parameters("?foo=bar&id=story--id").as_deref(),
        Some("story--id")
    );
    assert_eq!(parse_query_parameters("?foo=bar"), None);
}

#[test]
fn test_decode_legacy_kind_and_story() {
    let codec = SelectionCodec::new();
    let spec = codec
        .decode("?selectedKind=kind&selectedStory=story")
        .unwrap()
        .unwrap();
    assert_eq!(
        spec,
        SelectionSpecifier {
            story_specifier: StorySpecifier::KindName {
                kind: "kind".to_string(),
                name: "story".to_string()
            },
            view_mode: ViewMode::Story,
            single_story: false,
            args: None,
            globals: None,
        }
    );
    assert!(codec.legacy_notice_sent());
}

#[test]
fn test_legacy_notice_fires_once() {
    let codec = SelectionCodec::new();
    assert!(!codec.legacy_notice_sent());
    let first = codec.decode("?selectedKind=kind&selectedStory=story").unwrap();
    let second = codec.decode("?selectedKind=kind&selectedStory=story").unwrap();
    assert_eq!(first, second);
    assert!(codec.legacy_notice_sent());
}

#[test]
fn test_decode_current_format_with_args() {
    let codec = SelectionCodec::new();
    let spec = codec
        .decode("?id=story--id&args=obj.key:val")
        .unwrap()
        .unwrap();
    assert_eq!(spec.story_specifier, StorySpecifier::id("story--id"));
    assert_eq!(
        serde_json::Value::Object(spec.args.unwrap()),
        json!({"obj": {"key": "val"}})
    );
    assert_eq!(spec.globals, None);
}

#[test]
fn test_decode_globals_and_single_story() {
    let codec = SelectionCodec::new();
    let spec = codec
        .decode("?id=story--id&globals=theme:dark&singleStory=true&viewMode=docs")
        .unwrap()
        .unwrap();
    assert!(spec.single_story);
    assert_eq!(spec.view_mode, ViewMode::Docs);
    assert_eq!(
        serde_json::Value::Object(spec.globals.unwrap()),
        json!({"theme": "dark"})
    );
}

#[test]
fn test_decode_is_lenient_for_everything_but_path() {
    let codec = SelectionCodec::new();
    let spec = codec
        .decode("?id=a--b&viewMode=bogus&singleStory=yes")
        .unwrap()
        .unwrap();
    assert_eq!(spec.view_mode, ViewMode::Story);
    assert!(!spec.single_story);

    assert!(codec.decode("?path=/nope/a--b").is_err());
}

#[test]
fn test_decode_path_takes_priority_over_id() {
    let codec = SelectionCodec::new();
    let spec = codec
        .decode("?path=/story/from--path&id=from--id")
        .unwrap()
        .unwrap();
    assert_eq!(spec.story_specifier, StorySpecifier::id("from--path"));
}

#[test]
fn test_decode_wildcard_and_nothing() {
    let codec = SelectionCodec::new();
    let spec = codec.decode("?id=*").unwrap().unwrap();
    assert!(spec.story_specifier.is_wildcard());
    assert_eq!(Selection::from_specifier(&spec), None);

    assert_eq!(codec.decode("").unwrap(), None);
    assert_eq!(codec.decode("?foo=bar&selectedKind=only").unwrap(), None);
}

#[test]
fn test_unsafe_args_are_dropped_with_single_notice() {
    let codec = SelectionCodec::new();
    let spec = codec
        .decode("?id=a--b&args=ok:yes;bad:%3Cscript%3E")
        .unwrap()
        .unwrap();
    assert_eq!(serde_json::Value::Object(spec.args.unwrap()), json!({"ok": "yes"}));
    assert!(codec.unsafe_args_notice_sent());
}

#[test]
fn test_encode_then_decode_restores_selection() {
    let codec = SelectionCodec::new();
    let mut selection = Selection::new("widgets-button--primary", ViewMode::Docs);
    selection.single_story = true;
    selection.args.insert("label".to_string(), json!("Go"));
    selection.args.insert("size".to_string(), json!(2));
    selection.globals.insert("theme".to_string(), json!("dark"));

    let location = codec.encode(&selection, &Location::parse("iframe.html?keep=me#top"));
    assert_eq!(location.hash, "#top");
    assert!(location.search.starts_with("?keep=me&id=widgets-button--primary"));

    let spec = codec.decode(&location.search).unwrap().unwrap();
    assert_eq!(Selection::from_specifier(&spec), Some(selection));
}

#[test]
fn test_offset_dates_and_exponents_survive_the_url() {
    let codec = SelectionCodec::new();
    let mut selection = Selection::new("a--b", ViewMode::Story);
    selection
        .args
        .insert("when".to_string(), json!("2020-02-01T00:00:00+01:00"));
    selection.args.insert("eps".to_string(), json!(1e-7));

    let location = codec.encode(&selection, &Location::parse("/"));
    assert!(location.search.contains("%2B01:00"));
    let spec = codec.decode(&location.search).unwrap().unwrap();
    assert!(!codec.unsafe_args_notice_sent());
    assert_eq!(Selection::from_specifier(&spec), Some(selection));
}

// The selection carries the single-story flag; navigation keeps it set
#[test]
fn test_encode_follows_selection_over_stale_params() {
    let codec = SelectionCodec::new();
    let location = codec.encode(
        &Selection::new("a--b", ViewMode::Story),
        &Location::parse("/?id=a--b&args=label:old&singleStory=true"),
    );
    assert_eq!(location.search, "?id=a--b&viewMode=story");
}

#[test]
fn test_selection_from_history() {
    let codec = SelectionCodec::new();
    let history = MemoryHistory::new("iframe.html?id=intro--welcome&viewMode=story");
    let spec = codec.get_selection_specifier_from_path(&history).unwrap().unwrap();
    assert_eq!(
        Selection::from_specifier(&spec),
        Some(Selection::new("intro--welcome", ViewMode::Story))
    );
}

#[test]
fn test_specifier_serializes_in_wire_shape() {
    let spec = SelectionSpecifier::new(StorySpecifier::KindName {
        kind: "k".to_string(),
        name: "n".to_string(),
    });
    assert_eq!(
        serde_json::to_value(&spec).unwrap(),
        json!({"storySpecifier": {"kind": "k", "name": "n"}, "viewMode": "story", "singleStory": false})
    );
}
