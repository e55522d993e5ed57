use super::*;
use crate::channel::{events, install_highlight, Channel, MemoryStyleHost};
use crate::registry::{RegistryBuilder, SharedRegistry, StoryInput};
use crate::selection::{Selection, ViewMode};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

/// Renderer whose log survives being boxed into the preview.
#[derive(Clone, Default)]
struct SharedRenderer {
    inner: Arc<Mutex<RecordingRenderer>>,
}

impl Renderer for SharedRenderer {
    fn render(&mut self, context: &RenderContext<'_>) -> anyhow::Result<()> {
        self.inner.lock().render(context)
    }

    fn teardown(&mut self) {
        self.inner.lock().teardown();
    }
}

struct Fixture {
    channel: Channel,
    preview: Preview,
    renderer: SharedRenderer,
    emitted: Arc<Mutex<Vec<(String, Value)>>>,
}

fn fixture() -> Fixture {
    let mut builder = RegistryBuilder::new();
    builder
        .add_all(vec![
            StoryInput::new("Button", "Primary").with_arg("label", json!("Click")),
            StoryInput::new("Button", "Broken"),
        ])
        .unwrap();
    let registry = SharedRegistry::new(builder.build());

    let channel = Channel::mock();
    let renderer = SharedRenderer::default();
    renderer.inner.lock().failing.push("button--broken".to_string());
    let preview = Preview::new(channel.clone(), registry, Box::new(renderer.clone()));
    preview.install();

    let emitted = Arc::new(Mutex::new(Vec::new()));
    for event in [
        events::STORY_CHANGED,
        events::STORY_RENDERED,
        events::STORY_ERRORED,
        events::STORY_MISSING,
        events::STORY_ARGS_UPDATED,
        events::GLOBALS_UPDATED,
        events::SET_STORIES,
    ] {
        let sink = emitted.clone();
        channel.on(event, move |args| {
            sink.lock().push((
                event.to_string(),
                args.first().cloned().unwrap_or(Value::Null),
            ));
            Ok(())
        });
    }

    Fixture {
        channel,
        preview,
        renderer,
        emitted,
    }
}

fn select(channel: &Channel, id: &str) {
    channel
        .emit_data(events::SET_CURRENT_STORY, &Selection::new(id, ViewMode::Story))
        .unwrap();
}

fn names(emitted: &Arc<Mutex<Vec<(String, Value)>>>) -> Vec<String> {
    emitted.lock().iter().map(|(e, _)| e.clone()).collect()
}

#[test]
fn test_set_current_story_renders_and_announces_change() {
    let f = fixture();
    select(&f.channel, "button--primary");
    assert_eq!(names(&f.emitted), vec![events::STORY_CHANGED, events::STORY_RENDERED]);
    assert_eq!(f.emitted.lock()[0].1, json!("button--primary"));
    assert_eq!(f.preview.last_outcome(), Some(RenderOutcome::Rendered));
    assert_eq!(f.renderer.inner.lock().teardowns, 1);
}

#[test]
fn test_same_story_is_forced_render_without_change() {
    let f = fixture();
    select(&f.channel, "button--primary");
    select(&f.channel, "button--primary");
    assert_eq!(
        names(&f.emitted),
        vec![events::STORY_CHANGED, events::STORY_RENDERED, events::STORY_RENDERED]
    );
    let renderer = f.renderer.inner.lock();
    assert_eq!(renderer.rendered[1], ("button--primary".to_string(), true));
    assert_eq!(renderer.teardowns, 1);
}

#[test]
fn test_render_failure_is_reported_not_raised() {
    let f = fixture();
    select(&f.channel, "button--broken");
    assert_eq!(names(&f.emitted), vec![events::STORY_CHANGED, events::STORY_ERRORED]);
    assert_eq!(
        f.emitted.lock()[1].1,
        json!({"storyId": "button--broken", "error": "button--broken failed to render"})
    );
    // The preview keeps working
    select(&f.channel, "button--primary");
    assert_eq!(f.preview.last_outcome(), Some(RenderOutcome::Rendered));
}

#[test]
fn test_unknown_story_is_missing() {
    let f = fixture();
    select(&f.channel, "nope--nope");
    assert_eq!(names(&f.emitted), vec![events::STORY_MISSING]);
    assert_eq!(f.preview.current(), None);
}

#[test]
fn test_story_change_clears_highlight_before_render() {
    let f = fixture();
    let host = Arc::new(Mutex::new(MemoryStyleHost::new()));
    install_highlight(&f.channel, host.clone());

    select(&f.channel, "button--primary");
    f.channel.emit(
        events::A11Y_HIGHLIGHT,
        vec![json!({"elements": ["button"], "color": "red"})],
    );
    assert_eq!(host.lock().len(), 1);
    select(&f.channel, "button--broken");
    assert!(host.lock().is_empty());
}

#[test]
fn test_args_update_rerenders_current_story() {
    let f = fixture();
    select(&f.channel, "button--primary");
    f.channel.emit(
        events::UPDATE_STORY_ARGS,
        vec![update_args_payload(
            "button--primary",
            &json!({"label": "Go"}).as_object().cloned().unwrap(),
        )],
    );
    let emitted = f.emitted.lock();
    let (event, value) = &emitted[2];
    assert_eq!(event, events::STORY_ARGS_UPDATED);
    assert_eq!(value["args"]["label"], json!("Go"));
    assert_eq!(emitted[3].0, events::STORY_RENDERED);
}

#[test]
fn test_globals_update() {
    let f = fixture();
    f.channel
        .emit(events::UPDATE_GLOBALS, vec![json!({"globals": {"theme": "dark"}})]);
    assert_eq!(f.preview.globals()["theme"], json!("dark"));
    assert_eq!(names(&f.emitted), vec![events::GLOBALS_UPDATED]);
}

#[test]
fn test_announce_stories_sends_index() {
    let f = fixture();
    f.preview.announce_stories();
    let emitted = f.emitted.lock();
    assert_eq!(emitted[0].0, events::SET_STORIES);
    assert!(emitted[0].1["stories"]["button--primary"].is_object());
}
