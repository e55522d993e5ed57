use super::*;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

fn recorder() -> (Arc<Mutex<Vec<Value>>>, impl Fn(&[Value]) -> anyhow::Result<()> + Send + Sync) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |args: &[Value]| {
        sink.lock().push(Value::Array(args.to_vec()));
        Ok(())
    })
}

#[test]
fn test_mock_delivers_synchronously() {
    let channel = Channel::mock();
    let (seen, handler) = recorder();
    channel.on(events::STORY_CHANGED, handler);
    channel.emit(events::STORY_CHANGED, vec![json!("a--b")]);
    assert_eq!(*seen.lock(), vec![json!(["a--b"])]);
}

#[test]
fn test_once_fires_a_single_time() {
    let channel = Channel::mock();
    let (seen, handler) = recorder();
    channel.once("ping", handler);
    channel.emit("ping", vec![json!(1)]);
    channel.emit("ping", vec![json!(2)]);
    assert_eq!(seen.lock().len(), 1);
    assert_eq!(channel.listener_count("ping"), 0);
}

#[test]
fn test_remove_listener() {
    let channel = Channel::mock();
    let (seen, handler) = recorder();
    let id = channel.on("ping", handler);
    assert!(channel.remove_listener("ping", id));
    assert!(!channel.remove_listener("ping", id));
    channel.emit("ping", vec![]);
    assert!(seen.lock().is_empty());
}

#[test]
fn test_failing_handlers_do_not_stop_others() {
    let channel = Channel::mock();
    channel.on("ping", |_| Err(anyhow::anyhow!("boom")));
    channel.on("ping", |_| panic!("handler panic"));
    let (seen, handler) = recorder();
    channel.on("ping", handler);
    channel.emit("ping", vec![json!("still delivered")]);
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn test_handlers_may_emit_and_subscribe() {
    let channel = Channel::mock();
    let (seen, handler) = recorder();
    channel.on("second", handler);
    let inner = channel.clone();
    channel.on("first", move |args| {
        inner.emit("second", args.to_vec());
        inner.on("third", |_| Ok(()));
        Ok(())
    });
    channel.emit("first", vec![json!(7)]);
    assert_eq!(*seen.lock(), vec![json!([7])]);
    assert_eq!(channel.listener_count("third"), 1);
}

#[test]
fn test_transport_pair_crosses_contexts() {
    let (manager_end, preview_end) = pair();
    let manager = Channel::with_transport(manager_end);
    let preview = Channel::with_transport(preview_end);

    let (seen, handler) = recorder();
    preview.on(events::SET_CURRENT_STORY, handler);

    manager.emit_data(events::SET_CURRENT_STORY, &json!({"storyId": "a--b"})).unwrap();
    // Nothing crosses until the receiving side pumps
    assert!(seen.lock().is_empty());
    assert_eq!(preview.pump(), 1);
    assert_eq!(*seen.lock(), vec![json!([{"storyId": "a--b"}])]);
    assert_eq!(manager.pump(), 0);
}

#[test]
fn test_pump_skips_malformed_frames() {
    let (raw_end, preview_end) = pair();
    let preview = Channel::with_transport(preview_end);
    let (seen, handler) = recorder();
    preview.on("ok", handler);

    raw_end.send("junk", "not json".to_string()).unwrap();
    raw_end.send("junk", r#"{"args":[]}"#.to_string()).unwrap();
    raw_end
        .send("ok", serde_json::to_string(&Envelope::new("ok", vec![json!(1)])).unwrap())
        .unwrap();

    assert_eq!(preview.pump(), 1);
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn test_run_until_closed_drains_then_stops() {
    let (manager_end, preview_end) = pair();
    let manager = Channel::with_transport(manager_end.clone());
    let preview = Channel::with_transport(preview_end);
    let (seen, handler) = recorder();
    preview.on("tick", handler);

    let worker = std::thread::spawn(move || preview.run_until_closed());
    for i in 0..3 {
        manager.emit("tick", vec![json!(i)]);
    }
    manager_end.close();
    assert_eq!(worker.join().unwrap(), 3);
    assert_eq!(seen.lock().len(), 3);
}

#[test]
fn test_payload_helper() {
    let args = vec![json!({"elements": ["#a"], "color": "red"})];
    let info: HighlightInfo = payload(&args, 0).unwrap();
    assert_eq!(info.elements, vec!["#a".to_string()]);
    assert!(payload::<HighlightInfo>(&args, 1).is_err());
}
