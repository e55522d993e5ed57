//! Accessibility highlight decorations in the preview.
//!
//! The a11y panel asks the preview to outline offending elements. The outline
//! is a single injected style sheet that must not outlive the story it was
//! made for, so it is torn down on every story change.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bus::{payload, Channel, ListenerId};
use super::events::{A11Y_HIGHLIGHT, HIGHLIGHT_STYLE_ID, STORY_CHANGED};

/// Payload of the highlight event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HighlightInfo {
    /// CSS selectors of the elements to outline
    pub elements: Vec<String>,
    pub color: String,
}

/// Where style sheets are injected (the preview document's head).
pub trait StyleHost: Send {
    fn insert_style(&mut self, id: &str, css: &str);
    /// Remove a style sheet; false when there was none.
    fn remove_style(&mut self, id: &str) -> bool;
}

/// Style host that keeps sheets in memory.
#[derive(Debug, Default)]
pub struct MemoryStyleHost {
    sheets: Vec<(String, String)>,
}

impl MemoryStyleHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.sheets
            .iter()
            .find(|(sheet_id, _)| sheet_id == id)
            .map(|(_, css)| css.as_str())
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl StyleHost for MemoryStyleHost {
    fn insert_style(&mut self, id: &str, css: &str) {
        self.sheets.push((id.to_string(), css.to_string()));
    }

    fn remove_style(&mut self, id: &str) -> bool {
        let before = self.sheets.len();
        self.sheets.retain(|(sheet_id, _)| sheet_id != id);
        before != self.sheets.len()
    }
}

fn highlight_style(color: &str) -> String {
    format!(
        "outline: 2px dashed {}; outline-offset: 2px; box-shadow: 0 0 0 6px rgba(255,255,255,0.6);",
        color
    )
}

/// Style sheet text for a highlight; duplicate selectors appear once.
pub fn highlight_css(info: &HighlightInfo) -> String {
    let mut seen: HashSet<&str> = HashSet::with_capacity(info.elements.len());
    let style = highlight_style(&info.color);
    info.elements
        .iter()
        .filter(|element| seen.insert(element.as_str()))
        .map(|target| format!("{}{{ {} }}", target, style))
        .collect::<Vec<_>>()
        .join(" ")
}

fn reset_highlight<H: StyleHost>(host: &mut H) {
    if host.remove_style(HIGHLIGHT_STYLE_ID) {
        debug!("Highlight removed");
    }
}

/// Subscribe the highlight decoration to `channel`.
///
/// Returns the listener ids so the host can detach on teardown.
pub fn install_highlight<H>(channel: &Channel, host: Arc<Mutex<H>>) -> [ListenerId; 2]
where
    H: StyleHost + 'static,
{
    let reset_host = host.clone();
    let on_change = channel.on(STORY_CHANGED, move |_| {
        reset_highlight(&mut *reset_host.lock());
        Ok(())
    });

    let on_highlight = channel.on(A11Y_HIGHLIGHT, move |args| {
        let info: HighlightInfo = payload(args, 0)?;
        let mut host = host.lock();
        reset_highlight(&mut *host);
        host.insert_style(HIGHLIGHT_STYLE_ID, &highlight_css(&info));
        debug!(elements = info.elements.len(), color = %info.color, "Highlight applied");
        Ok(())
    });

    [on_change, on_highlight]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn installed() -> (Channel, Arc<Mutex<MemoryStyleHost>>) {
        let channel = Channel::mock();
        let host = Arc::new(Mutex::new(MemoryStyleHost::new()));
        install_highlight(&channel, host.clone());
        (channel, host)
    }

    #[test]
    fn test_highlight_dedupes_selectors() {
        let css = highlight_css(&HighlightInfo {
            elements: vec!["#a".into(), ".b".into(), "#a".into()],
            color: "red".into(),
        });
        assert_eq!(css.matches("#a{").count(), 1);
        assert!(css.contains(".b{"));
        // First occurrence keeps its place
        assert!(css.find("#a{") < css.find(".b{"));
        assert!(css.contains("2px dashed red"));
    }

    #[test]
    fn test_highlight_replaces_previous_sheet() {
        let (channel, host) = installed();
        channel.emit(A11Y_HIGHLIGHT, vec![json!({"elements": ["#a"], "color": "red"})]);
        channel.emit(A11Y_HIGHLIGHT, vec![json!({"elements": ["#b"], "color": "blue"})]);
        let host = host.lock();
        assert_eq!(host.len(), 1);
        assert!(host.get(HIGHLIGHT_STYLE_ID).unwrap().contains("#b"));
    }

    #[test]
    fn test_story_change_tears_down_highlight() {
        let (channel, host) = installed();
        channel.emit(A11Y_HIGHLIGHT, vec![json!({"elements": ["#a"], "color": "red"})]);
        assert_eq!(host.lock().len(), 1);
        channel.emit(STORY_CHANGED, vec![json!("next--story")]);
        assert!(host.lock().is_empty());
    }

    #[test]
    fn test_malformed_payload_leaves_host_untouched() {
        let (channel, host) = installed();
        channel.emit(A11Y_HIGHLIGHT, vec![json!({"elements": "nope"})]);
        assert!(host.lock().is_empty());
    }
}
