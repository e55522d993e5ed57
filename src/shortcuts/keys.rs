//! Keyboard events and chord matching.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Element that had focus when the key was pressed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTarget {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub content_editable: bool,
}

/// Plain-data keydown event. Events from the preview arrive in this shape
/// over the channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardEvent {
    pub key: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub alt_key: bool,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub shift_key: bool,
    #[serde(default)]
    pub target: Option<EventTarget>,
}

impl KeyboardEvent {
    pub fn key(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = code.to_string();
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt_key = true;
        self
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    pub fn in_element(mut self, tag_name: &str) -> Self {
        self.target = Some(EventTarget {
            tag_name: tag_name.to_string(),
            content_editable: false,
        });
        self
    }
}

/// True when the event was typed into an editable field.
pub fn focus_in_input(event: &KeyboardEvent) -> bool {
    event.target.as_ref().is_some_and(|target| {
        let tag = target.tag_name.to_ascii_lowercase();
        tag.contains("input") || tag.contains("textarea") || target.content_editable
    })
}

/// One position of a chord read from an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyInput {
    Key(String),
    /// The produced character and the physical key differ, e.g. Option+F
    /// on macOS produces `ƒ`. Either one matches.
    Either(String, String),
}

impl KeyInput {
    fn matches(&self, token: &str) -> bool {
        match self {
            KeyInput::Key(key) => key == token,
            KeyInput::Either(key, physical) => key == token || physical == token,
        }
    }

    fn primary(&self) -> &str {
        match self {
            KeyInput::Key(key) | KeyInput::Either(key, _) => key,
        }
    }
}

pub type EventChord = SmallVec<[KeyInput; 4]>;

const MODIFIER_KEYS: [&str; 4] = ["Meta", "Alt", "Control", "Shift"];
const NAMED_KEYS: [&str; 4] = ["ArrowRight", "ArrowDown", "ArrowUp", "ArrowLeft"];

/// Read the chord an event represents. A lone modifier press is no chord.
pub fn event_to_shortcut(event: &KeyboardEvent) -> Option<EventChord> {
    if MODIFIER_KEYS.contains(&event.key.as_str()) {
        return None;
    }

    let mut keys = EventChord::new();
    if event.alt_key {
        keys.push(KeyInput::Key("alt".to_string()));
    }
    if event.ctrl_key {
        keys.push(KeyInput::Key("control".to_string()));
    }
    if event.meta_key {
        keys.push(KeyInput::Key("meta".to_string()));
    }
    if event.shift_key {
        keys.push(KeyInput::Key("shift".to_string()));
    }

    if event.key.chars().count() == 1 && event.key != " " {
        let key = event.key.to_uppercase();
        let physical = event
            .code
            .to_uppercase()
            .replace("KEY", "")
            .replace("DIGIT", "");
        if physical.chars().count() == 1 && physical != key {
            keys.push(KeyInput::Either(key, physical));
        } else {
            keys.push(KeyInput::Key(key));
        }
    }

    match event.key.as_str() {
        " " => keys.push(KeyInput::Key("space".to_string())),
        "Escape" => keys.push(KeyInput::Key("escape".to_string())),
        named if NAMED_KEYS.contains(&named) => keys.push(KeyInput::Key(named.to_string())),
        _ => {}
    }

    if keys.is_empty() {
        None
    } else {
        Some(keys)
    }
}

/// Whether an event chord matches a configured chord. `shift` is optional
/// in front of `/`, which needs it on many layouts.
pub fn shortcut_matches_shortcut(input: &[KeyInput], chord: &[String]) -> bool {
    let input = match input {
        [KeyInput::Key(first), rest @ ..]
            if first == "shift" && rest.first().is_some_and(|k| k.primary().starts_with('/')) =>
        {
            rest
        }
        _ => input,
    };
    input.len() == chord.len() && input.iter().zip(chord).all(|(k, token)| k.matches(token))
}

/// Render a chord for logs and menus.
pub fn chord_label(chord: &[String]) -> String {
    chord.join("+")
}
