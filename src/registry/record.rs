//! Story records and id generation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, StorybookError};
use crate::story_sort::SortEntry;

/// Stable story identifier, `<kind-slug>--<name-slug>`.
pub type StoryId = String;

/// Open key/value mapping used for parameters, args and arg types.
pub type Params = Map<String, Value>;

/// A registered story.
///
/// `id`, `kind` and `name` never change for the lifetime of a registry;
/// `args` change through user interaction and can be reset to `initial_args`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRecord {
    pub id: StoryId,
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub parameters: Params,
    #[serde(default)]
    pub args: Params,
    #[serde(default)]
    pub initial_args: Params,
    #[serde(default)]
    pub arg_types: Params,
}

impl StoryRecord {
    /// The parameter under `key`, if any.
    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    /// Whether the consumer keyed by `key` is switched off for this story.
    pub fn is_disabled_for(&self, key: &str) -> bool {
        is_disabled(self.parameter(key))
    }
}

impl SortEntry for StoryRecord {
    fn kind(&self) -> &str {
        &self.kind
    }
    fn name(&self) -> &str {
        &self.name
    }
}

/// Registration form of a story, as produced by story files or an index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryInput {
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StoryId>,
    #[serde(default)]
    pub parameters: Params,
    #[serde(default)]
    pub args: Params,
    #[serde(default)]
    pub arg_types: Params,
}

impl StoryInput {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.args.insert(key.into(), value);
        self
    }
}

/// The generic "disable" convention shared by registry consumers:
/// `false` or `{ "disable": true }` switches a consumer off.
pub fn is_disabled(parameter: Option<&Value>) -> bool {
    match parameter {
        Some(Value::Bool(false)) => true,
        Some(Value::Object(map)) => map.get("disable") == Some(&Value::Bool(true)),
        _ => false,
    }
}

/// Convert a kind or story name to an id slug.
///
/// - Converts to lowercase
/// - Replaces every run of non-alphanumeric characters with one hyphen
///   (letters and digits of any script are kept)
/// - Removes leading/trailing hyphens
pub fn sanitize(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut prev_hyphen = false;
    for c in value.to_lowercase().chars() {
        if c.is_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }
    result.trim_matches('-').to_string()
}

fn sanitize_part(value: &str, part: &'static str) -> Result<String> {
    let slug = sanitize(value);
    if slug.is_empty() {
        return Err(StorybookError::InvalidStoryName {
            part,
            value: value.to_string(),
        });
    }
    Ok(slug)
}

/// Build the id for a story: `sanitize(kind)--sanitize(name)`.
pub fn to_id(kind: &str, name: &str) -> Result<StoryId> {
    Ok(format!(
        "{}--{}",
        sanitize_part(kind, "kind")?,
        sanitize_part(name, "name")?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Components/Button"), "components-button");
        assert_eq!(sanitize("  Hello   World!! "), "hello-world");
        assert_eq!(sanitize("a--b"), "a-b");
        assert_eq!(sanitize("Ünïcode"), "ünïcode");
        assert_eq!(sanitize("Кнопка / Основная"), "кнопка-основная");
        assert_eq!(sanitize("按钮"), "按钮");
    }

    #[test]
    fn test_to_id_keeps_non_latin_titles() {
        assert_eq!(to_id("Кнопка", "Основная").unwrap(), "кнопка--основная");
    }

    #[test]
    fn test_to_id() {
        assert_eq!(to_id("Components/Button", "Primary").unwrap(), "components-button--primary");
        assert_eq!(to_id("a / b", "With Icon").unwrap(), "a-b--with-icon");
    }

    #[test]
    fn test_to_id_rejects_empty_parts() {
        let err = to_id("***", "name").unwrap_err();
        assert!(matches!(err, StorybookError::InvalidStoryName { part: "kind", .. }));
        let err = to_id("kind", "").unwrap_err();
        assert!(matches!(err, StorybookError::InvalidStoryName { part: "name", .. }));
    }

    #[test]
    fn test_is_disabled_convention() {
        assert!(is_disabled(Some(&json!(false))));
        assert!(is_disabled(Some(&json!({"disable": true}))));
        assert!(!is_disabled(Some(&json!({"disable": false}))));
        assert!(!is_disabled(Some(&json!(true))));
        assert!(!is_disabled(None));
    }
}
