//! Parameter layering at registration time.

use serde_json::Value;

use super::record::Params;

/// Layer parameter maps, later layers winning.
///
/// Top-level keys are replaced wholesale, except keys listed in `deep_keys`
/// whose object values are merged recursively.
pub fn merge_parameters(layers: &[&Params], deep_keys: &[String]) -> Params {
    let mut merged = Params::new();
    for layer in layers {
        for (key, value) in layer.iter() {
            if deep_keys.iter().any(|k| k == key) {
                if let (Some(Value::Object(existing)), Value::Object(incoming)) =
                    (merged.get_mut(key), value)
                {
                    deep_merge(existing, incoming);
                    continue;
                }
            }
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

fn deep_merge(target: &mut Params, source: &Params) {
    for (key, value) in source {
        if let (Some(Value::Object(existing)), Value::Object(incoming)) =
            (target.get_mut(key), value)
        {
            deep_merge(existing, incoming);
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(v: Value) -> Params {
        match v {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_story_level_wins_shallow() {
        let global = params(json!({"layout": "centered", "backgrounds": {"default": "light", "grid": true}}));
        let component = params(json!({"backgrounds": {"default": "dark"}}));
        let story = params(json!({"layout": "fullscreen"}));
        let merged = merge_parameters(&[&global, &component, &story], &[]);
        assert_eq!(merged["layout"], json!("fullscreen"));
        // Shallow: the whole backgrounds object is replaced
        assert_eq!(merged["backgrounds"], json!({"default": "dark"}));
    }

    #[test]
    fn test_marked_keys_merge_deeply() {
        let global = params(json!({"docs": {"source": {"type": "code"}, "inlineStories": true}}));
        let story = params(json!({"docs": {"source": {"state": "open"}}}));
        let merged = merge_parameters(&[&global, &story], &["docs".to_string()]);
        assert_eq!(
            merged["docs"],
            json!({"source": {"type": "code", "state": "open"}, "inlineStories": true})
        );
    }
}
