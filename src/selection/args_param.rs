//! The compact `args`/`globals` URL syntax.
//!
//! `label:Hello;obj.key:val;list[0]:a;flag:!true;color:!hex(ff0000)`
//!
//! Pairs are `;`-separated, the first `:` separates the path from the value.
//! Paths nest with `.` and `[n]`. Values prefixed with `!` carry types the
//! plain text form can't: `!null`, `!undefined`, `!true`, `!false`,
//! `!date(..)`, `!hex(..)`, `!rgb(..)`, `!rgba(..)`, `!hsl(..)`, `!hsla(..)`.
//! Numeric text becomes a number.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Number, Value};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::debug;

use crate::registry::Params;

/// Keys and plain string values must look like this.
static VALIDATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9 _-]*$").expect("valid regex"));
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?([eE][-+]?[0-9]+)?$").expect("valid regex"));
static HEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^#([a-f0-9]{3,4}|[a-f0-9]{6}|[a-f0-9]{8})$").expect("valid regex")
});
static COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(rgba?|hsla?)\(([0-9]{1,3}),\s?([0-9]{1,3})%?,\s?([0-9]{1,3})%?,?\s?([0-9](\.[0-9]{1,2})?)?\)$",
    )
    .expect("valid regex")
});

/// Indices above this become object keys, so a URL can't allocate huge arrays.
const ARRAY_LIMIT: usize = 20;

/// Result of parsing an args parameter.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedArgs {
    pub args: Params,
    /// At least one entry was dropped as unsafe.
    pub omitted_unsafe: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Key(String),
    Index(usize),
}

enum Decoded {
    Typed(Value),
    Text(String),
    Unsafe,
}

fn decode_value(raw: &str) -> Decoded {
    if let Some(rest) = raw.strip_prefix('!') {
        return match rest {
            "null" | "undefined" => Decoded::Typed(Value::Null),
            "true" => Decoded::Typed(Value::Bool(true)),
            "false" => Decoded::Typed(Value::Bool(false)),
            _ => decode_bang(rest),
        };
    }
    if NUMBER.is_match(raw) {
        if let Some(n) = parse_number(raw) {
            return Decoded::Typed(Value::Number(n));
        }
    }
    Decoded::Text(raw.to_string())
}

fn decode_bang(rest: &str) -> Decoded {
    if let Some(inner) = rest.strip_prefix("date(").and_then(|s| s.strip_suffix(')')) {
        return match parse_date(inner) {
            Some(date) => Decoded::Typed(Value::String(date)),
            None => Decoded::Unsafe,
        };
    }
    if let Some(inner) = rest.strip_prefix("hex(").and_then(|s| s.strip_suffix(')')) {
        return Decoded::Text(format!("#{}", inner));
    }
    if let Some(caps) = COLOR.captures(rest) {
        let func = &caps[1];
        let (x, y, z) = (&caps[2], &caps[3], &caps[4]);
        let alpha = caps.get(5).map(|m| m.as_str()).unwrap_or_default();
        let lower = func.to_ascii_lowercase();
        let color = match lower.as_str() {
            "rgba" => format!("{}({}, {}, {}, {})", func, x, y, z, alpha),
            "hsla" => format!("{}({}, {}%, {}%, {})", func, x, y, z, alpha),
            "rgb" => format!("{}({}, {}, {})", func, x, y, z),
            _ => format!("{}({}, {}%, {}%)", func, x, y, z),
        };
        return Decoded::Typed(Value::String(color));
    }
    Decoded::Text(format!("!{}", rest))
}

fn parse_number(raw: &str) -> Option<Number> {
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Number::from(int));
    }
    raw.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Normalize a `!date(..)` payload to RFC 3339, accepting bare `YYYY-MM-DD`.
fn parse_date(raw: &str) -> Option<String> {
    let parsed = OffsetDateTime::parse(raw, &Rfc3339).ok().or_else(|| {
        Date::parse(raw, format_description!("[year]-[month]-[day]"))
            .ok()
            .map(|d| d.midnight().assume_utc())
    })?;
    parsed.format(&Rfc3339).ok()
}

fn is_safe_text(text: &str) -> bool {
    VALIDATION.is_match(text) || NUMBER.is_match(text) || HEX.is_match(text) || COLOR.is_match(text)
}

fn parse_path(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        let Some(open) = part.find('[') else {
            segments.push(Segment::Key(part.to_string()));
            continue;
        };
        let (head, mut rest) = part.split_at(open);
        let mut brackets = Vec::new();
        let mut well_formed = true;
        while !rest.is_empty() {
            let Some(inner) = rest.strip_prefix('[') else {
                well_formed = false;
                break;
            };
            let Some(close) = inner.find(']') else {
                well_formed = false;
                break;
            };
            brackets.push(bracket_segment(&inner[..close]));
            rest = &inner[close + 1..];
        }
        if !well_formed {
            segments.push(Segment::Key(part.to_string()));
            continue;
        }
        if !head.is_empty() {
            segments.push(Segment::Key(head.to_string()));
        }
        segments.extend(brackets);
    }
    segments
}

fn bracket_segment(content: &str) -> Segment {
    match content.parse::<usize>() {
        Ok(index) if index <= ARRAY_LIMIT && content.bytes().all(|b| b.is_ascii_digit()) => {
            Segment::Index(index)
        }
        _ => Segment::Key(content.to_string()),
    }
}

fn insert_at(target: &mut Value, path: &[Segment], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *target = value;
        return;
    };
    let slot = match head {
        Segment::Key(key) => {
            if !target.is_object() {
                *target = Value::Object(Params::new());
            }
            match target {
                Value::Object(map) => map.entry(key.clone()).or_insert(Value::Null),
                _ => return,
            }
        }
        Segment::Index(index) => {
            if let Value::Object(map) = target {
                map.entry(index.to_string()).or_insert(Value::Null)
            } else {
                if !target.is_array() {
                    *target = Value::Array(Vec::new());
                }
                match target {
                    Value::Array(items) => {
                        if items.len() <= *index {
                            items.resize(index + 1, Value::Null);
                        }
                        &mut items[*index]
                    }
                    _ => return,
                }
            }
        }
    };
    insert_at(slot, rest, value);
}

/// Parse an `args`/`globals` URL value into a nested mapping.
///
/// A top-level entry with an unsafe key or value anywhere inside it is
/// dropped entirely.
pub fn parse_args_param(input: &str) -> ParsedArgs {
    let mut root = Value::Object(Params::new());
    let mut unsafe_keys: HashSet<String> = HashSet::new();
    let mut omitted_unsafe = false;

    for pair in input.split(';').filter(|p| !p.is_empty()) {
        let (path, raw) = pair.split_once(':').unwrap_or((pair, ""));
        let mut segments = parse_path(path);
        if let Some(Segment::Index(index)) = segments.first().cloned() {
            segments[0] = Segment::Key(index.to_string());
        }
        let Some(Segment::Key(top)) = segments.first().cloned() else {
            continue;
        };

        let keys_safe = segments.iter().all(|s| match s {
            Segment::Key(k) => !k.is_empty() && VALIDATION.is_match(k),
            Segment::Index(_) => true,
        });
        let value = match decode_value(raw) {
            Decoded::Typed(v) => Some(v),
            Decoded::Text(t) if is_safe_text(&t) => Some(Value::String(t)),
            Decoded::Text(_) | Decoded::Unsafe => None,
        };

        match value {
            Some(value) if keys_safe => insert_at(&mut root, &segments, value),
            _ => {
                debug!(key = %top, "Unsafe args entry");
                unsafe_keys.insert(top);
                omitted_unsafe = true;
            }
        }
    }

    let mut args = match root {
        Value::Object(map) => map,
        _ => Params::new(),
    };
    args.retain(|key, _| !unsafe_keys.contains(key));
    ParsedArgs {
        args,
        omitted_unsafe,
    }
}

fn encode_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("!null".to_string()),
        Value::Bool(true) => Some("!true".to_string()),
        Value::Bool(false) => Some("!false".to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => {
            if let Some(hex) = s.strip_prefix('#').filter(|_| HEX.is_match(s)) {
                Some(format!("!hex({})", hex))
            } else if COLOR.is_match(s) {
                Some(format!("!{}", s.replace(' ', "")))
            } else if OffsetDateTime::parse(s, &Rfc3339).is_ok() {
                Some(format!("!date({})", s))
            } else if VALIDATION.is_match(s) {
                Some(s.clone())
            } else {
                None
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn flatten(path: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key.is_empty() || !VALIDATION.is_match(key) {
                    debug!(key = %key, "Skipping unsafe args key");
                    continue;
                }
                flatten(&format!("{}.{}", path, key), child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(&format!("{}[{}]", path, index), child, out);
            }
        }
        scalar => match encode_scalar(scalar) {
            Some(encoded) => out.push(format!("{}:{}", path, encoded)),
            None => debug!(path = %path, "Skipping unsafe args value"),
        },
    }
}

/// Serialize a mapping into the args URL syntax. Unsafe entries are skipped.
pub fn stringify_args(args: &Params) -> String {
    let mut pairs = Vec::new();
    for (key, value) in args {
        if key.is_empty() || !VALIDATION.is_match(key) {
            debug!(key = %key, "Skipping unsafe args key");
            continue;
        }
        flatten(key, value, &mut pairs);
    }
    pairs.join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(input: &str) -> Value {
        Value::Object(parse_args_param(input).args)
    }

    #[test]
    fn test_nested_paths() {
        assert_eq!(parse("obj.key:val"), json!({"obj": {"key": "val"}}));
        assert_eq!(
            parse("a.b.c:1;a.b.d:two;list[1]:x"),
            json!({"a": {"b": {"c": 1, "d": "two"}}, "list": [null, "x"]})
        );
        assert_eq!(parse("list[0].name:n"), json!({"list": [{"name": "n"}]}));
    }

    #[test]
    fn test_typed_values() {
        assert_eq!(
            parse("a:!null;b:!undefined;c:!true;d:!false;e:-1.5;f:42"),
            json!({"a": null, "b": null, "c": true, "d": false, "e": -1.5, "f": 42})
        );
        assert_eq!(parse("c:!hex(ff0000)"), json!({"c": "#ff0000"}));
        assert_eq!(parse("c:!rgba(255,0,0,0.5)"), json!({"c": "rgba(255, 0, 0, 0.5)"}));
        assert_eq!(parse("c:!hsl(120,50,50)"), json!({"c": "hsl(120, 50%, 50%)"}));
        assert_eq!(parse("d:!date(2020-02-01)"), json!({"d": "2020-02-01T00:00:00Z"}));
    }

    #[test]
    fn test_unsafe_entries_are_dropped() {
        let parsed = parse_args_param("ok:fine;bad:<script>;obj.x:1;obj.y:a&b");
        assert!(parsed.omitted_unsafe);
        assert_eq!(Value::Object(parsed.args), json!({"ok": "fine"}));

        let parsed = parse_args_param("b@d:x");
        assert!(parsed.omitted_unsafe);
        assert!(parsed.args.is_empty());

        let parsed = parse_args_param("d:!date(soon)");
        assert!(parsed.omitted_unsafe);
    }

    #[test]
    fn test_large_index_becomes_key() {
        assert_eq!(parse("a[21]:x"), json!({"a": {"21": "x"}}));
    }

    #[test]
    fn test_empty_input() {
        let parsed = parse_args_param("");
        assert!(parsed.args.is_empty());
        assert!(!parsed.omitted_unsafe);
    }

    #[test]
    fn test_stringify_then_parse() {
        let args = match json!({
            "label": "Hello world",
            "count": 3,
            "on": true,
            "nothing": null,
            "color": "#00ff00",
            "tint": "rgba(1, 2, 3, 0.5)",
            "obj": {"key": "val", "list": ["a", "b"]}
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let encoded = stringify_args(&args);
        assert_eq!(
            encoded,
            "label:Hello world;count:3;on:!true;nothing:!null;color:!hex(00ff00);\
             tint:!rgba(1,2,3,0.5);obj.key:val;obj.list[0]:a;obj.list[1]:b"
        );
        assert_eq!(parse_args_param(&encoded).args, args);
    }

    #[test]
    fn test_exponent_numbers_stay_numbers() {
        let args = match json!({"eps": 1e-7, "big": 1e21}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let encoded = stringify_args(&args);
        assert_eq!(encoded, "eps:1e-7;big:1e21");
        assert_eq!(parse_args_param(&encoded).args, args);
        assert_eq!(parse("n:2.5E3"), json!({"n": 2500.0}));
    }

    #[test]
    fn test_offset_dates_keep_their_offset() {
        assert_eq!(
            parse("when:!date(2020-02-01T00:00:00+01:00)"),
            json!({"when": "2020-02-01T00:00:00+01:00"})
        );
    }

    #[test]
    fn test_stringify_skips_unsafe() {
        let args = match json!({"ok": "x", "bad": "a;b", "we!rd": 1}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert_eq!(stringify_args(&args), "ok:x");
    }
}
