use super::*;
use std::cmp::Ordering;

struct Fixture {
    kind: &'static str,
    name: &'static str,
}

impl SortEntry for Fixture {
    fn kind(&self) -> &str {
        self.kind
    }
    fn name(&self) -> &str {
        self.name
    }
}

const fn kind(kind: &'static str) -> Fixture {
    Fixture { kind, name: "" }
}

const fn story(kind: &'static str, name: &'static str) -> Fixture {
    Fixture { kind, name }
}

const A: Fixture = kind("a");
const A_ACUTE: Fixture = kind("á");
const A_UPPER: Fixture = kind("A");
const B: Fixture = kind("b");
const A_A: Fixture = kind("a / a");
const A_B: Fixture = kind("a / b");
const A_C: Fixture = kind("a / c");
const B_A_A: Fixture = kind("b / a / a");
const B_B: Fixture = kind("b / b");
const C: Fixture = kind("c");
const LOCALE1: Fixture = kind("Б");
const LOCALE2: Fixture = kind("Г");
const C__A: Fixture = story("c", "a");
const C_B__A: Fixture = story("c / b", "a");
const C_B__B: Fixture = story("c / b", "b");
const C_B__C: Fixture = story("c / b", "c");
const C__C: Fixture = story("c", "c");

fn seg(s: &str) -> OrderItem {
    OrderItem::segment(s)
}

fn nested(items: &[&str]) -> OrderItem {
    OrderItem::nested(items.iter().map(|s| seg(s)).collect())
}

#[test]
fn test_configure_order_by_default() {
    let config = SortConfig::default();
    assert_eq!(compare(&A, &B, &config), Ordering::Equal);
    assert_eq!(compare(&B, &A, &config), Ordering::Equal);
    assert_eq!(compare(&A, &A, &config), Ordering::Equal);
    assert_eq!(compare(&C_B__A, &A_ACUTE, &config), Ordering::Equal);
    // Parent and child kinds too
    assert_eq!(compare(&A, &A_A, &config), Ordering::Equal);
    assert_eq!(compare(&A_A, &A, &config), Ordering::Equal);
    assert_eq!(compare(&B_B, &B_A_A, &config), Ordering::Equal);
}

#[test]
fn test_shallow_kinds_alphabetically() {
    let config = SortConfig::alphabetical();
    assert_eq!(compare(&A, &B, &config), Ordering::Less);
    assert_eq!(compare(&B, &A, &config), Ordering::Greater);
    assert_eq!(compare(&A, &A_ACUTE, &config), Ordering::Less);
    assert_eq!(compare(&A_ACUTE, &A, &config), Ordering::Greater);
}

#[test]
fn test_deep_kinds_alphabetically() {
    let config = SortConfig::alphabetical();
    assert_eq!(compare(&A_A, &A_B, &config), Ordering::Less);
    assert_eq!(compare(&A_B, &A_A, &config), Ordering::Greater);
    assert_eq!(compare(&A_A, &B, &config), Ordering::Less);
    assert_eq!(compare(&B, &A_A, &config), Ordering::Greater);
    assert_eq!(compare(&A_A, &A, &config), Ordering::Greater);
    assert_eq!(compare(&A, &A_A, &config), Ordering::Less);
    assert_eq!(compare(&B_A_A, &B_B, &config), Ordering::Less);
    assert_eq!(compare(&B_B, &B_A_A, &config), Ordering::Greater);
}

#[test]
fn test_alphabetical_ignores_case() {
    let config = SortConfig::alphabetical();
    assert_eq!(compare(&A, &A_UPPER, &config), Ordering::Equal);
    assert_eq!(compare(&A_UPPER, &A, &config), Ordering::Equal);
}

#[test]
fn test_alphabetical_with_locales() {
    let config = SortConfig::alphabetical().with_locales("ru-RU");
    assert_eq!(compare(&LOCALE1, &LOCALE2, &config), Ordering::Less);
    assert_eq!(compare(&LOCALE2, &LOCALE1, &config), Ordering::Greater);
}

#[test]
fn test_order_array() {
    let config = SortConfig::default().with_order(vec![seg("b"), seg("c")]);
    assert_eq!(compare(&A, &B, &config), Ordering::Greater);
    assert_eq!(compare(&B, &A, &config), Ordering::Less);
    assert_eq!(compare(&B_A_A, &B_B, &config), Ordering::Equal);
    assert_eq!(compare(&B_B, &B_A_A, &config), Ordering::Equal);
}

#[test]
fn test_nested_order_array() {
    let config = SortConfig::default().with_order(vec![seg("a"), nested(&["b", "c"]), seg("c")]);
    assert_eq!(compare(&A_A, &A_B, &config), Ordering::Greater);
    assert_eq!(compare(&A_B, &A_A, &config), Ordering::Less);
}

#[test]
fn test_alphabetical_including_names() {
    let config = SortConfig::alphabetical().with_names();
    assert_eq!(compare(&C_B__A, &C__A, &config), Ordering::Greater);
    assert_eq!(compare(&C__A, &C_B__A, &config), Ordering::Less);
    assert_eq!(compare(&C__C, &C__A, &config), Ordering::Greater);
    assert_eq!(compare(&C__A, &C__C, &config), Ordering::Less);
}

#[test]
fn test_order_array_including_names() {
    let config = SortConfig::default()
        .with_order(vec![
            seg("c"),
            OrderItem::nested(vec![seg("b"), nested(&["c", "b", "a"]), seg("c"), seg("a")]),
        ])
        .with_names();
    assert_eq!(compare(&C_B__A, &C_B__B, &config), Ordering::Greater);
    assert_eq!(compare(&C_B__B, &C_B__C, &config), Ordering::Greater);
    assert_eq!(compare(&C_B__A, &C_B__C, &config), Ordering::Greater);
    assert_eq!(compare(&C_B__A, &C__A, &config), Ordering::Less);
    assert_eq!(compare(&C_B__A, &C__C, &config), Ordering::Less);
    assert_eq!(compare(&C__A, &C__C, &config), Ordering::Greater);
}

#[test]
fn test_order_array_with_wildcard() {
    let config = SortConfig::default().with_order(vec![seg("a"), seg("*"), seg("b")]);
    assert_eq!(compare(&A, &B, &config), Ordering::Less);
    assert_eq!(compare(&C, &B, &config), Ordering::Less);
    assert_eq!(compare(&B, &C, &config), Ordering::Greater);
    assert_eq!(compare(&B, &A, &config), Ordering::Greater);
    assert_eq!(compare(&A, &C, &config), Ordering::Less);
}

#[test]
fn test_nested_order_array_with_wildcard() {
    let config = SortConfig::default().with_order(vec![seg("a"), nested(&["a", "*", "b"]), seg("c")]);
    assert_eq!(compare(&A, &C, &config), Ordering::Less);
    assert_eq!(compare(&C, &A, &config), Ordering::Greater);
    assert_eq!(compare(&A_A, &A_B, &config), Ordering::Less);
    assert_eq!(compare(&A_B, &A_A, &config), Ordering::Greater);
    assert_eq!(compare(&A_A, &A_C, &config), Ordering::Less);
    assert_eq!(compare(&A_C, &A_A, &config), Ordering::Greater);
    assert_eq!(compare(&A_C, &A_B, &config), Ordering::Less);
    assert_eq!(compare(&A_B, &A_C, &config), Ordering::Greater);
}

#[test]
fn test_reflexive_and_antisymmetric_for_every_config() {
    let all = [
        &A, &A_ACUTE, &A_UPPER, &B, &A_A, &A_B, &A_C, &B_A_A, &B_B, &C, &LOCALE1, &LOCALE2,
        &C__A, &C_B__A, &C_B__B, &C_B__C, &C__C,
    ];
    let configs = [
        SortConfig::default(),
        SortConfig::alphabetical(),
        SortConfig::alphabetical().with_names(),
        SortConfig::default().with_order(vec![seg("b"), seg("c")]),
        SortConfig::alphabetical().with_order(vec![seg("a"), seg("*"), seg("b")]),
    ];
    for config in &configs {
        for x in all {
            assert_eq!(compare(x, x, config), Ordering::Equal, "{} {:?}", x.kind, config);
            for y in all {
                assert_eq!(
                    compare(x, y, config),
                    compare(y, x, config).reverse(),
                    "{} vs {} under {:?}",
                    x.kind,
                    y.kind,
                    config
                );
            }
        }
    }
}

#[test]
fn test_stable_sort_keeps_registration_order() {
    let mut entries = vec![&C, &A, &B];
    entries.sort_by(|x, y| compare(*x, *y, &SortConfig::default()));
    let kinds: Vec<&str> = entries.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec!["c", "a", "b"]);
}

#[test]
fn test_order_deserializes_from_nested_arrays() {
    let config: SortConfig =
        serde_json::from_str(r#"{"method":"alphabetical","order":["a",["b","*"],"c"],"includeNames":true}"#)
            .unwrap();
    assert_eq!(config.method, SortMethod::Alphabetical);
    assert!(config.include_names);
    assert_eq!(
        config.order,
        vec![seg("a"), nested(&["b", "*"]), seg("c")]
    );
}

#[test]
fn test_split_kind_trims_segments() {
    assert_eq!(split_kind(" a / b/c "), vec!["a", "b", "c"]);
}
