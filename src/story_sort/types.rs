//! `storySort` configuration types.

use serde::{Deserialize, Serialize};

/// Order entry matching every segment not otherwise listed.
pub const WILDCARD: &str = "*";

/// How stories are ordered when the `order` list doesn't decide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMethod {
    /// Registration order; the comparator reports ties and a stable sort keeps insertion order.
    #[default]
    Configure,
    Alphabetical,
}

/// One element of the `order` list.
///
/// On the wire this is the nested-array form used by story configuration:
/// `["Intro", "Components", ["Button", "*"], "*"]`. A nested list applies to
/// the segment named immediately before it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderItem {
    Segment(String),
    Nested(Vec<OrderItem>),
}

impl OrderItem {
    pub fn segment(name: impl Into<String>) -> Self {
        OrderItem::Segment(name.into())
    }

    pub fn nested(items: Vec<OrderItem>) -> Self {
        OrderItem::Nested(items)
    }

    fn is_segment(&self, name: &str) -> bool {
        matches!(self, OrderItem::Segment(s) if s == name)
    }
}

/// Locale identifier(s) for alphabetical comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Locales {
    One(String),
    Many(Vec<String>),
}

impl Locales {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Locales::One(one) => std::slice::from_ref(one),
            Locales::Many(many) => many,
        }
    }
}

/// Options recognized by the story comparator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortConfig {
    #[serde(default)]
    pub method: SortMethod,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locales: Option<Locales>,
    #[serde(default)]
    pub include_names: bool,
}

impl SortConfig {
    pub fn alphabetical() -> Self {
        Self {
            method: SortMethod::Alphabetical,
            ..Default::default()
        }
    }

    pub fn with_order(mut self, order: Vec<OrderItem>) -> Self {
        self.order = order;
        self
    }

    pub fn with_names(mut self) -> Self {
        self.include_names = true;
        self
    }

    pub fn with_locales(mut self, locales: impl Into<String>) -> Self {
        self.locales = Some(Locales::One(locales.into()));
        self
    }
}

/// Position of a literal segment in an order list.
pub(crate) fn position_of(order: &[OrderItem], name: &str) -> Option<usize> {
    order.iter().position(|item| item.is_segment(name))
}

/// The sub-order that follows the entry at `index`, if it is a nested list.
pub(crate) fn nested_after(order: &[OrderItem], index: usize) -> &[OrderItem] {
    match order.get(index + 1) {
        Some(OrderItem::Nested(items)) => items,
        _ => &[],
    }
}
