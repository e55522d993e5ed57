//! Story ordering.
//!
//! Provides the comparator used to sort stories for the sidebar, the default
//! selection and next/previous navigation:
//! - `SortConfig` - the `storySort` options (`method`, `order`, `locales`, `includeNames`)
//! - `compare` - strict weak ordering over two sortable entries
//! - `collate` - case-insensitive, accent-aware string comparison
//!
//! # Example
//!
//! ```ignore
//! use storybook_core::story_sort::{compare, SortConfig, SortMethod};
//!
//! let config = SortConfig::alphabetical();
//! records.sort_by(|a, b| compare(a, b, &config)); // stable: ties keep registration order
//! ```

mod collate;
mod comparator;
mod types;

#[cfg(test)]
#[path = "story_sort_tests.rs"]
mod story_sort_tests;

pub use collate::collate;
pub use comparator::{compare, split_kind, SortEntry};
pub use types::{Locales, OrderItem, SortConfig, SortMethod, WILDCARD};
