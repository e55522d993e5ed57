//! The story comparator.

use std::cmp::Ordering;

use super::collate::collate;
use super::types::{nested_after, position_of, OrderItem, SortConfig, SortMethod, WILDCARD};

/// Anything that can be placed in story order.
pub trait SortEntry {
    /// Hierarchical kind path, segments separated by `/`.
    fn kind(&self) -> &str;
    /// Story name within the kind.
    fn name(&self) -> &str;
}

/// Split a kind path into trimmed segments (`"a / b"` -> `["a", "b"]`).
pub fn split_kind(kind: &str) -> Vec<&str> {
    kind.trim().split('/').map(str::trim).collect()
}

/// Order two stories under `config`.
///
/// Walks the kind path segment by segment. At the first differing segment the
/// `order` list decides when either segment is listed (unlisted segments take
/// the wildcard's position, or sort after every listed entry when there is no
/// wildcard). Otherwise `method` decides. Equal segments descend into the
/// nested order list that follows the matching entry.
pub fn compare<T: SortEntry + ?Sized>(a: &T, b: &T, config: &SortConfig) -> Ordering {
    // Same kind keeps definition order unless names take part
    if a.kind() == b.kind() && !config.include_names {
        return Ordering::Equal;
    }

    let mut path_a = split_kind(a.kind());
    let mut path_b = split_kind(b.kind());
    if config.include_names {
        path_a.push(a.name());
        path_b.push(b.name());
    }

    let mut order: &[OrderItem] = &config.order;
    let mut depth = 0;
    loop {
        let (seg_a, seg_b) = match (path_a.get(depth), path_b.get(depth)) {
            (None, None) => return Ordering::Equal,
            // Registration order decides between a kind and its children
            (None, Some(_)) | (Some(_), None) if config.method == SortMethod::Configure => {
                return Ordering::Equal
            }
            // Shallower paths go first
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => (*x, *y),
        };

        if seg_a != seg_b {
            return compare_segments(seg_a, seg_b, order, config);
        }

        let index = position_of(order, seg_a).or_else(|| position_of(order, WILDCARD));
        order = match index {
            Some(i) => nested_after(order, i),
            None => &[],
        };
        depth += 1;
    }
}

fn compare_segments(seg_a: &str, seg_b: &str, order: &[OrderItem], config: &SortConfig) -> Ordering {
    let index_a = position_of(order, seg_a);
    let index_b = position_of(order, seg_b);

    if index_a.is_some() || index_b.is_some() {
        let fallback = position_of(order, WILDCARD).unwrap_or(order.len());
        let a = index_a.unwrap_or(fallback);
        let b = index_b.unwrap_or(fallback);
        return a.cmp(&b);
    }

    match config.method {
        SortMethod::Configure => Ordering::Equal,
        SortMethod::Alphabetical => collate(seg_a, seg_b, config.locales.as_ref()),
    }
}
