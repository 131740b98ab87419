//! Deterministic ordering of files and archive entries.

use std::cmp::Ordering;

/// Case-insensitive lexicographic comparison of two display names.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Stable sort by [`compare_names`]; items with equal names keep their discovery order.
pub fn sort_by_name<T>(items: &mut [T], name: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| compare_names(name(a), name(b)));
}
