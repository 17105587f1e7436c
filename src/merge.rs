//! Merge, de-duplicate and sort one cycle's worth of items.

use std::collections::HashSet;

use crate::source::FeedItem;

/// Combine items into a single de-duplicated, reverse-chronological list.
///
/// * The first occurrence of an `id` wins; later duplicates are dropped.
/// * Items are ordered by [`FeedItem`]'s `Ord` (newest first, undated last).
/// * The sort is stable, so equal dates and undated items keep the order in
///   which they were encountered.
///
/// The function is pure and idempotent: feeding its output back in returns
/// the same list.
pub fn merge_cycle(items: impl IntoIterator<Item = FeedItem>) -> Vec<FeedItem> {
    let mut seen = HashSet::new();
    let mut merged: Vec<FeedItem> = items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect();
    merged.sort(); // stable; uses Ord impl (reverse-chronological)
    merged
}
