//! Feed state and the accumulator that owns it.
//!
//! [`FeedAccumulator`] is the only thing that mutates a [`FeedState`].  Both
//! [`replace`](FeedAccumulator::replace) and
//! [`append`](FeedAccumulator::append) take a whole cycle's result and apply
//! it in one step; the orchestrator calls them under a single lock so no
//! reader ever sees `items` from one cycle next to `pagination` from another.

use crate::merge::merge_cycle;
use crate::source::{FeedItem, PageInfo, SourceType};

/// Server-reported totals for each source, tracked independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub job_pickups: PageInfo,
    pub campaigns: PageInfo,
    pub posts: PageInfo,
}

impl Pagination {
    pub fn get(&self, source: SourceType) -> PageInfo {
        match source {
            SourceType::JobPickup => self.job_pickups,
            SourceType::Campaign => self.campaigns,
            SourceType::Post => self.posts,
        }
    }

    fn get_mut(&mut self, source: SourceType) -> &mut PageInfo {
        match source {
            SourceType::JobPickup => &mut self.job_pickups,
            SourceType::Campaign => &mut self.campaigns,
            SourceType::Post => &mut self.posts,
        }
    }

    /// Overwrite the entries a cycle reported; leave the rest untouched.
    pub fn apply(&mut self, update: &PaginationUpdate) {
        for source in SourceType::ALL {
            if let Some(info) = update.get(source) {
                *self.get_mut(source) = info;
            }
        }
    }

    pub fn max_total_pages(&self) -> u32 {
        SourceType::ALL
            .iter()
            .map(|&s| self.get(s).total_pages)
            .max()
            .unwrap_or(0)
    }
}

/// Pagination reported by one cycle.  `None` marks a source that failed and
/// whose previous entry must be kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationUpdate {
    entries: [Option<PageInfo>; 3],
}

impl PaginationUpdate {
    fn index(source: SourceType) -> usize {
        match source {
            SourceType::JobPickup => 0,
            SourceType::Campaign => 1,
            SourceType::Post => 2,
        }
    }

    pub fn set(&mut self, source: SourceType, info: PageInfo) {
        self.entries[Self::index(source)] = Some(info);
    }

    pub fn get(&self, source: SourceType) -> Option<PageInfo> {
        self.entries[Self::index(source)]
    }
}

/// Read-only snapshot of the feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    /// De-duplicated, reverse-chronological items.
    pub items: Vec<FeedItem>,
    pub pagination: Pagination,
    /// A first-page load is in flight.
    pub is_loading: bool,
    /// A load-more is in flight.
    pub is_loading_more: bool,
    /// Set when every source failed in the last cycle; cleared by the next
    /// cycle that gets anything back.
    pub error: Option<String>,
    /// Whether any source reports pages beyond `last_page`.
    pub has_more: bool,
    /// Logical pages applied so far.  `0` until the first successful load.
    pub last_page: u32,
}

impl FeedState {
    /// Nothing loaded and nothing wrong: the "no data" case.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.error.is_none()
    }
}

/// Owns the running [`FeedState`].
#[derive(Debug, Default)]
pub struct FeedAccumulator {
    state: FeedState,
}

impl FeedAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    /// Start over from page 1 with a fresh cycle's items.
    pub fn replace(&mut self, items: Vec<FeedItem>, update: &PaginationUpdate) {
        self.state.items = merge_cycle(items);
        self.state.pagination.apply(update);
        self.state.error = None;
        self.state.last_page = 1;
        self.recompute_has_more();
    }

    /// Fold the next page into the accumulated feed.
    ///
    /// Items already present from an earlier page are not repeated; the
    /// earlier copy wins.
    pub fn append(&mut self, items: Vec<FeedItem>, update: &PaginationUpdate) {
        let existing = std::mem::take(&mut self.state.items);
        self.state.items = merge_cycle(existing.into_iter().chain(items));
        self.state.pagination.apply(update);
        self.state.error = None;
        self.state.last_page += 1;
        self.recompute_has_more();
    }

    /// Record a total cycle failure.  Items and pagination are kept.
    pub fn fail(&mut self, error: String) {
        self.state.error = Some(error);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.is_loading = loading;
    }

    pub fn set_loading_more(&mut self, loading: bool) {
        self.state.is_loading_more = loading;
    }

    fn recompute_has_more(&mut self) {
        self.state.has_more = self.state.pagination.max_total_pages() > self.state.last_page;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::feed_item_tests::{day, make_item};

    fn update(pickups: Option<u32>, campaigns: Option<u32>, posts: Option<u32>) -> PaginationUpdate {
        let mut u = PaginationUpdate::default();
        let sources = [
            (SourceType::JobPickup, pickups),
            (SourceType::Campaign, campaigns),
            (SourceType::Post, posts),
        ];
        for (source, pages) in sources {
            if let Some(total_pages) = pages {
                u.set(
                    source,
                    PageInfo {
                        total: u64::from(total_pages) * 10,
                        total_pages,
                    },
                );
            }
        }
        u
    }

    #[test]
    fn new_accumulator_starts_empty() {
        let acc = FeedAccumulator::new();
        let state = acc.state();
        assert!(state.items.is_empty());
        assert!(state.is_empty());
        assert!(!state.has_more);
        assert_eq!(state.last_page, 0);
        assert_eq!(state.pagination, Pagination::default());
    }

    #[test]
    fn replace_sets_items_and_clears_error() {
        let mut acc = FeedAccumulator::new();
        acc.fail("boom".into());

        acc.replace(
            vec![make_item("a", day(2025, 1, 1)), make_item("b", day(2025, 2, 1))],
            &update(Some(3), Some(1), Some(0)),
        );

        let state = acc.state();
        assert_eq!(state.items[0].id, "b");
        assert!(state.error.is_none());
        assert_eq!(state.last_page, 1);
        assert!(state.has_more, "pickups report 3 pages");
        assert_eq!(state.pagination.job_pickups.total_pages, 3);
    }

    #[test]
    fn replace_discards_previous_items() {
        let mut acc = FeedAccumulator::new();
        acc.replace(vec![make_item("old", day(2025, 1, 1))], &update(Some(1), None, None));
        acc.replace(vec![make_item("new", day(2025, 1, 2))], &update(Some(1), None, None));

        assert_eq!(acc.state().items.len(), 1);
        assert_eq!(acc.state().items[0].id, "new");
    }

    #[test]
    fn failed_source_keeps_previous_pagination() {
        let mut acc = FeedAccumulator::new();
        acc.replace(Vec::new(), &update(Some(2), Some(5), Some(1)));
        acc.replace(Vec::new(), &update(Some(3), None, Some(1)));

        let p = acc.state().pagination;
        assert_eq!(p.job_pickups.total_pages, 3);
        assert_eq!(p.campaigns.total_pages, 5, "campaigns failed, kept");
        assert_eq!(p.posts.total_pages, 1);
    }

    #[test]
    fn append_dedups_against_history_and_keeps_order() {
        let mut acc = FeedAccumulator::new();
        acc.replace(
            vec![make_item("a", day(2025, 3, 1)), make_item("b", day(2025, 2, 1))],
            &update(Some(3), None, None),
        );
        acc.append(
            vec![make_item("b", day(2025, 2, 1)), make_item("c", day(2025, 1, 1))],
            &update(Some(3), None, None),
        );

        let ids: Vec<_> = acc.state().items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(acc.state().last_page, 2);
        assert!(acc.state().has_more);
    }

    #[test]
    fn append_never_shrinks() {
        let mut acc = FeedAccumulator::new();
        acc.replace(
            vec![make_item("a", day(2025, 3, 1)), make_item("b", None)],
            &update(Some(2), None, None),
        );
        let before = acc.state().items.len();

        acc.append(vec![make_item("a", day(2025, 3, 1))], &update(Some(2), None, None));

        assert!(acc.state().items.len() >= before);
    }

    #[test]
    fn pagination_totals_are_overwritten_not_summed() {
        let mut acc = FeedAccumulator::new();
        acc.replace(Vec::new(), &update(Some(4), None, None));
        acc.append(Vec::new(), &update(Some(2), None, None));

        assert_eq!(acc.state().pagination.job_pickups.total_pages, 2);
        assert!(!acc.state().has_more, "2 pages reported, 2 applied");
    }

    #[test]
    fn fail_keeps_items_and_pagination() {
        let mut acc = FeedAccumulator::new();
        acc.replace(vec![make_item("a", day(2025, 1, 1))], &update(Some(2), None, None));
        let before = acc.state().clone();

        acc.fail("all sources failed".into());

        assert_eq!(acc.state().items, before.items);
        assert_eq!(acc.state().pagination, before.pagination);
        assert_eq!(acc.state().last_page, 1);
        assert_eq!(acc.state().error.as_deref(), Some("all sources failed"));
        assert!(!acc.state().is_empty());
    }

    #[test]
    fn loading_flags_toggle_independently() {
        let mut acc = FeedAccumulator::new();
        acc.set_loading(true);
        assert!(acc.state().is_loading);
        assert!(!acc.state().is_loading_more);

        acc.set_loading(false);
        acc.set_loading_more(true);
        assert!(!acc.state().is_loading);
        assert!(acc.state().is_loading_more);
    }

    #[test]
    fn max_total_pages_across_sources() {
        let mut p = Pagination::default();
        assert_eq!(p.max_total_pages(), 0);
        p.apply(&update(Some(1), Some(4), Some(2)));
        assert_eq!(p.max_total_pages(), 4);
    }
}
