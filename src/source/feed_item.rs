//! The unified record shared by all three sources.
//!
//! `FeedItem` represents a single entry from any source (job pickup,
//! campaign, post).  Every source's raw item is converted into a `FeedItem`
//! by [`crate::normalize`] so merging, sorting and pagination can stay
//! source-agnostic.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};

/// Which upstream collection an item came from.
///
/// Drives the id prefix, the deep link and display metadata.  Merge
/// behaviour never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    JobPickup,
    Campaign,
    Post,
}

impl SourceType {
    /// All sources, in the order a cycle issues them.
    pub const ALL: [SourceType; 3] = [SourceType::JobPickup, SourceType::Campaign, SourceType::Post];

    /// Prefix used to make ids unique across sources.
    pub fn tag(self) -> &'static str {
        match self {
            SourceType::JobPickup => "pickup",
            SourceType::Campaign => "campaign",
            SourceType::Post => "post",
        }
    }

    /// Path segment of the deep link for this source.
    pub fn link_path(self) -> &'static str {
        match self {
            SourceType::JobPickup => "job-pickups",
            SourceType::Campaign => "campaigns",
            SourceType::Post => "posts",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceType::JobPickup => "job pickups",
            SourceType::Campaign => "campaigns",
            SourceType::Post => "posts",
        })
    }
}

/// A single feed entry, normalised from any source.
///
/// ## Sorting
///
/// `FeedItem` implements [`Ord`] for **reverse-chronological** ordering on
/// [`effective_date`](Self::effective_date): newer items sort before older
/// ones, and items without a valid date sort last.  Items with equal dates
/// compare `Equal`, so a stable sort keeps their insertion order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FeedItem {
    /// `"{tag}-{original_id}"`, unique across the whole feed.
    pub id: String,

    pub source_type: SourceType,

    /// Source-native identifier; only unique within its source.
    pub original_id: i64,

    /// Human-readable headline.  Empty if upstream sent none.
    pub title: String,

    /// Longer description or summary text.  Empty if upstream sent none.
    pub description: String,

    /// Secondary display line (company, campaign status, post author).
    pub subtitle: String,

    /// Timestamp used for ordering.
    ///
    /// `None` means upstream sent no date or an unparseable one; such items
    /// sort after all dated items.
    pub effective_date: Option<DateTime<Utc>>,

    /// Whether the item falls inside the "recent" window at normalisation
    /// time.  Always false when the date is invalid.
    pub is_recent: bool,

    /// Deep link to the item in the portal.
    pub link_url: String,
}

impl FeedItem {
    /// Build the composite feed id for a source-native id.
    pub fn compose_id(source_type: SourceType, original_id: i64) -> String {
        format!("{}-{}", source_type.tag(), original_id)
    }
}

// ---------------------------------------------------------------------------
// Ordering — reverse chronological (newest first)
// ---------------------------------------------------------------------------

impl Ord for FeedItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // `other` first so that `Some(newer) > Some(older)` gives us newest-first.
        // `None` is less than `Some(_)` in the standard library, so undated
        // items naturally sink to the bottom.
        other.effective_date.cmp(&self.effective_date)
    }
}

impl PartialOrd for FeedItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
