//! Source client abstraction layer.
//!
//! This module defines the [`SourceClient`] trait through which the engine
//! reaches the three paginated upstream collections, the common [`FeedItem`]
//! type, and the raw item shapes.  The concrete HTTP client lives in
//! [`http`].
//!
//! ## For contributors — swapping the transport
//!
//! The engine never talks HTTP directly.  Anything that can answer the three
//! `fetch_*` calls (a different API, a fixture file, a test double) just
//! implements [`SourceClient`] and is handed to
//! [`FeedOrchestrator::new`](crate::orchestrator::FeedOrchestrator::new).

mod feed_item;
pub mod http;
#[cfg(test)]
pub(crate) mod mock;
pub mod raw;

// Re-export the public API of this module so callers can write
// `use crate::source::{FeedItem, HttpSourceClient, SourceClient};`
pub use feed_item::{FeedItem, SourceType};
pub use http::HttpSourceClient;
pub use raw::{RawCampaign, RawPickup, RawPost};

#[cfg(test)]
pub(crate) use feed_item::tests as feed_item_tests;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::SourceError;

/// Query parameters for one page of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub sort_by: &'static str,
    pub sort_order: &'static str,
    /// Collection-specific status filter, if the endpoint takes one.
    pub status: Option<&'static str>,
}

impl PageRequest {
    /// The request the feed issues to `source` for `page`.
    pub fn for_source(source: SourceType, page: u32, limit: u32) -> Self {
        let (sort_by, status) = match source {
            SourceType::JobPickup => ("createdAt", None),
            SourceType::Campaign => ("createdAt", Some("active")),
            SourceType::Post => ("publishedAt", Some("published")),
        };
        Self {
            page,
            limit,
            sort_by,
            sort_order: "desc",
            status,
        }
    }
}

/// Server-reported pagination totals for one collection.
///
/// `total_pages == 0` means the source has no items, or has never been
/// fetched successfully.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInfo {
    pub total: u64,
    pub total_pages: u32,
}

/// One page of raw items plus the collection's pagination totals.
#[derive(Debug, Clone, Default)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

/// The three upstream collections.
///
/// Calls are issued concurrently by the orchestrator, so implementations
/// must be [`Send`] + [`Sync`].  Errors are contained per source: a failing
/// call only removes that source from the current cycle.
#[async_trait]
pub trait SourceClient: Send + Sync {
    async fn fetch_job_pickups(&self, req: &PageRequest) -> Result<Page<RawPickup>, SourceError>;

    async fn fetch_campaigns(&self, req: &PageRequest) -> Result<Page<RawCampaign>, SourceError>;

    async fn fetch_posts(&self, req: &PageRequest) -> Result<Page<RawPost>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_requests_carry_per_source_filters() {
        let pickups = PageRequest::for_source(SourceType::JobPickup, 1, 10);
        assert_eq!(pickups.sort_by, "createdAt");
        assert_eq!(pickups.status, None);

        let campaigns = PageRequest::for_source(SourceType::Campaign, 2, 10);
        assert_eq!(campaigns.page, 2);
        assert_eq!(campaigns.status, Some("active"));

        let posts = PageRequest::for_source(SourceType::Post, 3, 5);
        assert_eq!(posts.sort_by, "publishedAt");
        assert_eq!(posts.status, Some("published"));
        assert_eq!(posts.sort_order, "desc");
        assert_eq!(posts.limit, 5);
    }

    #[test]
    fn page_info_defaults_missing_fields() {
        let info: PageInfo = serde_json::from_str(r#"{"total": 4}"#).unwrap();
        assert_eq!(info, PageInfo { total: 4, total_pages: 0 });
    }
}
