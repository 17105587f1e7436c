//! Scripted [`SourceClient`] for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{Page, PageInfo, PageRequest, RawCampaign, RawPickup, RawPost, SourceClient, SourceType};
use crate::error::SourceError;
use crate::lock;

type Responder<T> = Box<dyn Fn(&PageRequest) -> Result<Page<T>, SourceError> + Send + Sync>;

/// Answers each source from a swappable closure and counts calls.
pub struct MockSourceClient {
    pickups: Mutex<Responder<RawPickup>>,
    campaigns: Mutex<Responder<RawCampaign>>,
    posts: Mutex<Responder<RawPost>>,
    delay: Mutex<Option<Duration>>,
    calls: [AtomicUsize; 3],
    pages: Mutex<Vec<(SourceType, u32)>>,
}

impl MockSourceClient {
    /// Every source answers with an empty page.
    pub fn new() -> Self {
        Self {
            pickups: Mutex::new(Box::new(|_| Ok(Page::default()))),
            campaigns: Mutex::new(Box::new(|_| Ok(Page::default()))),
            posts: Mutex::new(Box::new(|_| Ok(Page::default()))),
            delay: Mutex::new(None),
            calls: Default::default(),
            pages: Mutex::new(Vec::new()),
        }
    }

    pub fn set_pickups(
        &self,
        f: impl Fn(&PageRequest) -> Result<Page<RawPickup>, SourceError> + Send + Sync + 'static,
    ) {
        *lock(&self.pickups) = Box::new(f);
    }

    pub fn set_campaigns(
        &self,
        f: impl Fn(&PageRequest) -> Result<Page<RawCampaign>, SourceError> + Send + Sync + 'static,
    ) {
        *lock(&self.campaigns) = Box::new(f);
    }

    pub fn set_posts(
        &self,
        f: impl Fn(&PageRequest) -> Result<Page<RawPost>, SourceError> + Send + Sync + 'static,
    ) {
        *lock(&self.posts) = Box::new(f);
    }

    /// Make every call take `delay` (virtual time under `start_paused`).
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    /// Make every source fail.
    pub fn fail_all(&self) {
        self.set_pickups(|_| Err(SourceError::Network("pickups down".into())));
        self.set_campaigns(|_| Err(SourceError::Network("campaigns down".into())));
        self.set_posts(|_| Err(SourceError::Network("posts down".into())));
    }

    pub fn calls(&self, source: SourceType) -> usize {
        self.calls[source as usize].load(Ordering::SeqCst)
    }

    /// Pages requested so far, in call order.
    pub fn requested_pages(&self, source: SourceType) -> Vec<u32> {
        lock(&self.pages)
            .iter()
            .filter(|(s, _)| *s == source)
            .map(|&(_, page)| page)
            .collect()
    }

    async fn record(&self, source: SourceType, req: &PageRequest) {
        self.calls[source as usize].fetch_add(1, Ordering::SeqCst);
        lock(&self.pages).push((source, req.page));
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SourceClient for MockSourceClient {
    async fn fetch_job_pickups(&self, req: &PageRequest) -> Result<Page<RawPickup>, SourceError> {
        self.record(SourceType::JobPickup, req).await;
        (*lock(&self.pickups))(req)
    }

    async fn fetch_campaigns(&self, req: &PageRequest) -> Result<Page<RawCampaign>, SourceError> {
        self.record(SourceType::Campaign, req).await;
        (*lock(&self.campaigns))(req)
    }

    async fn fetch_posts(&self, req: &PageRequest) -> Result<Page<RawPost>, SourceError> {
        self.record(SourceType::Post, req).await;
        (*lock(&self.posts))(req)
    }
}

// -- fixtures -----------------------------------------------------------------

pub fn page<T>(items: Vec<T>, total_pages: u32) -> Page<T> {
    Page {
        pagination: PageInfo {
            total: items.len() as u64 * u64::from(total_pages.max(1)),
            total_pages,
        },
        items,
    }
}

pub fn pickup(id: i64, created_at: &str) -> RawPickup {
    RawPickup {
        id: Some(id),
        title: Some(format!("Pickup {id}")),
        created_at: Some(created_at.to_string()),
        ..Default::default()
    }
}

pub fn campaign(id: i64, created_at: &str) -> RawCampaign {
    RawCampaign {
        id: Some(id),
        name: Some(format!("Campaign {id}")),
        created_at: Some(created_at.to_string()),
        ..Default::default()
    }
}

pub fn post(id: i64, created_at: &str) -> RawPost {
    RawPost {
        id: Some(id),
        title: Some(format!("Post {id}")),
        created_at: Some(created_at.to_string()),
        ..Default::default()
    }
}
