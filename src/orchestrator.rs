//! The feed orchestrator: the engine's public entry point.
//!
//! ## Cycle pipeline
//!
//! ```text
//!              ┌─ fetch_job_pickups ─┐
//!  page N ─────┼─ fetch_campaigns ───┼─► normalize ─► merge_cycle ─► replace / append
//!  (parallel)  └─ fetch_posts ───────┘
//! ```
//!
//! All three calls are in flight at once and each is bounded by
//! [`FeedConfig::fetch_timeout`].  A failing source contributes nothing and
//! keeps its previous pagination entry; only when every source fails is the
//! cycle reported through [`FeedState::error`], with the existing items
//! left in place.
//!
//! Cycles are single-flight: explicit loads queue behind each other, poll
//! ticks that find a cycle running are skipped.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::error::{FeedError, SourceError};
use crate::lock;
use crate::merge::merge_cycle;
use crate::normalize::{normalize_campaign, normalize_pickup, normalize_post, NormalizeContext};
use crate::poll::PollController;
use crate::source::{FeedItem, Page, PageRequest, SourceClient, SourceType};
use crate::state::{FeedAccumulator, FeedState, PaginationUpdate};

/// Which in-flight flag a cycle raises.
#[derive(Debug, Clone, Copy)]
enum LoadKind {
    FirstPage,
    More,
}

/// Everything one cycle produced, before it touches the feed.
#[derive(Default)]
struct CycleResult {
    items: Vec<FeedItem>,
    pagination: PaginationUpdate,
    failures: Vec<(SourceType, SourceError)>,
}

impl CycleResult {
    fn absorb<T>(
        &mut self,
        source: SourceType,
        page: u32,
        result: Result<Page<T>, SourceError>,
        normalize: fn(&T, &NormalizeContext) -> FeedItem,
        ctx: &NormalizeContext,
    ) {
        match result {
            Ok(fetched) => {
                debug!(%source, page, items = fetched.items.len(), "source fetched");
                self.items
                    .extend(fetched.items.iter().map(|raw| normalize(raw, ctx)));
                self.pagination.set(source, fetched.pagination);
            }
            Err(error) => {
                warn!(%source, page, %error, "source fetch failed");
                self.failures.push((source, error));
            }
        }
    }
}

/// Owns the feed state and wires the sources, accumulator and poller
/// together.
///
/// Hold one long-lived instance per session; it is always handed out in an
/// [`Arc`] so the poll loop can reach it.
pub struct FeedOrchestrator {
    me: Weak<FeedOrchestrator>,
    client: Arc<dyn SourceClient>,
    config: FeedConfig,
    state: Mutex<FeedAccumulator>,
    cycle: tokio::sync::Mutex<()>,
    updates: watch::Sender<FeedState>,
    poller: PollController,
}

impl FeedOrchestrator {
    pub fn new(client: Arc<dyn SourceClient>, config: FeedConfig) -> Arc<Self> {
        let (updates, _) = watch::channel(FeedState::default());
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            client,
            config,
            state: Mutex::new(FeedAccumulator::new()),
            cycle: tokio::sync::Mutex::new(()),
            updates,
            poller: PollController::new(),
        })
    }

    /// Snapshot of the current feed.
    pub fn get_state(&self) -> FeedState {
        lock(&self.state).state().clone()
    }

    /// Receive a fresh snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.updates.subscribe()
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Fetch page 1 of every source and replace the feed with it.
    ///
    /// Never fails: a total failure is recorded in [`FeedState::error`].
    pub async fn load_first_page(&self) {
        let _cycle = self.cycle.lock().await;
        self.refresh().await;
    }

    /// Fetch the next logical page and append it.
    ///
    /// Does nothing before the first page has loaded or when no source
    /// reports further pages.
    pub async fn load_more(&self) {
        let _cycle = self.cycle.lock().await;

        let (next_page, has_more) = {
            let acc = lock(&self.state);
            let state = acc.state();
            (state.last_page + 1, state.last_page > 0 && state.has_more)
        };
        if !has_more {
            debug!(next_page, "no more pages to load");
            return;
        }

        let _loading = self.begin(LoadKind::More);
        match self.fetch_cycle(next_page).await {
            Ok(cycle) => {
                info!(page = next_page, items = cycle.items.len(), "appending page");
                self.update(|acc| acc.append(cycle.items, &cycle.pagination));
            }
            Err(error) => self.record_failure(error),
        }
    }

    /// Re-run the first-page load every `interval`, starting one interval
    /// from now.  Replaces any loop already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_polling(&self, interval: Duration) {
        let me = self.me.clone();
        self.poller.start(interval, move || {
            let me = me.clone();
            async move {
                match me.upgrade() {
                    Some(orchestrator) => {
                        orchestrator.poll_tick().await;
                        ControlFlow::Continue(())
                    }
                    None => ControlFlow::Break(()),
                }
            }
        });
    }

    /// Cancel future poll ticks.  A refresh already running still completes.
    pub fn stop_polling(&self) {
        self.poller.stop();
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_polling()
    }

    /// Interval of the running poll loop, if polling.
    pub fn poll_interval(&self) -> Option<Duration> {
        self.poller.interval()
    }

    async fn poll_tick(&self) {
        let Ok(_cycle) = self.cycle.try_lock() else {
            debug!("cycle in flight, skipping poll tick");
            return;
        };
        debug!("poll tick");
        self.refresh().await;
    }

    /// First-page cycle; caller holds the cycle lock.
    async fn refresh(&self) {
        let _loading = self.begin(LoadKind::FirstPage);
        match self.fetch_cycle(1).await {
            Ok(cycle) => {
                info!(items = cycle.items.len(), "feed refreshed");
                self.update(|acc| acc.replace(cycle.items, &cycle.pagination));
            }
            Err(error) => self.record_failure(error),
        }
    }

    async fn fetch_cycle(&self, page: u32) -> Result<CycleResult, FeedError> {
        let limit = self.config.page_size;
        let timeout = self.config.fetch_timeout;
        let pickups_req = PageRequest::for_source(SourceType::JobPickup, page, limit);
        let campaigns_req = PageRequest::for_source(SourceType::Campaign, page, limit);
        let posts_req = PageRequest::for_source(SourceType::Post, page, limit);

        let (pickups, campaigns, posts) = tokio::join!(
            with_timeout(timeout, self.client.fetch_job_pickups(&pickups_req)),
            with_timeout(timeout, self.client.fetch_campaigns(&campaigns_req)),
            with_timeout(timeout, self.client.fetch_posts(&posts_req)),
        );

        let ctx = NormalizeContext {
            now: Utc::now(),
            recent_window: self.config.recent_window,
        };
        let mut cycle = CycleResult::default();
        cycle.absorb(SourceType::JobPickup, page, pickups, normalize_pickup, &ctx);
        cycle.absorb(SourceType::Campaign, page, campaigns, normalize_campaign, &ctx);
        cycle.absorb(SourceType::Post, page, posts, normalize_post, &ctx);

        if cycle.failures.len() == SourceType::ALL.len() {
            return Err(FeedError::AllSourcesFailed {
                page,
                failures: cycle.failures,
            });
        }
        cycle.items = merge_cycle(cycle.items);
        Ok(cycle)
    }

    fn record_failure(&self, error: FeedError) {
        warn!(%error, "fetch cycle failed, keeping previous items");
        self.update(|acc| acc.fail(error.to_string()));
    }

    /// Mutate the accumulator and publish the result under one lock.
    fn update(&self, f: impl FnOnce(&mut FeedAccumulator)) {
        let mut acc = lock(&self.state);
        f(&mut acc);
        self.updates.send_replace(acc.state().clone());
    }

    fn begin(&self, kind: LoadKind) -> LoadingGuard<'_> {
        self.set_loading(kind, true);
        LoadingGuard { orchestrator: self, kind }
    }

    fn set_loading(&self, kind: LoadKind, loading: bool) {
        self.update(|acc| match kind {
            LoadKind::FirstPage => acc.set_loading(loading),
            LoadKind::More => acc.set_loading_more(loading),
        });
    }
}

/// Clears the in-flight flag on every exit path, including cancellation of
/// the surrounding future.
struct LoadingGuard<'a> {
    orchestrator: &'a FeedOrchestrator,
    kind: LoadKind,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.set_loading(self.kind, false);
    }
}

async fn with_timeout<T>(
    limit: Duration,
    fut: impl std::future::Future<Output = Result<T, SourceError>>,
) -> Result<T, SourceError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| SourceError::Timeout(limit))?
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
