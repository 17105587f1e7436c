//! feed-aggregator — one live, reverse-chronological feed out of three
//! independently paginated collections.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────────┐  Page<Raw*>  ┌────────────┐  FeedItem  ┌──────────┐
//! │ source/      │ ───────────► │ normalize  │ ─────────► │  merge   │
//! │ (3 fetches)  │  (parallel)  │  (pure)    │            │ (dedup,  │
//! └──────────────┘              └────────────┘            │  sort)   │
//!        ▲                                                └────┬─────┘
//!        │ load_first_page / load_more                         │
//! ┌──────┴───────┐   tick   ┌──────────┐   replace / append ┌───▼──────┐
//! │ orchestrator │ ◄─────── │  poll    │                    │  state   │
//! │              │ ───────────────────────────────────────► │ (accum.) │
//! └──────────────┘                                          └──────────┘
//! ```
//!
//! * **`source`** — the [`SourceClient`](source::SourceClient) trait, raw
//!   upstream shapes, and the HTTP implementation.
//! * **`normalize`** — maps each source's raw item to a [`FeedItem`](source::FeedItem).
//! * **`merge`** — de-duplicates and orders one batch of items.
//! * **`state`** — the feed snapshot and the accumulator that mutates it.
//! * **`poll`** — restartable interval loop.
//! * **`orchestrator`** — public entry point wiring everything together.

pub mod config;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod orchestrator;
pub mod poll;
pub mod source;
pub mod state;

pub use config::{Config, FeedConfig};
pub use error::{FeedError, SourceError};
pub use orchestrator::FeedOrchestrator;
pub use source::{FeedItem, HttpSourceClient, SourceClient, SourceType};
pub use state::{FeedState, Pagination};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a std mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
