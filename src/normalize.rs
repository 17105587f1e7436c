//! Record normaliser: raw source items → [`FeedItem`].
//!
//! Every function here is pure and infallible.  A malformed raw item maps to
//! a `FeedItem` with empty strings, id `0` and no date instead of failing the
//! cycle, which keeps upstream schema drift (a post carrying `publishedAt`
//! instead of `createdAt`, say) away from the merge logic.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::source::{FeedItem, RawCampaign, RawPickup, RawPost, SourceType};

/// Default width of the "recent" window.
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Inputs that are the same for every item in one cycle.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext {
    pub now: DateTime<Utc>,
    pub recent_window: Duration,
}

impl NormalizeContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            recent_window: Duration::days(RECENT_WINDOW_DAYS),
        }
    }
}

pub fn normalize_pickup(raw: &RawPickup, ctx: &NormalizeContext) -> FeedItem {
    build(
        SourceType::JobPickup,
        raw.id,
        first_present(&[&raw.title, &raw.job_title]),
        first_present(&[&raw.description]),
        first_present(&[&raw.company_name]),
        effective_date(&[&raw.created_at]),
        ctx,
    )
}

pub fn normalize_campaign(raw: &RawCampaign, ctx: &NormalizeContext) -> FeedItem {
    build(
        SourceType::Campaign,
        raw.id,
        first_present(&[&raw.name, &raw.title]),
        first_present(&[&raw.description]),
        first_present(&[&raw.status]),
        effective_date(&[&raw.created_at, &raw.start_date]),
        ctx,
    )
}

pub fn normalize_post(raw: &RawPost, ctx: &NormalizeContext) -> FeedItem {
    build(
        SourceType::Post,
        raw.id,
        first_present(&[&raw.title]),
        first_present(&[&raw.excerpt, &raw.content]),
        first_present(&[&raw.author_name]),
        effective_date(&[&raw.created_at, &raw.published_at]),
        ctx,
    )
}

fn build(
    source_type: SourceType,
    id: Option<i64>,
    title: String,
    description: String,
    subtitle: String,
    effective_date: Option<DateTime<Utc>>,
    ctx: &NormalizeContext,
) -> FeedItem {
    let original_id = id.unwrap_or_default();
    FeedItem {
        id: FeedItem::compose_id(source_type, original_id),
        source_type,
        original_id,
        title,
        description,
        subtitle,
        effective_date,
        is_recent: is_recent(effective_date, ctx),
        link_url: format!("/{}/{}", source_type.link_path(), original_id),
    }
}

/// First non-blank candidate, or an empty string.
fn first_present(candidates: &[&Option<String>]) -> String {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// First candidate that is present and parses.
fn effective_date(candidates: &[&Option<String>]) -> Option<DateTime<Utc>> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .find_map(parse_date)
}

/// A date in the future counts as recent; an invalid one never does.
fn is_recent(date: Option<DateTime<Utc>>, ctx: &NormalizeContext) -> bool {
    date.is_some_and(|d| ctx.now.signed_duration_since(d) <= ctx.recent_window)
}

/// Parse the ISO-ish timestamps the API emits.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` / `YYYY-MM-DD HH:MM:SS`
/// (taken as UTC) and bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
