//! HTTP implementation of [`SourceClient`].
//!
//! Each collection endpoint answers with the portal's standard envelope:
//!
//! ```text
//! { "success": true,
//!   "data": { "<collection>": [ ... ], "pagination": { "total": 31, "totalPages": 4 } } }
//! ```
//!
//! Envelope decoding is a pure function ([`decode_page`]) so tests can
//! exercise it without hitting the network.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::raw::decode_item;
use super::{Page, PageInfo, PageRequest, RawCampaign, RawPickup, RawPost, SourceClient};
use crate::error::SourceError;

/// Talks to the portal's REST API.
pub struct HttpSourceClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpSourceClient {
    /// Create a client rooted at `base_url` (e.g. `https://portal.example/api`).
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn get_page<T>(
        &self,
        path: &str,
        collection: &str,
        req: &PageRequest,
    ) -> Result<Page<T>, SourceError>
    where
        T: for<'de> Deserialize<'de> + Default,
    {
        let url = format!("{}/{}", self.base_url, path);
        let mut query = vec![
            ("page", req.page.to_string()),
            ("limit", req.limit.to_string()),
            ("sortBy", req.sort_by.to_string()),
            ("sortOrder", req.sort_order.to_string()),
        ];
        if let Some(status) = req.status {
            query.push(("status", status.to_string()));
        }

        let mut request = self.client.get(&url).query(&query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.bytes().await?;
        let page = decode_page(&body, collection)?;
        tracing::debug!(
            collection,
            page = req.page,
            items = page.items.len(),
            total_pages = page.pagination.total_pages,
            "fetched page"
        );
        Ok(page)
    }
}

#[async_trait]
impl SourceClient for HttpSourceClient {
    async fn fetch_job_pickups(&self, req: &PageRequest) -> Result<Page<RawPickup>, SourceError> {
        self.get_page("job-pickups", "pickups", req).await
    }

    async fn fetch_campaigns(&self, req: &PageRequest) -> Result<Page<RawCampaign>, SourceError> {
        self.get_page("campaigns", "campaigns", req).await
    }

    async fn fetch_posts(&self, req: &PageRequest) -> Result<Page<RawPost>, SourceError> {
        self.get_page("posts", "posts", req).await
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

/// Decode a response envelope whose item array lives under `collection`.
///
/// `success: false` or a missing `data` object is a [`SourceError`]; a
/// missing item array or pagination block is an empty page.  Individual
/// items never fail the page.
pub fn decode_page<T>(body: &[u8], collection: &str) -> Result<Page<T>, SourceError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    let envelope: Envelope = serde_json::from_slice(body)?;
    if !envelope.success {
        return Err(SourceError::Unsuccessful(
            envelope.message.unwrap_or_else(|| "success=false".into()),
        ));
    }
    let mut data = envelope
        .data
        .ok_or_else(|| SourceError::Decode("missing data".into()))?;

    let items = match data.remove(collection) {
        Some(Value::Array(values)) => values.into_iter().map(decode_item).collect(),
        _ => Vec::new(),
    };
    let pagination = data
        .remove("pagination")
        .and_then(|v| serde_json::from_value::<PageInfo>(v).ok())
        .unwrap_or_default();

    Ok(Page { items, pagination })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
