//! HTTP seam between the solver and the network.
//!
//! `ReqwestFetcher` does the real work; `CachedFetcher` wraps any fetcher
//! with a short-lived in-memory cache so repeated questions within a few
//! minutes do not hit Wolfram Alpha again.

use async_trait::async_trait;
use lru::LruCache;
use reqwest::{Client, Url};
use std::{
    fmt::Debug,
    num::NonZeroUsize,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;

/// Default lifetime of a cached response.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Status and raw body of a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait HttpFetch: Send + Sync + Debug {
    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<HttpResponse>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
    http: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<HttpResponse> {
        let res = self.http.get(url).query(params).send().await?;
        let status = res.status().as_u16();
        let body = res.bytes().await?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

#[derive(Debug)]
struct CachedResponse {
    response: HttpResponse,
    inserted_at: Instant,
}

/// LRU response cache with a TTL, keyed by the full request URL.
///
/// Only successful responses are stored. The lock is never held across
/// the inner request.
#[derive(Debug)]
pub struct CachedFetcher<F> {
    inner: F,
    cache: Mutex<LruCache<String, CachedResponse>>,
    ttl: Duration,
}

impl<F: HttpFetch> CachedFetcher<F> {
    /// * `capacity` - Maximum number of responses to keep (at least 1)
    /// * `ttl` - How long a response stays valid
    pub fn new(inner: F, capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn with_defaults(inner: F) -> Self {
        Self::new(inner, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Drop every entry older than the TTL.
    pub async fn prune_expired(&self) {
        let mut cache = self.cache.lock().await;
        let now = Instant::now();

        let expired: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.inserted_at) >= self.ttl)
            .map(|(key, _)| key.clone())
            .collect();

        for key in expired {
            cache.pop(&key);
        }
    }

    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn lookup(&self, key: &str) -> Option<HttpResponse> {
        let mut cache = self.cache.lock().await;

        let fresh = cache
            .get(key)
            .map(|entry| entry.inserted_at.elapsed() < self.ttl)?;

        if fresh {
            cache.get(key).map(|entry| entry.response.clone())
        } else {
            cache.pop(key);
            None
        }
    }
}

impl CachedFetcher<ReqwestFetcher> {
    pub fn reqwest() -> Self {
        Self::with_defaults(ReqwestFetcher::new())
    }
}

#[async_trait]
impl<F: HttpFetch> HttpFetch for CachedFetcher<F> {
    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<HttpResponse> {
        let key = cache_key(url, params);

        if let Some(hit) = self.lookup(&key).await {
            debug!(%url, "response cache hit");
            return Ok(hit);
        }

        debug!(%url, "response cache miss");
        let response = self.inner.get(url, params).await?;

        if response.is_success() {
            self.cache.lock().await.put(
                key,
                CachedResponse {
                    response: response.clone(),
                    inserted_at: Instant::now(),
                },
            );
        }

        Ok(response)
    }
}

fn cache_key(url: &str, params: &[(&str, &str)]) -> String {
    match Url::parse_with_params(url, params) {
        Ok(full) => full.into(),
        Err(_) => {
            let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            format!("{url}?{}", query.join("&"))
        }
    }
}
