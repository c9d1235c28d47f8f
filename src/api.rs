//! Backend API client with a TTL response cache and injectable fallback.
//!
//! The client consumes the publisher's REST backend:
//! - `GET /epapers` — e-paper summaries
//! - `GET /epapers/{id}` — one e-paper with full page/region data
//! - `GET /epapers/slug/{slug}` — same, addressed by slug
//!
//! # Failure policy
//!
//! There are no retries. A failed or unparseable response degrades, in
//! order, to: the cached response if one is still within TTL, then the
//! injected [`FallbackSource`], then an error. Errors are logged where
//! they occur and converted to fallback as early as possible; nothing in
//! this module panics on bad input.
//!
//! # Design
//!
//! The fallback dataset used to be module-level shared state loaded
//! lazily on first miss. Here it is an explicit trait implemented by
//! [`JsonFallback`] and passed to the client constructor, so tests and
//! offline runs can supply their own.

use crate::config::Config;
use crate::models::Epaper;
use crate::utils::truncate_for_log;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Source of last-resort e-paper data when the backend is unreachable.
pub trait FallbackSource {
    /// All e-papers the fallback knows about.
    fn epapers(&self) -> Option<Vec<Epaper>>;

    /// One e-paper addressed by id, `_id`, or slug.
    fn epaper(&self, candidate: &str) -> Option<Epaper>;
}

/// [`FallbackSource`] backed by a bundled JSON snapshot.
#[derive(Debug)]
pub struct JsonFallback {
    epapers: Vec<Epaper>,
}

impl JsonFallback {
    /// Parse a fallback dataset from a JSON array of e-papers.
    pub fn from_str(raw: &str) -> Result<Self, Box<dyn Error>> {
        let epapers: Vec<Epaper> = serde_json::from_str(raw)?;
        Ok(Self { epapers })
    }

    /// Load a fallback dataset from a JSON file on disk.
    pub fn from_path(path: &str) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path)?;
        let fallback = Self::from_str(&raw)?;
        info!(path, count = fallback.epapers.len(), "Loaded fallback dataset");
        Ok(fallback)
    }
}

impl FallbackSource for JsonFallback {
    fn epapers(&self) -> Option<Vec<Epaper>> {
        if self.epapers.is_empty() {
            None
        } else {
            Some(self.epapers.clone())
        }
    }

    fn epaper(&self, candidate: &str) -> Option<Epaper> {
        self.epapers
            .iter()
            .find(|e| {
                e.id.map(|id| id.to_string() == candidate).unwrap_or(false)
                    || e.raw_id.as_deref() == Some(candidate)
                    || e.slug.as_deref() == Some(candidate)
            })
            .cloned()
    }
}

/// In-memory response cache keyed by request path.
///
/// Entries expire after a single configured TTL and are dropped on read.
/// There is no size bound; the cache lives for one pipeline run.
pub struct TtlCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, String)>>,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a cached body, treating entries older than the TTL as gone.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        // Cached bodies are immutable once inserted, so a poisoned lock
        // still holds consistent data.
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some((stored_at, body)) if now.duration_since(*stored_at) <= self.ttl => {
                Some(body.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a response body under a request path.
    pub fn put(&self, key: &str, body: String) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), (Instant::now(), body));
    }
}

/// Client for the publisher's backend REST API.
pub struct EpaperClient<F> {
    http: reqwest::Client,
    base_url: String,
    cache: TtlCache,
    fallback: Option<F>,
}

impl<F> EpaperClient<F>
where
    F: FallbackSource,
{
    /// Build a client from configuration and an optional fallback source.
    ///
    /// The configured timeout applies to every request; there is exactly
    /// one timeout for the whole client.
    pub fn new(config: &Config, fallback: Option<F>) -> Result<Self, Box<dyn Error>> {
        let base = Url::parse(&config.api_base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            http,
            base_url: base.as_str().trim_end_matches('/').to_string(),
            cache: TtlCache::new(Duration::from_secs(config.cache_ttl_secs)),
            fallback,
        })
    }

    /// Fetch all e-paper summaries.
    #[instrument(level = "info", skip_all)]
    pub async fn list_epapers(&self) -> Result<Vec<Epaper>, Box<dyn Error>> {
        match self.fetch_parsed::<Vec<Epaper>>("/epapers").await {
            Ok(epapers) => Ok(epapers),
            Err(e) => {
                warn!(error = %e, "E-paper list fetch failed; consulting fallback");
                match self.fallback.as_ref().and_then(|f| f.epapers()) {
                    Some(epapers) => Ok(epapers),
                    None => Err(e),
                }
            }
        }
    }

    /// Fetch one e-paper with full page and region data by id or `_id`.
    #[instrument(level = "info", skip_all, fields(%candidate))]
    pub async fn epaper(&self, candidate: &str) -> Result<Epaper, Box<dyn Error>> {
        let path = format!("/epapers/{}", urlencoding::encode(candidate));
        self.fetch_epaper(&path, candidate).await
    }

    /// Fetch one e-paper by slug.
    #[instrument(level = "info", skip_all, fields(%slug))]
    pub async fn epaper_by_slug(&self, slug: &str) -> Result<Epaper, Box<dyn Error>> {
        let path = format!("/epapers/slug/{}", urlencoding::encode(slug));
        self.fetch_epaper(&path, slug).await
    }

    async fn fetch_epaper(&self, path: &str, candidate: &str) -> Result<Epaper, Box<dyn Error>> {
        match self.fetch_parsed::<Epaper>(path).await {
            Ok(epaper) => Ok(epaper),
            Err(e) => {
                warn!(error = %e, candidate, "E-paper fetch failed; consulting fallback");
                match self.fallback.as_ref().and_then(|f| f.epaper(candidate)) {
                    Some(epaper) => Ok(epaper),
                    None => Err(e),
                }
            }
        }
    }

    async fn fetch_parsed<T: DeserializeOwned>(&self, path: &str) -> Result<T, Box<dyn Error>> {
        let body = self.fetch_body(path).await?;
        match serde_json::from_str::<T>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                warn!(
                    path,
                    error = %e,
                    body_preview = %truncate_for_log(&body, 300),
                    "Backend returned non-conforming JSON"
                );
                Err(Box::new(e))
            }
        }
    }

    async fn fetch_body(&self, path: &str) -> Result<String, Box<dyn Error>> {
        if let Some(body) = self.cache.get(path) {
            debug!(path, "Response cache hit");
            return Ok(body);
        }
        let url = format!("{}{}", self.base_url, path);
        let t0 = Instant::now();
        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(path, elapsed_ms = t0.elapsed().as_millis() as u64, bytes = body.len(), "Fetched");
        self.cache.put(path, body.clone());
        Ok(body)
    }
}
