//! Ordered key resolution with session-lifetime memoization.
//!
//! The resolver walks its sources in fixed priority order and stops at the
//! first trimmed, non-empty candidate. An exhausted chain is `None` —
//! "feature unavailable" — never an error. The first success is cached for
//! the resolver's lifetime; [`KeyResolver::reset`] drops the cache.

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::keysource::{
    EnvSource, FileProbeSource, KeySource, KeyStore, OverrideSource, StoredSource,
};

/// A successfully resolved key together with the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub key: String,
    /// Name of the winning source (`override`, `env`, `stored`, ...).
    pub source: &'static str,
}

/// Walks an ordered list of [`KeySource`] strategies.
pub struct KeyResolver {
    sources: Vec<Box<dyn KeySource>>,
    cached: Mutex<Option<ResolvedKey>>,
}

impl KeyResolver {
    /// Resolver over an explicit source list, highest priority first.
    pub fn new(sources: Vec<Box<dyn KeySource>>) -> Self {
        Self {
            sources,
            cached: Mutex::new(None),
        }
    }

    /// Resolve the key, memoizing the first success.
    pub fn resolve(&self) -> Option<ResolvedKey> {
        if let Ok(cache) = self.cached.lock() {
            if let Some(hit) = cache.as_ref() {
                return Some(hit.clone());
            }
        }

        for source in &self.sources {
            if let Some(key) = source.try_resolve() {
                let resolved = ResolvedKey {
                    key,
                    source: source.name(),
                };
                debug!(source = resolved.source, "vendor API key resolved");
                if let Ok(mut cache) = self.cached.lock() {
                    *cache = Some(resolved.clone());
                }
                return Some(resolved);
            }
            debug!(source = source.name(), "key source empty, trying next");
        }

        None
    }

    /// Drop the memoized result so the next [`resolve`](Self::resolve)
    /// probes the sources again.
    pub fn reset(&self) {
        if let Ok(mut cache) = self.cached.lock() {
            *cache = None;
        }
    }
}

impl std::fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyResolver")
            .field("sources", &self.sources.len())
            .finish_non_exhaustive()
    }
}

/// Environment variable names probed for a vendor, most specific last.
fn env_names(vendor: &str) -> Vec<String> {
    vec![
        "WAITLINE_API_KEY".to_owned(),
        format!("{}_API_KEY", vendor.to_uppercase()),
    ]
}

/// Candidate config-file paths probed as a fallback of last resort.
fn probe_paths() -> Vec<PathBuf> {
    [".waitline.json", "waitline.json", ".env.waitline", ".env"]
        .into_iter()
        .map(PathBuf::from)
        .collect()
}

/// Build the standard resolution chain for a vendor:
/// override > environment > key store > config-file probe.
///
/// `override_key` is the query-parameter analog — consumed on first use
/// and written through to the key store.
pub fn default_resolver(vendor: &str, override_key: Option<String>) -> KeyResolver {
    let store = KeyStore::default_for(vendor);
    let mut sources: Vec<Box<dyn KeySource>> = Vec::new();

    if let Some(key) = override_key {
        sources.push(Box::new(OverrideSource::new(key, store.clone())));
    }

    let names = env_names(vendor);
    let mut probe_keys: Vec<String> = names.clone();
    probe_keys.push("api_key".to_owned());
    probe_keys.push("apiKey".to_owned());

    sources.push(Box::new(EnvSource::new(names)));
    if let Some(store) = store {
        sources.push(Box::new(StoredSource::new(store)));
    }
    sources.push(Box::new(FileProbeSource::new(probe_paths(), probe_keys)));

    KeyResolver::new(sources)
}
