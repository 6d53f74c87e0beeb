//! Candidate key sources.
//!
//! The landing page resolved its vendor API key from a pile of ambient
//! places (globals, query parameters, local storage, meta tags, inline
//! config blobs, remote config files). Each of those maps to one
//! [`KeySource`] here: an explicit value, a one-shot override, environment
//! variables, the persisted key store, and a tolerant config-file probe.
//! Sources are combined in priority order by [`crate::resolver::KeyResolver`].

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

/// A single candidate source for the vendor API key.
///
/// Implementations must be cheap to probe and must never fail loudly — a
/// source that has nothing to offer returns `None` and the resolver moves
/// on to the next one.
pub trait KeySource: Send + Sync {
    /// Short stable name, used in logs and `waitline status` output.
    fn name(&self) -> &'static str;

    /// Return the trimmed, non-empty candidate value, if this source has one.
    fn try_resolve(&self) -> Option<String>;
}

/// Trim a candidate and discard it when empty or whitespace-only.
fn non_empty(candidate: &str) -> Option<String> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

// ── Persisted key store ──────────────────────────────────────────────

/// File-backed key persistence, one file per vendor under `~/.waitline/`.
///
/// This is the localStorage analog: a key that arrives through a one-shot
/// override is written here so later sessions resolve it with no override
/// present.
#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    /// Store rooted at `dir`, keyed by vendor name.
    pub fn new(dir: &Path, vendor: &str) -> Self {
        Self {
            path: dir.join(format!("{vendor}-key")),
        }
    }

    /// Default store under the user's home directory, `None` when no home
    /// directory can be determined.
    pub fn default_for(vendor: &str) -> Option<Self> {
        home_dir().map(|home| Self::new(&home.join(".waitline"), vendor))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a key, creating the parent directory as needed.
    pub fn save(&self, key: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, key)?;

        // Restrict permissions on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&self.path, perms);
        }

        Ok(())
    }

    /// Load the persisted key, `None` when absent or empty.
    pub fn load(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        non_empty(&content)
    }

    /// Remove the persisted key, if any.
    pub fn clear(&self) -> std::io::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
}

// ── Sources ──────────────────────────────────────────────────────────

/// A constructor-injected key value (highest priority).
pub struct ExplicitSource {
    value: Option<String>,
}

impl ExplicitSource {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}

impl KeySource for ExplicitSource {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn try_resolve(&self) -> Option<String> {
        self.value.as_deref().and_then(non_empty)
    }
}

/// A one-shot caller-supplied override (the query-parameter analog).
///
/// The value is consumed on first use, and a hit is written through to the
/// [`KeyStore`] so subsequent resolutions without the override still
/// succeed.
pub struct OverrideSource {
    value: Mutex<Option<String>>,
    store: Option<KeyStore>,
}

impl OverrideSource {
    pub fn new(value: impl Into<String>, store: Option<KeyStore>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
            store,
        }
    }
}

impl KeySource for OverrideSource {
    fn name(&self) -> &'static str {
        "override"
    }

    fn try_resolve(&self) -> Option<String> {
        let taken = match self.value.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        let key = taken.as_deref().and_then(non_empty)?;

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&key) {
                warn!(path = %store.path().display(), error = %e, "failed to persist override key");
            }
        }

        Some(key)
    }
}

/// Environment variables, probed by name in order.
pub struct EnvSource {
    names: Vec<String>,
}

impl EnvSource {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl KeySource for EnvSource {
    fn name(&self) -> &'static str {
        "env"
    }

    fn try_resolve(&self) -> Option<String> {
        self.names
            .iter()
            .find_map(|name| std::env::var(name).ok().as_deref().and_then(non_empty))
    }
}

/// The persisted key store as a read-only source.
pub struct StoredSource {
    store: KeyStore,
}

impl StoredSource {
    pub fn new(store: KeyStore) -> Self {
        Self { store }
    }
}

impl KeySource for StoredSource {
    fn name(&self) -> &'static str {
        "stored"
    }

    fn try_resolve(&self) -> Option<String> {
        self.store.load()
    }
}

/// Fallback of last resort: probe a list of candidate config files.
///
/// Each candidate may be a JSON object (probed for the configured field
/// names) or `KEY=value` text. A missing file or a malformed document is
/// skipped — parse problems never propagate past this source.
pub struct FileProbeSource {
    paths: Vec<PathBuf>,
    keys: Vec<String>,
}

impl FileProbeSource {
    pub fn new<P, I, S>(paths: P, keys: I) -> Self
    where
        P: IntoIterator<Item = PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().collect(),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    fn probe_file(&self, path: &Path) -> Option<String> {
        let content = std::fs::read_to_string(path).ok()?;
        let trimmed = content.trim_start();

        if trimmed.starts_with('{') {
            match serde_json::from_str::<serde_json::Value>(&content) {
                Ok(json) => self.probe_json(&json),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "skipping malformed config file");
                    None
                }
            }
        } else {
            self.probe_env_format(&content)
        }
    }

    fn probe_json(&self, json: &serde_json::Value) -> Option<String> {
        self.keys.iter().find_map(|key| {
            json.get(key)
                .and_then(serde_json::Value::as_str)
                .and_then(non_empty)
        })
    }

    fn probe_env_format(&self, content: &str) -> Option<String> {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((name, value)) = line.split_once('=') else {
                continue;
            };
            if self.keys.iter().any(|k| k == name.trim()) {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if let Some(hit) = non_empty(value) {
                    return Some(hit);
                }
            }
        }
        None
    }
}

impl KeySource for FileProbeSource {
    fn name(&self) -> &'static str {
        "config-file"
    }

    fn try_resolve(&self) -> Option<String> {
        self.paths.iter().find_map(|path| self.probe_file(path))
    }
}
