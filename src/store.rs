use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Key under which the selected language is persisted
pub const LANGUAGE_KEY: &str = "language";

#[derive(Debug)]
struct StoreInner {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    persist_count: u64,
}

/// Durable key-value store for user preferences and cached payloads.
///
/// One JSON object per installation, loaded on open and rewritten atomically
/// (temp file + rename) on every mutation. This is the crate's analog of the
/// browser's localStorage: it survives restarts and is shared by every handle
/// cloned from the same `open` call.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl PreferenceStore {
    /// Open the store at `path`, loading existing contents.
    ///
    /// A missing file starts the store empty. A corrupt file also starts it
    /// empty with a diagnostic; preferences are reconstructible state and a
    /// bad file must never take the application down.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Preference store at {} is corrupt ({}), starting empty", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).context(format!("Failed to read preference store at {}", path.display()))
            }
        };

        Ok(Self {
            inner: Arc::new(Mutex::new(StoreInner {
                path,
                entries,
                persist_count: 0,
            })),
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let inner = self.inner.lock().expect("store lock poisoned");
        inner.entries.get(key).cloned()
    }

    /// Set a key. Writing the value a key already holds is a no-op and
    /// performs no durable write.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if inner.entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        inner.entries.insert(key.to_string(), value.to_string());
        Self::persist(&mut inner)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if inner.entries.remove(key).is_none() {
            return Ok(());
        }
        Self::persist(&mut inner)
    }

    pub fn clear(&self) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if inner.entries.is_empty() {
            return Ok(());
        }
        inner.entries.clear();
        Self::persist(&mut inner)
    }

    /// Persisted language preference, if any
    pub fn language(&self) -> Option<String> {
        self.get(LANGUAGE_KEY)
    }

    pub fn set_language(&self, code: &str) -> Result<()> {
        self.set(LANGUAGE_KEY, code)
    }

    /// Number of durable writes performed by this store since open
    pub fn persist_count(&self) -> u64 {
        self.inner.lock().expect("store lock poisoned").persist_count
    }

    fn persist(inner: &mut StoreInner) -> Result<()> {
        let raw = serde_json::to_string_pretty(&inner.entries)
            .context("Failed to serialize preference store")?;

        // Write-then-rename so a crash mid-write never corrupts the store
        let tmp = inner.path.with_extension("json.tmp");
        std::fs::write(&tmp, raw)
            .context(format!("Failed to write preference store at {}", tmp.display()))?;
        std::fs::rename(&tmp, &inner.path)
            .context(format!("Failed to replace preference store at {}", inner.path.display()))?;

        inner.persist_count += 1;
        Ok(())
    }
}
