use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{DescError, Result};

/// Callback fired with the new raw value after its key is written.
pub type Listener = Box<dyn FnMut(&str)>;

/// A string key-value store holding serialized slot values.
pub trait KeyValueStore {
    /// Raw serialized value for `key`, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Replace the value for `key` and notify its subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&mut self, key: &str, value: String) -> Result<()>;

    /// Register `listener` for future writes to `key`.
    fn subscribe(&mut self, key: &str, listener: Listener);
}

/// Listener registry shared by the store implementations.
#[derive(Default)]
struct Subscribers {
    by_key: HashMap<String, Vec<Listener>>,
}

impl Subscribers {
    fn add(&mut self, key: &str, listener: Listener) {
        self.by_key.entry(key.to_owned()).or_default().push(listener);
    }

    fn notify(&mut self, key: &str, value: &str) {
        if let Some(listeners) = self.by_key.get_mut(key) {
            for listener in listeners.iter_mut() {
                listener(value);
            }
        }
    }
}

/// Deserialize the slot `key`, falling back to `default` when it is absent
/// or cannot be parsed.
pub fn load_or<T, S>(store: &S, key: &str, default: T) -> T
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key) else {
        return default;
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "unparsable slot, using default");
            default
        }
    }
}

/// Serialize `value` into the slot `key`.
///
/// # Errors
///
/// Returns an error if serialization or the store write fails.
pub fn save<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, raw)
}

/// In-process store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_owned(), value.clone());
        self.subscribers.notify(key, &value);
        Ok(())
    }

    fn subscribe(&mut self, key: &str, listener: Listener) {
        self.subscribers.add(key, listener);
    }
}

/// Store persisted as a single JSON object file mapping slot names to their
/// serialized values.
///
/// The whole file is rewritten on every `set`. Concurrent writers are not
/// coordinated: the last write wins.
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
    subscribers: Subscribers,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing or corrupt file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "corrupt store file, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(DescError::Read { path, source }),
        };
        Ok(Self {
            path,
            values,
            subscribers: Subscribers::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, contents)?;
        tracing::debug!(path = %self.path.display(), "store written");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_owned(), value.clone());
        self.flush()?;
        self.subscribers.notify(key, &value);
        Ok(())
    }

    fn subscribe(&mut self, key: &str, listener: Listener) {
        self.subscribers.add(key, listener);
    }
}
