use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DescError, Result};
use crate::store::Limits;
use crate::store::collection::DEFAULT_LIMIT;

/// Runtime settings, optionally read from a YAML file.
///
/// ```yaml
/// store_path: .partdesc.json
/// history_limit: 50
/// saved_limit: 50
/// merge_highlight_ms: 1000
/// separator: ", "
/// uppercase: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File backing the history/saved/current slots. Relative paths resolve
    /// against the working directory; `~` is not expanded.
    pub store_path: PathBuf,
    pub history_limit: usize,
    pub saved_limit: usize,
    /// How long a merged element stays flagged as recently merged.
    pub merge_highlight_ms: u64,
    /// Separator used when exporting elements as text.
    pub separator: String,
    /// Initial state of the uppercase toggle.
    pub uppercase: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(".partdesc.json"),
            history_limit: DEFAULT_LIMIT,
            saved_limit: DEFAULT_LIMIT,
            merge_highlight_ms: 1000,
            separator: ", ".to_owned(),
            uppercase: false,
        }
    }
}

impl Config {
    /// Load settings from `path`; fields left out keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| DescError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file cannot be loaded.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            history: self.history_limit,
            saved: self.saved_limit,
        }
    }

    pub fn merge_highlight(&self) -> Duration {
        Duration::from_millis(self.merge_highlight_ms)
    }
}
